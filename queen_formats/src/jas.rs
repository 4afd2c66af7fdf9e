//! Sequential decoder for the static script stream (`QUEEN.JAS`) and its
//! companion string list (`QUEEN2.JAS`).
//!
//! Every section is prefixed by the count that sizes it, so the stream is
//! read in one forward pass over a cursor.

use std::io::{self, Cursor, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;

use crate::error::{FormatError, Result};
use crate::records::{
    ActorData, Area, CmdArea, CmdGameState, CmdInventory, CmdListData, CmdObject, FurnitureData,
    GraphicAnim, GraphicData, ItemData, ObjectData, ObjectDescription, Record, Rect, WalkOffData,
    read_table, write_table,
};
use crate::resource::{GameVersion, Platform};

pub const SCRIPT_FILE: &str = "QUEEN.JAS";
pub const TEXT_FILE: &str = "QUEEN2.JAS";
pub const PREAMBLE_LEN: usize = 20;
pub const VERSION_ID_LEN: usize = 5;
pub const MAX_AREAS_PER_ROOM: usize = 10;
pub const VERB_NAME_COUNT: usize = 12;
pub const JOE_RESPONSE_COUNT: usize = 40;

/// Per-room area tables plus the bounding box of every object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GridData {
    /// Indexed by room; slot 0 unused.
    pub obj_max: Vec<i16>,
    pub area_max: Vec<i16>,
    /// `areas[room][1..=area_max[room]]`, slot 0 of each room is a sentinel.
    pub areas: Vec<Vec<Area>>,
    /// 1-based, one per object.
    pub object_boxes: Vec<Rect>,
}

impl GridData {
    fn read_from<R: Read + ?Sized>(reader: &mut R, rooms: usize, objects: usize) -> Result<Self> {
        let mut grid = GridData {
            obj_max: vec![0],
            area_max: vec![0],
            areas: vec![Vec::new()],
            object_boxes: Vec::new(),
        };
        for room in 1..=rooms {
            let obj_max = reader.read_i16::<BigEndian>()?;
            let area_max = reader.read_i16::<BigEndian>()?;
            if area_max < 0 || area_max as usize > MAX_AREAS_PER_ROOM {
                return Err(FormatError::Malformed(format!(
                    "room {room} declares {area_max} areas"
                )));
            }
            grid.obj_max.push(obj_max);
            grid.area_max.push(area_max);
            grid.areas.push(read_table(reader, area_max as usize)?);
        }
        grid.object_boxes = read_table(reader, objects)?;
        Ok(grid)
    }

    fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        for room in 1..self.areas.len() {
            writer.write_i16::<BigEndian>(self.obj_max[room])?;
            writer.write_i16::<BigEndian>(self.area_max[room])?;
            write_table(writer, &self.areas[room])?;
        }
        write_table(writer, &self.object_boxes)
    }
}

/// The command table and its four satellite tables, all 1-based.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommandTables {
    pub list: Vec<CmdListData>,
    pub areas: Vec<CmdArea>,
    pub objects: Vec<CmdObject>,
    pub inventory: Vec<CmdInventory>,
    pub game_state: Vec<CmdGameState>,
}

/// An empty table still carries one placeholder record in the stream.
fn read_command_table<T, R>(reader: &mut R) -> io::Result<Vec<T>>
where
    T: Record + Default,
    R: Read + ?Sized,
{
    let count = reader.read_u16::<BigEndian>()? as usize;
    if count == 0 {
        T::read_from(reader)?;
        return Ok(vec![T::default()]);
    }
    read_table(reader, count)
}

fn write_command_table<T, W>(writer: &mut W, table: &[T]) -> io::Result<()>
where
    T: Record + Default,
    W: Write + ?Sized,
{
    let count = table.len().saturating_sub(1);
    writer.write_u16::<BigEndian>(count as u16)?;
    if count == 0 {
        return T::default().write_to(writer);
    }
    write_table(writer, table)
}

impl CommandTables {
    fn read_from<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            list: read_command_table(reader)?,
            areas: read_command_table(reader)?,
            objects: read_command_table(reader)?,
            inventory: read_command_table(reader)?,
            game_state: read_command_table(reader)?,
        })
    }

    fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        write_command_table(writer, &self.list)?;
        write_command_table(writer, &self.areas)?;
        write_command_table(writer, &self.objects)?;
        write_command_table(writer, &self.inventory)?;
        write_command_table(writer, &self.game_state)
    }
}

/// Whether a release ships the per-room sound table.
pub fn has_room_sfx_table(version: &GameVersion) -> bool {
    let dos = version.platform != Platform::Amiga;
    !(version.is_demo && dos) && !(version.is_interview && !dos)
}

/// Everything the script stream declares, decoded in stream order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JasData {
    pub num_rooms: u16,
    pub num_names: u16,
    pub num_descriptions: u16,
    pub objects: Vec<ObjectData>,
    /// `room_data[r] + 1 ..= room_data[r + 1]` are the objects of room `r`.
    pub room_data: Vec<u16>,
    pub sfx_names: Option<Vec<u16>>,
    pub items: Vec<ItemData>,
    pub graphics: Vec<GraphicData>,
    pub grid: GridData,
    pub walk_offs: Vec<WalkOffData>,
    pub object_descriptions: Vec<ObjectDescription>,
    pub commands: CommandTables,
    pub entry_obj: u16,
    pub furniture: Vec<FurnitureData>,
    pub num_actor_anims: u16,
    pub num_actor_names: u16,
    pub num_actor_files: u16,
    pub actors: Vec<ActorData>,
    pub graphic_anims: Vec<GraphicAnim>,
    pub version_id: String,
}

fn truncated(section: &'static str) -> impl Fn(io::Error) -> FormatError {
    move |err| {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            FormatError::Malformed(format!("script stream ends inside {section}"))
        } else {
            FormatError::Io(err)
        }
    }
}

fn read_count<R: Read + ?Sized>(reader: &mut R) -> io::Result<usize> {
    Ok(reader.read_u16::<BigEndian>()? as usize)
}

fn read_words<R: Read + ?Sized, const N: usize>(reader: &mut R) -> io::Result<[u16; N]> {
    let mut words = [0u16; N];
    for word in &mut words {
        *word = reader.read_u16::<BigEndian>()?;
    }
    Ok(words)
}

impl JasData {
    pub fn num_objects(&self) -> u16 {
        self.objects.len().saturating_sub(1) as u16
    }

    pub fn parse(bytes: &[u8], version: &GameVersion) -> Result<Self> {
        let mut reader = Cursor::new(bytes);
        let mut preamble = [0u8; PREAMBLE_LEN];
        reader.read_exact(&mut preamble).map_err(truncated("preamble"))?;

        let [num_rooms, num_names, num_objects, num_descriptions] =
            read_words::<_, 4>(&mut reader).map_err(truncated("header"))?;
        let rooms = num_rooms as usize;
        let object_count = num_objects as usize;

        let objects = read_table(&mut reader, object_count).map_err(truncated("objects"))?;

        // One start offset per room plus the closing object count.
        let mut room_data = Vec::with_capacity(rooms + 2);
        room_data.push(0);
        for _ in 0..=rooms {
            room_data.push(reader.read_u16::<BigEndian>().map_err(truncated("room table"))?);
        }
        if room_data.last() != Some(&num_objects) {
            return Err(FormatError::Malformed(format!(
                "room table ends at {:?}, expected {num_objects} objects",
                room_data.last()
            )));
        }

        let sfx_names = if has_room_sfx_table(version) {
            let mut names = Vec::with_capacity(rooms + 1);
            names.push(0);
            for _ in 0..rooms {
                names.push(reader.read_u16::<BigEndian>().map_err(truncated("room sounds"))?);
            }
            Some(names)
        } else {
            None
        };

        let count = read_count(&mut reader).map_err(truncated("items"))?;
        let items = read_table(&mut reader, count).map_err(truncated("items"))?;
        let count = read_count(&mut reader).map_err(truncated("graphics"))?;
        let graphics = read_table(&mut reader, count).map_err(truncated("graphics"))?;

        let grid = GridData::read_from(&mut reader, rooms, object_count).map_err(|err| match err {
            FormatError::Io(io) => truncated("grid")(io),
            other => other,
        })?;

        let count = read_count(&mut reader).map_err(truncated("walk-offs"))?;
        let walk_offs = read_table(&mut reader, count).map_err(truncated("walk-offs"))?;
        let count = read_count(&mut reader).map_err(truncated("descriptions"))?;
        let object_descriptions =
            read_table(&mut reader, count).map_err(truncated("descriptions"))?;

        let commands = CommandTables::read_from(&mut reader).map_err(truncated("commands"))?;
        let entry_obj = reader.read_u16::<BigEndian>().map_err(truncated("entry object"))?;

        let count = read_count(&mut reader).map_err(truncated("furniture"))?;
        let furniture = read_table(&mut reader, count).map_err(truncated("furniture"))?;

        let [num_actors, num_actor_anims, num_actor_names, num_actor_files] =
            read_words::<_, 4>(&mut reader).map_err(truncated("actor counts"))?;
        let actors = read_table(&mut reader, num_actors as usize).map_err(truncated("actors"))?;

        let count = read_count(&mut reader).map_err(truncated("animations"))?;
        let graphic_anims = read_table(&mut reader, count).map_err(truncated("animations"))?;

        let mut id = [0u8; VERSION_ID_LEN];
        reader.read_exact(&mut id).map_err(truncated("version id"))?;
        let version_id = String::from_utf8_lossy(&id).into_owned();
        if version_id != version.check_id() {
            return Err(FormatError::ReleaseVersionMismatch {
                expected: version.check_id().to_string(),
                found: version_id,
            });
        }

        Ok(Self {
            num_rooms,
            num_names,
            num_descriptions,
            objects,
            room_data,
            sfx_names,
            items,
            graphics,
            grid,
            walk_offs,
            object_descriptions,
            commands,
            entry_obj,
            furniture,
            num_actor_anims,
            num_actor_names,
            num_actor_files,
            actors,
            graphic_anims,
            version_id,
        })
    }

    /// Encodes the stream in the layout [`JasData::parse`] expects.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&[0u8; PREAMBLE_LEN])?;
        writer.write_u16::<BigEndian>(self.num_rooms)?;
        writer.write_u16::<BigEndian>(self.num_names)?;
        writer.write_u16::<BigEndian>(self.num_objects())?;
        writer.write_u16::<BigEndian>(self.num_descriptions)?;
        write_table(writer, &self.objects)?;
        let rooms = self.num_rooms as usize;
        for room in 1..=rooms {
            writer.write_u16::<BigEndian>(self.room_data.get(room).copied().unwrap_or(0))?;
        }
        writer.write_u16::<BigEndian>(self.num_objects())?;
        if let Some(names) = &self.sfx_names {
            for &name in names.iter().skip(1) {
                writer.write_u16::<BigEndian>(name)?;
            }
        }
        write_counted(writer, &self.items)?;
        write_counted(writer, &self.graphics)?;
        self.grid.write_to(writer)?;
        write_counted(writer, &self.walk_offs)?;
        write_counted(writer, &self.object_descriptions)?;
        self.commands.write_to(writer)?;
        writer.write_u16::<BigEndian>(self.entry_obj)?;
        write_counted(writer, &self.furniture)?;
        writer.write_u16::<BigEndian>(self.actors.len().saturating_sub(1) as u16)?;
        writer.write_u16::<BigEndian>(self.num_actor_anims)?;
        writer.write_u16::<BigEndian>(self.num_actor_names)?;
        writer.write_u16::<BigEndian>(self.num_actor_files)?;
        write_table(writer, &self.actors)?;
        write_counted(writer, &self.graphic_anims)?;
        let mut id = [b' '; VERSION_ID_LEN];
        let raw = self.version_id.as_bytes();
        let len = raw.len().min(VERSION_ID_LEN);
        id[..len].copy_from_slice(&raw[..len]);
        writer.write_all(&id)
    }
}

fn write_counted<T: Record, W: Write + ?Sized>(writer: &mut W, table: &[T]) -> io::Result<()> {
    writer.write_u16::<BigEndian>(table.len().saturating_sub(1) as u16)?;
    write_table(writer, table)
}

/// The string sections of `QUEEN2.JAS`. Lookups are 1-based and yield an
/// empty string when out of range.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JasText {
    pub descriptions: Vec<String>,
    pub object_names: Vec<String>,
    pub room_names: Vec<String>,
    pub verb_names: Vec<String>,
    pub joe_responses: Vec<String>,
    pub actor_anims: Vec<String>,
    pub actor_names: Vec<String>,
    pub actor_files: Vec<String>,
}

fn lookup(list: &[String], index: usize) -> &str {
    index
        .checked_sub(1)
        .and_then(|i| list.get(i))
        .map(String::as_str)
        .unwrap_or("")
}

impl JasText {
    pub fn parse(lines: &[String], data: &JasData) -> Result<Self> {
        let sizes = [
            data.num_descriptions as usize,
            data.num_names as usize,
            data.num_rooms as usize,
            VERB_NAME_COUNT,
            JOE_RESPONSE_COUNT,
            data.num_actor_anims as usize,
            data.num_actor_names as usize,
            data.num_actor_files as usize,
        ];
        let needed: usize = sizes.iter().sum();
        if lines.len() < needed {
            return Err(FormatError::Malformed(format!(
                "{TEXT_FILE} holds {} lines, {needed} expected",
                lines.len()
            )));
        }
        let mut rest = lines;
        let [
            descriptions,
            object_names,
            room_names,
            verb_names,
            joe_responses,
            actor_anims,
            actor_names,
            actor_files,
        ] = sizes.map(|size| {
            let (head, tail) = rest.split_at(size);
            rest = tail;
            head.to_vec()
        });
        Ok(Self {
            descriptions,
            object_names,
            room_names,
            verb_names,
            joe_responses,
            actor_anims,
            actor_names,
            actor_files,
        })
    }

    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for section in [
            &self.descriptions,
            &self.object_names,
            &self.room_names,
            &self.verb_names,
            &self.joe_responses,
            &self.actor_anims,
            &self.actor_names,
            &self.actor_files,
        ] {
            lines.extend(section.iter().cloned());
        }
        lines
    }

    pub fn description(&self, index: u16) -> &str {
        lookup(&self.descriptions, index as usize)
    }

    pub fn object_name(&self, index: i16) -> &str {
        lookup(&self.object_names, index.unsigned_abs() as usize)
    }

    pub fn room_name(&self, room: u16) -> &str {
        lookup(&self.room_names, room as usize)
    }

    pub fn verb_name(&self, index: usize) -> &str {
        lookup(&self.verb_names, index)
    }

    pub fn joe_response(&self, index: usize) -> &str {
        lookup(&self.joe_responses, index)
    }

    pub fn actor_anim(&self, index: u16) -> &str {
        lookup(&self.actor_anims, index as usize)
    }

    pub fn actor_name(&self, index: u16) -> &str {
        lookup(&self.actor_names, index as usize)
    }

    pub fn actor_file(&self, index: u16) -> &str {
        lookup(&self.actor_files, index as usize)
    }
}
