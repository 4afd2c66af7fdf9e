//! Save-game container: a fixed header followed by every stateful
//! component's block, in a fixed order.

use std::fs;
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use queen_formats::{
    read_table, write_table, Area, ItemData, ObjectData, ObjectDescription, Record, TalkSelected,
    WalkOffData,
};
use serde::Serialize;
use thiserror::Error;

use crate::grid::{area_state_len, read_area_state, write_area_state};
use crate::scene::SceneState;
use crate::sound::SoundState;
use crate::state::Direction;

pub const SAVE_MAGIC: &[u8; 4] = b"SCVM";
pub const SAVE_VERSION: u32 = 1;
pub const DESCRIPTION_LEN: usize = 32;
pub const HEADER_LEN: usize = 4 + 4 + 4 + 4 + DESCRIPTION_LEN;
pub const AUTOSAVE_FILE: &str = "queen.asd";

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("no saved game in slot {0}")]
    NotFound(u16),
    #[error("not a saved game (bad magic)")]
    BadMagic,
    #[error("saved game corrupted: header declares {declared} bytes, read {consumed}")]
    SaveCorrupted { declared: u32, consumed: u64 },
    #[error("saved game is truncated")]
    Truncated,
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveHeader {
    pub version: u32,
    pub flags: u32,
    pub data_size: u32,
    pub description: String,
}

impl SaveHeader {
    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> Result<Self, SaveError> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic).map_err(eof_as_truncated)?;
        if &magic != SAVE_MAGIC {
            return Err(SaveError::BadMagic);
        }
        let version = reader.read_u32::<BigEndian>().map_err(eof_as_truncated)?;
        let flags = reader.read_u32::<BigEndian>().map_err(eof_as_truncated)?;
        let data_size = reader.read_u32::<BigEndian>().map_err(eof_as_truncated)?;
        let mut description = [0u8; DESCRIPTION_LEN];
        reader
            .read_exact(&mut description)
            .map_err(eof_as_truncated)?;
        let end = description
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(DESCRIPTION_LEN);
        Ok(Self {
            version,
            flags,
            data_size,
            description: description[..end].iter().map(|&b| b as char).collect(),
        })
    }

    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(SAVE_MAGIC)?;
        writer.write_u32::<BigEndian>(self.version)?;
        writer.write_u32::<BigEndian>(self.flags)?;
        writer.write_u32::<BigEndian>(self.data_size)?;
        let mut description = [0u8; DESCRIPTION_LEN];
        for (slot, ch) in description.iter_mut().zip(self.description.chars()) {
            *slot = u8::try_from(ch).unwrap_or(b'?');
        }
        writer.write_all(&description)
    }
}

fn eof_as_truncated(err: io::Error) -> SaveError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        SaveError::Truncated
    } else {
        SaveError::Io(err)
    }
}

/// Everything a saved game restores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveData {
    pub scene: SceneState,
    pub areas: Vec<Vec<Area>>,
    pub inventory: [i16; 4],
    pub joe_x: i16,
    pub joe_y: i16,
    pub room: u16,
    pub objects: Vec<ObjectData>,
    pub items: Vec<ItemData>,
    pub game_state: Vec<i16>,
    pub talk_selected: Vec<TalkSelected>,
    pub walk_offs: Vec<WalkOffData>,
    pub facing: Direction,
    pub puzzle_attempts: u16,
    pub object_descriptions: Vec<ObjectDescription>,
    pub sound: SoundState,
}

impl SaveData {
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        self.scene.write_state(writer)?;
        write_area_state(&self.areas, writer)?;
        for item in self.inventory {
            writer.write_i16::<BigEndian>(item)?;
        }
        writer.write_i16::<BigEndian>(self.joe_x)?;
        writer.write_i16::<BigEndian>(self.joe_y)?;
        writer.write_u16::<BigEndian>(self.room)?;
        write_table(writer, &self.objects)?;
        write_table(writer, &self.items)?;
        for value in &self.game_state {
            writer.write_i16::<BigEndian>(*value)?;
        }
        for talk in &self.talk_selected {
            talk.write_to(writer)?;
        }
        write_table(writer, &self.walk_offs)?;
        writer.write_u16::<BigEndian>(self.facing.code())?;
        writer.write_u16::<BigEndian>(self.puzzle_attempts)?;
        write_table(writer, &self.object_descriptions)?;
        self.sound.write_state(writer)
    }

    /// Reads a payload whose tables are sized like `template`. Version 0
    /// payloads lack the puzzle counter and description series, which are
    /// then taken from `template`.
    pub fn read_from<R: Read + ?Sized>(
        reader: &mut R,
        version: u32,
        template: &SaveData,
    ) -> io::Result<Self> {
        let scene = SceneState::read_state(reader)?;
        let areas = read_area_state(&template.areas, reader)?;
        let mut inventory = [0i16; 4];
        for slot in inventory.iter_mut() {
            *slot = reader.read_i16::<BigEndian>()?;
        }
        let joe_x = reader.read_i16::<BigEndian>()?;
        let joe_y = reader.read_i16::<BigEndian>()?;
        let room = reader.read_u16::<BigEndian>()?;
        let objects = read_like(reader, &template.objects)?;
        let items = read_like(reader, &template.items)?;
        let game_state = (0..template.game_state.len())
            .map(|_| reader.read_i16::<BigEndian>())
            .collect::<io::Result<Vec<_>>>()?;
        let talk_selected = (0..template.talk_selected.len())
            .map(|_| TalkSelected::read_from(reader))
            .collect::<io::Result<Vec<_>>>()?;
        let walk_offs = read_like(reader, &template.walk_offs)?;
        let facing_code = reader.read_u16::<BigEndian>()?;
        let facing = Direction::from_code(facing_code).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unknown facing {facing_code}"),
            )
        })?;
        let (puzzle_attempts, object_descriptions) = if version >= 1 {
            (
                reader.read_u16::<BigEndian>()?,
                read_like(reader, &template.object_descriptions)?,
            )
        } else {
            (template.puzzle_attempts, template.object_descriptions.clone())
        };
        let sound = SoundState::read_state(reader)?;
        Ok(Self {
            scene,
            areas,
            inventory,
            joe_x,
            joe_y,
            room,
            objects,
            items,
            game_state,
            talk_selected,
            walk_offs,
            facing,
            puzzle_attempts,
            object_descriptions,
            sound,
        })
    }

    pub fn payload_len(&self) -> usize {
        2 + area_state_len(&self.areas)
            + 8
            + 6
            + records(&self.objects) * ObjectData::SIZE
            + records(&self.items) * ItemData::SIZE
            + self.game_state.len() * 2
            + self.talk_selected.len() * TalkSelected::SIZE
            + records(&self.walk_offs) * WalkOffData::SIZE
            + 2
            + 2
            + records(&self.object_descriptions) * ObjectDescription::SIZE
            + 2
    }
}

/// Records stored for a 1-based table, its sentinel excluded.
fn records<T>(table: &[T]) -> usize {
    table.len().saturating_sub(1)
}

/// Reads a 1-based table with as many records as `template`.
fn read_like<T, R>(reader: &mut R, template: &[T]) -> io::Result<Vec<T>>
where
    T: Record + Default,
    R: Read + ?Sized,
{
    if template.is_empty() {
        return Ok(Vec::new());
    }
    read_table(reader, records(template))
}

/// Serialises a complete saved game.
pub fn encode_save(description: &str, data: &SaveData) -> io::Result<Vec<u8>> {
    let mut payload = Vec::with_capacity(data.payload_len());
    data.write_to(&mut payload)?;
    let header = SaveHeader {
        version: SAVE_VERSION,
        flags: 0,
        data_size: payload.len() as u32,
        description: description.to_string(),
    };
    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    header.write_to(&mut bytes)?;
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Decodes a saved game into a fresh value. Nothing is returned unless the
/// payload consumed exactly the length the header declares.
pub fn decode_save(bytes: &[u8], template: &SaveData) -> Result<(SaveHeader, SaveData), SaveError> {
    let mut cursor = Cursor::new(bytes);
    let header = SaveHeader::read_from(&mut cursor)?;
    let payload = bytes.get(HEADER_LEN..).unwrap_or(&[]);
    let mut cursor = Cursor::new(payload);
    let data = match SaveData::read_from(&mut cursor, header.version, template) {
        Ok(data) => data,
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
            return Err(if (payload.len() as u64) < u64::from(header.data_size) {
                SaveError::Truncated
            } else {
                SaveError::SaveCorrupted {
                    declared: header.data_size,
                    consumed: payload.len() as u64,
                }
            });
        }
        Err(err) => return Err(err.into()),
    };
    let consumed = cursor.position();
    if consumed != u64::from(header.data_size) {
        return Err(SaveError::SaveCorrupted {
            declared: header.data_size,
            consumed,
        });
    }
    Ok((header, data))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveSlot {
    pub slot: u16,
    pub description: String,
}

/// Slot files `queen.sNN` plus the autosave, all in one directory.
#[derive(Debug, Clone)]
pub struct SaveManager {
    dir: PathBuf,
}

impl SaveManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn slot_path(&self, slot: u16) -> PathBuf {
        self.dir.join(format!("queen.s{slot:02}"))
    }

    pub fn autosave_path(&self) -> PathBuf {
        self.dir.join(AUTOSAVE_FILE)
    }

    pub fn write(&self, slot: u16, description: &str, data: &SaveData) -> Result<PathBuf, SaveError> {
        let path = self.slot_path(slot);
        self.write_file(&path, description, data)?;
        Ok(path)
    }

    pub fn write_autosave(&self, data: &SaveData) -> Result<PathBuf, SaveError> {
        let path = self.autosave_path();
        self.write_file(&path, "Autosave", data)?;
        Ok(path)
    }

    fn write_file(&self, path: &Path, description: &str, data: &SaveData) -> Result<(), SaveError> {
        fs::create_dir_all(&self.dir)?;
        let bytes = encode_save(description, data)?;
        fs::write(path, bytes)?;
        log::info!("save: wrote {}", path.display());
        Ok(())
    }

    pub fn read(&self, slot: u16) -> Result<Vec<u8>, SaveError> {
        let path = self.slot_path(slot);
        fs::read(&path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => SaveError::NotFound(slot),
            _ => SaveError::Io(err),
        })
    }

    /// Slots holding a readable header, in slot order.
    pub fn list(&self) -> Result<Vec<SaveSlot>, SaveError> {
        let mut slots = Vec::new();
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(slots),
            Err(err) => return Err(err.into()),
        };
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let Some(slot) = name
                .to_str()
                .and_then(|name| name.strip_prefix("queen.s"))
                .and_then(|digits| digits.parse::<u16>().ok())
            else {
                continue;
            };
            let mut file = fs::File::open(entry.path())?;
            match SaveHeader::read_from(&mut file) {
                Ok(header) => slots.push(SaveSlot {
                    slot,
                    description: header.description,
                }),
                Err(err) => log::warn!("save: skipping {}: {err}", entry.path().display()),
            }
        }
        slots.sort_by_key(|slot| slot.slot);
        Ok(slots)
    }
}
