//! Fixed-size big-endian records shared by the static data stream and the
//! save-game payload.
//!
//! Every record is a flat run of 16-bit fields. Tables indexed by these
//! records are 1-based: slot 0 is a zeroed sentinel and never read from disk.

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};

/// Bank slot holding the current room's object sprites.
pub const SHARED_OBJECT_BANK: u16 = 15;

pub trait Record: Sized {
    /// Encoded size in bytes.
    const SIZE: usize;

    fn read_from<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self>;

    fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()>;
}

/// Reads `count` records into a 1-based table with a default sentinel at index 0.
pub fn read_table<T, R>(reader: &mut R, count: usize) -> io::Result<Vec<T>>
where
    T: Record + Default,
    R: Read + ?Sized,
{
    let mut table = Vec::with_capacity(count + 1);
    table.push(T::default());
    for _ in 0..count {
        table.push(T::read_from(reader)?);
    }
    Ok(table)
}

/// Writes every record of a 1-based table, skipping the sentinel.
pub fn write_table<T, W>(writer: &mut W, table: &[T]) -> io::Result<()>
where
    T: Record,
    W: Write + ?Sized,
{
    for record in table.iter().skip(1) {
        record.write_to(writer)?;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x1: i16,
    pub y1: i16,
    pub x2: i16,
    pub y2: i16,
}

impl Rect {
    pub const fn new(x1: i16, y1: i16, x2: i16, y2: i16) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn x_diff(&self) -> i32 {
        i32::from(self.x2) - i32::from(self.x1)
    }

    pub fn y_diff(&self) -> i32 {
        i32::from(self.y2) - i32::from(self.y1)
    }

    /// Inclusive on all four edges.
    pub fn contains(&self, x: i16, y: i16) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }
}

impl Record for Rect {
    const SIZE: usize = 8;

    fn read_from<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            x1: reader.read_i16::<BigEndian>()?,
            y1: reader.read_i16::<BigEndian>()?,
            x2: reader.read_i16::<BigEndian>()?,
            y2: reader.read_i16::<BigEndian>()?,
        })
    }

    fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_i16::<BigEndian>(self.x1)?;
        writer.write_i16::<BigEndian>(self.y1)?;
        writer.write_i16::<BigEndian>(self.x2)?;
        writer.write_i16::<BigEndian>(self.y2)
    }
}

/// Walkable box of a room. A negative neighbour mask marks the area as
/// special: reaching it interrupts the walk and runs room-specific script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub map_neighbors: i16,
    pub rect: Rect,
    pub bottom_scale_factor: u16,
    pub top_scale_factor: u16,
    pub object: u16,
}

impl Area {
    pub fn scale_diff(&self) -> i32 {
        i32::from(self.top_scale_factor) - i32::from(self.bottom_scale_factor)
    }

    pub fn is_special(&self) -> bool {
        self.map_neighbors < 0
    }

    /// Perspective scale at vertical position `y`, interpolated across the
    /// box. A zero-height box (or a zero result) means "unscaled".
    pub fn calc_scale(&self, y: i16) -> u16 {
        let dy = self.y_diff();
        let mut scale = 0;
        if dy != 0 {
            let offset = i32::from(y) - i32::from(self.rect.y1);
            scale = ((offset * 100) / dy) * self.scale_diff() / 100
                + i32::from(self.bottom_scale_factor);
        }
        if scale <= 0 { 100 } else { scale as u16 }
    }

    fn y_diff(&self) -> i32 {
        self.rect.y_diff()
    }
}

impl Record for Area {
    const SIZE: usize = 16;

    fn read_from<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            map_neighbors: reader.read_i16::<BigEndian>()?,
            rect: Rect::read_from(reader)?,
            bottom_scale_factor: reader.read_u16::<BigEndian>()?,
            top_scale_factor: reader.read_u16::<BigEndian>()?,
            object: reader.read_u16::<BigEndian>()?,
        })
    }

    fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_i16::<BigEndian>(self.map_neighbors)?;
        self.rect.write_to(writer)?;
        writer.write_u16::<BigEndian>(self.bottom_scale_factor)?;
        writer.write_u16::<BigEndian>(self.top_scale_factor)?;
        writer.write_u16::<BigEndian>(self.object)
    }
}

/// Point the player walks to when leaving through an exit object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkOffData {
    pub entry_obj: i16,
    pub x: u16,
    pub y: u16,
}

impl Record for WalkOffData {
    const SIZE: usize = 6;

    fn read_from<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            entry_obj: reader.read_i16::<BigEndian>()?,
            x: reader.read_u16::<BigEndian>()?,
            y: reader.read_u16::<BigEndian>()?,
        })
    }

    fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_i16::<BigEndian>(self.entry_obj)?;
        writer.write_u16::<BigEndian>(self.x)?;
        writer.write_u16::<BigEndian>(self.y)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphicData {
    pub x: u16,
    pub y: u16,
    pub first_frame: i16,
    pub last_frame: i16,
    pub speed: u16,
}

impl GraphicData {
    pub fn is_animated(&self) -> bool {
        self.first_frame < 0 || self.last_frame > 0
    }

    pub fn frame_count(&self) -> i32 {
        if self.last_frame > 0 {
            i32::from(self.last_frame) - i32::from(self.first_frame) + 1
        } else {
            1
        }
    }
}

impl Record for GraphicData {
    const SIZE: usize = 10;

    fn read_from<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            x: reader.read_u16::<BigEndian>()?,
            y: reader.read_u16::<BigEndian>()?,
            first_frame: reader.read_i16::<BigEndian>()?,
            last_frame: reader.read_i16::<BigEndian>()?,
            speed: reader.read_u16::<BigEndian>()?,
        })
    }

    fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u16::<BigEndian>(self.x)?;
        writer.write_u16::<BigEndian>(self.y)?;
        writer.write_i16::<BigEndian>(self.first_frame)?;
        writer.write_i16::<BigEndian>(self.last_frame)?;
        writer.write_u16::<BigEndian>(self.speed)
    }
}

/// Static per-object record.
///
/// `name` doubles as visibility: positive is shown, negative hidden, zero
/// deleted. `image` is decoded through [`ObjectImage`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectData {
    pub name: i16,
    pub x: u16,
    pub y: u16,
    pub description: u16,
    pub entry_obj: i16,
    pub room: u16,
    pub state: u16,
    pub image: i16,
}

impl ObjectData {
    pub fn is_visible(&self) -> bool {
        self.name > 0
    }

    pub fn is_deleted(&self) -> bool {
        self.name == 0
    }

    pub fn image_kind(&self) -> ObjectImage {
        ObjectImage::from_code(self.image)
    }
}

impl Record for ObjectData {
    const SIZE: usize = 16;

    fn read_from<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            name: reader.read_i16::<BigEndian>()?,
            x: reader.read_u16::<BigEndian>()?,
            y: reader.read_u16::<BigEndian>()?,
            description: reader.read_u16::<BigEndian>()?,
            entry_obj: reader.read_i16::<BigEndian>()?,
            room: reader.read_u16::<BigEndian>()?,
            state: reader.read_u16::<BigEndian>()?,
            image: reader.read_i16::<BigEndian>()?,
        })
    }

    fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_i16::<BigEndian>(self.name)?;
        writer.write_u16::<BigEndian>(self.x)?;
        writer.write_u16::<BigEndian>(self.y)?;
        writer.write_u16::<BigEndian>(self.description)?;
        writer.write_i16::<BigEndian>(self.entry_obj)?;
        writer.write_u16::<BigEndian>(self.room)?;
        writer.write_u16::<BigEndian>(self.state)?;
        writer.write_i16::<BigEndian>(self.image)
    }
}

/// Offset applied to graphic indices of objects flagged for re-pasting.
pub const IMAGE_PASTE_OFFSET: i16 = 5000;

/// Decoded form of [`ObjectData::image`]. Converting back with
/// [`ObjectImage::code`] always yields the original value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ObjectImage {
    Deleted,
    Graphic { index: u16, pasted: bool },
    PastedBob,
    HiddenBob,
    Person { flipped: bool },
    Other(i16),
}

impl ObjectImage {
    pub fn from_code(code: i16) -> Self {
        match code {
            0 => ObjectImage::Deleted,
            c if c > IMAGE_PASTE_OFFSET => ObjectImage::Graphic {
                index: (c - IMAGE_PASTE_OFFSET) as u16,
                pasted: true,
            },
            c if c > 0 => ObjectImage::Graphic {
                index: c as u16,
                pasted: false,
            },
            -1 => ObjectImage::PastedBob,
            -2 => ObjectImage::HiddenBob,
            -3 => ObjectImage::Person { flipped: false },
            -4 => ObjectImage::Person { flipped: true },
            other => ObjectImage::Other(other),
        }
    }

    pub fn code(self) -> i16 {
        match self {
            ObjectImage::Deleted => 0,
            ObjectImage::Graphic { index, pasted } => {
                let index = index as i16;
                if pasted { index + IMAGE_PASTE_OFFSET } else { index }
            }
            ObjectImage::PastedBob => -1,
            ObjectImage::HiddenBob => -2,
            ObjectImage::Person { flipped: false } => -3,
            ObjectImage::Person { flipped: true } => -4,
            ObjectImage::Other(code) => code,
        }
    }

    pub fn is_person(self) -> bool {
        matches!(self, ObjectImage::Person { .. })
    }
}

/// Cycling description series attached to an object or item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectDescription {
    pub object: i16,
    pub kind: u16,
    pub last_description: u16,
    pub last_seen_number: u16,
}

impl Record for ObjectDescription {
    const SIZE: usize = 8;

    fn read_from<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            object: reader.read_i16::<BigEndian>()?,
            kind: reader.read_u16::<BigEndian>()?,
            last_description: reader.read_u16::<BigEndian>()?,
            last_seen_number: reader.read_u16::<BigEndian>()?,
        })
    }

    fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_i16::<BigEndian>(self.object)?;
        writer.write_u16::<BigEndian>(self.kind)?;
        writer.write_u16::<BigEndian>(self.last_description)?;
        writer.write_u16::<BigEndian>(self.last_seen_number)
    }
}

/// Inventory item. A positive name means the item is currently held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemData {
    pub name: i16,
    pub description: u16,
    pub state: u16,
    pub frame: u16,
    pub sfx_description: i16,
}

impl Record for ItemData {
    const SIZE: usize = 10;

    fn read_from<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            name: reader.read_i16::<BigEndian>()?,
            description: reader.read_u16::<BigEndian>()?,
            state: reader.read_u16::<BigEndian>()?,
            frame: reader.read_u16::<BigEndian>()?,
            sfx_description: reader.read_i16::<BigEndian>()?,
        })
    }

    fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_i16::<BigEndian>(self.name)?;
        writer.write_u16::<BigEndian>(self.description)?;
        writer.write_u16::<BigEndian>(self.state)?;
        writer.write_u16::<BigEndian>(self.frame)?;
        writer.write_i16::<BigEndian>(self.sfx_description)
    }
}

/// Binds a person object in a room to its sprite resources, valid only while
/// `GameState[gs_slot] == gs_value`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorData {
    pub room: i16,
    pub bob_num: i16,
    pub name: u16,
    pub gs_slot: i16,
    pub gs_value: i16,
    pub color: u16,
    pub bob_frame_standing: u16,
    pub x: u16,
    pub y: u16,
    pub anim: u16,
    pub bank_num: u16,
    pub file: u16,
}

impl Record for ActorData {
    const SIZE: usize = 24;

    fn read_from<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        let mut actor = Self {
            room: reader.read_i16::<BigEndian>()?,
            bob_num: reader.read_i16::<BigEndian>()?,
            name: reader.read_u16::<BigEndian>()?,
            gs_slot: reader.read_i16::<BigEndian>()?,
            gs_value: reader.read_i16::<BigEndian>()?,
            color: reader.read_u16::<BigEndian>()?,
            bob_frame_standing: reader.read_u16::<BigEndian>()?,
            x: reader.read_u16::<BigEndian>()?,
            y: reader.read_u16::<BigEndian>()?,
            anim: reader.read_u16::<BigEndian>()?,
            bank_num: reader.read_u16::<BigEndian>()?,
            file: reader.read_u16::<BigEndian>()?,
        };
        // Without a dedicated bank file the actor frames ship inside the
        // room's object bank.
        if actor.file == 0 {
            actor.bank_num = SHARED_OBJECT_BANK;
        }
        Ok(actor)
    }

    fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_i16::<BigEndian>(self.room)?;
        writer.write_i16::<BigEndian>(self.bob_num)?;
        writer.write_u16::<BigEndian>(self.name)?;
        writer.write_i16::<BigEndian>(self.gs_slot)?;
        writer.write_i16::<BigEndian>(self.gs_value)?;
        writer.write_u16::<BigEndian>(self.color)?;
        writer.write_u16::<BigEndian>(self.bob_frame_standing)?;
        writer.write_u16::<BigEndian>(self.x)?;
        writer.write_u16::<BigEndian>(self.y)?;
        writer.write_u16::<BigEndian>(self.anim)?;
        writer.write_u16::<BigEndian>(self.bank_num)?;
        writer.write_u16::<BigEndian>(self.file)
    }
}

/// Command table entry: a verb/noun/noun tuple plus the satellite tables it
/// drives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmdListData {
    pub verb: i16,
    pub noun_obj1: i16,
    pub noun_obj2: i16,
    pub song: i16,
    pub set_areas: Flag,
    pub set_objects: Flag,
    pub set_items: Flag,
    pub set_conditions: Flag,
    pub image_order: i16,
    pub special_section: i16,
}

impl CmdListData {
    /// A zero second noun in the table accepts any second noun.
    pub fn matches(&self, verb: i16, noun1: i16, noun2: i16) -> bool {
        self.verb == verb
            && self.noun_obj1 == noun1
            && (self.noun_obj2 == 0 || self.noun_obj2 == noun2)
    }
}

/// Word-sized switch. Any non-zero word is set; the word itself is kept so
/// the record re-encodes unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Flag(pub u16);

impl Flag {
    pub const ON: Flag = Flag(1);

    pub fn is_set(self) -> bool {
        self.0 != 0
    }
}

impl From<bool> for Flag {
    fn from(set: bool) -> Self {
        Flag(u16::from(set))
    }
}

fn read_flag<R: Read + ?Sized>(reader: &mut R) -> io::Result<Flag> {
    Ok(Flag(reader.read_u16::<BigEndian>()?))
}

fn write_flag<W: Write + ?Sized>(writer: &mut W, flag: Flag) -> io::Result<()> {
    writer.write_u16::<BigEndian>(flag.0)
}

impl Record for CmdListData {
    const SIZE: usize = 20;

    fn read_from<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            verb: reader.read_i16::<BigEndian>()?,
            noun_obj1: reader.read_i16::<BigEndian>()?,
            noun_obj2: reader.read_i16::<BigEndian>()?,
            song: reader.read_i16::<BigEndian>()?,
            set_areas: read_flag(reader)?,
            set_objects: read_flag(reader)?,
            set_items: read_flag(reader)?,
            set_conditions: read_flag(reader)?,
            image_order: reader.read_i16::<BigEndian>()?,
            special_section: reader.read_i16::<BigEndian>()?,
        })
    }

    fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_i16::<BigEndian>(self.verb)?;
        writer.write_i16::<BigEndian>(self.noun_obj1)?;
        writer.write_i16::<BigEndian>(self.noun_obj2)?;
        writer.write_i16::<BigEndian>(self.song)?;
        write_flag(writer, self.set_areas)?;
        write_flag(writer, self.set_objects)?;
        write_flag(writer, self.set_items)?;
        write_flag(writer, self.set_conditions)?;
        writer.write_i16::<BigEndian>(self.image_order)?;
        writer.write_i16::<BigEndian>(self.special_section)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmdArea {
    pub id: i16,
    pub area: i16,
    pub room: i16,
}

impl Record for CmdArea {
    const SIZE: usize = 6;

    fn read_from<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            id: reader.read_i16::<BigEndian>()?,
            area: reader.read_i16::<BigEndian>()?,
            room: reader.read_i16::<BigEndian>()?,
        })
    }

    fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_i16::<BigEndian>(self.id)?;
        writer.write_i16::<BigEndian>(self.area)?;
        writer.write_i16::<BigEndian>(self.room)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmdObject {
    pub id: i16,
    pub dst_obj: i16,
    pub src_obj: i16,
}

impl Record for CmdObject {
    const SIZE: usize = 6;

    fn read_from<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            id: reader.read_i16::<BigEndian>()?,
            dst_obj: reader.read_i16::<BigEndian>()?,
            src_obj: reader.read_i16::<BigEndian>()?,
        })
    }

    fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_i16::<BigEndian>(self.id)?;
        writer.write_i16::<BigEndian>(self.dst_obj)?;
        writer.write_i16::<BigEndian>(self.src_obj)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmdInventory {
    pub id: i16,
    pub dst_item: i16,
    pub src_item: i16,
}

impl Record for CmdInventory {
    const SIZE: usize = 6;

    fn read_from<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            id: reader.read_i16::<BigEndian>()?,
            dst_item: reader.read_i16::<BigEndian>()?,
            src_item: reader.read_i16::<BigEndian>()?,
        })
    }

    fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_i16::<BigEndian>(self.id)?;
        writer.write_i16::<BigEndian>(self.dst_item)?;
        writer.write_i16::<BigEndian>(self.src_item)
    }
}

/// Positive slots are conditions tested before a command runs, negative
/// slots are assignments applied when it does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmdGameState {
    pub id: i16,
    pub game_state_slot: i16,
    pub game_state_value: i16,
    pub speak_value: u16,
}

impl CmdGameState {
    pub fn is_condition(&self) -> bool {
        self.game_state_slot > 0
    }

    pub fn is_assignment(&self) -> bool {
        self.game_state_slot < 0
    }
}

impl Record for CmdGameState {
    const SIZE: usize = 8;

    fn read_from<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            id: reader.read_i16::<BigEndian>()?,
            game_state_slot: reader.read_i16::<BigEndian>()?,
            game_state_value: reader.read_i16::<BigEndian>()?,
            speak_value: reader.read_u16::<BigEndian>()?,
        })
    }

    fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_i16::<BigEndian>(self.id)?;
        writer.write_i16::<BigEndian>(self.game_state_slot)?;
        writer.write_i16::<BigEndian>(self.game_state_value)?;
        writer.write_u16::<BigEndian>(self.speak_value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FurnitureData {
    pub room: i16,
    pub obj_num: i16,
}

impl Record for FurnitureData {
    const SIZE: usize = 4;

    fn read_from<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            room: reader.read_i16::<BigEndian>()?,
            obj_num: reader.read_i16::<BigEndian>()?,
        })
    }

    fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_i16::<BigEndian>(self.room)?;
        writer.write_i16::<BigEndian>(self.obj_num)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphicAnim {
    pub key_frame: i16,
    pub frame: i16,
    pub speed: u16,
}

impl Record for GraphicAnim {
    const SIZE: usize = 6;

    fn read_from<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            key_frame: reader.read_i16::<BigEndian>()?,
            frame: reader.read_i16::<BigEndian>()?,
            speed: reader.read_u16::<BigEndian>()?,
        })
    }

    fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_i16::<BigEndian>(self.key_frame)?;
        writer.write_i16::<BigEndian>(self.frame)?;
        writer.write_u16::<BigEndian>(self.speed)
    }
}

/// Dialogue bookkeeping for one conversation partner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TalkSelected {
    pub has_talked_to: Flag,
    pub values: [i16; 4],
}

impl Record for TalkSelected {
    const SIZE: usize = 10;

    fn read_from<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        let has_talked_to = read_flag(reader)?;
        let mut values = [0i16; 4];
        for value in &mut values {
            *value = reader.read_i16::<BigEndian>()?;
        }
        Ok(Self {
            has_talked_to,
            values,
        })
    }

    fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        write_flag(writer, self.has_talked_to)?;
        for value in self.values {
            writer.write_i16::<BigEndian>(value)?;
        }
        Ok(())
    }
}
