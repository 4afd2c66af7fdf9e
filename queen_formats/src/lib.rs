pub mod error;
pub mod jas;
pub mod records;
pub mod resource;

pub use error::{FormatError, Result};
pub use jas::{CommandTables, GridData, JasData, JasText};
pub use records::{
    read_table, write_table,
    ActorData, Area, CmdArea, CmdGameState, CmdInventory, CmdListData, CmdObject, Flag,
    FurnitureData, GraphicAnim, GraphicData, ItemData, ObjectData, ObjectDescription, ObjectImage,
    Record, Rect, TalkSelected, WalkOffData,
};
pub use resource::{BundleWriter, GameVersion, Language, Platform, ResourceEntry, ResourceStore};
