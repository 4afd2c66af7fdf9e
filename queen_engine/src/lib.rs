//! Runtime for the adventure engine: zones and areas, walking, command
//! resolution and the per-room game logic, driven through a [`Frontend`].

pub mod bob;
pub mod cli;
pub mod command;
pub mod config;
pub mod frontend;
pub mod grid;
pub mod logic;
pub mod save;
pub mod scene;
pub mod sound;
pub mod state;
pub mod walk;

pub use command::{CommandEffectSet, CommandResolver, Resolution};
pub use config::{EngineConfig, SongTable};
pub use frontend::{Frontend, HeadlessFrontend, InputEvent};
pub use grid::{Grid, GridScreen};
pub use logic::{EnginePhase, Logic};
pub use save::{SaveData, SaveError, SaveManager};
pub use state::{Direction, Verb};
pub use walk::WalkOutcome;
