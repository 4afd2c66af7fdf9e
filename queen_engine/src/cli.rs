use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Result};
use clap::Parser;

use crate::frontend::InputEvent;

#[derive(Parser, Debug)]
#[command(about = "Headless runner for the adventure engine", version)]
pub struct Args {
    /// Directory holding queen.1 and friends
    #[arg(long, default_value = "data")]
    pub data_root: PathBuf,

    /// Companion table file for retail releases (defaults to queen.tbl in the data root)
    #[arg(long)]
    pub table: Option<PathBuf>,

    /// JSON song table to inject into the sound layer
    #[arg(long)]
    pub songs: Option<PathBuf>,

    /// Directory holding saved games
    #[arg(long)]
    pub save_dir: Option<PathBuf>,

    /// Restore this slot before running (requires --save-dir)
    #[arg(long)]
    pub load_slot: Option<u16>,

    /// Save into this slot after running (requires --save-dir)
    #[arg(long)]
    pub save_slot: Option<u16>,

    /// List the saved games in --save-dir and exit
    #[arg(long)]
    pub list_saves: bool,

    /// Enter this room instead of the starting room
    #[arg(long)]
    pub room: Option<u16>,

    /// Queue a click, `X,Y` or `X,Y,right`; repeatable
    #[arg(long = "click", value_name = "X,Y")]
    pub clicks: Vec<Click>,

    /// Path to write the run summary as JSON
    #[arg(long)]
    pub summary_json: Option<PathBuf>,

    /// Number of engine ticks to run
    #[arg(long, default_value_t = 200)]
    pub ticks: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Click(pub InputEvent);

impl FromStr for Click {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = value.split(',').map(str::trim).collect();
        let coord = |part: &str| {
            part.parse::<i16>()
                .map_err(|err| format!("bad coordinate '{part}': {err}"))
        };
        match parts.as_slice() {
            [x, y] => Ok(Click(InputEvent::left(coord(x)?, coord(y)?))),
            [x, y, "right"] => Ok(Click(InputEvent::right(coord(x)?, coord(y)?))),
            [x, y, "left"] => Ok(Click(InputEvent::left(coord(x)?, coord(y)?))),
            _ => Err(format!("expected X,Y or X,Y,right, got '{value}'")),
        }
    }
}

#[derive(Debug)]
pub enum Command {
    Run(RunArgs),
    ListSaves(PathBuf),
}

#[derive(Debug)]
pub struct RunArgs {
    pub data_root: PathBuf,
    pub table: Option<PathBuf>,
    pub songs: Option<PathBuf>,
    pub save_dir: Option<PathBuf>,
    pub load_slot: Option<u16>,
    pub save_slot: Option<u16>,
    pub room: Option<u16>,
    pub clicks: Vec<InputEvent>,
    pub summary_json: Option<PathBuf>,
    pub ticks: u64,
}

pub fn parse() -> Result<Command> {
    let args = Args::parse();
    args.into_command()
}

impl Args {
    pub fn into_command(self) -> Result<Command> {
        if self.list_saves {
            let Some(dir) = self.save_dir else {
                bail!("--list-saves requires --save-dir");
            };
            return Ok(Command::ListSaves(dir));
        }
        if self.save_dir.is_none() && (self.load_slot.is_some() || self.save_slot.is_some()) {
            bail!("--load-slot and --save-slot require --save-dir");
        }
        if self.room == Some(0) {
            bail!("--room must be a room number starting at 1");
        }
        Ok(Command::Run(RunArgs {
            data_root: self.data_root,
            table: self.table,
            songs: self.songs,
            save_dir: self.save_dir,
            load_slot: self.load_slot,
            save_slot: self.save_slot,
            room: self.room,
            clicks: self.clicks.into_iter().map(|click| click.0).collect(),
            summary_json: self.summary_json,
            ticks: self.ticks,
        }))
    }
}
