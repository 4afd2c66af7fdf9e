use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use queen_engine::cli::{self, Command, RunArgs};
use queen_engine::{EngineConfig, HeadlessFrontend, Logic, SaveManager, SongTable};
use queen_formats::ResourceStore;
use serde::Serialize;

#[derive(Serialize)]
struct RunSummary<'a> {
    release: &'a str,
    ticks: u64,
    room: u16,
    finished: bool,
    inventory: [i16; 4],
    joe: (i16, i16),
    events: &'a [String],
    frontend_calls: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    match cli::parse()? {
        Command::Run(args) => run(args),
        Command::ListSaves(dir) => list_saves(&dir),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let mut store = ResourceStore::open(&args.data_root, args.table.as_deref())
        .with_context(|| format!("opening game data in {}", args.data_root.display()))?;
    let mut config = EngineConfig::for_version(store.version());
    if let Some(path) = args.songs.as_deref() {
        let songs = SongTable::from_json_file(path)?;
        config = config.with_songs(songs);
    }

    let mut frontend = HeadlessFrontend::new();
    for click in &args.clicks {
        frontend.push_input(*click);
    }
    let mut logic = Logic::load(&mut store, config, frontend).context("loading game data")?;
    logic.start();
    if let Some(room) = args.room {
        logic.set_new_room(room);
        logic.set_entry_obj(0);
    }

    let saves = args.save_dir.as_ref().map(SaveManager::new);
    if let (Some(saves), Some(slot)) = (saves.as_ref(), args.load_slot) {
        if let Err(err) = logic.load_game(saves, slot) {
            log::error!("could not restore slot {slot}: {err}");
        }
    }

    let ticks = logic.run(args.ticks);

    if let (Some(saves), Some(slot)) = (saves.as_ref(), args.save_slot) {
        let description = format!("Room {}", logic.current_room());
        let path = logic
            .save_game(saves, slot, &description)
            .with_context(|| format!("saving slot {slot}"))?;
        println!("Saved game to {}", path.display());
    }

    let summary = RunSummary {
        release: logic.version().id.as_str(),
        ticks,
        room: logic.current_room(),
        finished: logic.is_finished(),
        inventory: logic.inventory(),
        joe: (logic.bob().x, logic.bob().y),
        events: logic.events(),
        frontend_calls: logic.frontend().calls().len(),
    };
    if let Some(path) = args.summary_json.as_ref() {
        let json = serde_json::to_string_pretty(&summary).context("serializing run summary")?;
        fs::write(path, json)
            .with_context(|| format!("writing run summary to {}", path.display()))?;
        println!("Saved run summary to {}", path.display());
    }

    println!("Release {} | ran {} ticks", summary.release, summary.ticks);
    println!(
        "Room {} ({}) | player at {:?} | inventory {:?}",
        summary.room,
        logic.text().room_name(summary.room),
        summary.joe,
        summary.inventory
    );
    if summary.finished {
        println!("Game over");
    }
    for event in summary.events.iter().rev().take(10).rev() {
        println!("  - {event}");
    }
    Ok(())
}

fn list_saves(dir: &Path) -> Result<()> {
    let saves = SaveManager::new(dir);
    let slots = saves
        .list()
        .with_context(|| format!("listing saved games in {}", dir.display()))?;
    if slots.is_empty() {
        println!("No saved games in {}", dir.display());
    }
    for slot in slots {
        println!("  {:>2}  {}", slot.slot, slot.description);
    }
    Ok(())
}
