use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use queen_formats::jas::{SCRIPT_FILE, TEXT_FILE};
use queen_formats::{JasData, JasText, ResourceStore};

/// Decode the static script stream and summarise or dump its tables.
#[derive(Parser)]
struct Args {
    /// Directory holding the game data
    data_root: PathBuf,
    /// Companion table file (defaults to `queen.tbl` in the data root)
    #[arg(long)]
    table: Option<PathBuf>,
    /// Dump every decoded table as JSON
    #[arg(long)]
    json: bool,
    /// Print the commands that mention this object number
    #[arg(long)]
    object: Option<i16>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut store = ResourceStore::open(&args.data_root, args.table.as_deref())
        .with_context(|| format!("opening game data in {}", args.data_root.display()))?;
    let version = store.version().clone();
    let bytes = store.load(SCRIPT_FILE)?;
    let data = JasData::parse(&bytes, &version).context("decoding script stream")?;
    let text = match store.load_text(TEXT_FILE) {
        Ok(lines) => Some(JasText::parse(&lines, &data)?),
        Err(err) => {
            log::warn!("no string list: {err}");
            None
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    if let Some(object) = args.object {
        for (index, command) in data.commands.list.iter().enumerate().skip(1) {
            if command.noun_obj1 == object || command.noun_obj2 == object {
                println!("{index:>5} {command:?}");
            }
        }
        return Ok(());
    }

    println!("release {}", data.version_id);
    println!("rooms: {}", data.num_rooms);
    println!("objects: {}", data.num_objects());
    println!("items: {}", data.items.len().saturating_sub(1));
    println!("actors: {}", data.actors.len().saturating_sub(1));
    println!("commands: {}", data.commands.list.len().saturating_sub(1));
    for room in 1..=data.num_rooms {
        let r = room as usize;
        let name = text.as_ref().map(|t| t.room_name(room)).unwrap_or("");
        println!(
            "room {room:>3} {name:<12} objects {:>4}..{:<4} areas {}",
            data.room_data[r] + 1,
            data.room_data[r + 1],
            data.grid.area_max[r]
        );
    }
    Ok(())
}
