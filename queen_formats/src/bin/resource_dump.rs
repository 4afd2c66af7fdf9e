use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use queen_formats::ResourceStore;

/// List the resource table of a game data directory.
#[derive(Parser)]
struct Args {
    /// Directory holding `queen.1` / `queen.1c`
    data_root: PathBuf,
    /// Companion table file (defaults to `queen.tbl` in the data root)
    #[arg(long)]
    table: Option<PathBuf>,
    /// Extract this entry to stdout instead of listing
    #[arg(long)]
    extract: Option<String>,
    /// Emit the listing as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut store = ResourceStore::open(&args.data_root, args.table.as_deref())
        .with_context(|| format!("opening game data in {}", args.data_root.display()))?;

    if let Some(name) = &args.extract {
        let bytes = store.load(name)?;
        std::io::Write::write_all(&mut std::io::stdout(), &bytes)?;
        return Ok(());
    }

    if args.json {
        let listing = serde_json::json!({
            "version": store.version(),
            "entries": store.entries(),
        });
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    let version = store.version();
    println!(
        "release {} ({:?}, {:?}{}{})",
        version.id,
        version.platform,
        version.language,
        if version.is_demo { ", demo" } else { "" },
        if version.is_interview { ", interview" } else { "" }
    );
    println!("{} entries", store.entries().len());
    for entry in store.entries() {
        println!(
            "{name:<12} {bundle:>2} {offset:>10} {size:>10}",
            name = entry.name,
            bundle = entry.bundle,
            offset = entry.offset,
            size = entry.size
        );
    }
    Ok(())
}
