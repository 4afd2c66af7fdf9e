mod common;

use std::fs;
use std::process::Command;

use anyhow::{Context, Result};
use serde_json::Value;
use tempfile::tempdir;

#[test]
fn headless_run_writes_a_summary() -> Result<()> {
    let data_dir = tempdir().context("creating data directory")?;
    common::write_bundle(data_dir.path())?;
    let summary_path = data_dir.path().join("summary.json");
    let click = format!("{},{}", common::DOOR_CLICK.0, common::DOOR_CLICK.1);

    let output = Command::new(env!("CARGO_BIN_EXE_queen_engine"))
        .arg("--data-root")
        .arg(data_dir.path())
        .arg("--summary-json")
        .arg(&summary_path)
        .args(["--ticks", "20", "--click", click.as_str()])
        .output()
        .context("executing queen_engine")?;
    assert!(
        output.status.success(),
        "queen_engine exited with {:?}: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );

    let summary: Value = serde_json::from_str(
        &fs::read_to_string(&summary_path).context("reading run summary")?,
    )?;
    assert_eq!(summary["release"], "CEM10");
    assert_eq!(summary["room"], 2);
    assert_eq!(summary["finished"], false);
    assert_eq!(summary["ticks"], 20);
    let events = summary["events"]
        .as_array()
        .context("events should be a list")?;
    assert!(events.iter().any(|event| event.as_str() == Some("room.enter 2")));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Room 2 (STREET)"), "stdout was {stdout}");
    Ok(())
}

#[test]
fn saved_slots_are_listed() -> Result<()> {
    let data_dir = tempdir().context("creating data directory")?;
    common::write_bundle(data_dir.path())?;
    let save_dir = data_dir.path().join("saves");
    fs::create_dir(&save_dir)?;

    let status = Command::new(env!("CARGO_BIN_EXE_queen_engine"))
        .arg("--data-root")
        .arg(data_dir.path())
        .arg("--save-dir")
        .arg(&save_dir)
        .args(["--save-slot", "2", "--ticks", "3"])
        .status()
        .context("executing queen_engine")?;
    assert!(status.success());
    assert!(save_dir.join("queen.s02").is_file());

    let output = Command::new(env!("CARGO_BIN_EXE_queen_engine"))
        .arg("--list-saves")
        .arg("--save-dir")
        .arg(&save_dir)
        .output()
        .context("listing saves")?;
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(" 2  Room 1"), "stdout was {stdout}");
    Ok(())
}

#[test]
fn missing_slot_is_logged_and_the_run_continues() -> Result<()> {
    let data_dir = tempdir().context("creating data directory")?;
    common::write_bundle(data_dir.path())?;
    let save_dir = data_dir.path().join("saves");
    fs::create_dir(&save_dir)?;

    let output = Command::new(env!("CARGO_BIN_EXE_queen_engine"))
        .env("RUST_LOG", "error")
        .arg("--data-root")
        .arg(data_dir.path())
        .arg("--save-dir")
        .arg(&save_dir)
        .args(["--load-slot", "5", "--ticks", "3"])
        .output()
        .context("executing queen_engine")?;
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR"), "stderr was {stderr}");
    assert!(stderr.contains("could not restore slot 5"), "stderr was {stderr}");
    assert!(!stderr.contains("[queen_engine]"), "stderr was {stderr}");
    Ok(())
}

#[test]
fn room_zero_is_rejected() -> Result<()> {
    let data_dir = tempdir().context("creating data directory")?;
    common::write_bundle(data_dir.path())?;
    let output = Command::new(env!("CARGO_BIN_EXE_queen_engine"))
        .arg("--data-root")
        .arg(data_dir.path())
        .args(["--room", "0"])
        .output()
        .context("executing queen_engine")?;
    assert!(!output.status.success());
    Ok(())
}
