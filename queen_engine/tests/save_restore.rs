mod common;

use std::fs;

use anyhow::{Context, Result};
use common::*;
use queen_engine::state::Verb;
use queen_engine::{EnginePhase, SaveError, SaveManager};
use tempfile::tempdir;

const MARKER: usize = 30;

#[test]
fn restoring_a_slot_brings_the_lobby_back() -> Result<()> {
    let (_dir, mut logic) = in_lobby()?;
    let saves_dir = tempdir().context("creating save directory")?;
    let saves = SaveManager::new(saves_dir.path());

    logic.set_game_state(MARKER, 7);
    logic.run_command(Verb::Move, [VASE as i16, 0]);
    let path = logic.save_game(&saves, 3, "Lobby, area closed")?;
    assert_eq!(path, saves_dir.path().join("queen.s03"));

    logic.set_game_state(MARKER, 0);
    logic.run_command(Verb::PickUp, [VASE as i16, 0]);
    if let Some(area) = logic.grid_mut().area_mut(1, 2) {
        area.map_neighbors = area.map_neighbors.abs();
    }
    assert_eq!(logic.inventory(), [COIN, WALLET, MAP, 0]);

    logic.load_game(&saves, 3)?;
    assert!(has_event(&logic, "game.restore 1"));
    assert_eq!(logic.game_state(MARKER), 7);
    assert_eq!(logic.inventory(), [WALLET, MAP, 0, 0]);
    assert_eq!(logic.object(VASE).map(|vase| vase.name), Some(3));
    assert!(logic.item(COIN as u16).is_some_and(|coin| coin.name < 0));
    assert!(logic.grid().area(1, 2).is_some_and(|area| area.is_special()));

    assert_eq!(logic.tick(), EnginePhase::RoomTransition);
    assert_eq!(logic.current_room(), 1);
    assert_eq!((logic.bob().x, logic.bob().y), LOBBY_START);
    assert!(logic.pending_walk().is_none());

    let slots = saves.list()?;
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].slot, 3);
    assert_eq!(slots[0].description, "Lobby, area closed");
    Ok(())
}

#[test]
fn damaged_saves_leave_the_game_untouched() -> Result<()> {
    let (_dir, mut logic) = in_lobby()?;
    let saves_dir = tempdir().context("creating save directory")?;
    let saves = SaveManager::new(saves_dir.path());
    let path = logic.save_game(&saves, 1, "Lobby")?;
    let bytes = fs::read(&path)?;

    logic.set_game_state(MARKER, 9);
    logic.inventory_insert_item(COIN);
    let before = logic.snapshot();

    // Declares two more payload bytes than the state consumes.
    let mut padded = bytes.clone();
    padded.extend_from_slice(&[0, 0]);
    let declared = u32::from_be_bytes([padded[12], padded[13], padded[14], padded[15]]) + 2;
    padded[12..16].copy_from_slice(&declared.to_be_bytes());
    let err = logic.load_bytes(&padded).unwrap_err();
    assert!(matches!(err, SaveError::SaveCorrupted { .. }), "unexpected {err}");

    let truncated = &bytes[..bytes.len() - 10];
    let err = logic.load_bytes(truncated).unwrap_err();
    assert!(matches!(err, SaveError::Truncated), "unexpected {err}");

    let mut foreign = bytes;
    foreign[0] = b'X';
    assert!(matches!(logic.load_bytes(&foreign), Err(SaveError::BadMagic)));

    assert!(matches!(logic.load_game(&saves, 8), Err(SaveError::NotFound(8))));

    assert_eq!(logic.game_state(MARKER), 9);
    assert_eq!(logic.inventory(), [COIN, WALLET, MAP, 0]);
    assert_eq!(logic.snapshot(), before);
    assert!(!has_event(&logic, "game.restore 1"));
    Ok(())
}
