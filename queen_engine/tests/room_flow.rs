mod common;

use anyhow::{Context, Result};
use common::*;
use queen_engine::state::{ObjectState, Verb};
use queen_engine::{EnginePhase, GridScreen, InputEvent};

#[test]
fn lobby_zones_list_objects_before_areas() -> Result<()> {
    let (_dir, logic) = in_lobby()?;
    assert_eq!(logic.current_room(), 1);
    assert!(has_event(&logic, "room.enter 1"));
    assert!(has_call(&logic, "render_room HOTEL LOBBY 1"));
    assert_eq!((logic.bob().x, logic.bob().y), LOBBY_START);

    let grid = logic.grid();
    assert_eq!(grid.find_zone_for_pos(GridScreen::Room, DOOR_CLICK.0, DOOR_CLICK.1), 1);
    assert_eq!(grid.find_zone_for_pos(GridScreen::Room, 95, 90), 3);
    assert_eq!(grid.find_zone_for_pos(GridScreen::Room, 20, 130), 4);
    assert_eq!(grid.find_zone_for_pos(GridScreen::Room, 250, 130), 5);
    assert_eq!(grid.find_area_for_pos(250, 130), 2);
    assert_eq!(grid.find_area_for_pos(DOOR_CLICK.0, DOOR_CLICK.1), 0);
    assert_eq!(logic.room_furniture().len(), 1);
    Ok(())
}

#[test]
fn clerk_actor_follows_game_state() -> Result<()> {
    let (_dir, mut logic) = in_lobby()?;
    let persons = logic.persons();
    assert_eq!(persons.len(), 1);
    assert_eq!(persons[0].name, "CLERK");
    assert_eq!(persons[0].actor_index, 1);
    assert!(has_call(&logic, "load_bank CLERK.BBK 9"));

    logic.set_game_state(CLERK_SHIFT, 1);
    let (index, bank) = logic
        .find_actor(CLERK, None)
        .map(|(index, actor)| (index, actor.bank_num))
        .context("night clerk should be on shift")?;
    assert_eq!((index, bank), (2, 15));

    logic.set_game_state(CLERK_SHIFT, 2);
    let relief = logic.find_actor(CLERK, None).map(|(index, _)| index);
    assert_eq!(relief, Some(3));
    assert!(logic.find_actor(VASE, None).is_none());
    Ok(())
}

#[test]
fn first_matching_command_wins() -> Result<()> {
    let (_dir, mut logic) = in_lobby()?;
    assert_eq!(logic.run_command(Verb::PickUp, [VASE as i16, 0]), Some(1));

    assert_eq!(logic.object(VASE).map(|vase| vase.name), Some(0));
    assert_eq!(logic.object(VASE).map(|vase| vase.image), Some(2));
    assert!(has_event(&logic, "object.delete 3"));
    assert!(has_call(&logic, "music 7"));
    assert_eq!(logic.inventory(), [COIN, WALLET, MAP, 0]);
    assert_eq!(logic.grid().find_zone_for_pos(GridScreen::Room, 95, 90), 0);

    // The vase is gone, so the command can no longer be issued.
    assert_eq!(logic.run_command(Verb::PickUp, [VASE as i16, 0]), None);
    Ok(())
}

#[test]
fn door_conditions_cascade_to_the_next_entry() -> Result<()> {
    let (_dir, mut logic) = in_lobby()?;
    assert_eq!(logic.run_command(Verb::Open, [DOOR as i16, 0]), Some(4));
    assert_eq!(logic.game_state(DOOR_OPENED), 5);
    let state = logic.object(DOOR).map(|door| ObjectState(door.state));
    assert!(state.is_some_and(|state| state.is_on() && state.default_verb() == Verb::Close));
    assert!(has_event(&logic, "object.open 1"));
    assert!(!has_call(&logic, "music 12"));

    logic.set_game_state(DOOR_STATE, 1);
    assert_eq!(logic.run_command(Verb::Open, [DOOR as i16, 0]), Some(3));

    logic.set_game_state(DOOR_STATE, 2);
    assert_eq!(logic.run_command(Verb::Open, [DOOR as i16, 0]), None);
    assert!(has_event(&logic, "command.fail 4"));
    Ok(())
}

fn call_position(logic: &queen_engine::Logic<queen_engine::HeadlessFrontend>, call: &str) -> Option<usize> {
    logic.frontend().calls().iter().position(|logged| logged == call)
}

#[test]
fn command_songs_bracket_the_effects() -> Result<()> {
    let (_dir, mut logic) = in_lobby()?;
    assert_eq!(logic.run_command(Verb::Use, [VASE as i16, 0]), Some(7));
    assert_eq!(logic.game_state(VASE_USED), 1);
    let song = call_position(&logic, "music 8").context("song before effects")?;
    let cutaway = call_position(&logic, "cutscene C1A.CUT").context("cutaway")?;
    assert!(song < cutaway, "calls were {:?}", logic.frontend().calls());

    assert_eq!(logic.run_command(Verb::Use, [DOOR as i16, 0]), Some(8));
    let song = call_position(&logic, "music 9").context("song after effects")?;
    let speech = call_position(&logic, "speak joe [JOE0051] It creaks.").context("speech")?;
    assert!(song < speech, "calls were {:?}", logic.frontend().calls());
    Ok(())
}

#[test]
fn looking_at_the_vase_cycles_its_descriptions() -> Result<()> {
    let (_dir, mut logic) = in_lobby()?;
    for expected in [3, 4, 5, 3] {
        assert_eq!(logic.run_command(Verb::LookAt, [VASE as i16, 0]), None);
        let last = logic.events().iter().rev().find(|event| event.starts_with("joe.speak"));
        assert_eq!(last.map(String::as_str), Some(format!("joe.speak description {expected}").as_str()));
    }
    assert!(has_call(&logic, "speak joe [JOE0043] A cheap vase."));

    logic.run_command(Verb::TalkTo, [DOOR as i16, 0]);
    let last = logic.events().last().context("talking should log")?;
    assert!(last.starts_with("joe.speak response "), "unexpected {last}");
    Ok(())
}

#[test]
fn disabled_area_stops_the_walk() -> Result<()> {
    let (_dir, mut logic) = in_lobby()?;
    assert_eq!(logic.run_command(Verb::Move, [VASE as i16, 0]), Some(6));
    assert!(has_event(&logic, "area.off 1 2"));
    assert!(logic.grid().area(1, 2).is_some_and(|area| area.is_special()));

    logic.handle_input(InputEvent::left(250, 130));
    assert_eq!(logic.tick(), EnginePhase::Walking);
    assert!(has_event(&logic, "walk.special 1 2"));
    assert!(logic.bob().x <= 170);
    assert_eq!(logic.current_room(), 1);
    Ok(())
}

#[test]
fn walking_through_the_door_enters_the_street() -> Result<()> {
    let (_dir, mut logic) = in_lobby()?;
    logic.handle_input(InputEvent::left(DOOR_CLICK.0, DOOR_CLICK.1));
    assert!(has_event(&logic, "command.queue WalkTo 1 0"));

    assert_eq!(logic.tick(), EnginePhase::Walking);
    assert_eq!((logic.bob().x, logic.bob().y), (150, 130));
    assert_eq!(logic.tick(), EnginePhase::Execute);
    assert_eq!(logic.new_room(), 2);
    assert_eq!(logic.tick(), EnginePhase::RoomTransition);
    assert_eq!((logic.bob().x, logic.bob().y), (30, 140));
    assert_eq!(logic.tick(), EnginePhase::Walking);

    assert_eq!(logic.current_room(), 2);
    assert_eq!(logic.old_room(), 1);
    assert_eq!((logic.bob().x, logic.bob().y), (50, 120));
    assert!(has_call(&logic, "fade_out 1"));
    assert!(has_call(&logic, "render_room STREET 2"));
    assert!(logic.persons().is_empty());
    Ok(())
}

#[test]
fn giving_the_wallet_from_the_panel_ends_the_game() -> Result<()> {
    let (_dir, mut logic) = in_lobby()?;
    logic.handle_input(InputEvent::left(65, 170));
    assert!(has_event(&logic, "verb.select Give"));
    logic.handle_input(InputEvent::left(190, 170));
    assert!(has_event(&logic, "item.select Give 1"));
    logic.handle_input(InputEvent::left(65, 80));
    assert!(has_event(&logic, "command.queue Give -1 2"));

    let ticks = logic.run(10);
    assert_eq!(ticks, 2);
    assert!(logic.is_finished());
    assert!(has_event(&logic, "game.over"));
    Ok(())
}

#[test]
fn inventory_refills_after_changes() -> Result<()> {
    let (_dir, mut logic) = in_lobby()?;
    assert_eq!(logic.inventory(), [WALLET, MAP, 0, 0]);

    logic.inventory_insert_item(COIN);
    assert_eq!(logic.inventory(), [COIN, WALLET, MAP, 0]);
    assert_eq!(logic.num_items_held(), 3);
    logic.inventory_scroll(1, false);
    assert_eq!(logic.inventory(), [COIN, WALLET, MAP, 0]);

    logic.inventory_delete_item(WALLET);
    assert_eq!(logic.inventory(), [MAP, COIN, 0, 0]);
    assert!(logic.item(WALLET as u16).is_some_and(|wallet| wallet.name < 0));

    // Right-clicking an item looks at it.
    logic.handle_input(InputEvent::right(190, 170));
    assert_eq!(logic.tick(), EnginePhase::Execute);
    assert!(has_event(&logic, "joe.speak description 8"));
    Ok(())
}
