#![allow(dead_code)]

use std::path::Path;

use anyhow::{Context, Result};
use queen_engine::state::Verb;
use queen_engine::{EngineConfig, HeadlessFrontend, Logic};
use queen_formats::jas::{JOE_RESPONSE_COUNT, SCRIPT_FILE, TEXT_FILE, VERB_NAME_COUNT};
use queen_formats::{
    ActorData, Area, BundleWriter, CmdArea, CmdGameState, CmdInventory, CmdListData, CmdObject,
    CommandTables, Flag, FurnitureData, GraphicAnim, GraphicData, GridData, ItemData, JasData,
    JasText, ObjectData, ObjectDescription, Rect, ResourceStore, WalkOffData,
};
use tempfile::TempDir;

pub const RELEASE: &str = "CEM10";

pub const DOOR: u16 = 1;
pub const CLERK: u16 = 2;
pub const VASE: u16 = 3;
pub const STREET_DOOR: u16 = 4;
pub const KEY: u16 = 5;

pub const WALLET: i16 = 1;
pub const MAP: i16 = 2;
pub const COIN: i16 = 3;

/// Slot checked by the door's open commands.
pub const DOOR_STATE: usize = 20;
/// Slot assigned when the door opens.
pub const DOOR_OPENED: usize = 21;
/// Slots assigned by the USE commands.
pub const VASE_USED: usize = 22;
pub const DOOR_USED: usize = 23;
/// Slot selecting which actor plays the clerk.
pub const CLERK_SHIFT: usize = 10;

pub const LOBBY_START: (i16, i16) = (150, 110);
pub const DOOR_CLICK: (i16, i16) = (155, 70);

fn area(rect: Rect, neighbours: i16) -> Area {
    Area {
        map_neighbors: neighbours,
        rect,
        bottom_scale_factor: 100,
        top_scale_factor: 100,
        object: 0,
    }
}

fn object(name: i16, room: u16, (x, y): (u16, u16), description: u16, image: i16) -> ObjectData {
    ObjectData {
        name,
        x,
        y,
        description,
        room,
        image,
        ..ObjectData::default()
    }
}

fn command(verb: Verb, noun1: i16, noun2: i16) -> CmdListData {
    CmdListData {
        verb: verb.code(),
        noun_obj1: noun1,
        noun_obj2: noun2,
        ..CmdListData::default()
    }
}

fn gs(id: i16, slot: i16, value: i16, speak: u16) -> CmdGameState {
    CmdGameState {
        id,
        game_state_slot: slot,
        game_state_value: value,
        speak_value: speak,
    }
}

/// Hotel lobby (room 1) with a door to the street (room 2), a clerk and a
/// vase; the street has the door back and a hidden key.
pub fn world() -> (JasData, JasText) {
    let mut door = object(1, 1, (150, 110), 1, 1);
    door.entry_obj = STREET_DOOR as i16;
    let mut street_door = object(4, 2, (50, 120), 6, 0);
    street_door.entry_obj = DOOR as i16;

    let objects = vec![
        ObjectData::default(),
        door,
        object(2, 1, (60, 120), 2, -3),
        object(3, 1, (100, 120), 3, 2),
        street_door,
        object(-5, 2, (205, 120), 6, 3),
    ];

    let items = vec![
        ItemData::default(),
        ItemData { name: 6, description: 7, ..ItemData::default() },
        ItemData { name: 7, description: 8, ..ItemData::default() },
        ItemData { name: -8, description: 9, ..ItemData::default() },
    ];

    let graphic = |first_frame| GraphicData {
        first_frame,
        last_frame: first_frame,
        ..GraphicData::default()
    };

    let grid = GridData {
        obj_max: vec![0, 3, 2],
        area_max: vec![0, 2, 1],
        areas: vec![
            Vec::new(),
            vec![
                Area::default(),
                area(Rect::new(0, 100, 170, 149), 1),
                area(Rect::new(150, 100, 319, 149), 2),
            ],
            vec![Area::default(), area(Rect::new(0, 100, 319, 149), 0)],
        ],
        object_boxes: vec![
            Rect::default(),
            Rect::new(140, 50, 170, 99),
            Rect::new(50, 60, 80, 99),
            Rect::new(90, 80, 110, 99),
            Rect::new(40, 50, 70, 99),
            Rect::new(200, 90, 210, 99),
        ],
    };

    let mut pick_up_vase = command(Verb::PickUp, VASE as i16, 0);
    pick_up_vase.set_objects = Flag::ON;
    pick_up_vase.set_items = Flag::ON;
    pick_up_vase.song = 7;
    let mut unreachable = command(Verb::PickUp, VASE as i16, 0);
    unreachable.set_areas = Flag::ON;
    let mut open_locked = command(Verb::Open, DOOR as i16, 0);
    open_locked.set_conditions = Flag::ON;
    let mut open_door = command(Verb::Open, DOOR as i16, 0);
    open_door.set_conditions = Flag::ON;
    open_door.song = -12;
    let mut give_wallet = command(Verb::Give, -WALLET, CLERK as i16);
    give_wallet.special_section = 5;
    let mut move_vase = command(Verb::Move, VASE as i16, 0);
    move_vase.set_areas = Flag::ON;
    let mut use_vase = command(Verb::Use, VASE as i16, 0);
    use_vase.set_conditions = Flag::ON;
    use_vase.song = 8;
    let mut use_door = command(Verb::Use, DOOR as i16, 0);
    use_door.set_conditions = Flag::ON;
    use_door.song = -9;

    let commands = CommandTables {
        list: vec![
            CmdListData::default(),
            pick_up_vase,
            unreachable,
            open_locked,
            open_door,
            give_wallet,
            move_vase,
            use_vase,
            use_door,
        ],
        areas: vec![CmdArea::default(), CmdArea { id: 6, area: -2, room: 1 }],
        objects: vec![
            CmdObject::default(),
            CmdObject { id: 1, dst_obj: VASE as i16, src_obj: -1 },
        ],
        inventory: vec![
            CmdInventory::default(),
            CmdInventory { id: 1, dst_item: COIN, src_item: 0 },
        ],
        game_state: vec![
            CmdGameState::default(),
            gs(3, DOOR_STATE as i16, 1, 6),
            gs(4, DOOR_STATE as i16, 0, 0),
            gs(4, -(DOOR_OPENED as i16), 5, 0),
            gs(7, -(VASE_USED as i16), 1, 10),
            gs(8, -(DOOR_USED as i16), 1, 11),
        ],
    };

    let day_clerk = ActorData {
        room: 1,
        bob_num: 1,
        name: 1,
        gs_slot: CLERK_SHIFT as i16,
        gs_value: 0,
        anim: 1,
        bank_num: 9,
        file: 1,
        ..ActorData::default()
    };
    let night_clerk = ActorData {
        name: 2,
        gs_value: 1,
        anim: 0,
        bank_num: 15,
        file: 0,
        ..day_clerk
    };
    // Covers every other shift.
    let relief_clerk = ActorData {
        gs_slot: -1,
        gs_value: 7,
        ..night_clerk
    };

    let data = JasData {
        num_rooms: 2,
        num_names: 8,
        num_descriptions: 11,
        objects,
        room_data: vec![0, 0, 3, 5],
        sfx_names: Some(vec![0, 0, 0]),
        items,
        graphics: vec![GraphicData::default(), graphic(1), graphic(2), graphic(3)],
        grid,
        walk_offs: vec![
            WalkOffData::default(),
            WalkOffData { entry_obj: DOOR as i16, x: 150, y: 130 },
            WalkOffData { entry_obj: STREET_DOOR as i16, x: 30, y: 140 },
        ],
        object_descriptions: vec![
            ObjectDescription::default(),
            ObjectDescription {
                object: VASE as i16,
                kind: 2,
                last_description: 5,
                last_seen_number: 0,
            },
        ],
        commands,
        entry_obj: DOOR,
        furniture: vec![
            FurnitureData::default(),
            FurnitureData { room: 1, obj_num: VASE as i16 },
        ],
        num_actor_anims: 1,
        num_actor_names: 2,
        num_actor_files: 1,
        actors: vec![ActorData::default(), day_clerk, night_clerk, relief_clerk],
        graphic_anims: vec![GraphicAnim::default()],
        version_id: RELEASE.to_string(),
    };

    let text = JasText {
        descriptions: [
            "A sturdy hotel door.",
            "The clerk looks bored.",
            "A cheap vase.",
            "Still a cheap vase.",
            "Definitely a vase.",
            "The door is locked.",
            "My trusty wallet.",
            "A map of the town.",
            "A shiny coin.",
            "C1A.CUT",
            "It creaks.",
        ]
        .map(String::from)
        .to_vec(),
        object_names: ["DOOR", "CLERK", "VASE", "DOOR", "KEY", "WALLET", "MAP", "COIN"]
            .map(String::from)
            .to_vec(),
        room_names: vec!["HOTEL LOBBY".to_string(), "STREET".to_string()],
        verb_names: (1..=VERB_NAME_COUNT).map(|i| format!("VERB{i}")).collect(),
        joe_responses: (1..=JOE_RESPONSE_COUNT).map(|i| format!("Response {i}.")).collect(),
        actor_anims: vec!["1,2,3,0".to_string()],
        actor_names: vec!["CLERK".to_string(), "NIGHTCLERK".to_string()],
        actor_files: vec!["CLERK.BBK".to_string()],
    };
    (data, text)
}

/// Writes the world as a rebuilt `queen.1` bundle in `dir`.
pub fn write_bundle(dir: &Path) -> Result<()> {
    let (data, text) = world();
    let mut script = Vec::new();
    data.write_to(&mut script).context("encoding script stream")?;
    let strings = text.to_lines().join("\n").into_bytes();
    let mut writer = BundleWriter::new(RELEASE);
    writer.add(SCRIPT_FILE, script).add(TEXT_FILE, strings);
    writer
        .write_file(dir.join("queen.1"))
        .context("writing fixture bundle")?;
    Ok(())
}

pub fn test_config(store: &ResourceStore) -> EngineConfig {
    EngineConfig {
        starting_inventory: [WALLET, MAP, 0, 0],
        ..EngineConfig::for_version(store.version())
    }
}

/// A fresh data directory with the bundle and the logic loaded from it.
pub fn load() -> Result<(TempDir, Logic<HeadlessFrontend>)> {
    let dir = tempfile::tempdir().context("creating data directory")?;
    write_bundle(dir.path())?;
    let mut store = ResourceStore::open(dir.path(), None).context("opening fixture bundle")?;
    let config = test_config(&store);
    let logic = Logic::load(&mut store, config, HeadlessFrontend::new())?;
    Ok((dir, logic))
}

/// Loaded, started, and standing in the lobby after the walk in.
pub fn in_lobby() -> Result<(TempDir, Logic<HeadlessFrontend>)> {
    let (dir, mut logic) = load()?;
    logic.start();
    logic.run(2);
    Ok((dir, logic))
}

pub fn has_event(logic: &Logic<HeadlessFrontend>, event: &str) -> bool {
    logic.events().iter().any(|logged| logged == event)
}

pub fn has_call(logic: &Logic<HeadlessFrontend>, call: &str) -> bool {
    logic.frontend().calls().iter().any(|logged| logged == call)
}
