//! The per-room state machine: static world tables, the player, persons,
//! inventory and the command pipeline, advanced one phase per tick.

mod actors;
mod commands;
mod inventory;
mod joe;
mod objects;
mod rooms;

pub use actors::Person;
pub use joe::{Costume, JoeState};

use anyhow::{Context, Result};
use queen_formats::jas::{SCRIPT_FILE, TEXT_FILE};
use queen_formats::{
    ActorData, FurnitureData, GameVersion, GraphicAnim, GraphicData, ItemData, JasData, JasText,
    ObjectData, ObjectDescription, ResourceStore, TalkSelected, WalkOffData,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::bob::BobSlot;
use crate::command::CommandResolver;
use crate::config::EngineConfig;
use crate::frontend::{Frontend, InputEvent, Interrupts};
use crate::grid::Grid;
use crate::scene::SceneState;
use crate::sound::SoundState;
use crate::state::{Direction, JoeWalkMode, Verb, GAME_STATE_COUNT, TALK_SELECTED_COUNT};

/// What a call to [`Logic::tick`] spent its time on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnginePhase {
    RoomTransition,
    Execute,
    Walking,
    Idle,
}

/// A resolved player action waiting for the walk that precedes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PendingCommand {
    pub verb: Verb,
    /// Objects are absolute indices, items are negated item numbers.
    pub subjects: [i16; 2],
    /// Room entered once the command has run, for exits.
    pub exit_room: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PendingWalk {
    pub x: i16,
    pub y: i16,
    pub facing: Option<Direction>,
}

/// Panel selection carried between clicks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub verb: Option<Verb>,
    /// First noun of a two-level verb, an item number.
    pub item: i16,
}

pub struct Logic<F: Frontend> {
    config: EngineConfig,
    version: GameVersion,
    text: JasText,

    objects: Vec<ObjectData>,
    items: Vec<ItemData>,
    graphics: Vec<GraphicData>,
    room_data: Vec<u16>,
    sfx_names: Option<Vec<u16>>,
    walk_offs: Vec<WalkOffData>,
    object_descriptions: Vec<ObjectDescription>,
    furniture: Vec<FurnitureData>,
    actors: Vec<ActorData>,
    graphic_anims: Vec<GraphicAnim>,

    grid: Grid,
    commands: CommandResolver,

    game_state: Vec<i16>,
    talk_selected: Vec<TalkSelected>,
    inventory: [i16; 4],
    puzzle_attempts: u16,

    joe: JoeState,
    bob: BobSlot,
    persons: Vec<Person>,
    room_furniture: Vec<FurnitureData>,

    current_room: u16,
    old_room: u16,
    new_room: u16,
    entry_obj: i16,

    selection: Selection,
    pending_command: Option<PendingCommand>,
    pending_walk: Option<PendingWalk>,

    sound: SoundState,
    scene: SceneState,
    interrupts: Interrupts,
    rng: StdRng,
    finished: bool,

    frontend: F,
    events: Vec<String>,
}

impl<F: Frontend> Logic<F> {
    /// Reads both script files from the bundle and builds the world.
    pub fn load(store: &mut ResourceStore, config: EngineConfig, frontend: F) -> Result<Self> {
        let version = store.version().clone();
        let bytes = store
            .load(SCRIPT_FILE)
            .with_context(|| format!("loading {SCRIPT_FILE}"))?;
        let data = JasData::parse(&bytes, &version)
            .with_context(|| format!("decoding {SCRIPT_FILE}"))?;
        let lines = store
            .load_text(TEXT_FILE)
            .with_context(|| format!("loading {TEXT_FILE}"))?;
        let text = JasText::parse(&lines, &data).with_context(|| format!("decoding {TEXT_FILE}"))?;
        Ok(Self::from_data(data, text, version, config, frontend))
    }

    pub fn from_data(
        data: JasData,
        text: JasText,
        version: GameVersion,
        config: EngineConfig,
        frontend: F,
    ) -> Self {
        let current_room = data
            .objects
            .get(data.entry_obj as usize)
            .map_or(1, |object| object.room);
        log::info!(
            "logic: {} objects, {} rooms, starting in room {current_room}",
            data.num_objects(),
            data.num_rooms
        );
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            text,
            objects: data.objects,
            items: data.items,
            graphics: data.graphics,
            room_data: data.room_data,
            sfx_names: data.sfx_names,
            walk_offs: data.walk_offs,
            object_descriptions: data.object_descriptions,
            furniture: data.furniture,
            actors: data.actors,
            graphic_anims: data.graphic_anims,
            grid: Grid::new(data.grid),
            commands: CommandResolver::new(data.commands),
            game_state: vec![0; GAME_STATE_COUNT],
            talk_selected: vec![TalkSelected::default(); TALK_SELECTED_COUNT],
            inventory: [0; 4],
            puzzle_attempts: 0,
            joe: JoeState::default(),
            bob: BobSlot::new(),
            persons: Vec::new(),
            room_furniture: Vec::new(),
            current_room,
            old_room: 0,
            new_room: 0,
            entry_obj: data.entry_obj as i16,
            selection: Selection::default(),
            pending_command: None,
            pending_walk: None,
            sound: SoundState::default(),
            scene: SceneState::default(),
            interrupts: Interrupts::default(),
            rng,
            finished: false,
            frontend,
            events: Vec::new(),
            config,
            version,
        }
    }

    /// New game: player banks, starting inventory, and a transition into
    /// the starting room.
    pub fn start(&mut self) {
        self.load_costume_banks(Costume::Normal);
        self.inventory_setup();
        self.old_room = 0;
        self.new_room = self.current_room;
        self.current_room = 0;
        self.log_event(format!("game.start {}", self.new_room));
    }

    /// Advances one phase: a pending room change first, then a command whose
    /// walk has completed, then a queued walk, otherwise input.
    pub fn tick(&mut self) -> EnginePhase {
        if self.new_room > 0 {
            self.change_room();
            return EnginePhase::RoomTransition;
        }
        if self.joe.walk == JoeWalkMode::Execute {
            self.execute_pending_command();
            return EnginePhase::Execute;
        }
        if let Some(walk) = self.pending_walk.take() {
            self.walk_pending(walk);
            return EnginePhase::Walking;
        }
        self.scene.update();
        if let Some(event) = self.frontend.poll_input() {
            self.handle_input(event);
        }
        EnginePhase::Idle
    }

    /// Ticks until `max_ticks`, the end of the game, or a quit request.
    pub fn run(&mut self, max_ticks: u64) -> u64 {
        let mut ticks = 0;
        while ticks < max_ticks && !self.finished && !self.interrupts.quit {
            self.tick();
            ticks += 1;
        }
        ticks
    }

    /// Queues a click as if it came from the frontend.
    pub fn handle_input(&mut self, event: InputEvent) {
        self.handle_click(event);
    }

    pub(crate) fn log_event(&mut self, event: impl Into<String>) {
        let event = event.into();
        log::debug!("event {event}");
        self.events.push(event);
    }

    pub fn events(&self) -> &[String] {
        &self.events
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn version(&self) -> &GameVersion {
        &self.version
    }

    pub fn text(&self) -> &JasText {
        &self.text
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    pub fn frontend_mut(&mut self) -> &mut F {
        &mut self.frontend
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn commands(&self) -> &CommandResolver {
        &self.commands
    }

    pub fn current_room(&self) -> u16 {
        self.current_room
    }

    pub fn old_room(&self) -> u16 {
        self.old_room
    }

    pub fn new_room(&self) -> u16 {
        self.new_room
    }

    pub fn set_new_room(&mut self, room: u16) {
        self.new_room = room;
    }

    pub fn entry_obj(&self) -> i16 {
        self.entry_obj
    }

    pub fn set_entry_obj(&mut self, object: i16) {
        self.entry_obj = object;
    }

    /// Index of the last object before `room`'s objects.
    pub fn room_base(&self, room: u16) -> u16 {
        self.room_data.get(room as usize).copied().unwrap_or(0)
    }

    pub fn current_room_base(&self) -> u16 {
        self.room_base(self.current_room)
    }

    pub fn current_room_sfx(&self) -> u16 {
        self.sfx_names
            .as_ref()
            .and_then(|names| names.get(self.current_room as usize))
            .copied()
            .unwrap_or(0)
    }

    pub fn game_state(&self, slot: usize) -> i16 {
        self.game_state.get(slot).copied().unwrap_or(0)
    }

    pub fn set_game_state(&mut self, slot: usize, value: i16) {
        if let Some(entry) = self.game_state.get_mut(slot) {
            *entry = value;
        } else {
            log::warn!("logic: game state slot {slot} out of range");
        }
    }

    pub fn game_states(&self) -> &[i16] {
        &self.game_state
    }

    pub fn talk_selected(&self) -> &[TalkSelected] {
        &self.talk_selected
    }

    pub fn talk_selected_mut(&mut self, index: usize) -> Option<&mut TalkSelected> {
        self.talk_selected.get_mut(index)
    }

    pub fn object(&self, index: u16) -> Option<&ObjectData> {
        self.objects.get(index as usize)
    }

    pub fn object_mut(&mut self, index: u16) -> Option<&mut ObjectData> {
        self.objects.get_mut(index as usize)
    }

    pub fn objects(&self) -> &[ObjectData] {
        &self.objects
    }

    pub fn item(&self, index: u16) -> Option<&ItemData> {
        self.items.get(index as usize)
    }

    pub fn items(&self) -> &[ItemData] {
        &self.items
    }

    pub fn graphic(&self, index: u16) -> Option<&GraphicData> {
        self.graphics.get(index as usize)
    }

    pub fn graphic_anims(&self) -> &[GraphicAnim] {
        &self.graphic_anims
    }

    pub fn walk_offs(&self) -> &[WalkOffData] {
        &self.walk_offs
    }

    pub fn object_descriptions(&self) -> &[ObjectDescription] {
        &self.object_descriptions
    }

    pub fn actors(&self) -> &[ActorData] {
        &self.actors
    }

    pub fn persons(&self) -> &[Person] {
        &self.persons
    }

    pub fn room_furniture(&self) -> &[FurnitureData] {
        &self.room_furniture
    }

    pub fn inventory(&self) -> [i16; 4] {
        self.inventory
    }

    pub fn puzzle_attempts(&self) -> u16 {
        self.puzzle_attempts
    }

    pub fn joe(&self) -> &JoeState {
        &self.joe
    }

    pub fn bob(&self) -> &BobSlot {
        &self.bob
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn pending_command(&self) -> Option<&PendingCommand> {
        self.pending_command.as_ref()
    }

    pub fn pending_walk(&self) -> Option<&PendingWalk> {
        self.pending_walk.as_ref()
    }

    pub fn sound(&self) -> &SoundState {
        &self.sound
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneState {
        &mut self.scene
    }

    pub fn interrupts_mut(&mut self) -> &mut Interrupts {
        &mut self.interrupts
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
