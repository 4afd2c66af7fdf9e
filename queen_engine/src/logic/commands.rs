use queen_formats::{CmdArea, CmdGameState, CmdInventory, CmdObject, Rect};
use rand::Rng;

use super::{Logic, PendingCommand, PendingWalk, Selection};
use crate::command::Resolution;
use crate::config::ActionTarget;
use crate::frontend::{Button, Frontend, InputEvent};
use crate::grid::{GridScreen, ROOM_ZONE_HEIGHT};
use crate::state::{Grab, JoeWalkMode, ObjectState, Verb};

/// Special sections handled by the engine itself.
const SECTION_DRESS: i16 = 2;
const SECTION_CLOTHES: i16 = 3;
const SECTION_GAME_OVER: i16 = 5;
const SECTION_UNDERWEAR: i16 = 31;

impl<F: Frontend> Logic<F> {
    pub(super) fn handle_click(&mut self, event: InputEvent) {
        if event.y >= ROOM_ZONE_HEIGHT {
            self.handle_panel_click(event);
        } else {
            self.handle_room_click(event);
        }
    }

    fn handle_panel_click(&mut self, event: InputEvent) {
        let verb = self.grid.find_verb_under_cursor(event.x, event.y);
        if verb.is_panel_command() {
            self.selection = Selection {
                verb: Some(verb),
                item: 0,
            };
            self.log_event(format!("verb.select {verb:?}"));
        } else if verb.is_scroll() {
            self.inventory_scroll(1, verb == Verb::ScrollUp);
        } else if let Some(slot) = verb.inventory_slot() {
            let item = self.find_inventory_item(slot);
            if item > 0 {
                self.handle_item_click(item, event.button);
            }
        }
    }

    fn handle_item_click(&mut self, item: i16, button: Button) {
        let state = ObjectState(self.items.get(item as usize).map_or(0, |data| data.state));
        let verb = match (button, self.selection.verb) {
            (Button::Right, _) | (Button::Left, None) => match state.default_verb() {
                Verb::None => Verb::LookAt,
                verb => verb,
            },
            (Button::Left, Some(verb)) => verb,
        };

        let needs_target = verb == Verb::Give || state.is_use_on();
        if verb.is_two_level() && self.selection.item == 0 && needs_target {
            self.selection = Selection {
                verb: Some(verb),
                item,
            };
            self.log_event(format!("item.select {verb:?} {item}"));
            return;
        }
        let subjects = if verb.is_two_level() && self.selection.item != 0 {
            [-self.selection.item, -item]
        } else {
            [-item, 0]
        };
        self.selection = Selection::default();
        self.pending_command = Some(PendingCommand {
            verb,
            subjects,
            exit_room: 0,
        });
        self.joe.walk = JoeWalkMode::Execute;
    }

    fn handle_room_click(&mut self, event: InputEvent) {
        let zone = self.grid.find_object_under_cursor(event.x, event.y, 0);
        let noun = if zone > 0 {
            self.grid.find_object_number(zone)
        } else {
            0
        };
        let max_obj = self.grid.obj_max(self.current_room);
        let object = self.current_room_base() + noun;
        let visible = noun > 0
            && noun <= max_obj
            && self.objects.get(object as usize).is_some_and(|data| data.name > 0);
        if !visible {
            self.selection = Selection::default();
            self.pending_command = None;
            self.pending_walk = Some(PendingWalk {
                x: event.x,
                y: event.y,
                facing: None,
            });
            return;
        }

        let state = ObjectState(self.objects[object as usize].state);
        let mut verb = match (event.button, self.selection.verb) {
            (Button::Right, _) => match state.default_verb() {
                Verb::None => Verb::WalkTo,
                verb => verb,
            },
            (Button::Left, Some(verb)) => verb,
            (Button::Left, None) => Verb::WalkTo,
        };
        let subjects = if verb.is_two_level() && self.selection.item != 0 {
            [-self.selection.item, object as i16]
        } else {
            [object as i16, 0]
        };
        if verb == Verb::Use && subjects[0] > 0 && self.objects[object as usize].entry_obj > 0 {
            verb = Verb::WalkTo;
        }
        self.selection = Selection::default();
        self.make_joe_walk_to(event.x, event.y, object, verb, subjects);
    }

    /// Queues the walk to `object` and the action to run on arrival. Walking
    /// to an exit also records the room it leads to.
    fn make_joe_walk_to(&mut self, x: i16, y: i16, object: u16, verb: Verb, subjects: [i16; 2]) {
        let Some(data) = self.objects.get(object as usize).copied() else {
            return;
        };
        let (mut x, mut y) = if data.x != 0 || data.y != 0 {
            (data.x as i16, data.y as i16)
        } else {
            (x, y)
        };
        let mut exit_room = 0;
        if verb == Verb::WalkTo {
            self.entry_obj = data.entry_obj;
            if data.entry_obj > 0 {
                exit_room = self
                    .objects
                    .get(data.entry_obj as usize)
                    .map_or(0, |entry| entry.room);
                if let Some(walk_off) = self.walk_off_for(object) {
                    x = walk_off.x as i16;
                    y = walk_off.y as i16;
                }
            }
        } else {
            self.entry_obj = 0;
        }
        self.pending_command = Some(PendingCommand {
            verb,
            subjects,
            exit_room,
        });
        self.pending_walk = Some(PendingWalk {
            x,
            y,
            facing: Some(ObjectState(data.state).direction()),
        });
        self.log_event(format!("command.queue {verb:?} {} {}", subjects[0], subjects[1]));
    }

    /// Runs the action whose walk has completed, then enters the exit room
    /// it recorded.
    pub(super) fn execute_pending_command(&mut self) {
        self.joe.walk = JoeWalkMode::Normal;
        let Some(command) = self.pending_command.take() else {
            return;
        };
        self.run_command(command.verb, command.subjects);
        if command.exit_room > 0 && !self.finished {
            self.new_room = command.exit_room;
        }
    }

    /// Resolves and executes `verb` on `subjects` (objects absolute, items
    /// negated). Returns the id of the command that ran.
    pub fn run_command(&mut self, verb: Verb, subjects: [i16; 2]) -> Option<u16> {
        let hidden = subjects.iter().any(|&subject| {
            subject > 0
                && self
                    .objects
                    .get(subject as usize)
                    .map_or(true, |data| data.name <= 0)
        });
        if hidden {
            log::debug!("logic: {verb:?} on hidden subject {subjects:?}");
            return None;
        }
        match self
            .commands
            .select(verb, subjects[0], subjects[1], &self.game_state)
        {
            Resolution::Unresolved => {
                self.say_invalid_action(verb, subjects);
                None
            }
            Resolution::Failed { id, speak } => {
                self.log_event(format!("command.fail {id}"));
                match speak {
                    Some(speak) => self.make_joe_speak(speak, true),
                    None if verb == Verb::LookAt => self.look_at_selected(subjects[0]),
                    None => {}
                }
                None
            }
            Resolution::Execute {
                id,
                assignments,
                speak,
            } => {
                self.execute_command(verb, subjects, id, &assignments, speak);
                Some(id)
            }
        }
    }

    fn execute_command(
        &mut self,
        verb: Verb,
        subjects: [i16; 2],
        id: u16,
        assignments: &[CmdGameState],
        mut speak: u16,
    ) {
        let Some(effects) = self.commands.effects(id) else {
            return;
        };
        let entry = effects.entry;
        self.log_event(format!("command.execute {id}"));

        // OPEN and CLOSE play their song only once the object has changed.
        let plays_song = !matches!(verb, Verb::None | Verb::Open | Verb::Close);
        if plays_song && entry.song > 0 {
            self.sound
                .play_song(entry.song, &self.config.songs, &mut self.frontend);
        }

        for row in assignments {
            self.set_game_state(row.game_state_slot.unsigned_abs() as usize, row.game_state_value);
        }
        self.set_areas(&effects.areas);

        if verb != Verb::TalkTo && verb != Verb::WalkTo {
            for subject in subjects.into_iter().filter(|&subject| subject > 0) {
                let grab = self
                    .objects
                    .get(subject as usize)
                    .map_or(Grab::None, |data| ObjectState(data.state).grab());
                if grab != Grab::None {
                    self.log_event(format!("joe.grab {grab:?}"));
                }
            }
        }

        let mut cut_done = false;
        if speak > 0 {
            let description = self.text.description(speak).to_string();
            if self.execute_if_cutaway(&description) {
                speak = 0;
                cut_done = true;
            } else if self.execute_if_dialog(&description) {
                speak = 0;
            }
        }

        let subject = subjects[0];
        self.set_objects(&effects.objects, subject);
        self.set_items(&effects.items);

        if entry.image_order != 0 && subject > 0 {
            if let Some(data) = self.objects.get_mut(subject as usize) {
                if entry.image_order < 0 {
                    if data.image > 0 {
                        data.image = -(data.image + 10);
                    }
                } else {
                    data.image = entry.image_order;
                }
                let image = data.image;
                self.log_event(format!("object.image {subject} {image}"));
            }
        }

        if plays_song && entry.song < 0 {
            self.sound
                .play_song(-entry.song, &self.config.songs, &mut self.frontend);
        }

        match entry.special_section {
            0 => {}
            SECTION_DRESS => self.joe_use_dress(true),
            SECTION_CLOTHES => self.joe_use_clothes(true),
            SECTION_UNDERWEAR => self.joe_use_underwear(),
            SECTION_GAME_OVER => {
                self.finished = true;
                self.log_event("game.over");
            }
            section => {
                self.log_event(format!("special {section}"));
                self.frontend.special_move(section);
            }
        }

        if subject > 0 {
            self.change_object_state(verb, subject as u16, entry.song, cut_done);
        }
        if speak > 0 {
            self.make_joe_speak(speak, true);
        }
    }

    fn set_areas(&mut self, rows: &[CmdArea]) {
        for row in rows {
            let room = row.room.max(0) as u16;
            let index = row.area.unsigned_abs();
            let Some(area) = self.grid.area_mut(room, index) else {
                log::warn!("logic: command area {index} of room {room} out of range");
                continue;
            };
            let enabled = row.area > 0;
            area.map_neighbors = if enabled {
                area.map_neighbors.abs()
            } else {
                -area.map_neighbors.abs()
            };
            self.log_event(format!(
                "area.{} {room} {index}",
                if enabled { "on" } else { "off" }
            ));
        }
    }

    fn set_objects(&mut self, rows: &[CmdObject], subject: i16) {
        for row in rows {
            let dst = row.dst_obj.unsigned_abs();
            let Some(data) = self.objects.get_mut(dst as usize) else {
                log::warn!("logic: command object {dst} out of range");
                continue;
            };
            if row.dst_obj < 0 {
                if data.name > 0 {
                    data.name = -data.name;
                    self.log_event(format!("object.hide {dst}"));
                }
                continue;
            }

            data.name = data.name.abs();
            if row.src_obj == -1 && data.name != 0 {
                data.name = 0;
                let in_room = data.room == self.current_room;
                if in_room && dst as i16 != subject && data.image > 0 {
                    data.image = -(data.image + 10);
                }
                if in_room {
                    if let Some(zone) = dst.checked_sub(self.current_room_base()) {
                        self.grid
                            .set_zone(GridScreen::Room, zone, Rect::new(0, 0, 1, 1));
                    }
                }
                self.log_event(format!("object.delete {dst}"));
            } else if row.src_obj > 0 {
                self.object_copy(row.src_obj as u16, dst);
            } else {
                self.log_event(format!("object.show {dst}"));
            }
        }
    }

    fn set_items(&mut self, rows: &[CmdInventory]) {
        for row in rows {
            let dst = row.dst_item.unsigned_abs() as usize;
            if dst == 0 || dst >= self.items.len() {
                log::warn!("logic: command item {dst} out of range");
                continue;
            }
            let source = (row.src_item > 0)
                .then(|| self.items.get(row.src_item as usize).copied())
                .flatten();
            if row.dst_item > 0 {
                if let Some(source) = source {
                    self.items[dst] = source;
                    self.items[dst].name = source.name.abs();
                }
                self.inventory_insert_item(dst as i16);
            } else {
                if self.items[dst].name > 0 {
                    self.inventory_delete_item(dst as i16);
                }
                if let Some(source) = source {
                    self.items[dst] = source;
                    self.items[dst].name = -source.name.abs();
                }
            }
        }
    }

    /// Opening and closing flip the on flag, the default verb and whether
    /// the object's exit can be used.
    fn change_object_state(&mut self, verb: Verb, object: u16, song: i16, cut_done: bool) {
        if cut_done {
            return;
        }
        let Some(data) = self.objects.get_mut(object as usize) else {
            return;
        };
        let state = ObjectState(data.state);
        let open = match verb {
            Verb::Open if !state.is_on() => true,
            Verb::Close if state.is_on() => false,
            _ => return,
        };
        let next_verb = if open { Verb::Close } else { Verb::Open };
        data.state = state.with_on(open).with_default_verb(next_verb).0;
        data.entry_obj = if open {
            data.entry_obj.abs()
        } else {
            -data.entry_obj.abs()
        };
        self.log_event(format!(
            "object.{} {object}",
            if open { "open" } else { "close" }
        ));
        if song > 0 {
            self.sound
                .play_song(song, &self.config.songs, &mut self.frontend);
        }
    }

    fn action_target(&self, subject: i16) -> ActionTarget {
        if subject < 0 {
            return ActionTarget::Item;
        }
        match self.objects.get(subject as usize) {
            Some(data) if subject > 0 && data.image_kind().is_person() => ActionTarget::Person,
            Some(_) if subject > 0 => ActionTarget::Object,
            _ => ActionTarget::Any,
        }
    }

    /// Generic response when no command matches.
    fn say_invalid_action(&mut self, verb: Verb, subjects: [i16; 2]) {
        self.log_event(format!("command.invalid {verb:?}"));
        match verb {
            Verb::LookAt => return self.look_at_selected(subjects[0]),
            Verb::WalkTo | Verb::None => return,
            _ => {}
        }
        if verb == Verb::Use && subjects[0] < 0 {
            let sfx = self
                .items
                .get(subjects[0].unsigned_abs() as usize)
                .map_or(0, |item| item.sfx_description);
            if sfx > 0 {
                return self.make_joe_speak(sfx as u16, true);
            }
        }
        let target = self.action_target(subjects[0]);
        let Some(rule) = self
            .config
            .invalid_actions
            .iter()
            .find(|rule| {
                rule.verb == verb && (rule.target == target || rule.target == ActionTarget::Any)
            })
            .copied()
        else {
            log::debug!("logic: no response for {verb:?} on {target:?}");
            return;
        };
        let offset = if rule.spread > 0 {
            self.rng.gen_range(0..=rule.spread)
        } else {
            0
        };
        self.make_joe_speak(rule.response + offset, false);
    }
}

