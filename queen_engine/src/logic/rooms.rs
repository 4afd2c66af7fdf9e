use std::path::PathBuf;

use super::{Logic, PendingWalk};
use crate::frontend::Frontend;
use crate::save::{decode_save, SaveData, SaveError, SaveManager};
use crate::state::{JoeWalkMode, ObjectState};

impl<F: Frontend> Logic<F> {
    /// Leaves the current room for `new_room`: fade out, rebuild zones,
    /// furniture and persons, place the player and queue the walk in.
    pub(super) fn change_room(&mut self) {
        self.scene.request_stop();
        self.old_room = self.current_room;
        self.current_room = self.new_room;
        self.new_room = 0;
        self.pending_walk = None;
        self.pending_command = None;
        if self.old_room > 0 {
            self.frontend.fade_out(self.old_room);
        }
        self.persons.clear();

        let room = self.current_room;
        let name = self.text.room_name(room).to_string();
        log::info!("logic: entering room {room} ({name}) from {}", self.old_room);
        self.frontend.render_room(&name, room);
        let base = self.current_room_base();
        self.grid.setup_new_room(room, base, &self.objects);
        self.room_furniture = self
            .furniture
            .iter()
            .skip(1)
            .filter(|furniture| furniture.room == room as i16)
            .copied()
            .collect();
        self.setup_persons();
        self.log_event(format!("room.enter {room}"));

        let walk_to = self.setup_joe_in_room();
        self.frontend.fade_in(room);
        if let Some((x, y)) = walk_to {
            self.pending_walk = Some(PendingWalk { x, y, facing: None });
        }
    }

    /// Places the player for the room just entered and returns the point
    /// they should then walk to, if any.
    pub(super) fn setup_joe_in_room(&mut self) -> Option<(i16, i16)> {
        let entry = (self.entry_obj > 0)
            .then(|| self.objects.get(self.entry_obj as usize).copied())
            .flatten();
        let (pos, walk_to) = match (self.joe.forced_pos.take(), entry) {
            (Some(pos), _) => (pos, None),
            (None, Some(object)) => {
                let object_pos = (object.x as i16, object.y as i16);
                match self.walk_off_for(self.entry_obj as u16) {
                    Some(walk_off) => (
                        (walk_off.x as i16, walk_off.y as i16),
                        Some(object_pos),
                    ),
                    None => (object_pos, None),
                }
            }
            (None, None) => ((self.bob.x, self.bob.y), None),
        };

        self.joe.scale = self.grid.find_scale(pos.0, pos.1);
        self.joe.facing = match (self.joe.cut_facing.take(), entry) {
            (Some(facing), _) => facing,
            (None, Some(object)) => ObjectState(object.state).direction().opposite(),
            (None, None) => self.joe.facing,
        };
        self.joe.prev_facing = self.joe.facing;
        self.bob.place(pos.0, pos.1);
        self.bob.scale = self.joe.scale;
        self.bob.active = true;
        self.joe_face();
        log::debug!(
            "logic: player at {pos:?} scale {} facing {:?}",
            self.joe.scale,
            self.joe.facing
        );
        walk_to
    }

    /// Captures every persistent component.
    pub fn snapshot(&self) -> SaveData {
        SaveData {
            scene: self.scene,
            areas: self.grid.areas().to_vec(),
            inventory: self.inventory,
            joe_x: self.bob.x,
            joe_y: self.bob.y,
            room: self.current_room,
            objects: self.objects.clone(),
            items: self.items.clone(),
            game_state: self.game_state.clone(),
            talk_selected: self.talk_selected.clone(),
            walk_offs: self.walk_offs.clone(),
            facing: self.joe.facing,
            puzzle_attempts: self.puzzle_attempts,
            object_descriptions: self.object_descriptions.clone(),
            sound: self.sound,
        }
    }

    /// Commits a decoded save and sets the restored game up.
    pub fn restore(&mut self, data: SaveData) {
        self.scene = data.scene;
        self.grid.restore_areas(data.areas);
        self.inventory = data.inventory;
        self.objects = data.objects;
        self.items = data.items;
        self.game_state = data.game_state;
        self.talk_selected = data.talk_selected;
        self.walk_offs = data.walk_offs;
        self.puzzle_attempts = data.puzzle_attempts;
        self.object_descriptions = data.object_descriptions;
        self.sound = data.sound;
        self.joe.facing = data.facing;
        self.joe.cut_facing = Some(data.facing);
        self.joe.forced_pos = Some((data.joe_x, data.joe_y));
        self.current_room = 0;
        self.new_room = data.room;
        self.setup_restored_game();
    }

    fn setup_restored_game(&mut self) {
        self.sound
            .play_last_song(&self.config.songs, &mut self.frontend);
        self.load_costume_banks(self.costume());
        self.joe.prev_facing = self.joe.facing;
        self.joe_face();
        self.entry_obj = 0;
        self.selection = Default::default();
        self.pending_command = None;
        self.pending_walk = None;
        self.joe.walk = JoeWalkMode::Normal;
        self.log_event(format!("game.restore {}", self.new_room));
    }

    pub fn save_game(&self, saves: &SaveManager, slot: u16, description: &str) -> Result<PathBuf, SaveError> {
        saves.write(slot, description, &self.snapshot())
    }

    /// Loads `slot`. A corrupted or unreadable save leaves the current game
    /// untouched and is reported to the caller.
    pub fn load_game(&mut self, saves: &SaveManager, slot: u16) -> Result<(), SaveError> {
        let bytes = saves.read(slot)?;
        self.load_bytes(&bytes)
    }

    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<(), SaveError> {
        match decode_save(bytes, &self.snapshot()) {
            Ok((header, data)) => {
                log::info!("logic: restoring \"{}\" in room {}", header.description, data.room);
                self.restore(data);
                Ok(())
            }
            Err(err) => {
                log::warn!("logic: saved game rejected, keeping current state: {err}");
                Err(err)
            }
        }
    }
}
