use queen_formats::jas::JOE_RESPONSE_COUNT;
use serde::Serialize;

use super::{Logic, PendingWalk};
use crate::config::SpecialAreaAction;
use crate::frontend::{Frontend, Speaker};
use crate::state::{Direction, JoeWalkMode, VAR_JOE_DRESSING_MODE};
use crate::walk::{self, WalkOutcome};

const JOE_ANIM_BANK: u16 = walk::WALK_BANK;
/// Bank holding the standing frames.
const JOE_STAND_BANK: u16 = 7;
/// Sprite slot the current standing frame is unpacked into.
const JOE_FACE_SLOT: u16 = 31;
/// Slots of the front/back and side turning frames.
const JOE_TURN_FRONT_BACK: u16 = 35;
const JOE_TURN_SIDE: u16 = 36;
/// Room where the player is always drawn with the first standing frame.
const FIXED_FACE_ROOM: u16 = 108;

/// Player response spoken when no route exists.
const RESPONSE_CANT_GET_THERE: u16 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JoeState {
    pub facing: Direction,
    pub prev_facing: Direction,
    /// Facing requested by a cutscene or restore for the next room entry.
    pub cut_facing: Option<Direction>,
    pub scale: u16,
    pub walk: JoeWalkMode,
    /// Position used by the next room setup instead of the entry object.
    pub forced_pos: Option<(i16, i16)>,
}

impl Default for JoeState {
    fn default() -> Self {
        Self {
            facing: Direction::Front,
            prev_facing: Direction::Front,
            cut_facing: None,
            scale: 100,
            walk: JoeWalkMode::Normal,
            forced_pos: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Costume {
    Normal,
    Underwear,
    Dress,
}

impl Costume {
    pub fn from_state(value: i16) -> Costume {
        match value {
            1 => Costume::Underwear,
            2 => Costume::Dress,
            _ => Costume::Normal,
        }
    }

    pub fn code(self) -> i16 {
        match self {
            Costume::Normal => 0,
            Costume::Underwear => 1,
            Costume::Dress => 2,
        }
    }

    fn banks(self) -> (&'static str, &'static str) {
        match self {
            Costume::Normal => ("JOE_A.BBK", "JOE_B.BBK"),
            Costume::Underwear => ("JOEU_A.BBK", "JOEU_B.BBK"),
            Costume::Dress => ("JOED_A.BBK", "JOED_B.BBK"),
        }
    }
}

pub(super) fn has_extension(name: &str, ext: &str) -> bool {
    name.len() > ext.len()
        && name
            .get(name.len() - ext.len()..)
            .is_some_and(|tail| tail.eq_ignore_ascii_case(ext))
}

impl<F: Frontend> Logic<F> {
    /// Unpacks the standing frame matching the current facing, showing a
    /// turning frame first when the player turns around.
    pub fn joe_face(&mut self) -> u16 {
        let frame = if self.current_room == FIXED_FACE_ROOM {
            1
        } else {
            let facing = self.joe.facing;
            let prev = self.joe.prev_facing;
            let (turn, frame) = match facing {
                Direction::Front => ((prev == Direction::Back).then_some(JOE_TURN_FRONT_BACK), 3),
                Direction::Back => ((prev == Direction::Front).then_some(JOE_TURN_FRONT_BACK), 5),
                Direction::Left | Direction::Right => {
                    ((prev == facing.opposite()).then_some(JOE_TURN_SIDE), 1)
                }
            };
            if let Some(turn) = turn {
                self.bob.frame_num = turn;
                self.frontend.update(&mut self.interrupts);
            }
            self.joe.prev_facing = facing;
            frame
        };
        self.bob.xflip = self.joe.facing == Direction::Left;
        self.bob.frame_num = JOE_FACE_SLOT;
        self.frontend
            .unpack_sprite_frame(frame, JOE_FACE_SLOT, JOE_STAND_BANK);
        frame
    }

    pub(super) fn load_costume_banks(&mut self, costume: Costume) {
        let (anim, stand) = costume.banks();
        self.frontend.load_bank(anim, JOE_ANIM_BANK);
        for slot in 11..31 {
            self.frontend.unpack_sprite_frame(slot - 10, slot, JOE_ANIM_BANK);
        }
        self.frontend.load_bank(stand, JOE_STAND_BANK);
        self.frontend.unpack_sprite_frame(1, 35, JOE_STAND_BANK);
        self.frontend.unpack_sprite_frame(3, 36, JOE_STAND_BANK);
        self.frontend.unpack_sprite_frame(5, 37, JOE_STAND_BANK);
        self.log_event(format!("joe.costume {costume:?}"));
    }

    pub fn costume(&self) -> Costume {
        Costume::from_state(self.game_state(VAR_JOE_DRESSING_MODE))
    }

    pub fn joe_use_dress(&mut self, show_cut: bool) {
        if show_cut {
            self.joe.facing = Direction::Front;
            self.joe_face();
            if self.costume() == Costume::Normal {
                self.play_cutaway("CDRES.CUT");
                self.inventory_insert_item(self.config.clothes_item);
            } else {
                self.play_cutaway("CUDRS.CUT");
            }
        }
        self.load_costume_banks(Costume::Dress);
        self.inventory_delete_item(self.config.dress_item);
        self.set_game_state(VAR_JOE_DRESSING_MODE, Costume::Dress.code());
    }

    pub fn joe_use_clothes(&mut self, show_cut: bool) {
        if show_cut {
            self.joe.facing = Direction::Front;
            self.joe_face();
            self.play_cutaway("CDCLO.CUT");
            self.inventory_insert_item(self.config.dress_item);
        }
        self.load_costume_banks(Costume::Normal);
        self.inventory_delete_item(self.config.clothes_item);
        self.set_game_state(VAR_JOE_DRESSING_MODE, Costume::Normal.code());
    }

    pub fn joe_use_underwear(&mut self) {
        self.load_costume_banks(Costume::Underwear);
        self.set_game_state(VAR_JOE_DRESSING_MODE, Costume::Underwear.code());
    }

    /// Speaks a player response, or an object description when
    /// `object_type` is set.
    pub fn make_joe_speak(&mut self, index: u16, object_type: bool) {
        let (text, voice_index, kind) = if object_type {
            (
                self.text.description(index).to_string(),
                index as usize + JOE_RESPONSE_COUNT,
                "description",
            )
        } else {
            (self.text.joe_response(index as usize).to_string(), index as usize, "response")
        };
        let voice = self
            .config
            .has_speech
            .then(|| format!("JOE{voice_index:04}"));
        self.frontend.speak(&text, Speaker::Joe, voice.as_deref());
        self.log_event(format!("joe.speak {kind} {index}"));
    }

    /// Speaks a description unless it names a cutscene or a dialogue, in
    /// which case that is played instead.
    pub(super) fn speak_description(&mut self, index: u16) {
        let text = self.text.description(index).to_string();
        if !self.execute_if_cutaway(&text) && !self.execute_if_dialog(&text) {
            self.make_joe_speak(index, true);
        }
    }

    /// Plays a cutscene and every cutscene it chains to.
    pub fn play_cutaway(&mut self, name: &str) {
        let mut next = Some(name.to_string());
        while let Some(cut) = next.take() {
            if !has_extension(&cut, ".CUT") {
                break;
            }
            self.log_event(format!("cutaway {cut}"));
            next = self.frontend.play_cutscene(&cut);
        }
        self.interrupts.cutaway_quit = false;
    }

    pub(super) fn execute_if_cutaway(&mut self, description: &str) -> bool {
        if has_extension(description, ".CUT") {
            self.play_cutaway(description);
            true
        } else {
            false
        }
    }

    pub(super) fn execute_if_dialog(&mut self, description: &str) -> bool {
        if has_extension(description, ".DOG") {
            self.log_event(format!("dialogue {description}"));
            self.frontend.play_dialogue(description);
            true
        } else {
            false
        }
    }

    /// Walks the player to `(x, y)` inside the current room. A blocked walk
    /// speaks the "can't get there" response; arriving turns the player to
    /// `facing`.
    pub fn move_joe(&mut self, facing: Option<Direction>, x: i16, y: i16, in_cutaway: bool) -> WalkOutcome {
        self.interrupts.cutaway_quit = false;
        self.interrupts.talk_quit = false;
        self.joe.walk = JoeWalkMode::Move;

        let start = (self.bob.x, self.bob.y);
        let outcome = match walk::plan_walk(&self.grid, start, (x, y), in_cutaway) {
            None => {
                log::debug!("walk: no route from {start:?} to ({x}, {y})");
                self.make_joe_speak(RESPONSE_CANT_GET_THERE, false);
                WalkOutcome::Blocked
            }
            Some(steps) if steps.is_empty() => WalkOutcome::Arrived,
            Some(steps) => {
                let first = steps[0];
                self.joe.facing = first.anim.facing;
                self.joe.scale = first.area.calc_scale(self.bob.y);
                self.bob.scale = self.joe.scale;
                self.joe_face();
                let (outcome, last_facing) = walk::animate_walk(
                    &mut self.bob,
                    &steps,
                    &self.grid,
                    &mut self.frontend,
                    &mut self.interrupts,
                );
                self.joe.scale = self.bob.scale;
                if let Some(last) = last_facing {
                    self.joe.facing = last;
                }
                if let WalkOutcome::Special { area, step, facing } = outcome {
                    self.handle_special_area(facing, area, step);
                }
                outcome
            }
        };

        self.bob.animating = false;
        if !matches!(outcome, WalkOutcome::Special { .. }) {
            if let Some(facing) = facing {
                self.joe.facing = facing;
            }
        }
        self.joe.prev_facing = self.joe.facing;
        self.joe_face();
        self.joe.walk = JoeWalkMode::Normal;
        self.log_event(format!("walk.{} {} {}", outcome.label(), self.bob.x, self.bob.y));
        outcome
    }

    pub(super) fn walk_pending(&mut self, walk: PendingWalk) {
        let outcome = self.move_joe(walk.facing, walk.x, walk.y, false);
        if outcome == WalkOutcome::Arrived {
            if self.pending_command.is_some() {
                self.joe.walk = JoeWalkMode::Execute;
            }
        } else {
            if let Some(command) = self.pending_command.take() {
                self.log_event(format!("command.cancel {:?}", command.verb));
            }
            self.new_room = 0;
        }
    }

    /// Runs the room's scripted reaction to stepping into a disabled area.
    pub fn handle_special_area(&mut self, facing: Direction, area: u16, walk_step: u16) {
        self.bob.animating = false;
        self.joe.facing = facing;
        self.joe_face();
        self.new_room = 0;
        self.entry_obj = 0;
        self.log_event(format!("walk.special {} {area}", self.current_room));

        let Some(rule) = self
            .config
            .special_area_rule(self.current_room, area, walk_step, &self.game_state)
            .cloned()
        else {
            log::debug!("walk: no reaction for room {} area {area}", self.current_room);
            return;
        };
        for action in &rule.actions {
            match action {
                SpecialAreaAction::Speak(response) => self.make_joe_speak(*response, false),
                SpecialAreaAction::Cutaway(name) => self.play_cutaway(name),
                SpecialAreaAction::Underwear => {
                    self.joe_use_underwear();
                    self.joe_face();
                }
            }
        }
        if let Some(set) = rule.then_set {
            self.set_game_state(set.slot, set.value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_match_case_insensitively() {
        assert!(has_extension("c6c.cut", ".CUT"));
        assert!(has_extension("TALK1.DOG", ".DOG"));
        assert!(!has_extension(".CUT", ".CUT"));
        assert!(!has_extension("The door is locked.", ".CUT"));
    }

    #[test]
    fn costume_codes_follow_dressing_mode() {
        assert_eq!(Costume::from_state(2), Costume::Dress);
        assert_eq!(Costume::from_state(7), Costume::Normal);
        assert_eq!(Costume::Underwear.code(), 1);
        assert_eq!(Costume::Dress.banks().0, "JOED_A.BBK");
    }
}
