use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use queen_formats::jas::has_room_sfx_table;
use queen_formats::GameVersion;
use serde::{Deserialize, Serialize};

use crate::state::{
    Verb, VAR_BYPASS_FLODA_RECEPTIONIST, VAR_BYPASS_ZOMBIES, VAR_ESCAPE_FROM_HOTEL_COUNT,
};

/// Release-dependent behaviour of the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub has_speech: bool,
    pub has_journal: bool,
    pub has_sfx_table: bool,
    pub is_demo: bool,
    pub is_interview: bool,
    pub starting_inventory: [i16; 4],
    pub dress_item: i16,
    pub clothes_item: i16,
    pub special_areas: Vec<SpecialAreaRule>,
    pub invalid_actions: Vec<InvalidActionRule>,
    #[serde(default)]
    pub songs: SongTable,
    /// Seed for description cycling and random responses.
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            has_speech: false,
            has_journal: true,
            has_sfx_table: true,
            is_demo: false,
            is_interview: false,
            starting_inventory: [1, 2, 3, 4],
            dress_item: 58,
            clothes_item: 59,
            special_areas: default_special_areas(),
            invalid_actions: default_invalid_actions(),
            songs: SongTable::default(),
            seed: 0x5155_4545,
        }
    }
}

impl EngineConfig {
    pub fn for_version(version: &GameVersion) -> Self {
        let mut config = EngineConfig {
            has_speech: version.is_talkie(),
            has_journal: !version.is_interview,
            has_sfx_table: has_room_sfx_table(version),
            is_demo: version.is_demo,
            is_interview: version.is_interview,
            ..EngineConfig::default()
        };
        if version.is_interview {
            config.starting_inventory = [1, 2, 0, 0];
            config.special_areas.clear();
        }
        config
    }

    pub fn with_songs(mut self, songs: SongTable) -> Self {
        self.songs = songs;
        self
    }

    /// First rule matching the room, area, walk step and game state.
    pub fn special_area_rule(
        &self,
        room: u16,
        area: u16,
        walk_step: u16,
        game_state: &[i16],
    ) -> Option<&SpecialAreaRule> {
        self.special_areas
            .iter()
            .find(|rule| rule.matches(room, area, walk_step, game_state))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCheck {
    pub slot: usize,
    pub value: i16,
}

impl StateCheck {
    pub fn holds(&self, game_state: &[i16]) -> bool {
        game_state.get(self.slot).copied() == Some(self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialAreaAction {
    Speak(u16),
    Cutaway(String),
    Underwear,
}

/// Scripted reaction to the player stepping into a disabled area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialAreaRule {
    pub room: u16,
    #[serde(default)]
    pub area: Option<u16>,
    #[serde(default)]
    pub walk_step: Option<u16>,
    #[serde(default)]
    pub when: Option<StateCheck>,
    pub actions: Vec<SpecialAreaAction>,
    #[serde(default)]
    pub then_set: Option<StateCheck>,
}

impl SpecialAreaRule {
    fn new(room: u16, actions: Vec<SpecialAreaAction>) -> Self {
        Self {
            room,
            area: None,
            walk_step: None,
            when: None,
            actions,
            then_set: None,
        }
    }

    fn in_area(mut self, area: u16) -> Self {
        self.area = Some(area);
        self
    }

    fn on_step(mut self, step: u16) -> Self {
        self.walk_step = Some(step);
        self
    }

    fn when(mut self, slot: usize, value: i16) -> Self {
        self.when = Some(StateCheck { slot, value });
        self
    }

    fn then_set(mut self, slot: usize, value: i16) -> Self {
        self.then_set = Some(StateCheck { slot, value });
        self
    }

    pub fn matches(&self, room: u16, area: u16, walk_step: u16, game_state: &[i16]) -> bool {
        self.room == room
            && self.area.map_or(true, |a| a == area)
            && self.walk_step.map_or(true, |s| s == walk_step)
            && self.when.map_or(true, |check| check.holds(game_state))
    }
}

fn cut(name: &str) -> SpecialAreaAction {
    SpecialAreaAction::Cutaway(name.to_string())
}

fn default_special_areas() -> Vec<SpecialAreaRule> {
    use SpecialAreaAction::{Speak, Underwear};
    vec![
        SpecialAreaRule::new(4, vec![Speak(16)]),
        SpecialAreaRule::new(6, vec![cut("C6C.CUT")]),
        SpecialAreaRule::new(14, vec![cut("C14B.CUT")]),
        SpecialAreaRule::new(16, vec![cut("C16A.CUT")]).in_area(3),
        SpecialAreaRule::new(17, vec![cut("C17A.CUT")]).on_step(4),
        SpecialAreaRule::new(17, vec![cut("C17B.CUT")]).on_step(2),
        SpecialAreaRule::new(22, vec![cut("C22A.CUT")]),
        SpecialAreaRule::new(26, vec![cut("C26B.CUT")]),
        SpecialAreaRule::new(30, vec![cut("C30A.CUT")]),
        SpecialAreaRule::new(32, vec![cut("C32C.CUT")]),
        SpecialAreaRule::new(50, vec![cut("C50D.CUT")])
            .in_area(6)
            .when(VAR_BYPASS_ZOMBIES, 0)
            .then_set(VAR_BYPASS_ZOMBIES, 1),
        SpecialAreaRule::new(50, vec![cut("C50H.CUT")])
            .in_area(6)
            .when(VAR_BYPASS_ZOMBIES, 1),
        SpecialAreaRule::new(53, vec![cut("C53B.CUT")]),
        SpecialAreaRule::new(55, vec![Speak(19)]),
        SpecialAreaRule::new(71, vec![Speak(21)]),
        SpecialAreaRule::new(73, vec![cut("C73A.CUT"), Underwear])
            .when(VAR_ESCAPE_FROM_HOTEL_COUNT, 0)
            .then_set(VAR_ESCAPE_FROM_HOTEL_COUNT, 1),
        SpecialAreaRule::new(73, vec![cut("C73B.CUT")])
            .when(VAR_ESCAPE_FROM_HOTEL_COUNT, 1)
            .then_set(VAR_ESCAPE_FROM_HOTEL_COUNT, 2),
        SpecialAreaRule::new(73, vec![cut("C73C.CUT")]).when(VAR_ESCAPE_FROM_HOTEL_COUNT, 2),
        SpecialAreaRule::new(62, vec![Speak(17)]).in_area(7),
        SpecialAreaRule::new(63, vec![cut("C101B.CUT")])
            .in_area(5)
            .when(187, 0),
        SpecialAreaRule::new(103, vec![cut("C103B.CUT")])
            .in_area(3)
            .when(VAR_BYPASS_FLODA_RECEPTIONIST, 0)
            .then_set(VAR_BYPASS_FLODA_RECEPTIONIST, 1),
        SpecialAreaRule::new(103, vec![cut("C103E.CUT")])
            .in_area(3)
            .when(VAR_BYPASS_FLODA_RECEPTIONIST, 1),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionTarget {
    Any,
    Item,
    Object,
    Person,
}

/// Player response spoken when a verb has no command-table entry. The
/// response is `response + random(0..=spread)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidActionRule {
    pub verb: Verb,
    pub target: ActionTarget,
    pub response: u16,
    #[serde(default)]
    pub spread: u16,
}

impl InvalidActionRule {
    const fn new(verb: Verb, target: ActionTarget, response: u16, spread: u16) -> Self {
        Self {
            verb,
            target,
            response,
            spread,
        }
    }
}

fn default_invalid_actions() -> Vec<InvalidActionRule> {
    use ActionTarget::{Any, Item, Person};
    vec![
        InvalidActionRule::new(Verb::Open, Any, 1, 0),
        InvalidActionRule::new(Verb::Close, Any, 2, 0),
        InvalidActionRule::new(Verb::Move, Person, 18, 0),
        InvalidActionRule::new(Verb::Move, Any, 3, 0),
        InvalidActionRule::new(Verb::PickUp, Item, 3, 0),
        InvalidActionRule::new(Verb::PickUp, Person, 20, 0),
        InvalidActionRule::new(Verb::PickUp, Any, 5, 2),
        InvalidActionRule::new(Verb::Give, Person, 27, 2),
        InvalidActionRule::new(Verb::Give, Any, 11, 0),
        InvalidActionRule::new(Verb::TalkTo, Any, 24, 2),
        InvalidActionRule::new(Verb::Use, Any, 2, 0),
    ]
}

/// How a song replaces whatever is already playing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SongOverride {
    #[default]
    Replace,
    AlterSettings,
    KeepPlaying,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongEntry {
    pub tunes: Vec<u16>,
    #[serde(default)]
    pub mode: SongOverride,
    /// Songs that are really a sound effect.
    #[serde(default)]
    pub sfx: u16,
}

/// Song number to tune mapping for one release. Songs without an entry
/// are passed to the music collaborator unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongTable {
    pub songs: BTreeMap<u16, SongEntry>,
}

impl SongTable {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading song table {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("parsing song table {}", path.display()))
    }

    pub fn get(&self, song: u16) -> Option<&SongEntry> {
        self.songs.get(&song)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_flags_follow_release() {
        let talkie = EngineConfig::for_version(&GameVersion::from_id("CEM10").unwrap());
        assert!(talkie.has_speech && talkie.has_sfx_table && !talkie.is_demo);

        let demo = EngineConfig::for_version(&GameVersion::from_id("PE100").unwrap());
        assert!(demo.is_demo && !demo.has_speech && !demo.has_sfx_table);

        let interview = EngineConfig::for_version(&GameVersion::from_id("PEint").unwrap());
        assert!(interview.is_interview && !interview.has_journal);
        assert_eq!(interview.starting_inventory, [1, 2, 0, 0]);
        assert!(interview.special_areas.is_empty());
    }

    #[test]
    fn special_area_rules_are_state_gated() {
        let config = EngineConfig::default();
        let mut game_state = vec![0i16; 211];
        let rule = config.special_area_rule(50, 6, 1, &game_state).unwrap();
        assert_eq!(rule.actions, vec![cut("C50D.CUT")]);
        game_state[VAR_BYPASS_ZOMBIES] = 1;
        let rule = config.special_area_rule(50, 6, 1, &game_state).unwrap();
        assert_eq!(rule.actions, vec![cut("C50H.CUT")]);
        assert!(config.special_area_rule(50, 2, 1, &game_state).is_none());
        assert!(config.special_area_rule(17, 1, 3, &game_state).is_none());
        assert_eq!(
            config.special_area_rule(17, 1, 2, &game_state).unwrap().actions,
            vec![cut("C17B.CUT")]
        );
    }

    #[test]
    fn song_table_parses_from_json() {
        let json = r#"{ "songs": { "5": { "tunes": [12, 13], "mode": "KeepPlaying" }, "9": { "tunes": [], "sfx": 40 } } }"#;
        let table: SongTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.get(5).unwrap().tunes, vec![12, 13]);
        assert_eq!(table.get(5).unwrap().mode, SongOverride::KeepPlaying);
        assert_eq!(table.get(9).unwrap().sfx, 40);
        assert!(table.get(1).is_none());
    }
}
