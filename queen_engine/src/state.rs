use serde::{Deserialize, Serialize};

/// Persistent world flags and counters.
pub const GAME_STATE_COUNT: usize = 211;
pub const TALK_SELECTED_COUNT: usize = 86;

/// Slot holding the player's costume (0 clothes, 1 underwear, 2 dress).
pub const VAR_JOE_DRESSING_MODE: usize = 19;
pub const VAR_BYPASS_ZOMBIES: usize = 21;
pub const VAR_BYPASS_FLODA_RECEPTIONIST: usize = 35;
pub const VAR_ESCAPE_FROM_HOTEL_COUNT: usize = 93;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Verb {
    None,
    Open,
    Close,
    Move,
    Give,
    Use,
    PickUp,
    TalkTo,
    LookAt,
    WalkTo,
    ScrollUp,
    ScrollDown,
    Inv1,
    Inv2,
    Inv3,
    Inv4,
    UseJournal,
    SkipText,
}

impl Verb {
    pub fn code(self) -> i16 {
        match self {
            Verb::None => 0,
            Verb::Open => 1,
            Verb::Close => 2,
            Verb::Move => 3,
            Verb::Give => 5,
            Verb::Use => 6,
            Verb::PickUp => 7,
            Verb::TalkTo => 8,
            Verb::LookAt => 9,
            Verb::WalkTo => 10,
            Verb::ScrollUp => 11,
            Verb::ScrollDown => 12,
            Verb::Inv1 => 13,
            Verb::Inv2 => 14,
            Verb::Inv3 => 15,
            Verb::Inv4 => 16,
            Verb::UseJournal => 20,
            Verb::SkipText => 101,
        }
    }

    pub fn from_code(code: i16) -> Option<Verb> {
        Some(match code {
            0 => Verb::None,
            1 => Verb::Open,
            2 => Verb::Close,
            3 => Verb::Move,
            5 => Verb::Give,
            6 => Verb::Use,
            7 => Verb::PickUp,
            8 => Verb::TalkTo,
            9 => Verb::LookAt,
            10 => Verb::WalkTo,
            11 => Verb::ScrollUp,
            12 => Verb::ScrollDown,
            13 => Verb::Inv1,
            14 => Verb::Inv2,
            15 => Verb::Inv3,
            16 => Verb::Inv4,
            20 => Verb::UseJournal,
            101 => Verb::SkipText,
            _ => return None,
        })
    }

    /// Verbs shown as panel buttons.
    pub fn is_panel_command(self) -> bool {
        matches!(
            self,
            Verb::Open
                | Verb::Close
                | Verb::Move
                | Verb::Give
                | Verb::Use
                | Verb::PickUp
                | Verb::TalkTo
                | Verb::LookAt
        )
    }

    pub fn inventory_slot(self) -> Option<usize> {
        match self {
            Verb::Inv1 => Some(0),
            Verb::Inv2 => Some(1),
            Verb::Inv3 => Some(2),
            Verb::Inv4 => Some(3),
            _ => None,
        }
    }

    pub fn is_scroll(self) -> bool {
        matches!(self, Verb::ScrollUp | Verb::ScrollDown)
    }

    /// Verbs that take an inventory item first and a target second.
    pub fn is_two_level(self) -> bool {
        matches!(self, Verb::Use | Verb::Give)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Front,
    Back,
}

impl Direction {
    pub fn code(self) -> u16 {
        match self {
            Direction::Left => 1,
            Direction::Right => 2,
            Direction::Front => 3,
            Direction::Back => 4,
        }
    }

    pub fn from_code(code: u16) -> Option<Direction> {
        match code {
            1 => Some(Direction::Left),
            2 => Some(Direction::Right),
            3 => Some(Direction::Front),
            4 => Some(Direction::Back),
            _ => None,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Front => Direction::Back,
            Direction::Back => Direction::Front,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grab {
    None,
    Down,
    Up,
    Mid,
}

const STATE_DIRECTIONS: [Direction; 4] = [
    Direction::Back,
    Direction::Right,
    Direction::Left,
    Direction::Front,
];

const STATE_VERBS: [Verb; 16] = [
    Verb::None,
    Verb::Open,
    Verb::None,
    Verb::Close,
    Verb::None,
    Verb::None,
    Verb::LookAt,
    Verb::Move,
    Verb::Give,
    Verb::TalkTo,
    Verb::None,
    Verb::None,
    Verb::Use,
    Verb::None,
    Verb::PickUp,
    Verb::None,
];

/// Accessors over the packed `ObjectData::state` / `ItemData::state` word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectState(pub u16);

impl ObjectState {
    pub fn direction(self) -> Direction {
        STATE_DIRECTIONS[((self.0 >> 2) & 3) as usize]
    }

    pub fn grab(self) -> Grab {
        match self.0 & 3 {
            0 => Grab::None,
            1 => Grab::Down,
            2 => Grab::Up,
            _ => Grab::Mid,
        }
    }

    pub fn default_verb(self) -> Verb {
        STATE_VERBS[((self.0 >> 4) & 0xF) as usize]
    }

    pub fn is_on(self) -> bool {
        self.0 & (1 << 8) != 0
    }

    pub fn can_talk(self) -> bool {
        self.0 & (1 << 9) != 0
    }

    pub fn is_use_on(self) -> bool {
        self.0 & (1 << 10) != 0
    }

    pub fn with_on(self, on: bool) -> ObjectState {
        if on {
            ObjectState(self.0 | (1 << 8))
        } else {
            ObjectState(self.0 & !(1 << 8))
        }
    }

    pub fn with_default_verb(self, verb: Verb) -> ObjectState {
        let nibble = STATE_VERBS
            .iter()
            .position(|candidate| *candidate == verb)
            .unwrap_or(0) as u16;
        ObjectState((self.0 & !0xF0) | (nibble << 4))
    }
}

/// How the player's walk request should be followed up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JoeWalkMode {
    Normal,
    Move,
    Execute,
    Speak,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verb_codes_round_trip() {
        for code in -1..=120 {
            if let Some(verb) = Verb::from_code(code) {
                assert_eq!(verb.code(), code);
            }
        }
        assert_eq!(Verb::from_code(4), None);
        assert_eq!(Verb::Inv3.inventory_slot(), Some(2));
    }

    #[test]
    fn state_word_fields() {
        // direction bits 0b01 -> right, grab up, default verb nibble 9 -> talk to
        let state = ObjectState((9 << 4) | (1 << 2) | 2 | (1 << 9));
        assert_eq!(state.direction(), Direction::Right);
        assert_eq!(state.grab(), Grab::Up);
        assert_eq!(state.default_verb(), Verb::TalkTo);
        assert!(state.can_talk());
        assert!(!state.is_on());
        assert!(state.with_on(true).is_on());
        assert_eq!(state.with_default_verb(Verb::PickUp).default_verb(), Verb::PickUp);
        assert_eq!(ObjectState(0).direction(), Direction::Back);
    }
}
