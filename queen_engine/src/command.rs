//! Verb/noun/noun matching against the command table and the satellite
//! rows each entry drives.

use queen_formats::{CmdArea, CmdGameState, CmdInventory, CmdListData, CmdObject, CommandTables};
use serde::Serialize;

use crate::state::Verb;

/// Every satellite row attached to one command entry, restricted to the
/// tables the entry enables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandEffectSet {
    pub id: u16,
    pub entry: CmdListData,
    pub areas: Vec<CmdArea>,
    pub objects: Vec<CmdObject>,
    pub items: Vec<CmdInventory>,
    pub game_state: Vec<CmdGameState>,
}

/// Outcome of checking one entry's game-state conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionCheck {
    /// All conditions hold. `speak` is the speak value of the last
    /// assignment row, 0 when there is none.
    Passed {
        assignments: Vec<CmdGameState>,
        speak: u16,
    },
    /// A condition failed; `speak` is the failing row's speak value.
    Failed { speak: u16 },
}

/// Result of cascading through every entry matching a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No entry matches the triple.
    Unresolved,
    Execute {
        id: u16,
        assignments: Vec<CmdGameState>,
        speak: u16,
    },
    /// The last matching entry failed its conditions.
    Failed { id: u16, speak: Option<u16> },
}

#[derive(Debug, Clone, Default)]
pub struct CommandResolver {
    tables: CommandTables,
}

impl CommandResolver {
    pub fn new(tables: CommandTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &CommandTables {
        &self.tables
    }

    pub fn entry(&self, id: u16) -> Option<&CmdListData> {
        if id == 0 {
            return None;
        }
        self.tables.list.get(id as usize)
    }

    /// Ids of all matching entries, in table order.
    pub fn matching(&self, verb: Verb, noun1: i16, noun2: i16) -> impl Iterator<Item = u16> + '_ {
        let verb = verb.code();
        self.tables
            .list
            .iter()
            .enumerate()
            .skip(1)
            .filter(move |(_, entry)| entry.matches(verb, noun1, noun2))
            .map(|(id, _)| id as u16)
    }

    /// First entry matching the triple, with its effects. Later entries never
    /// override an earlier match, even when more specific.
    pub fn resolve(&self, verb: Verb, noun1: i16, noun2: i16) -> Option<CommandEffectSet> {
        let id = self.matching(verb, noun1, noun2).next()?;
        self.effects(id)
    }

    pub fn effects(&self, id: u16) -> Option<CommandEffectSet> {
        let entry = *self.entry(id)?;
        let id_code = id as i16;
        let rows = |enabled: bool| enabled.then_some(id_code);
        Some(CommandEffectSet {
            id,
            entry,
            areas: collect_rows(&self.tables.areas, rows(entry.set_areas.is_set()), |row| row.id),
            objects: collect_rows(&self.tables.objects, rows(entry.set_objects.is_set()), |row| row.id),
            items: collect_rows(&self.tables.inventory, rows(entry.set_items.is_set()), |row| row.id),
            game_state: collect_rows(&self.tables.game_state, rows(entry.set_conditions.is_set()), |row| {
                row.id
            }),
        })
    }

    /// Tests the condition rows of entry `id` against `game_state`. Rows are
    /// visited in table order and the first failing condition stops the scan.
    pub fn test_conditions(&self, id: u16, game_state: &[i16]) -> ConditionCheck {
        let mut assignments = Vec::new();
        for row in self.tables.game_state.iter().skip(1) {
            if row.id != id as i16 {
                continue;
            }
            if row.is_condition() {
                let current = game_state.get(row.game_state_slot as usize).copied();
                if current != Some(row.game_state_value) {
                    log::debug!(
                        "command {id}: state[{}] is {:?}, wanted {}",
                        row.game_state_slot,
                        current,
                        row.game_state_value
                    );
                    return ConditionCheck::Failed {
                        speak: row.speak_value,
                    };
                }
            } else {
                assignments.push(*row);
            }
        }
        let speak = assignments.last().map_or(0, |row| row.speak_value);
        ConditionCheck::Passed { assignments, speak }
    }

    /// Walks the matching entries in order until one has no conditions or
    /// passes them. Only a failure of the last entry is reported.
    pub fn select(&self, verb: Verb, noun1: i16, noun2: i16, game_state: &[i16]) -> Resolution {
        let ids: Vec<u16> = self.matching(verb, noun1, noun2).collect();
        let Some(&last) = ids.last() else {
            return Resolution::Unresolved;
        };
        for &id in &ids {
            let Some(entry) = self.entry(id) else {
                continue;
            };
            if !entry.set_conditions.is_set() {
                return Resolution::Execute {
                    id,
                    assignments: Vec::new(),
                    speak: 0,
                };
            }
            match self.test_conditions(id, game_state) {
                ConditionCheck::Passed { assignments, speak } => {
                    return Resolution::Execute {
                        id,
                        assignments,
                        speak,
                    };
                }
                ConditionCheck::Failed { speak } if id == last => {
                    return Resolution::Failed {
                        id,
                        speak: (speak > 0).then_some(speak),
                    };
                }
                ConditionCheck::Failed { .. } => {}
            }
        }
        Resolution::Failed {
            id: last,
            speak: None,
        }
    }
}

fn collect_rows<T: Copy>(table: &[T], id: Option<i16>, row_id: impl Fn(&T) -> i16) -> Vec<T> {
    match id {
        Some(id) => table
            .iter()
            .skip(1)
            .filter(|row| row_id(row) == id)
            .copied()
            .collect(),
        None => Vec::new(),
    }
}
