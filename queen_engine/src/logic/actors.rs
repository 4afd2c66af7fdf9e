use queen_formats::ActorData;
use serde::Serialize;

use super::Logic;
use crate::frontend::Frontend;

/// First sprite frame slot used by persons; the player's frames come first.
const PERSON_FRAME_BASE: u16 = 29 + 38;

/// A person object of the current room bound to the actor row that
/// currently represents it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    /// Room-relative object number.
    pub noun: u16,
    pub actor_index: u16,
    pub actor: ActorData,
    pub name: String,
    pub anim: Option<String>,
    pub bob_frame: u16,
}

impl<F: Frontend> Logic<F> {
    /// Counts person objects from the start of `room` up to and including
    /// `object`; the result is the sprite slot of that person.
    pub fn find_person_number(&self, object: u16, room: u16) -> u16 {
        let first = self.room_base(room) + 1;
        (first..=object)
            .filter_map(|index| self.objects.get(index as usize))
            .filter(|data| data.image_kind().is_person())
            .count() as u16
    }

    /// Actor row currently representing person `noun` of the current room:
    /// the first row, by index, in this room whose game-state condition holds
    /// (rows with a negative slot have none) and whose sprite slot (or name,
    /// when given) matches.
    pub fn find_actor(&self, noun: u16, name: Option<&str>) -> Option<(u16, &ActorData)> {
        let object = self.current_room_base() + noun;
        let data = self.objects.get(object as usize)?;
        if !data.image_kind().is_person() {
            log::warn!("logic: object {object} is not a person");
            return None;
        }
        let bob_num = self.find_person_number(object, self.current_room);
        if bob_num == 0 {
            return None;
        }
        self.actors
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, actor)| {
                actor.room == self.current_room as i16
                    && (actor.gs_slot < 0
                        || self.game_state(actor.gs_slot as usize) == actor.gs_value)
                    && (actor.bob_num == bob_num as i16
                        || name.is_some_and(|name| self.text.actor_name(actor.name) == name))
            })
            .map(|(index, actor)| (index as u16, actor))
    }

    /// Resolves person `noun` and, when asked, loads the actor's own sprite
    /// bank. Actors without a bank file draw from the room's object bank.
    pub fn init_person(&mut self, noun: u16, name: Option<&str>, load_bank: bool) -> Option<Person> {
        let (actor_index, actor) = self.find_actor(noun, name).map(|(i, a)| (i, *a))?;
        let person = Person {
            noun,
            actor_index,
            actor,
            name: self.text.actor_name(actor.name).to_string(),
            anim: (actor.anim != 0).then(|| self.text.actor_anim(actor.anim).to_string()),
            bob_frame: PERSON_FRAME_BASE + actor.bob_num.max(0) as u16,
        };
        if load_bank && actor.file != 0 {
            let file = self.text.actor_file(actor.file).to_string();
            self.frontend.load_bank(&file, actor.bank_num);
        }
        self.log_event(format!("person.init {} {}", noun, person.name));
        Some(person)
    }

    /// Instantiates every visible person object of the current room.
    pub(super) fn setup_persons(&mut self) {
        self.persons.clear();
        let base = self.current_room_base();
        for noun in 1..=self.grid.obj_max(self.current_room) {
            let visible_person = self
                .objects
                .get((base + noun) as usize)
                .is_some_and(|data| data.name > 0 && data.image_kind().is_person());
            if !visible_person {
                continue;
            }
            if let Some(person) = self.init_person(noun, None, true) {
                self.persons.push(person);
            }
        }
    }
}
