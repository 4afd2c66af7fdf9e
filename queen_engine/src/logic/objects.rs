use queen_formats::{ObjectImage, WalkOffData};
use rand::Rng;

use super::Logic;
use crate::frontend::Frontend;

impl<F: Frontend> Logic<F> {
    fn graphic_frame_count(&self, image: i16) -> i32 {
        match ObjectImage::from_code(image) {
            ObjectImage::Graphic { index, .. } => self
                .graphics
                .get(index as usize)
                .map_or(1, |graphic| graphic.frame_count()),
            _ => 1,
        }
    }

    /// Copies object `dummy` over object `real`. When the dummy's graphic
    /// has more frames the two records are swapped instead, so the longer
    /// animation is never lost. The real object ends up visible; a hidden
    /// dummy stays hidden.
    pub fn object_copy(&mut self, dummy: u16, real: u16) {
        let (Some(&dummy_obj), Some(&real_obj)) = (
            self.objects.get(dummy as usize),
            self.objects.get(real as usize),
        ) else {
            log::warn!("logic: object copy {dummy} -> {real} out of range");
            return;
        };
        let dummy_hidden = dummy_obj.name < 0;
        let (frames_real, frames_dummy) = if real_obj.image > 0 {
            (
                self.graphic_frame_count(real_obj.image),
                self.graphic_frame_count(dummy_obj.image),
            )
        } else {
            (1, 1)
        };

        self.objects[real as usize] = dummy_obj;
        if frames_dummy > frames_real {
            self.objects[dummy as usize] = real_obj;
        }
        let real_name = &mut self.objects[real as usize].name;
        *real_name = real_name.abs();
        if dummy_hidden {
            let dummy_name = &mut self.objects[dummy as usize].name;
            *dummy_name = -dummy_name.abs();
        }

        if let Some(walk_off) = self
            .walk_offs
            .iter_mut()
            .skip(1)
            .find(|walk_off| walk_off.entry_obj == dummy as i16)
        {
            walk_off.entry_obj = real as i16;
        }
        self.log_event(format!("object.copy {dummy} {real}"));
    }

    /// Walk-off point attached to `object`, if any.
    pub fn walk_off_for(&self, object: u16) -> Option<WalkOffData> {
        self.walk_offs
            .iter()
            .skip(1)
            .find(|walk_off| walk_off.entry_obj == object as i16)
            .copied()
    }

    /// Advances the description series at `index` and returns the
    /// description to show.
    pub fn next_object_description(&mut self, index: usize, first: u16) -> u16 {
        let Some(desc) = self.object_descriptions.get(index).copied() else {
            return first;
        };
        let last = desc.last_description.max(first);
        let diff = last - first;
        let random = |rng: &mut rand::rngs::StdRng, seen: u16| {
            if diff == 0 {
                return first;
            }
            loop {
                let pick = first + rng.gen_range(0..=diff);
                if pick != seen {
                    return pick;
                }
            }
        };
        let seen = desc.last_seen_number;
        let next = match desc.kind {
            0 if seen == 0 => first,
            0 | 1 => random(&mut self.rng, seen),
            2 if seen < first || seen >= last => first,
            2 => seen + 1,
            3 if seen < first => first,
            3 if seen < last => seen + 1,
            3 => last,
            kind => {
                log::warn!("logic: unknown description series kind {kind}");
                first
            }
        };
        self.object_descriptions[index].last_seen_number = next;
        next
    }

    /// Speaks the description of an object (positive) or item (negative),
    /// cycling its description series when it has one.
    pub fn look_at_selected(&mut self, subject: i16) {
        let first = if subject < 0 {
            match self.items.get(subject.unsigned_abs() as usize) {
                Some(item) => item.description,
                None => return,
            }
        } else {
            match self.objects.get(subject as usize) {
                Some(object) if object.name > 0 => object.description,
                _ => return,
            }
        };
        let series = self
            .object_descriptions
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, desc)| desc.object == subject)
            .map(|(index, _)| index);
        let description = match series {
            Some(index) => self.next_object_description(index, first),
            None => first,
        };
        self.speak_description(description);
        self.joe_face();
    }
}
