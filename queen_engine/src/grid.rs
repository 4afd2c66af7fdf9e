use std::io::{self, Read, Write};

use queen_formats::{Area, GridData, ObjectData, Record, Rect};
use serde::Serialize;

use crate::state::Verb;

pub const MAX_ZONES: usize = 32;
/// Areas per room, slot 0 included.
pub const MAX_AREAS: usize = 11;
/// Height of the room viewport; the verb panel sits below it.
pub const ROOM_ZONE_HEIGHT: i16 = 150;

/// Authored box for this object overlaps its neighbour in room 41.
const ROOM_41: u16 = 41;
const ROOM_41_OBJECT: u16 = 303;
const ROOM_41_OBJECT_BOX: Rect = Rect::new(222, 51, 250, 81);

const PANEL_VERBS: [Verb; 15] = [
    Verb::None,
    Verb::Open,
    Verb::Close,
    Verb::Move,
    Verb::Give,
    Verb::LookAt,
    Verb::PickUp,
    Verb::TalkTo,
    Verb::Use,
    Verb::ScrollUp,
    Verb::ScrollDown,
    Verb::Inv1,
    Verb::Inv2,
    Verb::Inv3,
    Verb::Inv4,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridScreen {
    Room,
    Panel,
}

impl GridScreen {
    fn index(self) -> usize {
        match self {
            GridScreen::Room => 0,
            GridScreen::Panel => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ZoneSlot {
    pub valid: bool,
    pub rect: Rect,
}

/// Hit-test zones for the current room and the panel, plus the walkable
/// areas of every room.
#[derive(Debug, Clone)]
pub struct Grid {
    zones: [[ZoneSlot; MAX_ZONES]; 2],
    obj_max: Vec<i16>,
    area_max: Vec<i16>,
    areas: Vec<Vec<Area>>,
    object_boxes: Vec<Rect>,
    current_room: u16,
    room_base: u16,
}

impl Grid {
    pub fn new(data: GridData) -> Self {
        let mut grid = Self {
            zones: [[ZoneSlot::default(); MAX_ZONES]; 2],
            obj_max: data.obj_max,
            area_max: data.area_max,
            areas: data.areas,
            object_boxes: data.object_boxes,
            current_room: 0,
            room_base: 0,
        };
        grid.setup_panel();
        grid
    }

    pub fn current_room(&self) -> u16 {
        self.current_room
    }

    pub fn num_rooms(&self) -> usize {
        self.areas.len().saturating_sub(1)
    }

    pub fn obj_max(&self, room: u16) -> u16 {
        self.obj_max.get(room as usize).copied().unwrap_or(0).max(0) as u16
    }

    pub fn area_max(&self, room: u16) -> u16 {
        self.area_max.get(room as usize).copied().unwrap_or(0).max(0) as u16
    }

    pub fn area(&self, room: u16, index: u16) -> Option<&Area> {
        self.areas.get(room as usize)?.get(index as usize)
    }

    pub fn area_mut(&mut self, room: u16, index: u16) -> Option<&mut Area> {
        self.areas.get_mut(room as usize)?.get_mut(index as usize)
    }

    /// Areas of `room`, slot 0 being the sentinel.
    pub fn room_areas(&self, room: u16) -> &[Area] {
        self.areas
            .get(room as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn zone(&self, screen: GridScreen, zone: u16) -> Option<&ZoneSlot> {
        self.zones[screen.index()].get(zone as usize)
    }

    pub fn clear(&mut self, screen: GridScreen) {
        for slot in self.zones[screen.index()].iter_mut() {
            *slot = ZoneSlot::default();
        }
    }

    pub fn set_zone(&mut self, screen: GridScreen, zone: u16, rect: Rect) {
        if let Some(slot) = self.zones[screen.index()].get_mut(zone as usize) {
            *slot = ZoneSlot { valid: true, rect };
        }
    }

    pub fn setup_panel(&mut self) {
        for i in 0..8i16 {
            let x = i * 20;
            self.set_zone(GridScreen::Panel, (i + 1) as u16, Rect::new(x, 10, x + 19, 49));
        }
        self.set_zone(GridScreen::Panel, 9, Rect::new(160, 10, 179, 29));
        self.set_zone(GridScreen::Panel, 10, Rect::new(160, 30, 179, 49));
        self.set_zone(GridScreen::Panel, 11, Rect::new(180, 10, 213, 49));
        self.set_zone(GridScreen::Panel, 12, Rect::new(214, 10, 249, 49));
        self.set_zone(GridScreen::Panel, 13, Rect::new(250, 10, 284, 49));
        self.set_zone(GridScreen::Panel, 14, Rect::new(285, 10, 320, 49));
    }

    /// Rebuilds the room zones: one per object of the room (deleted objects
    /// keep their index but get no zone), then one per area.
    pub fn setup_new_room(&mut self, room: u16, room_base: u16, objects: &[ObjectData]) {
        self.clear(GridScreen::Room);
        self.current_room = room;
        self.room_base = room_base;

        let max_obj = self.obj_max(room);
        for zone in 1..=max_obj {
            let object = room_base + zone;
            let deleted = objects
                .get(object as usize)
                .map_or(true, ObjectData::is_deleted);
            if deleted {
                continue;
            }
            let rect = if room == ROOM_41 && object == ROOM_41_OBJECT {
                ROOM_41_OBJECT_BOX
            } else {
                self.object_boxes
                    .get(object as usize)
                    .copied()
                    .unwrap_or_default()
            };
            self.set_zone(GridScreen::Room, zone, rect);
        }

        for index in 1..=self.area_max(room) {
            if let Some(rect) = self.area(room, index).map(|area| area.rect) {
                self.set_zone(GridScreen::Room, max_obj + index, rect);
            }
        }
        log::debug!(
            "grid: room {room} has {max_obj} object zones and {} area zones",
            self.area_max(room)
        );
    }

    /// First valid zone containing the point, or 0.
    pub fn find_zone_for_pos(&self, screen: GridScreen, x: i16, y: i16) -> u16 {
        let y = match screen {
            GridScreen::Panel => y.saturating_sub(ROOM_ZONE_HEIGHT),
            GridScreen::Room => y,
        };
        self.zones[screen.index()]
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, slot)| slot.valid && slot.rect.contains(x, y))
            .map_or(0, |(index, _)| index as u16)
    }

    /// Area number under the point, 0 when over an object or nothing.
    pub fn find_area_for_pos(&self, x: i16, y: i16) -> u16 {
        let zone = self.find_zone_for_pos(GridScreen::Room, x, y);
        let max_obj = self.obj_max(self.current_room);
        if zone <= max_obj {
            0
        } else {
            zone - max_obj
        }
    }

    pub fn find_object_under_cursor(&self, x: i16, y: i16, scroll: i16) -> u16 {
        if y < ROOM_ZONE_HEIGHT {
            self.find_zone_for_pos(GridScreen::Room, x.saturating_add(scroll), y)
        } else {
            0
        }
    }

    /// Room-relative object number for a zone. Area zones resolve to the
    /// area's linked object.
    pub fn find_object_number(&self, zone: u16) -> u16 {
        let max_obj = self.obj_max(self.current_room);
        if zone <= max_obj {
            return zone;
        }
        let linked = self
            .area(self.current_room, zone - max_obj)
            .map_or(0, |area| area.object);
        if linked == 0 {
            0
        } else {
            linked.saturating_sub(self.room_base)
        }
    }

    pub fn find_verb_under_cursor(&self, x: i16, y: i16) -> Verb {
        let zone = self.find_zone_for_pos(GridScreen::Panel, x, y) as usize;
        PANEL_VERBS.get(zone).copied().unwrap_or(Verb::None)
    }

    pub fn find_scale(&self, x: i16, y: i16) -> u16 {
        match self.find_area_for_pos(x, y) {
            0 => 100,
            area => self
                .area(self.current_room, area)
                .map_or(100, |area| area.calc_scale(y)),
        }
    }

    pub fn areas(&self) -> &[Vec<Area>] {
        &self.areas
    }

    pub fn restore_areas(&mut self, areas: Vec<Vec<Area>>) {
        self.areas = areas;
    }
}

/// Bytes [`write_area_state`] produces for `areas`.
pub fn area_state_len(areas: &[Vec<Area>]) -> usize {
    areas
        .iter()
        .skip(1)
        .map(|room| room.len().saturating_sub(1) * Area::SIZE)
        .sum()
}

/// Writes every room's areas in room then area order.
pub fn write_area_state<W: Write + ?Sized>(areas: &[Vec<Area>], writer: &mut W) -> io::Result<()> {
    for room in areas.iter().skip(1) {
        for area in room.iter().skip(1) {
            area.write_to(writer)?;
        }
    }
    Ok(())
}

/// Reads areas shaped like `template`, without applying them.
pub fn read_area_state<R: Read + ?Sized>(
    template: &[Vec<Area>],
    reader: &mut R,
) -> io::Result<Vec<Vec<Area>>> {
    let mut areas = Vec::with_capacity(template.len());
    for (index, room) in template.iter().enumerate() {
        if index == 0 {
            areas.push(room.clone());
            continue;
        }
        let mut loaded = Vec::with_capacity(room.len());
        loaded.push(Area::default());
        for _ in 1..room.len() {
            loaded.push(Area::read_from(reader)?);
        }
        areas.push(loaded);
    }
    Ok(areas)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(rect: Rect, object: u16) -> Area {
        Area {
            map_neighbors: 1,
            rect,
            bottom_scale_factor: 50,
            top_scale_factor: 100,
            object,
        }
    }

    /// Room 1: objects 1..=2 (second one deleted), two overlapping areas.
    fn fixture() -> (Grid, Vec<ObjectData>) {
        let data = GridData {
            obj_max: vec![0, 2],
            area_max: vec![0, 2],
            areas: vec![
                Vec::new(),
                vec![
                    Area::default(),
                    area(Rect::new(0, 100, 160, 149), 0),
                    area(Rect::new(100, 90, 319, 149), 1),
                ],
            ],
            object_boxes: vec![
                Rect::default(),
                Rect::new(10, 10, 40, 40),
                Rect::new(50, 10, 80, 40),
            ],
        };
        let objects = vec![
            ObjectData::default(),
            ObjectData { name: 1, room: 1, ..ObjectData::default() },
            ObjectData { name: 0, room: 1, ..ObjectData::default() },
        ];
        let mut grid = Grid::new(data);
        grid.setup_new_room(1, 0, &objects);
        (grid, objects)
    }

    #[test]
    fn deleted_objects_keep_their_zone_index() {
        let (grid, _) = fixture();
        assert!(grid.zone(GridScreen::Room, 1).unwrap().valid);
        assert!(!grid.zone(GridScreen::Room, 2).unwrap().valid);
        assert_eq!(grid.find_zone_for_pos(GridScreen::Room, 60, 20), 0);
        assert_eq!(grid.find_zone_for_pos(GridScreen::Room, 20, 20), 1);
        // areas come after both object slots
        assert_eq!(grid.find_zone_for_pos(GridScreen::Room, 20, 120), 3);
        assert_eq!(grid.find_zone_for_pos(GridScreen::Room, 300, 120), 4);
    }

    #[test]
    fn extreme_coordinates_miss_every_zone() {
        let (grid, _) = fixture();
        assert_eq!(grid.find_zone_for_pos(GridScreen::Panel, 10, i16::MIN), 0);
        assert_eq!(grid.find_object_under_cursor(i16::MAX, 20, 40), 0);
        assert_eq!(grid.find_object_under_cursor(20, 20, 0), 1);
    }

    #[test]
    fn overlap_resolves_to_the_lower_zone() {
        let (grid, _) = fixture();
        assert_eq!(grid.find_zone_for_pos(GridScreen::Room, 120, 120), 3);
        assert_eq!(grid.find_area_for_pos(120, 120), 1);
        assert_eq!(grid.find_area_for_pos(200, 95), 2);
        assert_eq!(grid.find_area_for_pos(20, 20), 0);
        assert_eq!(grid.find_area_for_pos(5, 5), 0);
    }

    #[test]
    fn area_zones_map_to_linked_objects() {
        let (grid, _) = fixture();
        assert_eq!(grid.find_object_number(1), 1);
        assert_eq!(grid.find_object_number(3), 0);
        assert_eq!(grid.find_object_number(4), 1);
    }

    #[test]
    fn panel_layout_and_verbs() {
        let (grid, _) = fixture();
        assert_eq!(grid.find_verb_under_cursor(5, 160), Verb::Open);
        assert_eq!(grid.find_verb_under_cursor(150, 199), Verb::Use);
        assert_eq!(grid.find_verb_under_cursor(170, 165), Verb::ScrollUp);
        assert_eq!(grid.find_verb_under_cursor(170, 185), Verb::ScrollDown);
        assert_eq!(grid.find_verb_under_cursor(300, 170), Verb::Inv4);
        assert_eq!(grid.find_verb_under_cursor(100, 155), Verb::None);
        assert_eq!(grid.find_object_under_cursor(20, 160, 0), 0);
        assert_eq!(grid.find_object_under_cursor(15, 20, 5), 1);
    }

    #[test]
    fn scale_is_unscaled_outside_areas() {
        let (grid, _) = fixture();
        assert_eq!(grid.find_scale(5, 5), 100);
        assert_eq!(grid.find_scale(20, 100), 50);
    }

    #[test]
    fn room_41_box_correction() {
        let mut objects = vec![ObjectData::default(); 304];
        objects[303] = ObjectData { name: 7, room: 41, ..ObjectData::default() };
        let mut obj_max = vec![0; 42];
        obj_max[41] = 1;
        let mut areas = vec![Vec::new(); 42];
        areas.iter_mut().skip(1).for_each(|room| room.push(Area::default()));
        let data = GridData {
            obj_max,
            area_max: vec![0; 42],
            areas,
            object_boxes: vec![Rect::new(0, 0, 5, 5); 304],
        };
        let mut grid = Grid::new(data);
        grid.setup_new_room(41, 302, &objects);
        assert_eq!(grid.zone(GridScreen::Room, 1).unwrap().rect, ROOM_41_OBJECT_BOX);
    }

    #[test]
    fn area_state_round_trips() {
        let (mut grid, _) = fixture();
        let mut bytes = Vec::new();
        write_area_state(grid.areas(), &mut bytes).unwrap();
        assert_eq!(bytes.len(), 2 * Area::SIZE);
        assert_eq!(area_state_len(grid.areas()), bytes.len());
        let before = grid.areas().to_vec();
        grid.area_mut(1, 2).unwrap().map_neighbors = -1;
        let restored = read_area_state(grid.areas(), &mut bytes.as_slice()).unwrap();
        assert_eq!(restored, before);
        grid.restore_areas(restored);
        assert_eq!(grid.area(1, 2).unwrap().map_neighbors, 1);
    }
}
