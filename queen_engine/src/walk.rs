//! Area-to-area path planning and step-wise walking of the player sprite.

use std::collections::VecDeque;

use queen_formats::Area;
use serde::Serialize;

use crate::bob::BobSlot;
use crate::frontend::{Frontend, Interrupts};
use crate::grid::Grid;
use crate::state::Direction;

/// Upper bound on planned hops, start and destination segments included.
pub const MAX_WALK_DATA: usize = 16;
/// Base walk speed before perspective scaling.
pub const WALK_SPEED: u16 = 6;
/// Bank holding the walk cycle frames.
pub const WALK_BANK: u16 = 13;
/// Walk frames sit in sprite slots this far above their bank frame.
const WALK_SLOT_OFFSET: u16 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WalkAnim {
    pub first_frame: u16,
    pub last_frame: u16,
    pub facing: Direction,
}

impl WalkAnim {
    const fn new(first_frame: u16, last_frame: u16, facing: Direction) -> Self {
        Self {
            first_frame,
            last_frame,
            facing,
        }
    }
}

/// One straight segment of a walk, travelled inside `area_num`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WalkData {
    pub dx: i16,
    pub dy: i16,
    pub area_num: u16,
    pub area: Area,
    pub anim: WalkAnim,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WalkOutcome {
    Arrived,
    /// No sequence of neighbouring areas joins start and destination.
    Blocked,
    Interrupted,
    /// The walk stepped into a disabled area at segment `step`.
    Special {
        area: u16,
        step: u16,
        facing: Direction,
    },
}

impl WalkOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            WalkOutcome::Arrived => "arrived",
            WalkOutcome::Blocked => "blocked",
            WalkOutcome::Interrupted => "interrupted",
            WalkOutcome::Special { .. } => "special",
        }
    }
}

/// Picks the crossing coordinate on one axis between two overlapping boxes.
pub fn calc_c(c1: i16, c2: i16, c3: i16, c4: i16, last: i16) -> i16 {
    let s1 = c1.max(c3);
    let s2 = c2.min(c4);
    if (last >= s1 && last <= s2) || (last >= s2 && last <= s1) {
        last
    } else {
        ((i32::from(s1) + i32::from(s2)) / 2) as i16
    }
}

/// Plans walks over the areas of one room. `areas[0]` is the sentinel.
pub struct WalkPlanner<'a> {
    areas: &'a [Area],
}

impl<'a> WalkPlanner<'a> {
    pub fn new(areas: &'a [Area]) -> Self {
        Self { areas }
    }

    fn area_count(&self) -> u16 {
        self.areas.len().saturating_sub(1) as u16
    }

    /// Nearest area to the point, and the point clamped into it when
    /// `recalibrate` is set.
    pub fn find_area_position(&self, x: i16, y: i16, recalibrate: bool) -> (u16, i16, i16) {
        let mut best = 1;
        let mut best_dist = u64::MAX;
        for (index, area) in self.areas.iter().enumerate().skip(1) {
            let b = area.rect;
            let gap = |edge: i16, at: i16| {
                u64::from((i32::from(edge) - i32::from(at)).unsigned_abs())
            };
            let csx = gap(b.x1, x).min(gap(b.x2, x));
            let csy = gap(b.y1, y).min(gap(b.y2, y));
            let in_x = x >= b.x1 && x <= b.x2;
            let in_y = y >= b.y1 && y <= b.y2;
            let dist = match (in_x, in_y) {
                (true, true) => 0,
                (true, false) => csy * csy,
                (false, true) => csx * csx,
                (false, false) => csx * csx + csy * csy,
            };
            if dist < best_dist {
                best_dist = dist;
                best = index as u16;
            }
        }
        if !recalibrate {
            return (best, x, y);
        }
        match self.areas.get(best as usize) {
            Some(area) => {
                let b = area.rect;
                (best, x.clamp(b.x1, b.x2.max(b.x1)), y.clamp(b.y1, b.y2.max(b.y1)))
            }
            None => (best, x, y),
        }
    }

    /// Neighbours of `area` in ascending index order. Bit `count - n` of the
    /// mask links area `n`; disabled areas are still traversable.
    pub fn neighbors(&self, area: u16) -> impl Iterator<Item = u16> + '_ {
        let count = self.area_count();
        let mask = self
            .areas
            .get(area as usize)
            .map_or(0, |a| a.map_neighbors.unsigned_abs());
        (1..=count).filter(move |&n| {
            let bit = count - n;
            bit < 16 && mask & (1 << bit) != 0
        })
    }

    /// Fewest-hop route from `from` to `to`, inclusive. Ties go to the
    /// lowest-numbered neighbour.
    pub fn find_path(&self, from: u16, to: u16) -> Option<Vec<u16>> {
        let count = self.area_count() as usize;
        if from == 0 || to == 0 || from as usize > count || to as usize > count {
            return None;
        }
        let mut previous = vec![0u16; count + 1];
        let mut seen = vec![false; count + 1];
        let mut queue = VecDeque::from([from]);
        seen[from as usize] = true;
        while let Some(area) = queue.pop_front() {
            if area == to {
                let mut path = vec![to];
                let mut current = to;
                while current != from {
                    current = previous[current as usize];
                    path.push(current);
                }
                path.reverse();
                return Some(path);
            }
            for next in self.neighbors(area) {
                if !seen[next as usize] {
                    seen[next as usize] = true;
                    previous[next as usize] = area;
                    queue.push_back(next);
                }
            }
        }
        None
    }

    /// Builds the segments of a walk from `start` to `end`. Positions outside
    /// every area are resolved to the nearest one, the destination being
    /// pulled inside it.
    pub fn plan(
        &self,
        old_pos: u16,
        new_pos: u16,
        start: (i16, i16),
        end: (i16, i16),
    ) -> Option<Vec<WalkData>> {
        if self.area_count() == 0 {
            return None;
        }
        let (mut x, mut y) = end;
        let mut new_pos = new_pos;
        if new_pos == 0 {
            (new_pos, x, y) = self.find_area_position(x, y, true);
        }
        let (old_x, old_y) = start;
        let mut old_pos = old_pos;
        if old_pos == 0 {
            old_pos = self.find_area_position(old_x, old_y, false).0;
        }

        let mut steps = Vec::new();
        if old_pos == new_pos {
            self.push_step(&mut steps, (old_x, old_y), (x, y), new_pos);
            return Some(steps);
        }

        let path = self.find_path(old_pos, new_pos)?;
        if path.len() >= MAX_WALK_DATA {
            log::warn!("walk: route of {} areas is too long", path.len());
            return None;
        }
        let (mut px, mut py) = (old_x, old_y);
        for pair in path.windows(2) {
            let (a1, a2) = (pair[0], pair[1]);
            let b1 = self.areas[a1 as usize].rect;
            let b2 = self.areas[a2 as usize].rect;
            let cx = calc_c(b1.x1, b1.x2, b2.x1, b2.x2, px);
            let cy = calc_c(b1.y1, b1.y2, b2.y1, b2.y2, py);
            self.push_step(&mut steps, (px, py), (cx, cy), a1);
            px = cx;
            py = cy;
        }
        self.push_step(&mut steps, (px, py), (x, y), new_pos);
        Some(steps)
    }

    fn push_step(&self, steps: &mut Vec<WalkData>, from: (i16, i16), to: (i16, i16), area_num: u16) {
        if from == to {
            return;
        }
        let area = self.areas.get(area_num as usize).copied().unwrap_or_default();
        let dx = to.0.saturating_sub(from.0);
        let dy = to.1.saturating_sub(from.1);
        steps.push(WalkData {
            dx,
            dy,
            area_num,
            area,
            anim: choose_anim(dx, dy, &area),
        });
    }
}

/// Side-on frames unless the perspective-weighted vertical travel dominates.
fn choose_anim(dx: i16, dy: i16, area: &Area) -> WalkAnim {
    const SIDE_FIRST: u16 = 11;
    const SIDE_LAST: u16 = 18;
    const FRONT: WalkAnim = WalkAnim::new(19, 24, Direction::Front);
    const BACK: WalkAnim = WalkAnim::new(25, 30, Direction::Back);

    let side = if dx < 0 { Direction::Left } else { Direction::Right };
    let mut anim = WalkAnim::new(SIDE_FIRST, SIDE_LAST, side);

    let mut k = i32::from(dy).abs();
    let ds = area.scale_diff();
    let y_diff = area.rect.y_diff();
    if ds > 0 && y_diff != 0 {
        k *= ((k * ds) / y_diff) / 2;
    }
    if i32::from(dx).abs() < k {
        anim = match (dy < 0, ds < 0) {
            (true, true) => FRONT,
            (true, false) => BACK,
            (false, true) => BACK,
            (false, false) => FRONT,
        };
    }
    anim
}

/// Segments for a walk of the player from `start` to `end` in the grid's
/// current room. In a cutscene a destination outside every area is reached
/// in one unchecked segment.
pub fn plan_walk(grid: &Grid, start: (i16, i16), end: (i16, i16), in_cutaway: bool) -> Option<Vec<WalkData>> {
    let areas = grid.room_areas(grid.current_room());
    let planner = WalkPlanner::new(areas);
    let old_pos = grid.find_area_for_pos(start.0, start.1);
    let new_pos = grid.find_area_for_pos(end.0, end.1);
    if new_pos == 0 && in_cutaway {
        let mut steps = Vec::new();
        planner.push_step(&mut steps, start, end, old_pos);
        return Some(steps);
    }
    planner.plan(old_pos, new_pos, start, end)
}

/// Moves `bob` along `steps`, one display update per movement frame.
/// Returns the outcome and the facing of the last segment walked.
pub fn animate_walk<F: Frontend + ?Sized>(
    bob: &mut BobSlot,
    steps: &[WalkData],
    grid: &Grid,
    frontend: &mut F,
    interrupts: &mut Interrupts,
) -> (WalkOutcome, Option<Direction>) {
    let mut last_facing = None;
    for (index, step) in steps.iter().enumerate() {
        if step.area.is_special() {
            bob.stop();
            let outcome = WalkOutcome::Special {
                area: step.area_num,
                step: index as u16 + 1,
                facing: step.anim.facing,
            };
            return (outcome, last_facing);
        }
        if last_facing != Some(step.anim.facing) {
            bob.anim_normal(step.anim.first_frame, step.anim.last_frame, 1, false, false);
        }
        let speed = (u32::from(grid.find_scale(bob.x, bob.y)) * u32::from(WALK_SPEED) / 100) as i16;
        bob.move_to(bob.x.saturating_add(step.dx), bob.y.saturating_add(step.dy), speed);
        bob.xflip = step.dx < 0;
        while bob.moving {
            bob.scale = step.area.calc_scale(bob.y);
            bob.scale_walk_speed(WALK_SPEED);
            bob.tick();
            frontend.unpack_sprite_frame(
                bob.frame_num.saturating_sub(WALK_SLOT_OFFSET),
                bob.frame_num,
                WALK_BANK,
            );
            frontend.update(interrupts);
            if interrupts.any() {
                bob.stop();
                log::debug!("walk: interrupted at ({}, {})", bob.x, bob.y);
                return (WalkOutcome::Interrupted, Some(step.anim.facing));
            }
        }
        last_facing = Some(step.anim.facing);
    }
    (WalkOutcome::Arrived, last_facing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::HeadlessFrontend;
    use queen_formats::{GridData, Rect};

    fn mask(count: u16, neighbours: &[u16]) -> i16 {
        neighbours
            .iter()
            .fold(0i16, |acc, &n| acc | (1 << (count - n)))
    }

    fn area(rect: Rect, neighbours: i16) -> Area {
        Area {
            map_neighbors: neighbours,
            rect,
            bottom_scale_factor: 100,
            top_scale_factor: 100,
            object: 0,
        }
    }

    /// Three boxes in a row: 1 <-> 2 <-> 3, plus an isolated 4.
    fn corridor() -> Vec<Area> {
        vec![
            Area::default(),
            area(Rect::new(0, 100, 100, 140), mask(4, &[2])),
            area(Rect::new(90, 100, 200, 140), mask(4, &[1, 3])),
            area(Rect::new(190, 100, 300, 140), mask(4, &[2])),
            area(Rect::new(0, 0, 50, 20), 0),
        ]
    }

    #[test]
    fn crossing_keeps_coordinate_inside_overlap() {
        assert_eq!(calc_c(0, 100, 90, 200, 95), 95);
        assert_eq!(calc_c(0, 100, 90, 200, 20), 95);
        assert_eq!(calc_c(100, 140, 100, 140, 120), 120);
    }

    #[test]
    fn path_follows_neighbour_bits() {
        let areas = corridor();
        let planner = WalkPlanner::new(&areas);
        assert_eq!(planner.neighbors(2).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(planner.find_path(1, 3), Some(vec![1, 2, 3]));
        assert_eq!(planner.find_path(3, 3), Some(vec![3]));
        assert_eq!(planner.find_path(1, 4), None);
    }

    #[test]
    fn equal_routes_prefer_lower_area() {
        // 1 reaches 4 through either 2 or 3
        let areas = vec![
            Area::default(),
            area(Rect::new(0, 0, 10, 10), mask(4, &[2, 3])),
            area(Rect::new(0, 0, 10, 10), mask(4, &[1, 4])),
            area(Rect::new(0, 0, 10, 10), mask(4, &[1, 4])),
            area(Rect::new(0, 0, 10, 10), mask(4, &[2, 3])),
        ];
        let planner = WalkPlanner::new(&areas);
        assert_eq!(planner.find_path(1, 4), Some(vec![1, 2, 4]));
    }

    #[test]
    fn plan_emits_one_segment_per_hop() {
        let areas = corridor();
        let planner = WalkPlanner::new(&areas);
        let steps = planner.plan(1, 3, (10, 120), (250, 130)).unwrap();
        let hops: Vec<_> = steps.iter().map(|s| (s.dx, s.dy, s.area_num)).collect();
        assert_eq!(hops, vec![(85, 0, 1), (100, 0, 2), (55, 10, 3)]);
        let total: (i16, i16) = steps.iter().fold((10, 120), |(x, y), s| (x + s.dx, y + s.dy));
        assert_eq!(total, (250, 130));
        assert!(planner.plan(1, 4, (10, 120), (20, 10)).is_none());
    }

    #[test]
    fn destination_outside_areas_is_snapped() {
        let areas = corridor();
        let planner = WalkPlanner::new(&areas);
        assert_eq!(planner.find_area_position(150, 160, true), (2, 150, 140));
        assert_eq!(planner.find_area_position(150, 160, false), (2, 150, 160));
        let steps = planner.plan(2, 0, (150, 120), (150, 160)).unwrap();
        assert_eq!(steps.len(), 1);
        assert_eq!((steps[0].dx, steps[0].dy), (0, 20));
    }

    #[test]
    fn far_off_points_snap_to_the_nearest_area() {
        let areas = corridor();
        let planner = WalkPlanner::new(&areas);
        assert_eq!(planner.find_area_position(i16::MIN, i16::MIN, true), (4, 0, 0));
        assert_eq!(planner.find_area_position(i16::MAX, i16::MAX, true), (3, 300, 140));
    }

    #[test]
    fn animation_frames_follow_direction() {
        let flat = area(Rect::new(0, 0, 100, 100), 0);
        assert_eq!(choose_anim(-30, 2, &flat).facing, Direction::Left);
        assert_eq!(choose_anim(30, -2, &flat).first_frame, 11);
        assert_eq!(choose_anim(3, 40, &flat), WalkAnim::new(19, 24, Direction::Front));
        assert_eq!(choose_anim(3, -40, &flat), WalkAnim::new(25, 30, Direction::Back));
        let receding = Area {
            bottom_scale_factor: 100,
            top_scale_factor: 50,
            ..flat
        };
        assert_eq!(choose_anim(3, -40, &receding).facing, Direction::Front);
    }

    fn grid_with(areas: Vec<Area>) -> Grid {
        let area_max = areas.len() as i16 - 1;
        let mut grid = Grid::new(GridData {
            obj_max: vec![0, 0],
            area_max: vec![0, area_max],
            areas: vec![Vec::new(), areas],
            object_boxes: vec![Rect::default()],
        });
        grid.setup_new_room(1, 0, &[]);
        grid
    }

    #[test]
    fn animate_reaches_destination() {
        let grid = grid_with(corridor());
        let steps = plan_walk(&grid, (10, 120), (250, 130), false).unwrap();
        let mut bob = BobSlot::new();
        bob.place(10, 120);
        let mut frontend = HeadlessFrontend::new();
        let mut interrupts = Interrupts::default();
        let (outcome, facing) = animate_walk(&mut bob, &steps, &grid, &mut frontend, &mut interrupts);
        assert_eq!(outcome, WalkOutcome::Arrived);
        assert_eq!(facing, Some(Direction::Right));
        assert_eq!((bob.x, bob.y), (250, 130));
        assert!(frontend.frames() > 0);
    }

    #[test]
    fn every_walk_frame_is_unpacked() {
        let grid = grid_with(corridor());
        let steps = plan_walk(&grid, (10, 120), (250, 130), false).unwrap();
        let mut bob = BobSlot::new();
        bob.place(10, 120);
        let mut frontend = HeadlessFrontend::new();
        let mut interrupts = Interrupts::default();
        animate_walk(&mut bob, &steps, &grid, &mut frontend, &mut interrupts);

        let unpacked: Vec<&String> = frontend
            .calls()
            .iter()
            .filter(|call| call.starts_with("unpack "))
            .collect();
        assert_eq!(unpacked.len() as u64, frontend.frames());
        assert!(unpacked.len() > steps.len());
        assert!(unpacked.iter().all(|call| call.ends_with(" 13")));
    }

    #[test]
    fn interrupt_stops_mid_path() {
        let grid = grid_with(corridor());
        let steps = plan_walk(&grid, (10, 120), (250, 130), false).unwrap();
        let mut bob = BobSlot::new();
        bob.place(10, 120);
        let mut frontend = HeadlessFrontend::new();
        frontend.interrupt_at_frame(3);
        let mut interrupts = Interrupts::default();
        let (outcome, _) = animate_walk(&mut bob, &steps, &grid, &mut frontend, &mut interrupts);
        assert_eq!(outcome, WalkOutcome::Interrupted);
        assert!(bob.x < 250);
        assert!(!bob.moving);
    }

    #[test]
    fn disabled_area_halts_the_walk() {
        let mut areas = corridor();
        areas[2].map_neighbors = -areas[2].map_neighbors;
        let grid = grid_with(areas);
        let steps = plan_walk(&grid, (10, 120), (250, 130), false).unwrap();
        let mut bob = BobSlot::new();
        bob.place(10, 120);
        let mut frontend = HeadlessFrontend::new();
        let mut interrupts = Interrupts::default();
        let (outcome, _) = animate_walk(&mut bob, &steps, &grid, &mut frontend, &mut interrupts);
        assert_eq!(
            outcome,
            WalkOutcome::Special {
                area: 2,
                step: 2,
                facing: Direction::Right
            }
        );
        assert_eq!(bob.x, 95);
    }

    #[test]
    fn cutaway_walks_leave_the_areas() {
        let grid = grid_with(corridor());
        let steps = plan_walk(&grid, (10, 120), (20, 60), true).unwrap();
        assert_eq!(steps.len(), 1);
        assert_eq!((steps[0].dx, steps[0].dy, steps[0].area_num), (10, -60, 1));
    }
}
