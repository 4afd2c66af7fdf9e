use serde::Serialize;

/// A sprite slot that can animate through a frame range and travel along a
/// line one pixel step at a time.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BobSlot {
    pub active: bool,
    pub x: i16,
    pub y: i16,
    pub frame_num: u16,
    pub scale: u16,
    pub xflip: bool,
    pub moving: bool,
    pub animating: bool,
    pub speed: i16,
    end_x: i16,
    end_y: i16,
    dx: i16,
    dy: i16,
    x_dir: i16,
    y_dir: i16,
    total: i16,
    x_major: bool,
    anim: NormalAnim,
    frame_dir: i16,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
struct NormalAnim {
    first_frame: u16,
    last_frame: u16,
    speed: u16,
    speed_bak: u16,
    rebound: bool,
}

impl BobSlot {
    pub fn new() -> Self {
        Self {
            scale: 100,
            frame_dir: 1,
            ..Self::default()
        }
    }

    pub fn place(&mut self, x: i16, y: i16) {
        self.x = x;
        self.y = y;
        self.active = true;
    }

    pub fn x_major(&self) -> bool {
        self.x_major
    }

    /// Starts a straight-line move; the first step is taken immediately.
    pub fn move_to(&mut self, dst_x: i16, dst_y: i16, speed: i16) {
        self.moving = true;
        self.end_x = dst_x;
        self.end_y = dst_y;
        self.speed = speed.max(1);

        let delta_x = dst_x - self.x;
        self.dx = delta_x.abs();
        self.x_dir = if delta_x < 0 { -1 } else { 1 };
        let delta_y = dst_y - self.y;
        self.dy = delta_y.abs();
        self.y_dir = if delta_y < 0 { -1 } else { 1 };

        if self.dx > self.dy {
            self.total = self.dy / 2;
            self.x_major = true;
        } else {
            self.total = self.dx / 2;
            self.x_major = false;
        }
        self.move_one_step();
    }

    pub fn move_one_step(&mut self) {
        if self.x_major {
            if self.x == self.end_x {
                self.y = self.end_y;
                self.moving = false;
            } else {
                self.x += self.x_dir;
                self.total += self.dy;
                if self.total > self.dx {
                    self.y += self.y_dir;
                    self.total -= self.dx;
                }
            }
        } else if self.y == self.end_y {
            self.x = self.end_x;
            self.moving = false;
        } else {
            self.y += self.y_dir;
            self.total += self.dx;
            if self.total > self.dy {
                self.x += self.x_dir;
                self.total -= self.dy;
            }
        }
    }

    /// Walk speed follows the sprite scale, halved on mostly-vertical lines.
    pub fn scale_walk_speed(&mut self, base: u16) {
        let base = if self.x_major { base } else { base / 2 };
        self.speed = ((u32::from(self.scale) * u32::from(base)) / 100) as i16;
        if self.speed == 0 {
            self.speed = 1;
        }
    }

    pub fn anim_normal(&mut self, first: u16, last: u16, speed: u16, rebound: bool, flip: bool) {
        self.active = true;
        self.animating = true;
        self.frame_num = first;
        self.anim = NormalAnim {
            first_frame: first,
            last_frame: last,
            speed,
            speed_bak: speed,
            rebound,
        };
        self.frame_dir = 1;
        self.xflip = flip;
    }

    fn anim_one_step(&mut self) {
        self.anim.speed = self.anim.speed.saturating_sub(1);
        if self.anim.speed > 0 {
            return;
        }
        self.anim.speed = self.anim.speed_bak.max(1);
        let next = i32::from(self.frame_num) + i32::from(self.frame_dir);
        if next > i32::from(self.anim.last_frame) || next < i32::from(self.anim.first_frame) {
            if self.anim.rebound {
                self.frame_dir = -self.frame_dir;
            } else {
                self.frame_num = self.anim.first_frame.saturating_sub(1);
            }
        }
        self.frame_num = (i32::from(self.frame_num) + i32::from(self.frame_dir)).max(0) as u16;
    }

    /// One display frame: advance the animation, then `speed` line steps.
    pub fn tick(&mut self) {
        if self.animating {
            self.anim_one_step();
        }
        let mut steps = 0;
        while self.moving && steps < self.speed {
            self.move_one_step();
            steps += 1;
        }
    }

    pub fn stop(&mut self) {
        self.moving = false;
        self.animating = false;
    }

    pub fn clear(&mut self) {
        *self = BobSlot::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(bob: &mut BobSlot) -> usize {
        let mut frames = 0;
        while bob.moving {
            bob.tick();
            frames += 1;
            assert!(frames < 10_000, "bob never arrived");
        }
        frames
    }

    #[test]
    fn line_move_reaches_destination() {
        let mut bob = BobSlot::new();
        bob.place(10, 10);
        bob.move_to(50, 22, 3);
        assert!(bob.x_major());
        run(&mut bob);
        assert_eq!((bob.x, bob.y), (50, 22));

        bob.move_to(45, 90, 2);
        assert!(!bob.x_major());
        run(&mut bob);
        assert_eq!((bob.x, bob.y), (45, 90));
    }

    #[test]
    fn walk_speed_is_scaled_and_never_zero() {
        let mut bob = BobSlot::new();
        bob.place(0, 0);
        bob.move_to(100, 0, 1);
        bob.scale = 50;
        bob.scale_walk_speed(6);
        assert_eq!(bob.speed, 3);

        bob.move_to(0, 100, 1);
        bob.scale = 10;
        bob.scale_walk_speed(6);
        assert_eq!(bob.speed, 1);
    }

    #[test]
    fn looping_animation_wraps_to_first_frame() {
        let mut bob = BobSlot::new();
        bob.anim_normal(11, 13, 1, false, false);
        let frames: Vec<u16> = (0..4)
            .map(|_| {
                bob.tick();
                bob.frame_num
            })
            .collect();
        assert_eq!(frames, vec![12, 13, 11, 12]);
    }
}
