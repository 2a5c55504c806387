//! Grid DDA traversal.
//!
//! A [`Ray`] walks an orthogonal unit grid one cell boundary at a time.
//! Distances are measured in units of the direction vector: for a unit
//! direction that is the straight-line distance, for a camera-plane
//! direction (`forward + right · k`) it is the perpendicular distance to the
//! camera plane, which is what column projection wants.

use glam::{DVec2, IVec2, dvec2, ivec2};

/// Sentinel distance for a boundary the ray can never reach. Compare with
/// `==`; it is never produced by a reachable crossing.
pub const UNREACHABLE: f64 = f64::MAX;

/// Direction components smaller than this count as exactly zero.
const AXIS_EPSILON: f64 = 1e-12;

/// Which kind of grid line was crossed most recently.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// Crossed a line of constant x (stepped in x).
    Vertical,
    /// Crossed a line of constant y (stepped in y).
    Horizontal,
    /// `next()` has not been called yet.
    None,
}

#[derive(Clone, Debug)]
pub struct Ray {
    start: DVec2,
    dir: DVec2,
    map: IVec2,  // cell the ray is currently in (floor convention)
    step: IVec2, // ±1 per axis
    side_dist: DVec2,
    delta_dist: DVec2,
    side: Side,
    distance: f64, // to the most recent crossing
}

impl Ray {
    /// Ray from `(x, y)` heading `angle` radians (0 = +X).
    pub fn new(x: f64, y: f64, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_direction(dvec2(x, y), dvec2(c, s))
    }

    /// Ray from `origin` along `dir`, which need not be unit length.
    pub fn from_direction(origin: DVec2, dir: DVec2) -> Self {
        let snap = |v: f64| if v.abs() < AXIS_EPSILON { 0.0 } else { v };
        let dir = dvec2(snap(dir.x), snap(dir.y));

        let map = origin.floor().as_ivec2();
        let delta = |d: f64| if d == 0.0 { UNREACHABLE } else { 1.0 / d.abs() };
        let delta_dist = dvec2(delta(dir.x), delta(dir.y));

        // Partial distance from origin to the first grid line per axis.
        let first = |o: f64, cell: i32, d: f64, delta: f64| -> (i32, f64) {
            if d == 0.0 {
                (1, UNREACHABLE)
            } else if d < 0.0 {
                (-1, (o - cell as f64) * delta)
            } else {
                (1, (cell as f64 + 1.0 - o) * delta)
            }
        };
        let (step_x, side_x) = first(origin.x, map.x, dir.x, delta_dist.x);
        let (step_y, side_y) = first(origin.y, map.y, dir.y, delta_dist.y);

        Self {
            start: origin,
            dir,
            map,
            step: ivec2(step_x, step_y),
            side_dist: dvec2(side_x, side_y),
            delta_dist,
            side: Side::None,
            distance: 0.0,
        }
    }

    /// Advance to the next grid-line crossing.
    pub fn next(&mut self) {
        if self.side_dist.x < self.side_dist.y {
            self.side_dist.x = (self.side_dist.x + self.delta_dist.x).min(UNREACHABLE);
            self.map.x += self.step.x;
            self.side = Side::Vertical;
        } else {
            self.side_dist.y = (self.side_dist.y + self.delta_dist.y).min(UNREACHABLE);
            self.map.y += self.step.y;
            self.side = Side::Horizontal;
        }
        // Clamp away rounding jitter between the two axis formulas.
        self.distance = self.distance.max(self.distance_for(self.side));
    }

    /// Cell the ray is in, in world-cell coordinates (`floor` of position).
    #[inline]
    pub fn cell(&self) -> IVec2 {
        self.map
    }

    /// Legacy map coordinate: `floor(x) + 1`.
    #[inline]
    pub fn map_x(&self) -> i32 {
        self.map.x + 1
    }

    /// Legacy map coordinate: `floor(y) + 1`.
    #[inline]
    pub fn map_y(&self) -> i32 {
        self.map.y + 1
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    #[inline]
    pub fn direction(&self) -> DVec2 {
        self.dir
    }

    /// Distance from the origin to the most recent crossing; 0 before the
    /// first `next()`. Never decreases. May equal [`UNREACHABLE`].
    #[inline]
    pub fn true_distance(&self) -> f64 {
        self.distance
    }

    /// Distance to the current cell's entry line on the axis `side`,
    /// computed from the cell and step alone. [`UNREACHABLE`] when the ray
    /// never moves along that axis.
    pub fn distance_for(&self, side: Side) -> f64 {
        let along = |cell: i32, start: f64, step: i32, d: f64| {
            if d == 0.0 {
                UNREACHABLE
            } else {
                ((cell as f64 - start + (1 - step) as f64 / 2.0) / d).abs()
            }
        };
        match side {
            Side::Vertical => along(self.map.x, self.start.x, self.step.x, self.dir.x),
            Side::Horizontal => along(self.map.y, self.start.y, self.step.y, self.dir.y),
            Side::None => 0.0,
        }
    }

    /// Column of a `texture_w`-wide texture struck at the last crossing.
    ///
    /// Mirrored for two of the four face/direction combinations so a texture
    /// reads the same way from whichever side a cell is approached.
    pub fn texture_x(&self, texture_w: usize) -> usize {
        if texture_w == 0 {
            return 0;
        }
        let hit = match self.side {
            Side::Vertical => self.start.y + self.distance * self.dir.y,
            Side::Horizontal => self.start.x + self.distance * self.dir.x,
            Side::None => return 0,
        };
        let frac = hit - hit.floor();
        let mut tx = ((frac * texture_w as f64) as usize).min(texture_w - 1);
        let mirror = match self.side {
            Side::Vertical => self.dir.x > 0.0,
            Side::Horizontal => self.dir.y < 0.0,
            Side::None => false,
        };
        if mirror {
            tx = texture_w - tx - 1;
        }
        tx
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    #[test]
    fn distance_never_decreases() {
        let origins = [(0.5, 0.5), (3.25, 7.8), (10.0, 10.0), (-2.3, 4.999)];
        for &(x, y) in &origins {
            for i in 0..720 {
                let angle = i as f64 * TAU / 720.0;
                let mut ray = Ray::new(x, y, angle);
                let mut last = ray.true_distance();
                for _ in 0..200 {
                    ray.next();
                    let d = ray.true_distance();
                    assert!(d >= last, "angle {angle}: {d} < {last}");
                    last = d;
                }
            }
        }
    }

    #[test]
    fn axis_aligned_rays_report_unreachable_axis() {
        for (angle, never) in [
            (0.0, Side::Horizontal),
            (FRAC_PI_2, Side::Vertical),
            (PI, Side::Horizontal),
            (3.0 * FRAC_PI_2, Side::Vertical),
        ] {
            let mut ray = Ray::new(2.5, 2.5, angle);
            for _ in 0..10 {
                ray.next();
                assert_ne!(ray.side(), never, "angle {angle}");
                assert!(ray.true_distance() < 100.0);
            }
            assert_eq!(ray.distance_for(never), UNREACHABLE, "angle {angle}");
        }
    }

    #[test]
    fn axis_aligned_crossings_are_exact() {
        let mut ray = Ray::new(2.5, 2.5, 0.0);
        ray.next();
        assert_eq!(ray.side(), Side::Vertical);
        assert!((ray.true_distance() - 0.5).abs() < 1e-12);
        ray.next();
        assert!((ray.true_distance() - 1.5).abs() < 1e-12);
        assert_eq!(ray.cell(), ivec2(4, 2));
    }

    #[test]
    fn legacy_map_coords_are_offset_by_one() {
        let ray = Ray::new(3.7, -1.2, 1.0);
        assert_eq!(ray.side(), Side::None);
        assert_eq!(ray.map_x(), 4);
        assert_eq!(ray.map_y(), -1);
        assert_eq!(ray.cell(), ivec2(3, -2));
        assert_eq!(ray.true_distance(), 0.0);
    }

    #[test]
    fn camera_plane_direction_gives_perpendicular_distance() {
        // Looking +Y, wall line at y = 5, origin at y = 3.5.
        for k in [-0.5, -0.2, 0.0, 0.3, 0.55] {
            let dir = dvec2(0.0, 1.0) + dvec2(-1.0, 0.0) * k;
            let mut ray = Ray::from_direction(dvec2(5.5, 3.5), dir);
            while ray.cell().y < 5 {
                ray.next();
            }
            assert_eq!(ray.side(), Side::Horizontal);
            assert!((ray.true_distance() - 1.5).abs() < 1e-9, "k {k}");
        }
    }

    #[test]
    fn texture_x_is_in_range_and_mirrored() {
        // East-bound ray hits x = 3 at y = 2.25 → frac 0.25, mirrored.
        let mut east = Ray::new(2.5, 2.25, 0.0);
        east.next();
        assert_eq!(east.texture_x(64), 64 - 16 - 1);

        // West-bound ray hits x = 2 at y = 2.25 → frac 0.25, not mirrored.
        let mut west = Ray::from_direction(dvec2(2.5, 2.25), dvec2(-1.0, 0.0));
        west.next();
        assert_eq!(west.texture_x(64), 16);

        // North-bound (+Y) ray: not mirrored; south-bound: mirrored.
        let mut north = Ray::from_direction(dvec2(2.25, 2.5), dvec2(0.0, 1.0));
        north.next();
        assert_eq!(north.texture_x(64), 16);
        let mut south = Ray::from_direction(dvec2(2.25, 2.5), dvec2(0.0, -1.0));
        south.next();
        assert_eq!(south.texture_x(64), 64 - 16 - 1);
    }

    #[test]
    fn texture_x_before_first_step_is_zero() {
        let ray = Ray::new(1.5, 1.5, 0.7);
        assert_eq!(ray.texture_x(32), 0);
        assert_eq!(ray.texture_x(0), 0);
    }
}
