//! Per-frame projection constants and the perspective-division helpers
//! shared by walls, roofs, the sky/ground gradient and sprites.

use glam::DVec2;

use crate::{
    colour::{Colour, distance_factor},
    renderer::RenderConfig,
    world::Camera,
};

/// Anything nearer than this is projected as if it were this near.
const MIN_DISTANCE: f64 = 1e-6;

/// Screen-space results are clamped to ±this many pixels before
/// conversion, so `base - height` can never overflow.
const PX_LIMIT: f64 = 16_777_216.0;

#[inline]
fn to_px(v: f64) -> i32 {
    v.clamp(-PX_LIMIT, PX_LIMIT) as i32
}

/// Camera state reused by every column and sprite of one frame.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Viewer {
    pub w: usize,
    pub h: usize,
    /// Eye → virtual screen distance in pixels.
    pub screen_dist: f64,
    pub unit_block_height: f64,
    /// `(z - 0.5) · unit_block_height`; divided by distance per use.
    pub z_adjust: f64,
    /// `tan(pitch) · screen_dist`, clamped to ±window height.
    pub pitch_adjust: i32,
    /// Screen row of the horizon.
    pub horizon: i32,
    forward: DVec2,
    right: DVec2,
    brightness_min: f64,
    brightness_max: f64,
}

impl Viewer {
    pub fn new(camera: &Camera, cfg: &RenderConfig) -> Self {
        let screen_dist = camera.screen_distance(cfg.width);
        let h = cfg.height as f64;
        let pitch_adjust = to_px((camera.pitch().tan() * screen_dist).clamp(-h, h));
        Self {
            w: cfg.width,
            h: cfg.height,
            screen_dist,
            unit_block_height: cfg.unit_block_height,
            z_adjust: (camera.z() - 0.5) * cfg.unit_block_height,
            pitch_adjust,
            horizon: (cfg.height / 2) as i32 + pitch_adjust,
            forward: camera.forward(),
            right: camera.right(),
            brightness_min: cfg.brightness_min,
            brightness_max: cfg.brightness_max,
        }
    }

    /// Screen row of the bottom edge of a block `distance` away:
    ///
    /// ```text
    /// h/2 + U/(2d) + (z - 0.5)·U/d + pitch_adjust
    /// ```
    #[inline]
    pub fn display_base(&self, distance: f64) -> i32 {
        let d = distance.max(MIN_DISTANCE);
        to_px(
            (self.h / 2) as f64
                + (self.unit_block_height * 0.5 + self.z_adjust) / d
                + self.pitch_adjust as f64,
        )
    }

    /// On-screen height of a block `fraction` units tall, `distance` away.
    #[inline]
    pub fn display_height(&self, fraction: f64, distance: f64) -> i32 {
        to_px(fraction * self.unit_block_height / distance.max(MIN_DISTANCE))
    }

    /// Camera-plane ray direction for screen column `x`. Its angle is
    /// `yaw + atan((x - w/2) / screen_dist)` and distances measured along
    /// it are perpendicular to the camera plane.
    #[inline]
    pub fn column_dir(&self, x: usize) -> DVec2 {
        let offset = x as f64 - (self.w / 2) as f64;
        self.forward + self.right * (offset / self.screen_dist)
    }

    /// Flat-plane distance of a sky or ground row.
    #[inline]
    pub fn row_distance(&self, y: i32) -> f64 {
        let dy = (y - self.horizon).unsigned_abs() as f64;
        self.unit_block_height / (2.0 * dy)
    }

    /// Global brightness for a surface `distance` away, within the
    /// configured bounds.
    #[inline]
    pub fn brightness(&self, distance: f64) -> f64 {
        distance_factor(distance)
            .max(self.brightness_min)
            .min(self.brightness_max)
    }

    #[inline]
    pub fn shade(&self, colour: Colour, distance: f64) -> Colour {
        colour.scaled(self.brightness(distance))
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_4};

    fn viewer(z: f64, pitch: f64) -> Viewer {
        let mut cfg = RenderConfig::for_window(640, 480);
        cfg.unit_block_height = 512.0;
        let cam = Camera::new(DVec3::new(0.5, 0.5, z), 0.0)
            .with_fov(FRAC_PI_3)
            .with_pitch(pitch);
        Viewer::new(&cam, &cfg)
    }

    #[test]
    fn unit_block_is_symmetric_about_centre() {
        let v = viewer(0.5, 0.0);
        let base = v.display_base(2.0);
        let top = base - v.display_height(1.0, 2.0);
        assert_eq!((top, base), (112, 368));
        assert_eq!(240 - top, base - 240);
        assert_eq!(v.horizon, 240);
    }

    #[test]
    fn higher_eye_pushes_blocks_down() {
        let low = viewer(0.2, 0.0).display_base(2.0);
        let high = viewer(0.8, 0.0).display_base(2.0);
        assert!(high > low);
    }

    #[test]
    fn pitch_adjust_is_clamped() {
        let v = viewer(0.5, FRAC_PI_2);
        assert_eq!(v.pitch_adjust, 480);
        let v = viewer(0.5, -FRAC_PI_2);
        assert_eq!(v.pitch_adjust, -480);
        let v = viewer(0.5, FRAC_PI_4 / 4.0);
        assert!(v.pitch_adjust > 0 && v.pitch_adjust < 480);
        assert_eq!(v.horizon, 240 + v.pitch_adjust);
    }

    #[test]
    fn zero_distance_does_not_overflow() {
        let v = viewer(0.0, 0.0);
        let base = v.display_base(0.0);
        let h = v.display_height(1.0, 0.0);
        assert!(base > 0 && h > 0);
        let _top = base - h;
    }

    #[test]
    fn centre_column_looks_straight_ahead() {
        let v = viewer(0.5, 0.0);
        let d = v.column_dir(320);
        assert!((d.x - 1.0).abs() < 1e-12 && d.y.abs() < 1e-12);
        let edge = v.column_dir(0);
        let angle = edge.y.atan2(edge.x);
        assert!((angle + FRAC_PI_3 / 2.0).abs() < 1e-9);
    }

    #[test]
    fn brightness_respects_bounds() {
        let mut v = viewer(0.5, 0.0);
        v.brightness_min = 0.25;
        v.brightness_max = 0.8;
        assert_eq!(v.brightness(0.5), 0.8);
        assert_eq!(v.brightness(1e9), 0.25);
        assert!((v.brightness(2.0) - 1.0 / 2f64.sqrt()).abs() < 1e-12);
    }
}
