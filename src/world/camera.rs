use std::f64::consts::{FRAC_PI_2, FRAC_PI_3, TAU};

use glam::{DVec2, DVec3, dvec2};
use thiserror::Error;

/// Largest pitch magnitude a camera will ever accept. `tan` blows up at
/// exactly ±π/2, so the hard bounds sit a hair inside.
pub const PITCH_LIMIT: f64 = FRAC_PI_2 - 1e-6;

/// Map any angle into `[0, 2π)`.
#[inline]
pub fn normalise_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if a >= TAU { 0.0 } else { a }
}

#[derive(Debug, Error, PartialEq)]
pub enum CameraError {
    #[error("pitch limits inverted: min {min} > max {max}")]
    InvertedPitchLimits { min: f64, max: f64 },

    #[error("pitch limits [{min}, {max}] exceed ±{limit}", limit = PITCH_LIMIT)]
    PitchLimitsOutOfRange { min: f64, max: f64 },
}

/// Viewer pose in world space.
///
/// * `pos.x`, `pos.y` are grid units, `pos.z` is eye height as a fraction
///   of one unit block (0.5 = half-way up a full-height wall).
/// * `yaw` is unnormalised radians, 0 = +X, counter-clockwise positive.
/// * `pitch` is kept inside the configured `[pitch_min, pitch_max]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pos: DVec3,
    yaw: f64,
    pitch: f64,
    pitch_min: f64,
    pitch_max: f64,
    fov: f64,      // horizontal FoV (radians)
    max_dist: f64, // nothing farther than this is ray-marched
}

/// Where a target sits relative to a camera, see [`Camera::target_info`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetInfo {
    /// Angle at which the target presents itself to the camera, used to
    /// choose a directional sprite frame.
    pub visible_angle: f64,
    /// Bearing of the line target→camera relative to the camera's yaw,
    /// normalised to `[0, 2π)`. The target is in front when this lies in
    /// `[π/2, 3π/2]`, dead ahead at exactly π.
    pub bearing: f64,
    /// Straight-line distance on the ground plane.
    pub distance: f64,
}

impl TargetInfo {
    #[inline]
    pub fn is_in_front(&self) -> bool {
        (FRAC_PI_2..=3.0 * FRAC_PI_2).contains(&self.bearing)
    }

    /// Distance along the camera's forward axis.
    #[inline]
    pub fn depth(&self) -> f64 {
        -self.distance * self.bearing.cos()
    }
}

impl Camera {
    /// Camera at `pos` facing `yaw`, with a 60° FoV, level pitch and a view
    /// distance of 64 units.
    pub fn new(pos: DVec3, yaw: f64) -> Self {
        Self {
            pos,
            yaw,
            pitch: 0.0,
            pitch_min: -PITCH_LIMIT,
            pitch_max: PITCH_LIMIT,
            fov: FRAC_PI_3,
            max_dist: 64.0,
        }
    }

    pub fn with_fov(mut self, fov: f64) -> Self {
        self.fov = fov;
        self
    }

    pub fn with_max_dist(mut self, max_dist: f64) -> Self {
        self.max_dist = max_dist;
        self
    }

    pub fn with_pitch(mut self, pitch: f64) -> Self {
        self.set_pitch(pitch);
        self
    }

    /*──────────────────────── accessors ─────────────────────────────*/

    #[inline]
    pub fn pos(&self) -> DVec3 {
        self.pos
    }
    #[inline]
    pub fn x(&self) -> f64 {
        self.pos.x
    }
    #[inline]
    pub fn y(&self) -> f64 {
        self.pos.y
    }
    #[inline]
    pub fn z(&self) -> f64 {
        self.pos.z
    }
    #[inline]
    pub fn yaw(&self) -> f64 {
        self.yaw
    }
    #[inline]
    pub fn pitch(&self) -> f64 {
        self.pitch
    }
    #[inline]
    pub fn pitch_limits(&self) -> (f64, f64) {
        (self.pitch_min, self.pitch_max)
    }
    #[inline]
    pub fn fov(&self) -> f64 {
        self.fov
    }
    #[inline]
    pub fn max_dist(&self) -> f64 {
        self.max_dist
    }

    pub fn set_x(&mut self, x: f64) {
        self.pos.x = x;
    }
    pub fn set_y(&mut self, y: f64) {
        self.pos.y = y;
    }
    pub fn set_z(&mut self, z: f64) {
        self.pos.z = z;
    }
    pub fn set_yaw(&mut self, yaw: f64) {
        self.yaw = yaw;
    }

    /// Set pitch, clamped into the current limits.
    pub fn set_pitch(&mut self, pitch: f64) {
        self.pitch = pitch.clamp(self.pitch_min, self.pitch_max);
    }

    /// Narrow the allowed pitch range. The current pitch is re-clamped.
    pub fn set_pitch_limits(&mut self, min: f64, max: f64) -> Result<(), CameraError> {
        if min.is_nan() || max.is_nan() || min < -PITCH_LIMIT || max > PITCH_LIMIT {
            return Err(CameraError::PitchLimitsOutOfRange { min, max });
        }
        if min > max {
            return Err(CameraError::InvertedPitchLimits { min, max });
        }
        self.pitch_min = min;
        self.pitch_max = max;
        self.set_pitch(self.pitch);
        Ok(())
    }

    /*──────────────────────── derived vectors ───────────────────────*/

    /// Unit vector pointing where the camera looks on the X-Y plane.
    #[inline(always)]
    pub fn forward(&self) -> DVec2 {
        let (s, c) = self.yaw.sin_cos();
        dvec2(c, s)
    }

    /// Unit vector pointing to the camera's right; a positive `strafe`
    /// moves this way.
    #[inline(always)]
    pub fn right(&self) -> DVec2 {
        self.forward().perp()
    }

    /*──────────────────────── movement helpers ──────────────────────*/

    /// Move along the current heading (backwards if `delta` is negative).
    pub fn move_forward(&mut self, delta: f64) {
        let f = self.forward() * delta;
        self.pos.x += f.x;
        self.pos.y += f.y;
    }

    /// Move perpendicular to the heading.
    pub fn strafe(&mut self, delta: f64) {
        let r = self.right() * delta;
        self.pos.x += r.x;
        self.pos.y += r.y;
    }

    /// Adjust yaw. Left unnormalised; trig takes care of wrapping.
    pub fn turn(&mut self, delta: f64) {
        self.yaw += delta;
    }

    /// Adjust pitch through the clamped setter.
    pub fn pitch_by(&mut self, delta: f64) {
        self.set_pitch(self.pitch + delta);
    }

    /*───────────────── projection helpers ─────────────────*/

    /// Distance from the eye to a virtual screen `window_w` pixels wide
    /// that exactly spans the FoV.
    ///
    /// ```text
    /// sd = w / (2 * tan(fov/2))
    /// ```
    #[inline]
    pub fn screen_distance(&self, window_w: usize) -> f64 {
        window_w as f64 / (2.0 * (self.fov * 0.5).tan())
    }

    /// Bearing, presented angle and distance of another pose.
    pub fn target_info(&self, target: &Camera) -> TargetInfo {
        let d = dvec2(self.pos.x - target.pos.x, self.pos.y - target.pos.y);
        let direct = d.y.atan2(d.x);
        TargetInfo {
            visible_angle: target.yaw + direct,
            bearing: normalise_angle(direct - self.yaw),
            distance: d.length(),
        }
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
