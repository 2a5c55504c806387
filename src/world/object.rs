use std::{
    f64::consts::{PI, TAU},
    sync::Arc,
    time::{Duration, Instant},
};

use crate::world::{
    camera::{Camera, normalise_angle},
    texture::Texture,
};

/// How an object stands, crouches and jumps. Heights are fractions of the
/// unit block height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovementParams {
    /// Time from leaving the ground to landing again.
    pub jump_time: Duration,
    pub stand_height: f64,
    pub crouch_height: f64,
    /// Peak vertical displacement of a jump.
    pub jump_height: f64,
}

impl Default for MovementParams {
    fn default() -> Self {
        Self {
            jump_time: Duration::from_millis(700),
            stand_height: 0.5,
            crouch_height: 0.3,
            jump_height: 0.4,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovementState {
    Standing,
    Crouching,
    Jumping { started: Instant },
}

/// A billboard entity: a pose, a footprint and a ring of directional frames.
///
/// Frame `n` of `N` is the view seen when the object presents itself at
/// angle `π/2 + n·2π/N`.
#[derive(Clone, Debug)]
pub struct Object {
    width: f64,  // x-extent regardless of rotation, 1.0 = one block
    height: f64, // vertical extent, 1.0 = unit block height
    camera: Camera,
    movement: MovementParams,
    state: MovementState,
    textures: Vec<Arc<Texture>>,
}

impl Object {
    pub fn new(width: f64, height: f64, camera: Camera, movement: MovementParams) -> Self {
        Self {
            width,
            height,
            camera,
            movement,
            state: MovementState::Standing,
            textures: Vec::new(),
        }
    }

    pub fn add_texture(&mut self, texture: Arc<Texture>) {
        self.textures.push(texture);
    }

    pub fn with_texture(mut self, texture: Arc<Texture>) -> Self {
        self.add_texture(texture);
        self
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }
    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }
    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }
    #[inline]
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }
    #[inline]
    pub fn state(&self) -> MovementState {
        self.state
    }
    #[inline]
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn texture(&self, n: usize) -> Option<&Texture> {
        self.textures.get(n).map(Arc::as_ref)
    }

    /// Frame nearest to the presented `angle`.
    pub fn texture_for_angle(&self, angle: f64) -> Option<&Texture> {
        let n = self.textures.len();
        if n == 0 {
            return None;
        }
        let mut fraction = normalise_angle(angle) / TAU - 0.25;
        if fraction < 0.0 {
            fraction += 1.0;
        }
        let idx = (n as f64 * fraction + 0.5).floor() as usize % n;
        self.texture(idx)
    }

    /*──────────────────────── movement ───────────────────────*/

    pub fn move_forward(&mut self, delta: f64) {
        self.camera.move_forward(delta);
    }
    pub fn strafe(&mut self, delta: f64) {
        self.camera.strafe(delta);
    }
    pub fn turn(&mut self, delta: f64) {
        self.camera.turn(delta);
    }
    pub fn pitch_by(&mut self, delta: f64) {
        self.camera.pitch_by(delta);
    }

    /// Enter (`true`) or leave (`false`) the crouch. Entering fails while
    /// airborne, leaving fails when not crouched.
    pub fn crouch(&mut self, on: bool) -> bool {
        match (on, self.state) {
            (true, MovementState::Jumping { .. }) => false,
            (true, _) => {
                self.state = MovementState::Crouching;
                true
            }
            (false, MovementState::Crouching) => {
                self.state = MovementState::Standing;
                true
            }
            (false, _) => false,
        }
    }

    /// Start a jump at `now`. Fails only if already jumping.
    pub fn jump(&mut self, now: Instant) -> bool {
        if matches!(self.state, MovementState::Jumping { .. }) {
            return false;
        }
        self.state = MovementState::Jumping { started: now };
        true
    }

    /// Update eye height for the current movement state.
    pub fn tick(&mut self, now: Instant) {
        let p = self.movement;
        let z = match self.state {
            MovementState::Standing => p.stand_height,
            MovementState::Crouching => p.crouch_height,
            MovementState::Jumping { started } => {
                let t = now.saturating_duration_since(started);
                if t >= p.jump_time {
                    self.state = MovementState::Standing;
                    p.stand_height
                } else {
                    let frac = t.as_secs_f64() / p.jump_time.as_secs_f64();
                    p.stand_height + (frac * PI).sin() * p.jump_height
                }
            }
        };
        self.camera.set_z(z);
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::colour::Colour;
    use glam::DVec3;
    use std::f64::consts::FRAC_PI_2;

    fn object() -> Object {
        Object::new(
            0.3,
            0.6,
            Camera::new(DVec3::new(1.0, 1.0, 0.5), 0.0),
            MovementParams::default(),
        )
    }

    fn frame(name: &str) -> Arc<Texture> {
        Arc::new(Texture::solid(name, 1, 1, Colour::WHITE))
    }

    #[test]
    fn no_frames_no_texture() {
        assert!(object().texture_for_angle(1.0).is_none());
    }

    #[test]
    fn single_frame_for_every_angle() {
        let o = object().with_texture(frame("only"));
        for i in 0..16 {
            assert_eq!(o.texture_for_angle(i as f64 * 0.4).unwrap().name, "only");
        }
    }

    #[test]
    fn four_frames_pick_nearest() {
        let mut o = object();
        for n in ["n0", "n1", "n2", "n3"] {
            o.add_texture(frame(n));
        }
        let name = |a: f64| o.texture_for_angle(a).unwrap().name.clone();
        assert_eq!(name(FRAC_PI_2), "n0");
        assert_eq!(name(PI), "n1");
        assert_eq!(name(3.0 * FRAC_PI_2), "n2");
        assert_eq!(name(0.0), "n3");
        // rounding, and wrap past the last frame back to frame 0
        assert_eq!(name(FRAC_PI_2 + 0.3), "n0");
        assert_eq!(name(FRAC_PI_2 - 0.3 + TAU), "n0");
    }

    #[test]
    fn crouch_rules() {
        let mut o = object();
        assert!(!o.crouch(false));
        assert!(o.crouch(true));
        assert_eq!(o.state(), MovementState::Crouching);
        o.tick(Instant::now());
        assert!((o.camera().z() - 0.3).abs() < 1e-12);
        assert!(o.crouch(false));
        assert_eq!(o.state(), MovementState::Standing);
    }

    #[test]
    fn jump_arc_and_landing() {
        let mut o = object();
        let t0 = Instant::now();
        assert!(o.jump(t0));
        assert!(!o.jump(t0));
        assert!(!o.crouch(true));

        o.tick(t0 + Duration::from_millis(350)); // apex
        assert!((o.camera().z() - 0.9).abs() < 1e-6);

        o.tick(t0 + Duration::from_millis(700));
        assert_eq!(o.state(), MovementState::Standing);
        assert!((o.camera().z() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn movement_delegates_to_camera() {
        let mut o = object();
        o.move_forward(1.0);
        o.turn(FRAC_PI_2);
        o.move_forward(1.0);
        assert!((o.camera().x() - 2.0).abs() < 1e-12);
        assert!((o.camera().y() - 2.0).abs() < 1e-12);
    }
}
