//! ---------------------------------------------------------------------------
//! Software (CPU) column caster
//!
//! * Fills an owned frame-buffer in **0xAARRGGBB** format plus one `f64`
//!   depth value per pixel.
//! * One ray per screen column; wall slices are composited back-to-front, so
//!   the depth buffer only ever decreases within a frame.
//! * Sprites are drawn last, far-to-near, tested against the depth buffer.
//! ---------------------------------------------------------------------------

mod columns;
mod frame;
mod projection;
mod sprites;
mod top_down;

use crate::{
    colour::Colour,
    renderer::{FrameStats, RenderConfig, RenderMode, Rgba, Scene},
    world::Camera,
};

use self::{frame::FrameBuffers, projection::Viewer};

pub use self::columns::MAX_SLICES;

/*───────────────────────────────────────────────────────────────────────*/
/*                              Backend                                 */
/*───────────────────────────────────────────────────────────────────────*/

/// Column renderer over a [`Scene`].
pub struct Software<S: Scene> {
    scene: S,
    config: RenderConfig,
    fb: FrameBuffers,
}

impl<S: Scene> Software<S> {
    pub fn new(scene: S, config: RenderConfig) -> Self {
        Self {
            scene,
            fb: FrameBuffers::new(config.width, config.height),
            config,
        }
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// New window size. The unit block height is left as configured.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.config.width = width;
        self.config.height = height;
        self.fb.resize(width, height);
    }

    pub fn set_brightness(&mut self, min: f64, max: f64) {
        self.config.brightness_min = min;
        self.config.brightness_max = max;
    }

    /// Draw one complete frame as seen from `camera`.
    pub fn render(&mut self, camera: &Camera, mode: RenderMode) -> FrameStats {
        let view = Viewer::new(camera, &self.config);
        let mut stats = FrameStats::default();

        self.fb.reset_depth();
        columns::draw_background(&mut self.fb, &view, self.config.sky, self.config.ground);

        for x in 0..self.fb.w {
            let march = columns::march_column(&self.scene, camera, &view, x);
            stats.slices += march.slices.len();
            if march.truncated {
                stats.truncated_columns += 1;
            }
            columns::composite_column(&mut self.fb, &view, x, &march.slices, mode);
        }

        stats.sprites_drawn = sprites::draw_objects(&self.scene, &mut self.fb, camera, &view, mode);

        if mode == RenderMode::DepthBuffer {
            self.paint_depth();
        }
        stats
    }

    /// Overhead map in the top-left corner, over whatever is in the frame.
    pub fn render_top_down(&mut self, camera: &Camera) {
        top_down::render_top_down(&self.scene, &mut self.fb, camera);
    }

    /// Replace the frame with a grey heat-map of the depth buffer.
    fn paint_depth(&mut self) {
        for (px, &d) in self.fb.pixels.iter_mut().zip(&self.fb.depth) {
            let v = if d > 1.0 { (255.0 / d).floor() as u8 } else { 255 };
            *px = Colour::rgb(v, v, v).to_argb();
        }
    }

    pub fn frame(&self) -> &[Rgba] {
        &self.fb.pixels
    }

    /// Per-pixel distance of the nearest surface, `+∞` where only sky or
    /// ground was drawn.
    pub fn depth(&self) -> &[f64] {
        &self.fb.depth
    }

    /// Hand the finished frame to `present` (e.g. a window update).
    pub fn end_frame<R>(&self, present: impl FnOnce(&[Rgba], usize, usize) -> R) -> R {
        present(&self.fb.pixels, self.fb.w, self.fb.h)
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{GridMap, MovementParams, Object, Texture};
    use glam::DVec3;
    use std::{f64::consts::{FRAC_PI_2, FRAC_PI_3}, sync::Arc};

    const WALL: Colour = Colour::rgb(200, 0, 0);
    const YELLOW: Colour = Colour::rgb(255, 255, 0);

    /* tiny helpers ---------------------------------------------------*/
    fn camera() -> Camera {
        Camera::new(DVec3::new(5.5, 3.5, 0.5), FRAC_PI_2).with_fov(FRAC_PI_3)
    }

    fn renderer(map: GridMap) -> Software<GridMap> {
        let mut cfg = RenderConfig::for_window(640, 480);
        cfg.unit_block_height = 512.0;
        Software::new(map, cfg)
    }

    fn sprite(x: f64, y: f64, colour: Colour) -> Object {
        Object::new(
            0.5,
            0.5,
            Camera::new(DVec3::new(x, y, 0.5), 0.0),
            MovementParams::default(),
        )
        .with_texture(Arc::new(Texture::solid("sprite", 8, 8, colour)))
    }

    fn px(sw: &Software<GridMap>, x: usize, y: usize) -> Colour {
        Colour::from_argb(sw.frame()[y * 640 + x])
    }

    fn is_yellowish(c: Colour) -> bool {
        c.r > 0 && c.g > 0 && c.b == 0
    }

    #[test]
    fn single_block_end_to_end() {
        let mut map = GridMap::new(16, 16);
        map.set_block(5, 5, 1.0, WALL, None).unwrap();
        let mut sw = renderer(map);
        let stats = sw.render(&camera(), RenderMode::Normal);
        assert!(stats.slices > 0);
        assert_eq!(stats.truncated_columns, 0);

        for y in 69..=410 {
            let c = px(&sw, 320, y);
            assert!(c.r > 0 && c.g == 0 && c.b == 0, "row {y}: {c:?}");
        }
        for y in 0..60 {
            let c = px(&sw, 320, y);
            assert!(c.b > 0 && c.r == 0 && c.g == 0, "sky row {y}: {c:?}");
        }
        for y in 416..480 {
            let c = px(&sw, 320, y);
            assert!(c.g > 0 && c.r == 0 && c.b == 0, "ground row {y}: {c:?}");
        }
        for x in (0..130).chain(510..640) {
            for y in 0..480 {
                assert_eq!(px(&sw, x, y).r, 0, "wall leaked into column {x}");
            }
        }
        assert!((sw.depth()[240 * 640 + 320] - 1.5).abs() < 1e-9);
        assert_eq!(sw.depth()[10 * 640 + 320], f64::INFINITY);
    }

    #[test]
    fn depth_buffer_holds_nearest_surface() {
        let mut map = GridMap::new(16, 16);
        map.set_block(5, 5, 0.5, WALL, None).unwrap();
        map.set_block(5, 8, 2.0, Colour::WHITE, None).unwrap();
        let mut sw = renderer(map);
        sw.render(&camera(), RenderMode::Normal);

        let depth = |y: usize| sw.depth()[y * 640 + 320];
        assert!((depth(100) - 4.5).abs() < 1e-9);
        assert!((depth(300) - 1.5).abs() < 1e-9);
        assert_eq!(depth(50), f64::INFINITY);
    }

    #[test]
    fn sprite_behind_wall_is_hidden() {
        let mut map = GridMap::new(16, 16);
        map.set_block(5, 5, 1.0, WALL, None).unwrap();
        map.add_object(sprite(5.5, 6.5, YELLOW));
        let mut sw = renderer(map);
        sw.render(&camera(), RenderMode::Normal);
        assert!(!sw.frame().iter().any(|&p| is_yellowish(Colour::from_argb(p))));

        // same sprite with the wall removed
        sw.scene_mut().clear_block(5, 5).unwrap();
        let stats = sw.render(&camera(), RenderMode::Normal);
        assert_eq!(stats.sprites_drawn, 1);
        assert!(sw.frame().iter().any(|&p| is_yellowish(Colour::from_argb(p))));
    }

    #[test]
    fn sprite_in_front_of_wall_is_drawn() {
        let mut map = GridMap::new(16, 16);
        map.set_block(5, 5, 1.0, WALL, None).unwrap();
        map.add_object(sprite(5.5, 4.5, YELLOW));
        let mut sw = renderer(map);
        sw.render(&camera(), RenderMode::Normal);
        assert!(is_yellowish(px(&sw, 320, 260)));
    }

    #[test]
    fn nearer_sprite_wins_in_either_order() {
        let cyan = Colour::rgb(0, 255, 255);
        for flip in [false, true] {
            let mut map = GridMap::new(32, 32);
            let (near, far) = (sprite(5.5, 8.5, YELLOW), sprite(5.5, 13.5, cyan));
            if flip {
                map.add_object(far);
                map.add_object(near);
            } else {
                map.add_object(near);
                map.add_object(far);
            }
            let mut sw = renderer(map);
            let stats = sw.render(&camera(), RenderMode::Normal);
            assert_eq!(stats.sprites_drawn, 2);
            assert!(is_yellowish(px(&sw, 320, 250)), "flip={flip}");
        }
    }

    #[test]
    fn long_corridor_of_low_blocks_hits_the_cap() {
        let mut map = GridMap::new(128, 3);
        for x in 1..120 {
            map.set_block(x, 1, 0.1, WALL, None).unwrap();
        }
        let mut sw = renderer(map);
        let cam = Camera::new(DVec3::new(0.5, 1.5, 0.5), 0.0).with_max_dist(100.0);
        let stats = sw.render(&cam, RenderMode::Normal);
        assert!(stats.truncated_columns >= 1);
    }

    #[test]
    fn depth_view_is_a_heat_map() {
        let mut map = GridMap::new(16, 16);
        map.set_block(5, 5, 1.0, WALL, None).unwrap();
        let mut sw = renderer(map);
        sw.render(&camera(), RenderMode::DepthBuffer);
        // 1.5 → 255/1.5 = 170
        assert_eq!(px(&sw, 320, 240), Colour::rgb(170, 170, 170));
        // sky: infinite depth renders black
        assert_eq!(px(&sw, 320, 10), Colour::BLACK);
    }

    #[test]
    fn pitch_moves_the_horizon() {
        let mut sw = renderer(GridMap::new(4, 4));
        let cam = camera().with_pitch(0.2);
        sw.render(&cam, RenderMode::Normal);
        // horizon is now below row 240, so row 250 is still sky
        let c = px(&sw, 320, 250);
        assert!(c.b > 0 && c.g == 0);
    }

    #[test]
    fn end_frame_hands_over_the_buffer() {
        let mut sw = renderer(GridMap::new(4, 4));
        sw.render(&camera(), RenderMode::Normal);
        let (len, w, h) = sw.end_frame(|buf, w, h| (buf.len(), w, h));
        assert_eq!((len, w, h), (640 * 480, 640, 480));
    }

    #[test]
    fn resize_reallocates() {
        let mut sw = renderer(GridMap::new(4, 4));
        sw.resize(320, 200);
        sw.render(&camera(), RenderMode::Normal);
        assert_eq!(sw.frame().len(), 320 * 200);
        assert_eq!(sw.depth().len(), 320 * 200);
    }
}
