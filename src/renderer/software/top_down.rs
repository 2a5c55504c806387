//! Overhead debug map drawn into the top-left corner of the frame.
//!
//! Purely diagnostic: flat block colours, a grid, the cells crossed by a ray
//! along the camera's yaw, a crosshair at the eye and a line of sight. No
//! depth buffer and no perspective.

use crate::{
    colour::Colour,
    renderer::{Scene, software::frame::{FrameBuffers, Rect}},
    world::{Camera, Ray},
};

/// Screen pixels are divided by this when mapping world → panel.
const DIVISOR: i32 = 4;
/// Width/height of a cell before division.
const CELL: i32 = 16 * DIVISOR;
/// Cells highlighted along the debug ray, at most.
const RAY_CELLS: usize = 64;
const CROSSHAIR: i32 = 2;
const SIGHT_LEN: f64 = 64.0;

struct Panel {
    cam_x: f64,
    cam_y: f64,
    half_w: f64,
    half_h: f64,
}

impl Panel {
    #[inline]
    fn sx(&self, x: f64) -> i32 {
        (self.half_w + CELL as f64 * (self.cam_x - x)) as i32 / DIVISOR
    }
    #[inline]
    fn sy(&self, y: f64) -> i32 {
        (self.half_h + CELL as f64 * (self.cam_y - y)) as i32 / DIVISOR
    }
}

pub(crate) fn render_top_down<S: Scene>(scene: &S, fb: &mut FrameBuffers, camera: &Camera) {
    let (w, h) = (fb.w as i32, fb.h as i32);
    let cells_wide = w / CELL;
    let cells_high = h / CELL;
    let clip = Rect::new(0, 0, cells_wide * CELL / DIVISOR, cells_high * CELL / DIVISOR);
    let p = Panel {
        cam_x: camera.x(),
        cam_y: camera.y(),
        half_w: (w / 2) as f64,
        half_h: (h / 2) as f64,
    };

    let min_x = camera.x().ceil() as i32 - cells_wide / 2;
    let max_x = camera.x().floor() as i32 + cells_wide / 2;
    let min_y = camera.y().ceil() as i32 - cells_high / 2;
    let max_y = camera.y().floor() as i32 + cells_high / 2;

    fb.fill_rect(clip, Colour::BLACK, clip);

    // Cell (cx, cy) spans world [cx, cx+1); the panel mirrors both axes, so
    // its screen rectangle starts at the far corner.
    let cell_rect = |cx: i32, cy: i32, inset: i32| {
        Rect::new(
            p.sx((cx + 1) as f64) + inset,
            p.sy((cy + 1) as f64) + inset,
            (CELL - inset) / DIVISOR,
            (CELL - inset) / DIVISOR,
        )
    };

    for cy in min_y..=max_y {
        for cx in min_x..=max_x {
            if let Some(block) = scene.query_block(cx, cy) {
                fb.fill_rect(cell_rect(cx, cy, 0), block.colour, clip);
            }
        }
    }

    for x in min_x..=max_x {
        let sx = p.sx(x as f64);
        fb.draw_line(sx, 0, sx, h / DIVISOR, Colour::GREY, clip);
    }
    for y in min_y..=max_y {
        let sy = p.sy(y as f64);
        fb.draw_line(0, sy, w / DIVISOR, sy, Colour::GREY, clip);
    }

    let mut ray = Ray::new(camera.x(), camera.y(), camera.yaw());
    for _ in 0..RAY_CELLS {
        let c = ray.cell();
        if c.x < min_x || c.x >= max_x || c.y < min_y || c.y >= max_y {
            break;
        }
        fb.fill_rect(cell_rect(c.x, c.y, 1), Colour::RED, clip);
        ray.next();
    }

    let (ex, ey) = (p.sx(camera.x()), p.sy(camera.y()));
    let k = CROSSHAIR;
    fb.draw_line(ex - k, ey - k, ex + k, ey + k, Colour::BLUE, clip);
    fb.draw_line(ex - k, ey + k, ex + k, ey - k, Colour::BLUE, clip);

    let f = camera.forward() * SIGHT_LEN;
    let (tx, ty) = (p.sx(camera.x() + f.x), p.sy(camera.y() + f.y));
    fb.draw_line(ex, ey, tx, ty, Colour::GREEN, clip);
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{renderer::BlockInfo, world::Object};
    use glam::DVec3;
    use std::f64::consts::FRAC_PI_2;

    struct Two;
    impl Scene for Two {
        fn query_block(&self, x: i32, y: i32) -> Option<BlockInfo<'_>> {
            let colour = match (x, y) {
                (3, 3) => Colour::rgb(10, 20, 30),
                (5, 5) => Colour::WHITE,
                _ => return None,
            };
            Some(BlockInfo {
                height: 1.0,
                colour,
                texture: None,
            })
        }
        fn objects_near(&self, _camera: &Camera) -> Vec<&Object> {
            Vec::new()
        }
    }

    fn draw() -> FrameBuffers {
        let mut fb = FrameBuffers::new(640, 480);
        fb.clear(Colour::rgb(1, 1, 1));
        let cam = Camera::new(DVec3::new(5.5, 3.5, 0.5), FRAC_PI_2);
        render_top_down(&Two, &mut fb, &cam);
        fb
    }

    fn at(fb: &FrameBuffers, x: usize, y: usize) -> Colour {
        Colour::from_argb(fb.pixels[fb.idx(x, y)])
    }

    #[test]
    fn block_is_filled_with_its_colour() {
        let fb = draw();
        assert_eq!(at(&fb, 110, 60), Colour::rgb(10, 20, 30));
    }

    #[test]
    fn ray_cells_are_highlighted() {
        let fb = draw();
        // (5,5) lies on the ray: highlight replaces the block colour
        assert_eq!(at(&fb, 76, 28), Colour::RED);
    }

    #[test]
    fn crosshair_and_line_of_sight() {
        let fb = draw();
        assert_eq!(at(&fb, 78, 58), Colour::BLUE);
        assert_eq!(at(&fb, 80, 40), Colour::GREEN);
    }

    #[test]
    fn nothing_escapes_the_panel() {
        let fb = draw();
        assert_eq!(at(&fb, 300, 300), Colour::rgb(1, 1, 1));
        assert_eq!(at(&fb, 80, 200), Colour::rgb(1, 1, 1));
        assert_eq!(at(&fb, 0, 0), Colour::BLACK);
    }
}
