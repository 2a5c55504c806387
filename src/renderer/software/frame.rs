//! Colour + depth scratch buffers and the few raster primitives the
//! renderer needs (rows, column spans, rectangles, lines).

use crate::{colour::Colour, renderer::Rgba};

/// Screen-space rectangle, used both for fills and as a clip region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.w && y < self.y + self.h
    }

    pub fn intersect(&self, o: &Rect) -> Rect {
        let x0 = self.x.max(o.x);
        let y0 = self.y.max(o.y);
        let x1 = (self.x + self.w).min(o.x + o.w);
        let y1 = (self.y + self.h).min(o.y + o.h);
        Rect::new(x0, y0, (x1 - x0).max(0), (y1 - y0).max(0))
    }
}

/// Frame-buffer plus one depth value per pixel.
#[derive(Default)]
pub(crate) struct FrameBuffers {
    pub w: usize,
    pub h: usize,
    pub pixels: Vec<Rgba>,
    pub depth: Vec<f64>,
}

impl FrameBuffers {
    pub fn new(w: usize, h: usize) -> Self {
        let mut fb = Self::default();
        fb.resize(w, h);
        fb
    }

    /// (Re)allocate for a new resolution. Contents are unspecified until
    /// the next frame clears them.
    pub fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.pixels.resize(w * h, 0);
        self.depth.resize(w * h, f64::INFINITY);
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.w as i32, self.h as i32)
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.w + x
    }

    pub fn clear(&mut self, colour: Colour) {
        self.pixels.fill(colour.to_argb());
    }

    pub fn reset_depth(&mut self) {
        self.depth.fill(f64::INFINITY);
    }

    pub fn fill_row(&mut self, y: usize, colour: Colour) {
        let start = self.idx(0, y);
        self.pixels[start..start + self.w].fill(colour.to_argb());
    }

    /// Rows `y0..=y1` of column `x`, clipped to the screen; `None` if empty.
    #[inline]
    pub fn clip_span(&self, y0: i32, y1: i32) -> Option<(usize, usize)> {
        let y0 = y0.max(0);
        let y1 = y1.min(self.h as i32 - 1);
        (y0 <= y1).then_some((y0 as usize, y1 as usize))
    }

    pub fn vline(&mut self, x: usize, y0: i32, y1: i32, colour: Colour) {
        if let Some((a, b)) = self.clip_span(y0, y1) {
            let px = colour.to_argb();
            for y in a..=b {
                let i = self.idx(x, y);
                self.pixels[i] = px;
            }
        }
    }

    /// Record a wall depth. Walls arrive back-to-front, so a write must
    /// never move a pixel farther away; equal distances are allowed.
    #[inline]
    pub fn write_depth(&mut self, x: usize, y: usize, distance: f64) {
        let i = self.idx(x, y);
        debug_assert!(
            distance <= self.depth[i],
            "depth order violated at ({x},{y}): {distance} > {}",
            self.depth[i]
        );
        self.depth[i] = distance;
    }

    /// Record a depth only where it is nearer than what is there.
    #[inline]
    pub fn lower_depth(&mut self, x: usize, y: usize, distance: f64) {
        let i = self.idx(x, y);
        if distance < self.depth[i] {
            self.depth[i] = distance;
        }
    }

    pub fn fill_rect(&mut self, r: Rect, colour: Colour, clip: Rect) {
        let r = r.intersect(&clip).intersect(&self.bounds());
        let px = colour.to_argb();
        for y in r.y..r.y + r.h {
            let start = self.idx(r.x as usize, y as usize);
            self.pixels[start..start + r.w as usize].fill(px);
        }
    }

    /// Integer Bresenham line-drawing algorithm, clipped per pixel.
    pub fn draw_line(
        &mut self,
        mut x0: i32,
        mut y0: i32,
        x1: i32,
        y1: i32,
        colour: Colour,
        clip: Rect,
    ) {
        let clip = clip.intersect(&self.bounds());
        let px = colour.to_argb();
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            if clip.contains(x0, y0) {
                let i = self.idx(x0 as usize, y0 as usize);
                self.pixels[i] = px;
            }
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                if x0 == x1 {
                    break;
                }
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                if y0 == y1 {
                    break;
                }
                err += dx;
                y0 += sy;
            }
        }
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vline_is_clipped() {
        let mut fb = FrameBuffers::new(4, 4);
        fb.clear(Colour::BLACK);
        fb.vline(1, -10, 1, Colour::RED);
        let red = Colour::RED.to_argb();
        assert_eq!(fb.pixels[fb.idx(1, 0)], red);
        assert_eq!(fb.pixels[fb.idx(1, 1)], red);
        assert_ne!(fb.pixels[fb.idx(1, 2)], red);
        fb.vline(2, 7, 9, Colour::RED); // fully below
        assert!(fb.clip_span(7, 9).is_none());
    }

    #[test]
    fn lower_depth_only_decreases() {
        let mut fb = FrameBuffers::new(2, 2);
        fb.reset_depth();
        fb.lower_depth(0, 0, 5.0);
        fb.lower_depth(0, 0, 7.0);
        assert_eq!(fb.depth[0], 5.0);
        fb.write_depth(0, 0, 5.0); // tie accepted
        fb.write_depth(0, 0, 2.0);
        assert_eq!(fb.depth[0], 2.0);
    }

    #[test]
    #[should_panic(expected = "depth order violated")]
    #[cfg(debug_assertions)]
    fn farther_wall_write_is_caught() {
        let mut fb = FrameBuffers::new(1, 1);
        fb.reset_depth();
        fb.write_depth(0, 0, 1.0);
        fb.write_depth(0, 0, 2.0);
    }

    #[test]
    fn rect_and_line_stay_inside_clip() {
        let mut fb = FrameBuffers::new(8, 8);
        fb.clear(Colour::BLACK);
        let clip = Rect::new(0, 0, 4, 4);
        fb.fill_rect(Rect::new(2, 2, 10, 10), Colour::WHITE, clip);
        fb.draw_line(0, 7, 7, 0, Colour::RED, clip);
        for y in 0..8 {
            for x in 0..8 {
                let px = fb.pixels[fb.idx(x, y)];
                if x >= 4 || y >= 4 {
                    assert_eq!(px, Colour::BLACK.to_argb(), "({x},{y})");
                }
            }
        }
        assert_eq!(fb.pixels[fb.idx(3, 3)], Colour::WHITE.to_argb());
    }
}
