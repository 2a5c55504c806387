//! Per-column ray march and back-to-front compositing of wall slices.
//!
//! A column is processed in two passes. [`march_column`] walks the grid away
//! from the eye, recording a [`BlockDisplaySlice`] for every occupied cell it
//! crosses. [`composite_column`] then paints those slices farthest first, so
//! nearer walls overwrite farther ones and depth writes only ever decrease.

use smallvec::SmallVec;

use crate::{
    colour::Colour,
    renderer::{BlockInfo, RenderMode, Scene, software::frame::FrameBuffers},
    world::{Camera, Ray, Side},
};

use super::projection::Viewer;

/// Hard cap on slices per column; farther cells are dropped.
pub const MAX_SLICES: usize = 64;

/// Shade multiplier for faces struck on a `Side::Horizontal` crossing.
const HORIZONTAL_SIDE_SHADE: f64 = 0.6;
/// Roofs are drawn slightly brighter than the block colour.
const ROOF_SHADE: f64 = 1.05;

pub(crate) type SliceStack<'a> = SmallVec<[BlockDisplaySlice<'a>; MAX_SLICES]>;

/// Visible roof of a block whose top edge lies below the horizon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct TopStrip {
    /// Rows between the near and far top edges.
    pub size: i32,
    /// Ray distance at the far edge of the cell.
    pub next_distance: f64,
}

/// One occupied cell as seen from one screen column.
#[derive(Clone, Copy, Debug)]
pub(crate) struct BlockDisplaySlice<'a> {
    pub distance: f64,
    pub side: Side,
    /// Screen row of the bottom edge.
    pub base: i32,
    pub height: i32,
    pub top_strip: Option<TopStrip>,
    pub texture_x: Option<usize>,
    pub block: BlockInfo<'a>,
}

impl BlockDisplaySlice<'_> {
    #[inline]
    pub fn top(&self) -> i32 {
        self.base - self.height
    }
}

pub(crate) struct ColumnMarch<'a> {
    pub slices: SliceStack<'a>,
    /// The march stopped because the stack was full.
    pub truncated: bool,
}

/// Cast the ray for screen column `x` and collect the slices along it,
/// nearest first.
pub(crate) fn march_column<'s, S: Scene>(
    scene: &'s S,
    camera: &Camera,
    view: &Viewer,
    x: usize,
) -> ColumnMarch<'s> {
    let mut slices = SliceStack::new();
    let mut truncated = false;

    let mut ray = Ray::from_direction(camera.pos().truncate(), view.column_dir(x));
    ray.next();

    while ray.true_distance() < camera.max_dist() {
        let cell = ray.cell();
        let Some(block) = scene.query_block(cell.x, cell.y).filter(|b| b.height > 0.0) else {
            ray.next();
            continue;
        };
        if slices.len() == MAX_SLICES {
            truncated = true;
            break;
        }

        let distance = ray.true_distance();
        let base = view.display_base(distance);
        let height = view.display_height(block.height, distance);
        let mut slice = BlockDisplaySlice {
            distance,
            side: ray.side(),
            base,
            height,
            top_strip: None,
            texture_x: block.texture.map(|t| ray.texture_x(t.w)),
            block,
        };

        // Reaches the top of the screen: nothing behind can show. Wall
        // textures are opaque, so this holds for textured blocks too.
        if slice.top() <= 0 {
            slices.push(slice);
            break;
        }

        ray.next();

        let top = slice.top();
        if top > view.horizon {
            let next_distance = ray.true_distance();
            let next_top =
                view.display_base(next_distance) - view.display_height(block.height, next_distance);
            slice.top_strip = Some(TopStrip {
                size: top - next_top,
                next_distance,
            });
        }
        slices.push(slice);
    }

    ColumnMarch { slices, truncated }
}

/// Paint `slices` (nearest first) into column `x`, farthest first.
pub(crate) fn composite_column(
    fb: &mut FrameBuffers,
    view: &Viewer,
    x: usize,
    slices: &[BlockDisplaySlice<'_>],
    mode: RenderMode,
) {
    for slice in slices.iter().rev() {
        if let Some((y0, y1)) = fb.clip_span(slice.top(), slice.base) {
            if mode == RenderMode::Normal {
                draw_wall(fb, view, x, slice, (y0, y1));
            }
            for y in y0..=y1 {
                fb.write_depth(x, y, slice.distance);
            }
        }

        if let Some(strip) = slice.top_strip {
            draw_roof(fb, view, x, slice, strip, mode);
        }
    }
}

fn draw_wall(
    fb: &mut FrameBuffers,
    view: &Viewer,
    x: usize,
    slice: &BlockDisplaySlice<'_>,
    (y0, y1): (usize, usize),
) {
    let side_shade = if slice.side == Side::Horizontal {
        HORIZONTAL_SIDE_SHADE
    } else {
        1.0
    };
    let shade = side_shade * view.brightness(slice.distance);

    match (slice.block.texture, slice.texture_x) {
        (Some(tex), Some(tx)) if tex.h > 0 => {
            let top = slice.top();
            let rows = (slice.height + 1) as f64;
            for y in y0..=y1 {
                let v = ((y as i32 - top) as f64 * tex.h as f64 / rows) as usize;
                let texel = tex.pixel(tx, v);
                let px = Colour { a: 255, ..texel }.scaled(shade);
                let i = fb.idx(x, y);
                fb.pixels[i] = px.to_argb();
            }
        }
        _ => {
            let colour = slice.block.colour.scaled(shade);
            fb.vline(x, y0 as i32, y1 as i32, colour);
        }
    }
}

/// Roof rows `[top - size, top]`, with distance interpolated from the
/// slice distance at the near edge to `next_distance` at the far edge.
fn draw_roof(
    fb: &mut FrameBuffers,
    view: &Viewer,
    x: usize,
    slice: &BlockDisplaySlice<'_>,
    strip: TopStrip,
    mode: RenderMode,
) {
    let top = slice.top();
    let far = top - strip.size;
    let Some((y0, y1)) = fb.clip_span(far, top) else {
        return;
    };
    let roof = slice.block.colour.scaled(ROOF_SHADE);
    let span = strip.size.max(1) as f64;

    for y in y0..=y1 {
        let t = ((top - y as i32) as f64 / span).clamp(0.0, 1.0);
        let distance = slice.distance + (strip.next_distance - slice.distance) * t;
        if mode == RenderMode::Normal {
            let i = fb.idx(x, y);
            fb.pixels[i] = view.shade(roof, distance).to_argb();
        }
        fb.lower_depth(x, y, distance);
    }
}

/// Flat sky above the horizon, flat ground on and below it, each shaded by
/// its analytic plane distance.
pub(crate) fn draw_background(fb: &mut FrameBuffers, view: &Viewer, sky: Colour, ground: Colour) {
    for y in 0..fb.h {
        let row = y as i32;
        let base = if row < view.horizon { sky } else { ground };
        fb.fill_row(y, view.shade(base, view.row_distance(row)));
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
