//! Rendering abstraction layer.
//!
//! *The renderer never owns or mutates the world.* Everything it needs comes
//! through a [`Scene`]: one query for the block occupying a grid cell and one
//! for the billboard objects worth considering this frame.
//!
//! * [`software::Software`] is the CPU column caster; it owns the frame-buffer
//!   and the per-pixel depth buffer.
//! * [`RenderConfig`] carries the construction-time constants: window size,
//!   unit block height, brightness bounds, sky and ground colours.

use crate::{
    colour::Colour,
    world::{Camera, Object, Texture},
};

/// Pixel format of the software frame-buffer (0xAARRGGBB).
pub type Rgba = u32;

/// What occupies one grid cell.
#[derive(Clone, Copy, Debug)]
pub struct BlockInfo<'a> {
    /// Height as a fraction of the unit block; `0.0` means no block.
    pub height: f64,
    /// Flat colour: used for the roof always, and for walls when untextured.
    pub colour: Colour,
    pub texture: Option<&'a Texture>,
}

/// The world as the renderer sees it.
///
/// Both calls happen synchronously inside `render`, possibly thousands of
/// times per frame for `query_block`; implementations must not block.
pub trait Scene {
    /// Block at world cell `(cell_x, cell_y)`, which covers
    /// `[cell_x, cell_x + 1) × [cell_y, cell_y + 1)`. `None` for empty or
    /// out-of-range cells.
    fn query_block(&self, cell_x: i32, cell_y: i32) -> Option<BlockInfo<'_>>;

    /// Sprites the renderer should consider from `camera`. Culling is up to
    /// the implementation; the renderer rejects off-screen objects itself.
    fn objects_near(&self, camera: &Camera) -> Vec<&Object>;
}

/// Construction-time constants for a renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderConfig {
    pub width: usize,
    pub height: usize,
    /// On-screen height, in pixels, of a unit block one unit away. Larger
    /// values stretch blocks vertically relative to their width.
    pub unit_block_height: f64,
    pub brightness_min: f64,
    pub brightness_max: f64,
    pub sky: Colour,
    pub ground: Colour,
}

impl RenderConfig {
    /// Defaults scaled for a `width × height` window.
    pub fn for_window(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            unit_block_height: 512.0 * width as f64 / 640.0,
            brightness_min: 0.0,
            brightness_max: 1.0,
            sky: Colour::BLUE,
            ground: Colour::GREEN,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::for_window(640, 480)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderMode {
    #[default]
    Normal,
    /// Run the full pipeline but only record depth, then show the depth
    /// buffer as a grey-scale heat-map.
    DepthBuffer,
}

/// Counters for one rendered frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Wall slices composited across all columns.
    pub slices: usize,
    /// Columns whose march stopped at the slice cap.
    pub truncated_columns: usize,
    /// Objects that survived visibility rejection and were rasterised.
    pub sprites_drawn: usize,
}

pub mod software;
