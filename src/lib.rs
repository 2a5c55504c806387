//! First-person grid raycaster: variable-height blocks, a shaded sky and
//! ground, and billboard sprites occluded through a per-pixel depth buffer.

pub mod colour;
pub mod net;
pub mod renderer;
pub mod world;
