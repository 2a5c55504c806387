mod camera;
mod map;
mod object;
mod ray;
mod texture;

pub use camera::{Camera, CameraError, PITCH_LIMIT, TargetInfo, normalise_angle};

pub use map::{Block, GridMap, MapError};

pub use object::{MovementParams, MovementState, Object};

pub use ray::{Ray, Side, UNREACHABLE};

pub use texture::{NO_TEXTURE, Texture, TextureBank, TextureError, TextureId};
