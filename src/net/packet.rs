//! # Player-state datagram
//!
//! ```text
//! offset  size  field
//! 0       4     sequence id      (u32, big-endian)
//! 4       1     player count N   (u8)
//! 5       16·N  N × { x, y, z, yaw }  (f32 each, little-endian)
//! ```
//!
//! The buffer length must match `5 + 16·N` exactly.

use byteorder::{BigEndian as BE, LittleEndian as LE, ReadBytesExt, WriteBytesExt};
use std::io::{self, Cursor};
use thiserror::Error;

use crate::world::Camera;

pub const MAX_PLAYERS: usize = u8::MAX as usize;

const HEADER_LEN: usize = 4 + 1;
const ENTRY_LEN: usize = 4 * 4;

#[derive(Error, Debug)]
pub enum PacketError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("packet of {0} bytes is shorter than its header")]
    Truncated(usize),

    #[error("packet announces {count} players ({expected} bytes) but holds {actual} bytes")]
    LengthMismatch {
        count: u8,
        expected: usize,
        actual: usize,
    },

    #[error("more than {max} players in one packet", max = MAX_PLAYERS)]
    TooManyPlayers,
}

/// One player's pose as sent over the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub yaw: f32,
}

impl PlayerState {
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            x: camera.x() as f32,
            y: camera.y() as f32,
            z: camera.z() as f32,
            yaw: camera.yaw() as f32,
        }
    }

    /// Move `camera` to this pose; pitch and lens settings are kept.
    pub fn apply_to(&self, camera: &mut Camera) {
        camera.set_x(self.x as f64);
        camera.set_y(self.y as f64);
        camera.set_z(self.z as f64);
        camera.set_yaw(self.yaw as f64);
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerStatePacket {
    pub id: u32,
    players: Vec<PlayerState>,
}

impl PlayerStatePacket {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            players: Vec::new(),
        }
    }

    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }

    pub fn push(&mut self, player: PlayerState) -> Result<(), PacketError> {
        if self.players.len() == MAX_PLAYERS {
            return Err(PacketError::TooManyPlayers);
        }
        self.players.push(player);
        Ok(())
    }

    /// Serialised size in bytes.
    pub fn encoded_len(&self) -> usize {
        HEADER_LEN + ENTRY_LEN * self.players.len()
    }

    pub fn encode(&self) -> Result<Vec<u8>, PacketError> {
        let count = u8::try_from(self.players.len()).map_err(|_| PacketError::TooManyPlayers)?;
        let mut out = Vec::with_capacity(self.encoded_len());
        out.write_u32::<BE>(self.id)?;
        out.write_u8(count)?;
        for p in &self.players {
            out.write_f32::<LE>(p.x)?;
            out.write_f32::<LE>(p.y)?;
            out.write_f32::<LE>(p.z)?;
            out.write_f32::<LE>(p.yaw)?;
        }
        Ok(out)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PacketError> {
        if bytes.len() < HEADER_LEN {
            return Err(PacketError::Truncated(bytes.len()));
        }
        let mut cur = Cursor::new(bytes);
        let id = cur.read_u32::<BE>()?;
        let count = cur.read_u8()?;

        let expected = HEADER_LEN + ENTRY_LEN * count as usize;
        if bytes.len() != expected {
            return Err(PacketError::LengthMismatch {
                count,
                expected,
                actual: bytes.len(),
            });
        }

        let mut players = Vec::with_capacity(count as usize);
        for _ in 0..count {
            players.push(PlayerState {
                x: cur.read_f32::<LE>()?,
                y: cur.read_f32::<LE>()?,
                z: cur.read_f32::<LE>()?,
                yaw: cur.read_f32::<LE>()?,
            });
        }
        Ok(Self { id, players })
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
