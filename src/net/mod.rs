//! Wire formats shared between game clients and the relay server.
//!
//! Only the fixed binary state-sync packet lives here; sockets and the
//! line-oriented control channel are the application's business.

mod packet;

pub use packet::{MAX_PLAYERS, PacketError, PlayerState, PlayerStatePacket};
