//! TCP segments (RFC 793, RFC 3168 for the ECN bits).
//!
//! Options live in a second [`Layout`](crate::engine::Layout) behind the
//! fixed header. TCP carries no discriminator; the payload is always opaque.

pub mod layout;
mod options;
pub mod packet;

use crate::engine::PacketKind;

pub const KIND: PacketKind = PacketKind::new("tcp");

pub use packet::Tcp;
