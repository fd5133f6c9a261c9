//! UDP datagrams (RFC 768).

pub mod layout;
pub mod packet;

use crate::engine::PacketKind;

pub const KIND: PacketKind = PacketKind::new("udp");

pub use packet::Udp;
