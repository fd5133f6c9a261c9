//! ICMPv6 (RFC 4443). Only the neighbor discovery messages are decoded
//! past the common header.

pub mod layout;
pub mod packet;

use crate::engine::PacketKind;

pub const KIND: PacketKind = PacketKind::new("icmpv6");

pub use packet::{ICMPV6_MAP, Icmpv6};
