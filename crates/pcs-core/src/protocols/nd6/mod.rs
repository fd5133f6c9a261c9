//! Neighbor discovery messages carried in ICMPv6 (RFC 4861).
//!
//! Only the fixed part of each message is decoded; the trailing options
//! are kept as opaque bytes.

pub mod layout;
pub mod packet;

use crate::engine::PacketKind;

pub const SOLICIT_KIND: PacketKind = PacketKind::new("nd6_solicit");
pub const ADVERT_KIND: PacketKind = PacketKind::new("nd6_advert");

pub use packet::{Nd6Advert, Nd6Solicit};
