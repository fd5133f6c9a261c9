//! IPv4 datagrams (RFC 791).
//!
//! The protocol field selects IGMP, TCP or UDP. Options are kept as raw
//! bytes behind the fixed header and counted by `hlen`. The total length
//! bounds the payload; anything after it (Ethernet minimum-frame padding,
//! typically) is kept as a trailer so the frame re-encodes byte for byte.
//! Non-first fragments are never dispatched.

pub mod layout;
pub mod packet;

use crate::engine::PacketKind;

pub const KIND: PacketKind = PacketKind::new("ipv4");

pub use packet::{IPV4_MAP, Ipv4};
