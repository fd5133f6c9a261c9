//! IPv6 fixed header (RFC 8200).
//!
//! Extension headers are not decoded: a next-header value outside the
//! dispatch table leaves the payload opaque.

pub mod layout;
pub mod packet;

use crate::engine::PacketKind;

pub const KIND: PacketKind = PacketKind::new("ipv6");

pub use packet::{IPV6_MAP, Ipv6};
