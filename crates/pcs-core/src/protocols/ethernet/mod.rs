//! Ethernet II framing.
//!
//! The EtherType field is the discriminator; IPv4 and IPv6 payloads are
//! decoded, anything else is kept opaque.

pub mod layout;
pub mod packet;

use crate::engine::PacketKind;

pub const KIND: PacketKind = PacketKind::new("ethernet");

pub use packet::{ETHERNET_MAP, Ethernet};
