//! IGMP (RFC 2236, RFC 3376).
//!
//! The common header dispatches on its type to the IGMPv2 body or the
//! IGMPv3 report. A membership query is ambiguous by type alone: one of at
//! least [`layout::V3_QUERY_MINLEN`] bytes decodes as an IGMPv3 query. The
//! checksum covers the header and everything after it.

pub mod layout;
pub mod packet;
pub mod v2;
pub mod v3;

use crate::engine::PacketKind;

pub const KIND: PacketKind = PacketKind::new("igmp");

pub use packet::{IGMP_MAP, Igmp, describe};
pub use v2::IgmpV2;
pub use v3::{GroupRecord, IgmpV3Query, IgmpV3Report};
