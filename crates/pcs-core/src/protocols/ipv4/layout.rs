use std::ops::Range;

use crate::engine::{Field, Layout, PacketError};

pub const VERSION: usize = 0;
pub const HLEN: usize = 1;
pub const TOS: usize = 2;
pub const LENGTH: usize = 3;
pub const ID: usize = 4;
pub const FLAGS: usize = 5;
pub const OFFSET: usize = 6;
pub const TTL: usize = 7;
pub const PROTOCOL: usize = 8;
pub const CHECKSUM: usize = 9;
pub const SRC: usize = 10;
pub const DST: usize = 11;

/// Fixed header length; `hlen` counts 32-bit words including options.
pub const HEADER_LEN: usize = 20;
pub const MAX_OPTIONS_LEN: usize = 40;
pub const ADDRESSES_RANGE: Range<usize> = 12..20;

pub const FLAG_DONT_FRAGMENT: u8 = 0b010;
pub const FLAG_MORE_FRAGMENTS: u8 = 0b001;

pub const PROTO_IGMP: u8 = 2;
pub const PROTO_TCP: u8 = 6;
pub const PROTO_UDP: u8 = 17;

pub fn layout() -> Result<Layout, PacketError> {
    Layout::from_fields([
        Field::new("version", 4).with_default(4),
        Field::new("hlen", 4).with_default(5),
        Field::new("tos", 8),
        Field::new("length", 16).with_default(HEADER_LEN as u128),
        Field::new("id", 16),
        Field::new("flags", 3),
        Field::new("offset", 13),
        Field::new("ttl", 8).with_default(64),
        Field::new("protocol", 8).discriminator(),
        Field::new("checksum", 16),
        Field::new("src", 32),
        Field::new("dst", 32),
    ])
}
