use std::ops::Range;

use crate::engine::{Field, Layout, PacketError};

pub const VERSION: usize = 0;
pub const TRAFFIC_CLASS: usize = 1;
pub const FLOW: usize = 2;
pub const LENGTH: usize = 3;
pub const NEXT_HEADER: usize = 4;
pub const HOP_LIMIT: usize = 5;
pub const SRC: usize = 6;
pub const DST: usize = 7;

pub const HEADER_LEN: usize = 40;
pub const ADDRESSES_RANGE: Range<usize> = 8..40;

pub const NH_TCP: u8 = 6;
pub const NH_UDP: u8 = 17;
pub const NH_ICMPV6: u8 = 58;

pub fn layout() -> Result<Layout, PacketError> {
    Layout::from_fields([
        Field::new("version", 4).with_default(6),
        Field::new("traffic_class", 8),
        Field::new("flow", 20),
        Field::new("length", 16),
        Field::new("next_header", 8).discriminator(),
        Field::new("hop_limit", 8).with_default(64),
        Field::new("src", 128),
        Field::new("dst", 128),
    ])
}
