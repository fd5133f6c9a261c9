use crate::engine::{Field, Layout, PacketError};

pub const SPORT: usize = 0;
pub const DPORT: usize = 1;
pub const LENGTH: usize = 2;
pub const CHECKSUM: usize = 3;

pub const HEADER_LEN: usize = 8;
pub const PROTOCOL: u8 = 17;

pub fn layout() -> Result<Layout, PacketError> {
    Layout::from_fields([
        Field::new("sport", 16),
        Field::new("dport", 16),
        Field::new("length", 16).with_default(HEADER_LEN as u128),
        Field::new("checksum", 16),
    ])
}
