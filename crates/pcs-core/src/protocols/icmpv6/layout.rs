use crate::engine::{Field, Layout, PacketError};

pub const TYPE: usize = 0;
pub const CODE: usize = 1;
pub const CHECKSUM: usize = 2;

pub const HEADER_LEN: usize = 4;
pub const PROTOCOL: u8 = 58;

pub const ECHO_REQUEST: u8 = 128;
pub const ECHO_REPLY: u8 = 129;
pub const ND_ROUTER_SOLICIT: u8 = 133;
pub const ND_ROUTER_ADVERT: u8 = 134;
pub const ND_NEIGHBOR_SOLICIT: u8 = 135;
pub const ND_NEIGHBOR_ADVERT: u8 = 136;

pub fn layout() -> Result<Layout, PacketError> {
    Layout::from_fields([
        Field::new("type", 8).discriminator(),
        Field::new("code", 8),
        Field::new("checksum", 16),
    ])
}
