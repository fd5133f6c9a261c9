use crate::engine::{Field, Layout, PacketError};

pub const DST: usize = 0;
pub const SRC: usize = 1;
pub const ETHER_TYPE: usize = 2;

pub const HEADER_LEN: usize = 14;

pub const ETHERTYPE_IPV4: u16 = 0x0800;
pub const ETHERTYPE_IPV6: u16 = 0x86dd;

pub fn layout() -> Result<Layout, PacketError> {
    Layout::from_fields([
        Field::new("dst", 48),
        Field::new("src", 48),
        Field::new("type", 16).discriminator(),
    ])
}
