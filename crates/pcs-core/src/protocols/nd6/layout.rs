use crate::engine::{Field, Layout, PacketError};

pub const SOLICIT_RESERVED: usize = 0;
pub const SOLICIT_TARGET: usize = 1;

pub const ADVERT_ROUTER: usize = 0;
pub const ADVERT_SOLICITED: usize = 1;
pub const ADVERT_OVERRIDE: usize = 2;
pub const ADVERT_RESERVED: usize = 3;
pub const ADVERT_TARGET: usize = 4;

/// Both messages are 20 bytes before their options.
pub const MESSAGE_LEN: usize = 20;

pub fn solicit_layout() -> Result<Layout, PacketError> {
    Layout::from_fields([Field::new("reserved", 32), Field::new("target", 128)])
}

pub fn advert_layout() -> Result<Layout, PacketError> {
    Layout::from_fields([
        Field::new("router", 1),
        Field::new("solicited", 1),
        Field::new("override", 1),
        Field::new("reserved", 29),
        Field::new("target", 128),
    ])
}
