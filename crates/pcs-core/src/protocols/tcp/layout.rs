use crate::engine::{Field, Layout, PacketError};

pub const SPORT: usize = 0;
pub const DPORT: usize = 1;
pub const SEQUENCE: usize = 2;
pub const ACK_NUMBER: usize = 3;
pub const OFFSET: usize = 4;
pub const RESERVED: usize = 5;
pub const NS: usize = 6;
pub const CWR: usize = 7;
pub const ECE: usize = 8;
pub const URGENT: usize = 9;
pub const ACK: usize = 10;
pub const PUSH: usize = 11;
pub const RESET: usize = 12;
pub const SYN: usize = 13;
pub const FIN: usize = 14;
pub const WINDOW: usize = 15;
pub const CHECKSUM: usize = 16;
pub const URG_POINTER: usize = 17;

pub const HEADER_LEN: usize = 20;
pub const MAX_OPTIONS_LEN: usize = 40;
/// IP protocol number used in the pseudo header.
pub const PROTOCOL: u8 = 6;

pub const OPT_EOL: u8 = 0;
pub const OPT_NOP: u8 = 1;
pub const OPT_MSS: u8 = 2;
pub const OPT_WINDOW_SCALE: u8 = 3;
pub const OPT_SACK_PERMITTED: u8 = 4;
pub const OPT_SACK: u8 = 5;
pub const OPT_TIMESTAMP: u8 = 8;

pub fn layout() -> Result<Layout, PacketError> {
    Layout::from_fields([
        Field::new("sport", 16),
        Field::new("dport", 16),
        Field::new("sequence", 32),
        Field::new("ack_number", 32),
        Field::new("offset", 4).with_default(5),
        Field::new("reserved", 3),
        Field::new("ns", 1),
        Field::new("cwr", 1),
        Field::new("ece", 1),
        Field::new("urgent", 1),
        Field::new("ack", 1),
        Field::new("push", 1),
        Field::new("reset", 1),
        Field::new("syn", 1),
        Field::new("fin", 1),
        Field::new("window", 16),
        Field::new("checksum", 16),
        Field::new("urg_pointer", 16),
    ])
}
