use crate::engine::{Field, Layout, PacketError};

pub const TYPE: usize = 0;
pub const CODE: usize = 1;
pub const CHECKSUM: usize = 2;

pub const HEADER_LEN: usize = 4;

pub const HOST_MEMBERSHIP_QUERY: u8 = 0x11;
pub const V1_HOST_MEMBERSHIP_REPORT: u8 = 0x12;
pub const DVMRP: u8 = 0x13;
pub const V2_HOST_MEMBERSHIP_REPORT: u8 = 0x16;
pub const HOST_LEAVE_MESSAGE: u8 = 0x17;
pub const MTRACE_REPLY: u8 = 0x1e;
pub const MTRACE_QUERY: u8 = 0x1f;
pub const V3_HOST_MEMBERSHIP_REPORT: u8 = 0x22;

/// A membership query at least this long, IGMP header included, is IGMPv3.
pub const V3_QUERY_MINLEN: usize = 12;

pub fn layout() -> Result<Layout, PacketError> {
    Layout::from_fields([
        Field::new("type", 8).discriminator(),
        Field::new("code", 8),
        Field::new("checksum", 16),
    ])
}

pub const V2_GROUP: usize = 0;

pub fn v2_layout() -> Result<Layout, PacketError> {
    Layout::from_fields([Field::new("group", 32)])
}

pub const QUERY_GROUP: usize = 0;
pub const QUERY_RESERVED: usize = 1;
pub const QUERY_SUPPRESS: usize = 2;
pub const QUERY_QRV: usize = 3;
pub const QUERY_QQIC: usize = 4;
pub const QUERY_NSRC: usize = 5;

pub fn v3_query_layout() -> Result<Layout, PacketError> {
    Layout::from_fields([
        Field::new("group", 32),
        Field::new("reserved", 4),
        Field::new("suppress", 1),
        Field::new("qrv", 3),
        Field::new("qqic", 8),
        Field::new("nsrc", 16),
    ])
}

pub const REPORT_RESERVED: usize = 0;
pub const REPORT_NRECORDS: usize = 1;

pub fn v3_report_layout() -> Result<Layout, PacketError> {
    Layout::from_fields([Field::new("reserved", 16), Field::new("nrecords", 16)])
}

pub const RECORD_TYPE: usize = 0;
pub const RECORD_AUXLEN: usize = 1;
pub const RECORD_NSRCS: usize = 2;
pub const RECORD_GROUP: usize = 3;

pub const MODE_IS_INCLUDE: u8 = 1;
pub const MODE_IS_EXCLUDE: u8 = 2;
pub const CHANGE_TO_INCLUDE: u8 = 3;
pub const CHANGE_TO_EXCLUDE: u8 = 4;
pub const ALLOW_NEW_SOURCES: u8 = 5;
pub const BLOCK_OLD_SOURCES: u8 = 6;

pub fn group_record_layout() -> Result<Layout, PacketError> {
    Layout::from_fields([
        Field::new("type", 8),
        Field::new("auxlen", 8),
        Field::new("nsrcs", 16),
        Field::new("group", 32),
    ])
}
