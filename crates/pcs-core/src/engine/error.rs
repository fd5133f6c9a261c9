use thiserror::Error;

/// Errors raised while declaring layouts, decoding bytes or building packets.
///
/// Unknown discriminator values are not represented here: they decode into
/// an opaque payload. Checksum mismatches are not errors either, see
/// [`ChecksumStatus`](crate::ChecksumStatus).
///
/// # Examples
/// ```
/// use pcs_core::PacketError;
///
/// let err = PacketError::Layout { needed: 4, actual: 2 };
/// assert!(err.to_string().contains("need 4 bytes"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PacketError {
    #[error("value {value:#x} does not fit in {width}-bit field '{field}'")]
    Range {
        field: String,
        width: u32,
        value: u128,
    },
    #[error("layout too short: need {needed} bytes, got {actual}")]
    Layout { needed: usize, actual: usize },
    #[error("no discriminator value selects payload kind '{kind}'")]
    Discrimination { kind: String },
    #[error("truncated payload: {declared} bytes declared, {available} available")]
    TruncatedPayload { declared: usize, available: usize },
    #[error("non-zero padding bits ({bits:#x}) after last field")]
    Padding { bits: u8 },
    #[error("invalid width {width} for field '{field}' (expected 1..=128)")]
    InvalidWidth { field: String, width: u32 },
    #[error("duplicate field name '{field}'")]
    DuplicateField { field: String },
    #[error("layout already has a discriminator ('{existing}'), cannot add '{field}'")]
    DuplicateDiscriminator { existing: String, field: String },
    #[error("unknown field '{field}'")]
    UnknownField { field: String },
    #[error("layout has no discriminator field")]
    NoDiscriminator,
    #[error("dispatch value {value:#x} appears more than once")]
    DuplicateDispatchValue { value: u128 },
    #[error("invalid value {value} for field '{field}': {reason}")]
    InvalidField {
        field: &'static str,
        value: u128,
        reason: &'static str,
    },
    #[error("{kind} checksum needs an enclosing IPv4 or IPv6 header")]
    MissingPseudoHeader { kind: &'static str },
    #[error("unsupported link type: {linktype}")]
    UnsupportedLinkType { linktype: i32 },
}
