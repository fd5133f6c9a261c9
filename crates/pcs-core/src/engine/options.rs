use serde::{Deserialize, Serialize};

/// Decode policy knobs.
///
/// The default is lenient: padding bits after a layout whose width is not a
/// multiple of eight are ignored on decode (they are always written as zero).
///
/// # Examples
/// ```
/// use pcs_core::DecodeOptions;
///
/// let options: DecodeOptions = serde_json::from_str(r#"{"strict_padding":true}"#).unwrap();
/// assert!(options.strict_padding);
/// assert!(!DecodeOptions::default().strict_padding);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Reject non-zero padding bits instead of ignoring them.
    pub strict_padding: bool,
}

impl DecodeOptions {
    pub fn strict() -> Self {
        Self {
            strict_padding: true,
        }
    }
}

/// Per-decode state handed down the packet chain.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DecodeContext {
    /// Capture timestamp in seconds since the Unix epoch.
    pub timestamp: Option<f64>,
    pub options: DecodeOptions,
}

impl DecodeContext {
    pub fn new(timestamp: Option<f64>, options: DecodeOptions) -> Self {
        Self { timestamp, options }
    }
}
