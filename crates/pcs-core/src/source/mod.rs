//! Capture connectors.
//!
//! A [`FrameSource`] yields raw link-layer frames with their capture time and
//! link type; a [`FrameSink`] writes frames back out. Decoding a frame into a
//! packet chain is done by [`crate::link`], so nothing here knows about
//! protocols.

pub mod pcap;

pub use pcap::{PcapFileSink, PcapFileSource};

pub use pcap_parser::Linktype;
use thiserror::Error;

/// One captured frame, exactly as read from the capture.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Capture time in seconds since the epoch, when the format records one.
    pub ts: Option<f64>,
    pub linktype: Linktype,
    pub data: Vec<u8>,
}

pub trait FrameSource {
    /// Next frame, or `None` at end of capture.
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError>;
}

pub trait FrameSink {
    fn write_frame(&mut self, ts: Option<f64>, data: &[u8]) -> Result<(), SourceError>;

    fn flush(&mut self) -> Result<(), SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PCAP parse error: {0}")]
    Pcap(String),
}

impl From<pcap::error::PcapSourceError> for SourceError {
    fn from(value: pcap::error::PcapSourceError) -> Self {
        match value {
            pcap::error::PcapSourceError::Io(err) => SourceError::Io(err),
            pcap::error::PcapSourceError::Pcap { context, message } => {
                SourceError::Pcap(format!("{context}: {message}"))
            }
        }
    }
}
