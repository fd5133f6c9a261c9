use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use pcap_parser::Linktype;
use tracing::debug;

use crate::source::{FrameSink, SourceError};

use super::error::PcapSourceError;
use super::layout;
use super::reader::split_timestamp;

/// Writes legacy little-endian pcap, microsecond resolution.
///
/// Frames longer than the snap length are still written whole.
pub struct PcapFileSink<W: Write = BufWriter<File>> {
    inner: W,
    frames: u64,
}

impl PcapFileSink {
    pub fn create(path: &Path, linktype: Linktype) -> Result<Self, SourceError> {
        let file = File::create(path)?;
        debug!(path = %path.display(), linktype = linktype.0, "creating capture");
        Self::new(BufWriter::new(file), linktype)
    }
}

impl<W: Write> PcapFileSink<W> {
    /// Write the global header to `inner` and return the sink.
    pub fn new(mut inner: W, linktype: Linktype) -> Result<Self, SourceError> {
        inner.write_all(&global_header(linktype))?;
        Ok(Self { inner, frames: 0 })
    }

    pub fn frames_written(&self) -> u64 {
        self.frames
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> FrameSink for PcapFileSink<W> {
    fn write_frame(&mut self, ts: Option<f64>, data: &[u8]) -> Result<(), SourceError> {
        let len = u32::try_from(data.len()).map_err(|_| {
            SourceError::from(PcapSourceError::Pcap {
                context: "pcap writer",
                message: format!("frame of {} bytes is too large", data.len()),
            })
        })?;
        let (ts_sec, ts_usec) = split_timestamp(ts);
        let mut record = Vec::with_capacity(layout::PCAP_RECORD_HEADER_LEN + data.len());
        record.extend_from_slice(&ts_sec.to_le_bytes());
        record.extend_from_slice(&ts_usec.to_le_bytes());
        record.extend_from_slice(&len.to_le_bytes());
        record.extend_from_slice(&len.to_le_bytes());
        record.extend_from_slice(data);
        self.inner.write_all(&record)?;
        self.frames += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SourceError> {
        self.inner.flush()?;
        Ok(())
    }
}

fn global_header(linktype: Linktype) -> [u8; layout::PCAP_GLOBAL_HEADER_LEN] {
    let mut header = [0u8; layout::PCAP_GLOBAL_HEADER_LEN];
    header[0..4].copy_from_slice(&layout::PCAP_MAGIC_USEC.to_le_bytes());
    header[4..6].copy_from_slice(&layout::PCAP_VERSION_MAJOR.to_le_bytes());
    header[6..8].copy_from_slice(&layout::PCAP_VERSION_MINOR.to_le_bytes());
    // thiszone and sigfigs stay zero
    header[16..20].copy_from_slice(&layout::PCAP_DEFAULT_SNAPLEN.to_le_bytes());
    header[20..24].copy_from_slice(&(linktype.0 as u32).to_le_bytes());
    header
}
