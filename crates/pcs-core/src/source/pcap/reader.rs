use std::io::{Read, Seek, SeekFrom};

use pcap_parser::Linktype;

use super::error::PcapSourceError;
use super::layout;

/// Read the first four bytes and rewind.
///
/// # Errors
/// Returns `PcapSourceError::Io` when fewer than four bytes are available
/// or the reader cannot seek back.
pub fn read_magic_and_rewind<R: Read + Seek>(reader: &mut R) -> Result<[u8; 4], PcapSourceError> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    reader.seek(SeekFrom::Start(0))?;
    Ok(magic)
}

pub fn is_pcapng_magic(magic: &[u8; 4]) -> bool {
    magic == &layout::PCAPNG_MAGIC
}

/// Link type of a pcapng interface; frames on an undeclared interface are
/// treated as Ethernet.
///
/// # Examples
/// ```
/// use pcap_parser::Linktype;
/// use pcs_core::source::pcap::reader::linktype_for_interface;
///
/// let linktypes = [Linktype::RAW];
/// assert_eq!(linktype_for_interface(&linktypes, 0), Linktype::RAW);
/// assert_eq!(linktype_for_interface(&linktypes, 1), Linktype::ETHERNET);
/// ```
pub fn linktype_for_interface(linktypes: &[Linktype], if_id: u32) -> Linktype {
    linktypes
        .get(if_id as usize)
        .copied()
        .unwrap_or(Linktype::ETHERNET)
}

/// Convert a pcapng high/low microsecond timestamp to seconds.
pub fn pcapng_ts_to_seconds(ts_high: u32, ts_low: u32) -> f64 {
    let ts = ((ts_high as u64) << 32) | (ts_low as u64);
    ts as f64 / 1_000_000.0
}

pub fn legacy_ts_to_seconds(ts_sec: u32, ts_usec: u32) -> f64 {
    ts_sec as f64 + ts_usec as f64 / 1_000_000.0
}

/// Split seconds into the whole-second and microsecond parts of a legacy
/// record header. Negative or missing times are written as zero.
///
/// # Examples
/// ```
/// use pcs_core::source::pcap::reader::split_timestamp;
///
/// assert_eq!(split_timestamp(Some(12.25)), (12, 250_000));
/// assert_eq!(split_timestamp(None), (0, 0));
/// ```
pub fn split_timestamp(ts: Option<f64>) -> (u32, u32) {
    let Some(ts) = ts.filter(|ts| ts.is_finite() && *ts >= 0.0) else {
        return (0, 0);
    };
    let micros = (ts * 1e6).round() as u64;
    let secs = (micros / 1_000_000).min(u32::MAX as u64) as u32;
    (secs, (micros % 1_000_000) as u32)
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use pcap_parser::Linktype;

    use super::{
        is_pcapng_magic, legacy_ts_to_seconds, linktype_for_interface, pcapng_ts_to_seconds,
        read_magic_and_rewind, split_timestamp,
    };
    use crate::source::pcap::error::PcapSourceError;
    use crate::source::pcap::layout;

    #[test]
    fn detect_pcapng_magic() {
        assert!(is_pcapng_magic(&layout::PCAPNG_MAGIC));
        assert!(!is_pcapng_magic(&layout::PCAP_MAGIC_USEC.to_le_bytes()));
    }

    #[test]
    fn read_magic_rewinds() {
        let mut cursor = Cursor::new([0xd4, 0xc3, 0xb2, 0xa1, 0x02]);
        let magic = read_magic_and_rewind(&mut cursor).unwrap();
        assert_eq!(magic, [0xd4, 0xc3, 0xb2, 0xa1]);
        let mut buf = [0u8; 1];
        cursor.read_exact(&mut buf).unwrap();
        assert_eq!(buf[0], 0xd4);
    }

    #[test]
    fn read_magic_too_short() {
        let mut cursor = Cursor::new([0x0a, 0x0d, 0x0d]);
        let err = read_magic_and_rewind(&mut cursor).unwrap_err();
        assert!(matches!(err, PcapSourceError::Io(_)));
    }

    #[test]
    fn linktype_defaults_to_ethernet() {
        assert_eq!(linktype_for_interface(&[], 0), Linktype::ETHERNET);
    }

    #[test]
    fn timestamps_convert_both_ways() {
        assert!((pcapng_ts_to_seconds(0, 1_500_000) - 1.5).abs() < f64::EPSILON);
        assert!((legacy_ts_to_seconds(3, 250_000) - 3.25).abs() < 1e-9);
        assert_eq!(split_timestamp(Some(1_700_000_000.000001)), (1_700_000_000, 1));
        assert_eq!(split_timestamp(Some(-1.0)), (0, 0));
    }
}
