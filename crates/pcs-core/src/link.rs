//! Link-layer entry point: turn a captured frame into a packet chain.
//!
//! The capture's link type picks the outermost decoder. Loopback captures
//! (`NULL`, `LOOP`) carry a 4-byte address family header that is skipped;
//! raw IP captures choose IPv4 or IPv6 from the version nibble.

use pcap_parser::Linktype;
use tracing::trace;

use crate::engine::{DecodeContext, DecodeOptions, Packet, PacketError, PacketType};
use crate::protocols::ethernet::{self, Ethernet};
use crate::protocols::ipv4::Ipv4;
use crate::protocols::ipv6::Ipv6;
use crate::source::Frame;

const LOOPBACK_HEADER_LEN: usize = 4;

/// Bytes in front of the network header for `linktype`.
///
/// # Errors
/// [`PacketError::UnsupportedLinkType`] for link types without a decoder.
pub fn link_offset(linktype: Linktype) -> Result<usize, PacketError> {
    match linktype {
        Linktype::ETHERNET => Ok(ethernet::layout::HEADER_LEN),
        Linktype::RAW | Linktype::IPV4 | Linktype::IPV6 => Ok(0),
        Linktype::NULL | Linktype::LOOP => Ok(LOOPBACK_HEADER_LEN),
        other => Err(PacketError::UnsupportedLinkType { linktype: other.0 }),
    }
}

/// Decode `bytes` captured on `linktype`.
///
/// # Examples
/// ```
/// use pcap_parser::Linktype;
/// use pcs_core::{DecodeOptions, link};
///
/// let mut frame = vec![0x45, 0, 0, 20, 0, 0, 0, 0, 64, 17, 0, 0];
/// frame.extend_from_slice(&[10, 0, 0, 1, 10, 0, 0, 2]);
/// let packet = link::unpack(&frame, Linktype::RAW, None, DecodeOptions::default())?;
/// assert_eq!(packet.kind().name(), "ipv4");
/// # Ok::<(), pcs_core::PacketError>(())
/// ```
pub fn unpack(
    bytes: &[u8],
    linktype: Linktype,
    timestamp: Option<f64>,
    options: DecodeOptions,
) -> Result<Box<dyn Packet>, PacketError> {
    let ctx = DecodeContext::new(timestamp, options);
    let offset = link_offset(linktype)?;
    trace!(linktype = linktype.0, len = bytes.len(), "unpacking frame");
    match linktype {
        Linktype::ETHERNET => Ok(Box::new(Ethernet::decode(bytes, &ctx)?)),
        _ => {
            let network = bytes.get(offset..).ok_or(PacketError::Layout {
                needed: offset,
                actual: bytes.len(),
            })?;
            decode_ip(network, &ctx)
        }
    }
}

/// [`unpack`] applied to a frame read from a capture.
pub fn unpack_frame(frame: &Frame, options: DecodeOptions) -> Result<Box<dyn Packet>, PacketError> {
    unpack(&frame.data, frame.linktype, frame.ts, options)
}

fn decode_ip(bytes: &[u8], ctx: &DecodeContext) -> Result<Box<dyn Packet>, PacketError> {
    let first = *bytes.first().ok_or(PacketError::Layout {
        needed: 1,
        actual: 0,
    })?;
    match first >> 4 {
        4 => Ok(Box::new(Ipv4::decode(bytes, ctx)?)),
        6 => Ok(Box::new(Ipv6::decode(bytes, ctx)?)),
        version => Err(PacketError::InvalidField {
            field: "version",
            value: version.into(),
            reason: "raw frame is neither IPv4 nor IPv6",
        }),
    }
}

#[cfg(test)]
mod tests {
    use pcap_parser::Linktype;

    use super::{link_offset, unpack, unpack_frame};
    use crate::engine::{DecodeOptions, Packet, PacketError};
    use crate::protocols::{ethernet, ipv4, ipv6};
    use crate::source::Frame;

    fn ipv4_header() -> Vec<u8> {
        let mut bytes = vec![0x45, 0, 0, 20, 0, 0, 0, 0, 64, 17, 0, 0];
        bytes.extend_from_slice(&[10, 0, 0, 1, 10, 0, 0, 2]);
        bytes
    }

    #[test]
    fn raw_picks_ip_version() {
        let v4 = unpack(&ipv4_header(), Linktype::RAW, None, DecodeOptions::default()).unwrap();
        assert_eq!(v4.kind(), ipv4::KIND);

        let mut v6 = vec![0x60];
        v6.resize(40, 0);
        let v6 = unpack(&v6, Linktype::IPV6, Some(1.0), DecodeOptions::default()).unwrap();
        assert_eq!(v6.kind(), ipv6::KIND);
        assert_eq!(v6.timestamp(), Some(1.0));
    }

    #[test]
    fn loopback_header_is_skipped() {
        let mut frame = vec![2, 0, 0, 0];
        frame.extend_from_slice(&ipv4_header());
        let packet = unpack(&frame, Linktype::NULL, None, DecodeOptions::default()).unwrap();
        assert_eq!(packet.kind(), ipv4::KIND);
        assert_eq!(packet.bytes(), ipv4_header());
    }

    #[test]
    fn ethernet_frames() {
        let mut data = vec![0xff; 6];
        data.extend_from_slice(&[0, 1, 2, 3, 4, 5, 0x08, 0x00]);
        data.extend_from_slice(&ipv4_header());
        let frame = Frame {
            ts: Some(3.0),
            linktype: Linktype::ETHERNET,
            data,
        };
        let packet = unpack_frame(&frame, DecodeOptions::default()).unwrap();
        assert_eq!(packet.kind(), ethernet::KIND);
        assert_eq!(packet.data().and_then(|d| d.kind()), Some(ipv4::KIND));
    }

    #[test]
    fn unsupported_link_type() {
        let err = unpack(&[0; 20], Linktype(147), None, DecodeOptions::default()).unwrap_err();
        assert_eq!(err, PacketError::UnsupportedLinkType { linktype: 147 });
        assert!(link_offset(Linktype(147)).is_err());
    }

    #[test]
    fn unknown_ip_version_is_rejected() {
        let err = unpack(&[0x50, 0], Linktype::RAW, None, DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, PacketError::InvalidField { field: "version", .. }));
    }
}
