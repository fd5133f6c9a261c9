use crate::engine::{
    ChainView, ChecksumStatus, DecodeContext, Packet, PacketBase, PacketError, PacketKind,
    PacketType, opaque_tail,
};
use crate::protocols::common::pseudo::{transport_checksum, verify_transport};
use crate::protocols::ipv4;

use super::layout;

const DESCRIPTION: &str = "UDP";

#[derive(Debug)]
pub struct Udp {
    base: PacketBase,
    trailer: Vec<u8>,
}

impl Udp {
    pub fn new() -> Result<Self, PacketError> {
        Ok(Self {
            base: PacketBase::new(layout::layout()?, DESCRIPTION),
            trailer: Vec::new(),
        })
    }

    field_accessors! {
        sport, set_sport: u16 = layout::SPORT;
        dport, set_dport: u16 = layout::DPORT;
        /// Header plus payload, in bytes.
        length, set_length: u16 = layout::LENGTH;
        checksum, set_checksum: u16 = layout::CHECKSUM;
    }

    /// Bytes past the declared `length`, kept for re-encoding.
    pub fn trailer(&self) -> &[u8] {
        &self.trailer
    }

    pub fn set_trailer(&mut self, trailer: Vec<u8>) {
        self.trailer = trailer;
    }

    /// Set `length` to header plus current payload.
    pub fn update_length(&mut self) -> Result<(), PacketError> {
        let len = layout::HEADER_LEN + self.data().map_or(0, |data| data.len());
        let len = u16::try_from(len).map_err(|_| PacketError::InvalidField {
            field: "length",
            value: len as u128,
            reason: "datagram longer than 65535 bytes",
        })?;
        self.set_length(len)
    }
}

impl PacketType for Udp {
    const KIND: PacketKind = super::KIND;

    fn decode(bytes: &[u8], ctx: &DecodeContext) -> Result<Self, PacketError> {
        let (base, rest) = PacketBase::unpack(layout::layout()?, DESCRIPTION, bytes, ctx)?;
        let mut packet = Self {
            base,
            trailer: Vec::new(),
        };
        // Zero is left to the enclosing layer (IPv6 jumbograms).
        let end = match packet.length() as usize {
            0 => bytes.len(),
            n if n < layout::HEADER_LEN => {
                return Err(PacketError::InvalidField {
                    field: "length",
                    value: n as u128,
                    reason: "length shorter than the UDP header",
                });
            }
            n if n > bytes.len() => {
                return Err(PacketError::TruncatedPayload {
                    declared: n,
                    available: bytes.len(),
                });
            }
            n => n,
        };
        let payload = &rest[..end - layout::HEADER_LEN];
        packet.trailer = bytes[end..].to_vec();
        packet.base.set_data(opaque_tail(payload));
        Ok(packet)
    }
}

impl Packet for Udp {
    packet_identity!();

    fn trailer_bytes(&self) -> &[u8] {
        &self.trailer
    }

    /// A computed sum of zero goes on the wire as 0xffff.
    fn calc_checksum(&mut self, chain: &ChainView<'_>) -> Result<(), PacketError> {
        let header = self.base.layout().pack_zeroed(layout::CHECKSUM);
        let checksum = transport_checksum(chain, layout::PROTOCOL, &header, super::KIND.name())?;
        self.set_checksum(if checksum == 0 { 0xffff } else { checksum })
    }

    /// Over IPv4 a stored zero means the sender did not compute a checksum.
    fn verify_checksum(&self, chain: &ChainView<'_>) -> ChecksumStatus {
        let over_ipv4 = chain
            .enclosing
            .is_some_and(|enclosing| enclosing.kind == ipv4::KIND);
        if over_ipv4 && self.checksum() == 0 {
            return ChecksumStatus::NotApplicable;
        }
        let header = self.base.layout().pack_zeroed(layout::CHECKSUM);
        match verify_transport(
            chain,
            layout::PROTOCOL,
            &header,
            self.checksum(),
            super::KIND.name(),
        ) {
            ChecksumStatus::Invalid {
                stored: 0xffff,
                computed: 0,
            } => ChecksumStatus::Valid,
            status => status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Udp;
    use crate::engine::{
        ChainView, ChecksumStatus, DecodeContext, Enclosing, Packet, PacketError, PacketType,
        Payload,
    };
    use crate::protocols::ipv4;

    fn ipv4_header() -> [u8; 20] {
        let mut header = [0u8; 20];
        header[12..16].copy_from_slice(&[192, 168, 1, 1]);
        header[16..20].copy_from_slice(&[192, 168, 1, 2]);
        header
    }

    #[test]
    fn update_length_counts_header_and_payload() {
        let mut udp = Udp::new().unwrap();
        udp.set_data(Some(Payload::opaque(vec![0u8; 12])));
        udp.update_length().unwrap();
        assert_eq!(udp.length(), 20);
    }

    #[test]
    fn declared_length_beyond_input_is_truncated() {
        let mut udp = Udp::new().unwrap();
        udp.set_length(30).unwrap();
        let err = Udp::decode(&udp.bytes(), &DecodeContext::default()).unwrap_err();
        assert_eq!(
            err,
            PacketError::TruncatedPayload {
                declared: 30,
                available: 8
            }
        );
    }

    #[test]
    fn zero_checksum_over_ipv4_is_not_checked() {
        let header = ipv4_header();
        let chain = ChainView {
            enclosing: Some(Enclosing {
                kind: ipv4::KIND,
                header: &header,
            }),
            following: &[],
        };
        let udp = Udp::new().unwrap();
        assert_eq!(udp.verify_checksum(&chain), ChecksumStatus::NotApplicable);
    }

    #[test]
    fn calc_then_verify() {
        let header = ipv4_header();
        let payload = b"hello".to_vec();
        let chain = ChainView {
            enclosing: Some(Enclosing {
                kind: ipv4::KIND,
                header: &header,
            }),
            following: &payload,
        };
        let mut udp = Udp::new().unwrap();
        udp.set_sport(5353).unwrap();
        udp.set_dport(5353).unwrap();
        udp.set_length(13).unwrap();
        udp.calc_checksum(&chain).unwrap();
        assert_ne!(udp.checksum(), 0);
        assert_eq!(udp.verify_checksum(&chain), ChecksumStatus::Valid);
    }

    #[test]
    fn bytes_past_length_are_a_trailer() {
        let mut udp = Udp::new().unwrap();
        udp.set_data(Some(Payload::opaque(b"dns".to_vec())));
        udp.update_length().unwrap();
        let mut bytes = udp.bytes();
        bytes.extend_from_slice(&[0, 0, 0]);

        let decoded = Udp::decode(&bytes, &DecodeContext::default()).unwrap();
        assert_eq!(decoded.data().and_then(Payload::as_opaque), Some(&b"dns"[..]));
        assert_eq!(decoded.trailer(), &[0, 0, 0]);
        assert_eq!(decoded.bytes(), bytes);
    }

    #[test]
    fn checksum_ignores_the_trailer() {
        let header = ipv4_header();
        let mut udp = Udp::new().unwrap();
        udp.set_data(Some(Payload::opaque(b"hello".to_vec())));
        udp.update_length().unwrap();
        let payload = b"hello".to_vec();
        let chain = ChainView {
            enclosing: Some(Enclosing {
                kind: ipv4::KIND,
                header: &header,
            }),
            following: &payload,
        };
        udp.calc_checksum(&chain).unwrap();

        let mut bytes = udp.bytes();
        bytes.extend_from_slice(&[0xaa; 4]);
        let decoded = Udp::decode(&bytes, &DecodeContext::default()).unwrap();
        assert_eq!(decoded.trailer(), &[0xaa; 4]);
        let following = decoded.data().unwrap().bytes();
        let chain = ChainView {
            following: &following,
            ..chain
        };
        assert_eq!(decoded.verify_checksum(&chain), ChecksumStatus::Valid);
    }

    #[test]
    fn length_below_header_is_rejected() {
        let mut udp = Udp::new().unwrap();
        udp.set_length(4).unwrap();
        let err = Udp::decode(&udp.bytes(), &DecodeContext::default()).unwrap_err();
        assert!(matches!(err, PacketError::InvalidField { field: "length", .. }));
    }

    #[test]
    fn zero_length_takes_the_rest() {
        let mut bytes = Udp::new().unwrap().bytes();
        bytes[4..6].copy_from_slice(&[0, 0]);
        bytes.extend_from_slice(b"jumbo");
        let decoded = Udp::decode(&bytes, &DecodeContext::default()).unwrap();
        assert_eq!(decoded.data().map(Payload::len), Some(5));
        assert!(decoded.trailer().is_empty());
    }
}
