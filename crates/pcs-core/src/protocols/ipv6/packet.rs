use std::net::Ipv6Addr;

use crate::engine::{
    DecodeContext, DispatchEntry, DispatchTable, Packet, PacketBase, PacketError, PacketKind,
    PacketType, decode_next,
};
use crate::protocols::icmpv6::Icmpv6;
use crate::protocols::tcp::Tcp;
use crate::protocols::udp::Udp;

use super::layout;

pub static IPV6_MAP: DispatchTable = DispatchTable::new(&[
    DispatchEntry::of::<Tcp>(layout::NH_TCP as u128),
    DispatchEntry::of::<Udp>(layout::NH_UDP as u128),
    DispatchEntry::of::<Icmpv6>(layout::NH_ICMPV6 as u128),
]);

const DESCRIPTION: &str = "IPv6";

#[derive(Debug)]
pub struct Ipv6 {
    base: PacketBase,
    trailer: Vec<u8>,
}

impl Ipv6 {
    pub fn new() -> Result<Self, PacketError> {
        Ok(Self {
            base: PacketBase::new(layout::layout()?, DESCRIPTION),
            trailer: Vec::new(),
        })
    }

    field_accessors! {
        version, set_version: u8 = layout::VERSION;
        traffic_class, set_traffic_class: u8 = layout::TRAFFIC_CLASS;
        flow, set_flow: u32 = layout::FLOW;
        /// Payload length; excludes the fixed header.
        length, set_length: u16 = layout::LENGTH;
        next_header, set_next_header: u8 = layout::NEXT_HEADER;
        hop_limit, set_hop_limit: u8 = layout::HOP_LIMIT;
        src, set_src: u128 = layout::SRC;
        dst, set_dst: u128 = layout::DST;
    }

    pub fn src_addr(&self) -> Ipv6Addr {
        Ipv6Addr::from(self.src())
    }

    pub fn set_src_addr(&mut self, addr: Ipv6Addr) -> Result<(), PacketError> {
        self.set_src(addr.into())
    }

    pub fn dst_addr(&self) -> Ipv6Addr {
        Ipv6Addr::from(self.dst())
    }

    pub fn set_dst_addr(&mut self, addr: Ipv6Addr) -> Result<(), PacketError> {
        self.set_dst(addr.into())
    }

    pub fn trailer(&self) -> &[u8] {
        &self.trailer
    }

    pub fn set_trailer(&mut self, trailer: Vec<u8>) {
        self.trailer = trailer;
    }

    /// Set `length` to the current payload length.
    pub fn update_length(&mut self) -> Result<(), PacketError> {
        let len = self.data().map_or(0, |data| data.len());
        let len = u16::try_from(len).map_err(|_| PacketError::InvalidField {
            field: "length",
            value: len as u128,
            reason: "payload longer than 65535 bytes",
        })?;
        self.set_length(len)
    }
}

impl PacketType for Ipv6 {
    const KIND: PacketKind = super::KIND;

    fn decode(bytes: &[u8], ctx: &DecodeContext) -> Result<Self, PacketError> {
        let (base, rest) = PacketBase::unpack(layout::layout()?, DESCRIPTION, bytes, ctx)?;
        let mut packet = Self {
            base,
            trailer: Vec::new(),
        };

        let payload_len = match packet.length() as usize {
            0 => rest.len(),
            n if n > rest.len() => {
                return Err(PacketError::TruncatedPayload {
                    declared: n,
                    available: rest.len(),
                });
            }
            n => n,
        };
        let (payload, trailer) = rest.split_at(payload_len);
        packet.trailer = trailer.to_vec();

        let data = decode_next(&IPV6_MAP, Some(packet.next_header().into()), payload, ctx)?;
        packet.base.set_data(data);
        Ok(packet)
    }
}

impl Packet for Ipv6 {
    packet_identity!();

    fn trailer_bytes(&self) -> &[u8] {
        &self.trailer
    }

    fn dispatch(&self) -> Option<&'static DispatchTable> {
        Some(&IPV6_MAP)
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv6Addr;

    use super::{IPV6_MAP, Ipv6};
    use crate::engine::{DecodeContext, Packet, PacketError, PacketType, Payload};
    use crate::protocols::ipv6::layout;

    fn sample() -> Ipv6 {
        let mut packet = Ipv6::new().unwrap();
        packet
            .set_src_addr("fe80::1".parse::<Ipv6Addr>().unwrap())
            .unwrap();
        packet
            .set_dst_addr("ff02::1".parse::<Ipv6Addr>().unwrap())
            .unwrap();
        packet.set_next_header(59).unwrap();
        packet.set_data(Some(Payload::opaque(vec![1, 2, 3, 4])));
        packet.update_length().unwrap();
        packet
    }

    #[test]
    fn dispatch_table_is_valid() {
        IPV6_MAP.validate().unwrap();
    }

    #[test]
    fn defaults() {
        let packet = Ipv6::new().unwrap();
        assert_eq!(packet.version(), 6);
        assert_eq!(packet.hop_limit(), 64);
        assert_eq!(packet.sizeof(), layout::HEADER_LEN);
    }

    #[test]
    fn round_trip_with_trailer() {
        let mut bytes = sample().bytes();
        assert_eq!(bytes.len(), 44);
        assert_eq!(bytes[0] >> 4, 6);
        assert_eq!(&bytes[8..10], &[0xfe, 0x80]);
        bytes.extend_from_slice(&[0, 0]);

        let decoded = Ipv6::decode(&bytes, &DecodeContext::default()).unwrap();
        assert_eq!(decoded.length(), 4);
        assert_eq!(decoded.src_addr(), "fe80::1".parse::<Ipv6Addr>().unwrap());
        assert_eq!(decoded.trailer(), &[0, 0]);
        assert_eq!(
            decoded.data().and_then(Payload::as_opaque),
            Some(&[1u8, 2, 3, 4][..])
        );
        assert_eq!(decoded.bytes(), bytes);
    }

    #[test]
    fn payload_length_beyond_input_is_truncated() {
        let bytes = sample().bytes();
        let err = Ipv6::decode(&bytes[..42], &DecodeContext::default()).unwrap_err();
        assert_eq!(
            err,
            PacketError::TruncatedPayload {
                declared: 4,
                available: 2
            }
        );
    }
}
