use std::net::Ipv4Addr;

use crate::engine::{
    ChainView, ChecksumStatus, DecodeContext, DispatchEntry, DispatchTable, Packet, PacketBase,
    PacketError, PacketKind, PacketType, decode_next, internet_checksum, opaque_tail,
};
use crate::protocols::igmp::Igmp;
use crate::protocols::tcp::Tcp;
use crate::protocols::udp::Udp;

use super::layout;

pub static IPV4_MAP: DispatchTable = DispatchTable::new(&[
    DispatchEntry::of::<Igmp>(layout::PROTO_IGMP as u128),
    DispatchEntry::of::<Tcp>(layout::PROTO_TCP as u128),
    DispatchEntry::of::<Udp>(layout::PROTO_UDP as u128),
]);

const DESCRIPTION: &str = "IPv4";

#[derive(Debug)]
pub struct Ipv4 {
    base: PacketBase,
    options: Vec<u8>,
    trailer: Vec<u8>,
}

impl Ipv4 {
    pub fn new() -> Result<Self, PacketError> {
        Ok(Self {
            base: PacketBase::new(layout::layout()?, DESCRIPTION),
            options: Vec::new(),
            trailer: Vec::new(),
        })
    }

    field_accessors! {
        version, set_version: u8 = layout::VERSION;
        /// Header length in 32-bit words.
        hlen, set_hlen: u8 = layout::HLEN;
        tos, set_tos: u8 = layout::TOS;
        /// Total datagram length in bytes.
        length, set_length: u16 = layout::LENGTH;
        id, set_id: u16 = layout::ID;
        flags, set_flags: u8 = layout::FLAGS;
        /// Fragment offset in 8-byte units.
        fragment_offset, set_fragment_offset: u16 = layout::OFFSET;
        ttl, set_ttl: u8 = layout::TTL;
        protocol, set_protocol: u8 = layout::PROTOCOL;
        checksum, set_checksum: u16 = layout::CHECKSUM;
        src, set_src: u32 = layout::SRC;
        dst, set_dst: u32 = layout::DST;
    }

    pub fn src_addr(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.src())
    }

    pub fn set_src_addr(&mut self, addr: Ipv4Addr) -> Result<(), PacketError> {
        self.set_src(addr.into())
    }

    pub fn dst_addr(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.dst())
    }

    pub fn set_dst_addr(&mut self, addr: Ipv4Addr) -> Result<(), PacketError> {
        self.set_dst(addr.into())
    }

    pub fn options(&self) -> &[u8] {
        &self.options
    }

    /// Replace the options and update `hlen` to match.
    pub fn set_options(&mut self, options: Vec<u8>) -> Result<(), PacketError> {
        if options.len() % 4 != 0 || options.len() > layout::MAX_OPTIONS_LEN {
            return Err(PacketError::InvalidField {
                field: "options",
                value: options.len() as u128,
                reason: "options must be a multiple of 4 bytes, at most 40",
            });
        }
        self.set_hlen(((layout::HEADER_LEN + options.len()) / 4) as u8)?;
        self.options = options;
        Ok(())
    }

    pub fn trailer(&self) -> &[u8] {
        &self.trailer
    }

    pub fn set_trailer(&mut self, trailer: Vec<u8>) {
        self.trailer = trailer;
    }

    /// Set `length` to header plus current payload.
    pub fn update_length(&mut self) -> Result<(), PacketError> {
        let total = self.sizeof() + self.data().map_or(0, |data| data.len());
        let total = u16::try_from(total).map_err(|_| PacketError::InvalidField {
            field: "length",
            value: total as u128,
            reason: "datagram longer than 65535 bytes",
        })?;
        self.set_length(total)
    }

    /// True for any piece of a fragmented datagram, the first one included.
    pub fn is_fragment(&self) -> bool {
        self.fragment_offset() != 0 || self.flags() & layout::FLAG_MORE_FRAGMENTS != 0
    }

    fn compute_checksum(&self) -> u16 {
        let header = self.base.layout().pack_zeroed(layout::CHECKSUM);
        internet_checksum(&[&header, &self.options])
    }
}

impl PacketType for Ipv4 {
    const KIND: PacketKind = super::KIND;

    fn decode(bytes: &[u8], ctx: &DecodeContext) -> Result<Self, PacketError> {
        let (base, _) = PacketBase::unpack(layout::layout()?, DESCRIPTION, bytes, ctx)?;
        let mut packet = Self {
            base,
            options: Vec::new(),
            trailer: Vec::new(),
        };

        let header_len = packet.hlen() as usize * 4;
        if header_len < layout::HEADER_LEN {
            return Err(PacketError::InvalidField {
                field: "hlen",
                value: packet.hlen().into(),
                reason: "header length below 5 words",
            });
        }
        if header_len > bytes.len() {
            return Err(PacketError::TruncatedPayload {
                declared: header_len,
                available: bytes.len(),
            });
        }
        packet.options = bytes[layout::HEADER_LEN..header_len].to_vec();

        let total = match packet.length() as usize {
            0 => bytes.len(),
            n if n < header_len => {
                return Err(PacketError::InvalidField {
                    field: "length",
                    value: n as u128,
                    reason: "total length shorter than header",
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
        let payload = &bytes[header_len..total];
        packet.trailer = bytes[total..].to_vec();

        let data = if packet.is_fragment() {
            opaque_tail(payload)
        } else {
            decode_next(&IPV4_MAP, Some(packet.protocol().into()), payload, ctx)?
        };
        packet.base.set_data(data);
        Ok(packet)
    }
}

impl Packet for Ipv4 {
    packet_identity!();

    fn header_bytes(&self) -> Vec<u8> {
        let mut bytes = self.base.layout().pack();
        bytes.extend_from_slice(&self.options);
        bytes
    }

    fn trailer_bytes(&self) -> &[u8] {
        &self.trailer
    }

    fn dispatch(&self) -> Option<&'static DispatchTable> {
        Some(&IPV4_MAP)
    }

    /// The IPv4 checksum covers the header and its options only.
    fn calc_checksum(&mut self, _chain: &ChainView<'_>) -> Result<(), PacketError> {
        let checksum = self.compute_checksum();
        self.set_checksum(checksum)
    }

    fn verify_checksum(&self, _chain: &ChainView<'_>) -> ChecksumStatus {
        ChecksumStatus::compare(self.checksum(), self.compute_checksum())
    }
}
