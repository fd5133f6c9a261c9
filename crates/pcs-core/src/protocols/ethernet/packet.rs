use crate::engine::{
    DecodeContext, DispatchEntry, DispatchTable, Packet, PacketBase, PacketError, PacketKind,
    PacketType, decode_next,
};
use crate::protocols::common::{mac_to_u64, u64_to_mac};
use crate::protocols::ipv4::Ipv4;
use crate::protocols::ipv6::Ipv6;

use super::layout;

pub static ETHERNET_MAP: DispatchTable = DispatchTable::new(&[
    DispatchEntry::of::<Ipv4>(layout::ETHERTYPE_IPV4 as u128),
    DispatchEntry::of::<Ipv6>(layout::ETHERTYPE_IPV6 as u128),
]);

const DESCRIPTION: &str = "Ethernet";

#[derive(Debug)]
pub struct Ethernet {
    base: PacketBase,
}

impl Ethernet {
    pub fn new() -> Result<Self, PacketError> {
        Ok(Self {
            base: PacketBase::new(layout::layout()?, DESCRIPTION),
        })
    }

    field_accessors! {
        dst, set_dst: u64 = layout::DST;
        src, set_src: u64 = layout::SRC;
        ether_type, set_ether_type: u16 = layout::ETHER_TYPE;
    }

    pub fn dst_mac(&self) -> [u8; 6] {
        u64_to_mac(self.dst())
    }

    pub fn set_dst_mac(&mut self, mac: [u8; 6]) -> Result<(), PacketError> {
        self.set_dst(mac_to_u64(mac))
    }

    pub fn src_mac(&self) -> [u8; 6] {
        u64_to_mac(self.src())
    }

    pub fn set_src_mac(&mut self, mac: [u8; 6]) -> Result<(), PacketError> {
        self.set_src(mac_to_u64(mac))
    }
}

impl PacketType for Ethernet {
    const KIND: PacketKind = super::KIND;

    fn decode(bytes: &[u8], ctx: &DecodeContext) -> Result<Self, PacketError> {
        let (base, rest) = PacketBase::unpack(layout::layout()?, DESCRIPTION, bytes, ctx)?;
        let mut packet = Self { base };
        let data = decode_next(&ETHERNET_MAP, Some(packet.ether_type().into()), rest, ctx)?;
        packet.base.set_data(data);
        Ok(packet)
    }
}

impl Packet for Ethernet {
    packet_identity!();

    fn dispatch(&self) -> Option<&'static DispatchTable> {
        Some(&ETHERNET_MAP)
    }
}
