use std::net::Ipv4Addr;

use crate::engine::{
    DecodeContext, Packet, PacketBase, PacketError, PacketKind, PacketType, opaque_tail,
};

use super::layout;

pub const KIND: PacketKind = PacketKind::new("igmpv2");

/// IGMPv1/v2 message body: the group address.
#[derive(Debug)]
pub struct IgmpV2 {
    base: PacketBase,
}

impl IgmpV2 {
    pub fn new() -> Result<Self, PacketError> {
        Ok(Self {
            base: PacketBase::new(layout::v2_layout()?, "IGMPv2"),
        })
    }

    field_accessors! {
        group, set_group: u32 = layout::V2_GROUP;
    }

    pub fn group_addr(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.group())
    }

    pub fn set_group_addr(&mut self, addr: Ipv4Addr) -> Result<(), PacketError> {
        self.set_group(addr.into())
    }
}

impl PacketType for IgmpV2 {
    const KIND: PacketKind = KIND;

    fn decode(bytes: &[u8], ctx: &DecodeContext) -> Result<Self, PacketError> {
        let (mut base, rest) = PacketBase::unpack(layout::v2_layout()?, "IGMPv2", bytes, ctx)?;
        base.set_data(opaque_tail(rest));
        Ok(Self { base })
    }
}

impl Packet for IgmpV2 {
    packet_identity!();
}
