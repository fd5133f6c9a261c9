use crate::engine::{
    ChainView, ChecksumStatus, DecodeContext, DispatchEntry, DispatchTable, Packet, PacketBase,
    PacketError, PacketKind, PacketType, decode_next,
};
use crate::protocols::common::pseudo::{transport_checksum, verify_transport};
use crate::protocols::nd6::{Nd6Advert, Nd6Solicit};

use super::layout;

pub static ICMPV6_MAP: DispatchTable = DispatchTable::new(&[
    DispatchEntry::of::<Nd6Solicit>(layout::ND_NEIGHBOR_SOLICIT as u128),
    DispatchEntry::of::<Nd6Advert>(layout::ND_NEIGHBOR_ADVERT as u128),
]);

const DESCRIPTION: &str = "ICMPv6";

#[derive(Debug)]
pub struct Icmpv6 {
    base: PacketBase,
}

impl Icmpv6 {
    pub fn new() -> Result<Self, PacketError> {
        Ok(Self {
            base: PacketBase::new(layout::layout()?, DESCRIPTION),
        })
    }

    field_accessors! {
        message_type, set_message_type: u8 = layout::TYPE;
        code, set_code: u8 = layout::CODE;
        checksum, set_checksum: u16 = layout::CHECKSUM;
    }
}

impl PacketType for Icmpv6 {
    const KIND: PacketKind = super::KIND;

    fn decode(bytes: &[u8], ctx: &DecodeContext) -> Result<Self, PacketError> {
        let (base, rest) = PacketBase::unpack(layout::layout()?, DESCRIPTION, bytes, ctx)?;
        let mut packet = Self { base };
        let data = decode_next(&ICMPV6_MAP, Some(packet.message_type().into()), rest, ctx)?;
        packet.base.set_data(data);
        Ok(packet)
    }
}

impl Packet for Icmpv6 {
    packet_identity!();

    fn dispatch(&self) -> Option<&'static DispatchTable> {
        Some(&ICMPV6_MAP)
    }

    fn calc_checksum(&mut self, chain: &ChainView<'_>) -> Result<(), PacketError> {
        let header = self.base.layout().pack_zeroed(layout::CHECKSUM);
        let checksum = transport_checksum(chain, layout::PROTOCOL, &header, super::KIND.name())?;
        self.set_checksum(checksum)
    }

    fn verify_checksum(&self, chain: &ChainView<'_>) -> ChecksumStatus {
        let header = self.base.layout().pack_zeroed(layout::CHECKSUM);
        verify_transport(
            chain,
            layout::PROTOCOL,
            &header,
            self.checksum(),
            super::KIND.name(),
        )
    }
}
