use std::net::Ipv6Addr;

use crate::engine::{
    DecodeContext, Packet, PacketBase, PacketError, PacketKind, PacketType, opaque_tail,
};

use super::layout;

#[derive(Debug)]
pub struct Nd6Solicit {
    base: PacketBase,
}

impl Nd6Solicit {
    const DESCRIPTION: &'static str = "Neighbor Solicitation";

    pub fn new() -> Result<Self, PacketError> {
        Ok(Self {
            base: PacketBase::new(layout::solicit_layout()?, Self::DESCRIPTION),
        })
    }

    field_accessors! {
        reserved, set_reserved: u32 = layout::SOLICIT_RESERVED;
        target, set_target: u128 = layout::SOLICIT_TARGET;
    }

    pub fn target_addr(&self) -> Ipv6Addr {
        Ipv6Addr::from(self.target())
    }

    pub fn set_target_addr(&mut self, addr: Ipv6Addr) -> Result<(), PacketError> {
        self.set_target(addr.into())
    }
}

impl PacketType for Nd6Solicit {
    const KIND: PacketKind = super::SOLICIT_KIND;

    fn decode(bytes: &[u8], ctx: &DecodeContext) -> Result<Self, PacketError> {
        let (mut base, rest) =
            PacketBase::unpack(layout::solicit_layout()?, Self::DESCRIPTION, bytes, ctx)?;
        base.set_data(opaque_tail(rest));
        Ok(Self { base })
    }
}

impl Packet for Nd6Solicit {
    packet_identity!();
}

#[derive(Debug)]
pub struct Nd6Advert {
    base: PacketBase,
}

impl Nd6Advert {
    const DESCRIPTION: &'static str = "Neighbor Advertisement";

    pub fn new() -> Result<Self, PacketError> {
        Ok(Self {
            base: PacketBase::new(layout::advert_layout()?, Self::DESCRIPTION),
        })
    }

    field_accessors! {
        router, set_router: u8 = layout::ADVERT_ROUTER;
        solicited, set_solicited: u8 = layout::ADVERT_SOLICITED;
        override_flag, set_override_flag: u8 = layout::ADVERT_OVERRIDE;
        reserved, set_reserved: u32 = layout::ADVERT_RESERVED;
        target, set_target: u128 = layout::ADVERT_TARGET;
    }

    pub fn target_addr(&self) -> Ipv6Addr {
        Ipv6Addr::from(self.target())
    }

    pub fn set_target_addr(&mut self, addr: Ipv6Addr) -> Result<(), PacketError> {
        self.set_target(addr.into())
    }
}

impl PacketType for Nd6Advert {
    const KIND: PacketKind = super::ADVERT_KIND;

    fn decode(bytes: &[u8], ctx: &DecodeContext) -> Result<Self, PacketError> {
        let (mut base, rest) =
            PacketBase::unpack(layout::advert_layout()?, Self::DESCRIPTION, bytes, ctx)?;
        base.set_data(opaque_tail(rest));
        Ok(Self { base })
    }
}

impl Packet for Nd6Advert {
    packet_identity!();
}
