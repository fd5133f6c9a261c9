use std::fmt::Write as _;

use crate::engine::{
    ChainView, ChecksumStatus, DecodeContext, Layout, Packet, PacketBase, PacketError,
    PacketKind, PacketType, opaque_tail,
};
use crate::protocols::common::pseudo::{transport_checksum, verify_transport};

use super::{layout, options};

const DESCRIPTION: &str = "TCP";

#[derive(Debug)]
pub struct Tcp {
    base: PacketBase,
    options: Layout,
}

impl Tcp {
    pub fn new() -> Result<Self, PacketError> {
        Ok(Self {
            base: PacketBase::new(layout::layout()?, DESCRIPTION),
            options: Layout::new(),
        })
    }

    field_accessors! {
        sport, set_sport: u16 = layout::SPORT;
        dport, set_dport: u16 = layout::DPORT;
        sequence, set_sequence: u32 = layout::SEQUENCE;
        ack_number, set_ack_number: u32 = layout::ACK_NUMBER;
        /// Data offset in 32-bit words.
        offset, set_offset: u8 = layout::OFFSET;
        reserved, set_reserved: u8 = layout::RESERVED;
        ns, set_ns: u8 = layout::NS;
        cwr, set_cwr: u8 = layout::CWR;
        ece, set_ece: u8 = layout::ECE;
        urgent, set_urgent: u8 = layout::URGENT;
        ack, set_ack: u8 = layout::ACK;
        push, set_push: u8 = layout::PUSH;
        reset, set_reset: u8 = layout::RESET;
        syn, set_syn: u8 = layout::SYN;
        fin, set_fin: u8 = layout::FIN;
        window, set_window: u16 = layout::WINDOW;
        checksum, set_checksum: u16 = layout::CHECKSUM;
        urg_pointer, set_urg_pointer: u16 = layout::URG_POINTER;
    }

    pub fn options(&self) -> &Layout {
        &self.options
    }

    /// Direct access to the option fields. Call [`Self::finish_options`]
    /// afterwards to keep `offset` in step.
    pub fn options_mut(&mut self) -> &mut Layout {
        &mut self.options
    }

    /// Append one option; kinds 0 and 1 take an empty value.
    pub fn push_option(&mut self, kind: u8, value: &[u8]) -> Result<(), PacketError> {
        options::push(&mut self.options, kind, value)
    }

    /// Value of the first option of `kind`.
    pub fn option(&self, kind: u8) -> Option<u128> {
        options::find(&self.options, kind)
    }

    /// Maximum segment size option, if present.
    pub fn mss(&self) -> Option<u16> {
        self.option(layout::OPT_MSS)
            .and_then(|value| u16::try_from(value).ok())
    }

    /// Pad the options to a 32-bit boundary and set `offset` to match.
    pub fn finish_options(&mut self) -> Result<(), PacketError> {
        options::pad(&mut self.options)?;
        let len = self.options.sizeof_bytes();
        if len > layout::MAX_OPTIONS_LEN {
            return Err(PacketError::InvalidField {
                field: "options",
                value: len as u128,
                reason: "options longer than 40 bytes",
            });
        }
        self.set_offset(((layout::HEADER_LEN + len) / 4) as u8)
    }

    fn zeroed_header(&self) -> Vec<u8> {
        let mut header = self.base.layout().pack_zeroed(layout::CHECKSUM);
        header.extend_from_slice(&self.options.pack());
        header
    }
}

impl PacketType for Tcp {
    const KIND: PacketKind = super::KIND;

    fn decode(bytes: &[u8], ctx: &DecodeContext) -> Result<Self, PacketError> {
        let (base, _) = PacketBase::unpack(layout::layout()?, DESCRIPTION, bytes, ctx)?;
        let mut packet = Self {
            base,
            options: Layout::new(),
        };

        let header_len = packet.offset() as usize * 4;
        if header_len < layout::HEADER_LEN {
            return Err(PacketError::InvalidField {
                field: "offset",
                value: packet.offset().into(),
                reason: "data offset below 5 words",
            });
        }
        if header_len > bytes.len() {
            return Err(PacketError::TruncatedPayload {
                declared: header_len,
                available: bytes.len(),
            });
        }
        packet.options = options::parse(&bytes[layout::HEADER_LEN..header_len])?;
        packet.base.set_data(opaque_tail(&bytes[header_len..]));
        Ok(packet)
    }
}

impl Packet for Tcp {
    packet_identity!();

    fn header_bytes(&self) -> Vec<u8> {
        let mut bytes = self.base.layout().pack();
        bytes.extend_from_slice(&self.options.pack());
        bytes
    }

    fn calc_checksum(&mut self, chain: &ChainView<'_>) -> Result<(), PacketError> {
        let checksum = transport_checksum(
            chain,
            layout::PROTOCOL,
            &self.zeroed_header(),
            super::KIND.name(),
        )?;
        self.set_checksum(checksum)
    }

    fn verify_checksum(&self, chain: &ChainView<'_>) -> ChecksumStatus {
        verify_transport(
            chain,
            layout::PROTOCOL,
            &self.zeroed_header(),
            self.checksum(),
            super::KIND.name(),
        )
    }

    fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.description());
        for field in self.base.layout().iter().chain(self.options.iter()) {
            let _ = writeln!(out, "{} {}", field.name(), field.get());
        }
        out
    }
}
