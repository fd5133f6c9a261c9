//! IGMPv3 membership query and report bodies (RFC 3376 sections 4.1, 4.2).

use std::fmt::Write as _;
use std::net::Ipv4Addr;

use crate::engine::{
    DecodeContext, Layout, Packet, PacketBase, PacketError, PacketKind, PacketType, opaque_tail,
};

use super::layout;

pub const QUERY_KIND: PacketKind = PacketKind::new("igmpv3_query");
pub const REPORT_KIND: PacketKind = PacketKind::new("igmpv3_report");

#[derive(Debug)]
pub struct IgmpV3Query {
    base: PacketBase,
    sources: Vec<Ipv4Addr>,
}

impl IgmpV3Query {
    pub fn new() -> Result<Self, PacketError> {
        Ok(Self {
            base: PacketBase::new(layout::v3_query_layout()?, "IGMPv3 Query"),
            sources: Vec::new(),
        })
    }

    field_accessors! {
        group, set_group: u32 = layout::QUERY_GROUP;
        reserved, set_reserved: u8 = layout::QUERY_RESERVED;
        /// Suppress router-side processing flag.
        suppress, set_suppress: u8 = layout::QUERY_SUPPRESS;
        /// Querier's robustness variable.
        qrv, set_qrv: u8 = layout::QUERY_QRV;
        /// Querier's query interval code.
        qqic, set_qqic: u8 = layout::QUERY_QQIC;
        nsrc, set_nsrc: u16 = layout::QUERY_NSRC;
    }

    pub fn group_addr(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.group())
    }

    pub fn set_group_addr(&mut self, addr: Ipv4Addr) -> Result<(), PacketError> {
        self.set_group(addr.into())
    }

    pub fn sources(&self) -> &[Ipv4Addr] {
        &self.sources
    }

    /// Replace the source list and update `nsrc`.
    pub fn set_sources(&mut self, sources: Vec<Ipv4Addr>) -> Result<(), PacketError> {
        let count = u16::try_from(sources.len()).map_err(|_| PacketError::InvalidField {
            field: "nsrc",
            value: sources.len() as u128,
            reason: "more than 65535 sources",
        })?;
        self.set_nsrc(count)?;
        self.sources = sources;
        Ok(())
    }
}

impl PacketType for IgmpV3Query {
    const KIND: PacketKind = QUERY_KIND;

    fn decode(bytes: &[u8], ctx: &DecodeContext) -> Result<Self, PacketError> {
        let (base, rest) =
            PacketBase::unpack(layout::v3_query_layout()?, "IGMPv3 Query", bytes, ctx)?;
        let mut packet = Self {
            base,
            sources: Vec::new(),
        };
        let (sources, rest) = read_sources(rest, packet.nsrc().into())?;
        packet.sources = sources;
        packet.base.set_data(opaque_tail(rest));
        Ok(packet)
    }
}

impl Packet for IgmpV3Query {
    packet_identity!();

    fn header_bytes(&self) -> Vec<u8> {
        let mut bytes = self.base.layout().pack();
        write_sources(&mut bytes, &self.sources);
        bytes
    }

    fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.description());
        for field in self.base.layout() {
            let _ = writeln!(out, "{} {}", field.name(), field.get());
        }
        for source in &self.sources {
            let _ = writeln!(out, "source {source}");
        }
        out
    }
}

/// One record of an IGMPv3 report: fixed fields, sources and auxiliary data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRecord {
    layout: Layout,
    sources: Vec<Ipv4Addr>,
    aux: Vec<u8>,
}

impl GroupRecord {
    pub fn new(record_type: u8, group: Ipv4Addr) -> Result<Self, PacketError> {
        let mut fields = layout::group_record_layout()?;
        fields.set(layout::RECORD_TYPE, record_type.into())?;
        fields.set(layout::RECORD_GROUP, u32::from(group).into())?;
        Ok(Self {
            layout: fields,
            sources: Vec::new(),
            aux: Vec::new(),
        })
    }

    /// Decode one record from the head of `bytes`; returns it with the
    /// number of bytes consumed.
    pub fn decode(bytes: &[u8], ctx: &DecodeContext) -> Result<(Self, usize), PacketError> {
        let mut fields = layout::group_record_layout()?;
        let used = fields.unpack_with(bytes, &ctx.options)?;
        let nsrcs = fields.get(layout::RECORD_NSRCS) as usize;
        let (sources, rest) = read_sources(&bytes[used..], nsrcs)?;
        let aux_len = fields.get(layout::RECORD_AUXLEN) as usize * 4;
        if aux_len > rest.len() {
            return Err(PacketError::TruncatedPayload {
                declared: aux_len,
                available: rest.len(),
            });
        }
        let record = Self {
            layout: fields,
            sources,
            aux: rest[..aux_len].to_vec(),
        };
        let total = used + nsrcs * 4 + aux_len;
        Ok((record, total))
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn record_type(&self) -> u8 {
        self.layout.get(layout::RECORD_TYPE) as u8
    }

    /// Auxiliary data length in 32-bit words.
    pub fn auxlen(&self) -> u8 {
        self.layout.get(layout::RECORD_AUXLEN) as u8
    }

    pub fn nsrcs(&self) -> u16 {
        self.layout.get(layout::RECORD_NSRCS) as u16
    }

    pub fn group_addr(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.layout.get(layout::RECORD_GROUP) as u32)
    }

    pub fn sources(&self) -> &[Ipv4Addr] {
        &self.sources
    }

    pub fn aux(&self) -> &[u8] {
        &self.aux
    }

    /// Add a source and bump `nsrcs`.
    pub fn push_source(&mut self, source: Ipv4Addr) -> Result<(), PacketError> {
        self.layout
            .set(layout::RECORD_NSRCS, (self.sources.len() + 1) as u128)?;
        self.sources.push(source);
        Ok(())
    }

    /// Replace the auxiliary data; its length must be whole 32-bit words.
    pub fn set_aux(&mut self, aux: Vec<u8>) -> Result<(), PacketError> {
        if aux.len() % 4 != 0 {
            return Err(PacketError::InvalidField {
                field: "auxlen",
                value: aux.len() as u128,
                reason: "auxiliary data must be a multiple of 4 bytes",
            });
        }
        self.layout
            .set(layout::RECORD_AUXLEN, (aux.len() / 4) as u128)?;
        self.aux = aux;
        Ok(())
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut bytes = self.layout.pack();
        write_sources(&mut bytes, &self.sources);
        bytes.extend_from_slice(&self.aux);
        bytes
    }
}

#[derive(Debug)]
pub struct IgmpV3Report {
    base: PacketBase,
    records: Vec<GroupRecord>,
}

impl IgmpV3Report {
    pub fn new() -> Result<Self, PacketError> {
        Ok(Self {
            base: PacketBase::new(layout::v3_report_layout()?, "IGMPv3 Report"),
            records: Vec::new(),
        })
    }

    field_accessors! {
        reserved, set_reserved: u16 = layout::REPORT_RESERVED;
        nrecords, set_nrecords: u16 = layout::REPORT_NRECORDS;
    }

    pub fn records(&self) -> &[GroupRecord] {
        &self.records
    }

    /// Append a record and bump `nrecords`.
    pub fn push_record(&mut self, record: GroupRecord) -> Result<(), PacketError> {
        self.base
            .layout_mut()
            .set(layout::REPORT_NRECORDS, (self.records.len() + 1) as u128)?;
        self.records.push(record);
        Ok(())
    }
}

impl PacketType for IgmpV3Report {
    const KIND: PacketKind = REPORT_KIND;

    fn decode(bytes: &[u8], ctx: &DecodeContext) -> Result<Self, PacketError> {
        let (base, mut rest) =
            PacketBase::unpack(layout::v3_report_layout()?, "IGMPv3 Report", bytes, ctx)?;
        let mut packet = Self {
            base,
            records: Vec::new(),
        };
        for _ in 0..packet.nrecords() {
            let (record, used) = GroupRecord::decode(rest, ctx).map_err(|err| match err {
                PacketError::Layout { needed, actual } => PacketError::TruncatedPayload {
                    declared: needed,
                    available: actual,
                },
                other => other,
            })?;
            packet.records.push(record);
            rest = &rest[used..];
        }
        packet.base.set_data(opaque_tail(rest));
        Ok(packet)
    }
}

impl Packet for IgmpV3Report {
    packet_identity!();

    fn header_bytes(&self) -> Vec<u8> {
        let mut bytes = self.base.layout().pack();
        for record in &self.records {
            bytes.extend_from_slice(&record.bytes());
        }
        bytes
    }

    fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.description());
        for field in self.base.layout() {
            let _ = writeln!(out, "{} {}", field.name(), field.get());
        }
        for record in &self.records {
            let _ = writeln!(
                out,
                "record type {} group {} sources {}",
                record.record_type(),
                record.group_addr(),
                record.sources().len()
            );
        }
        out
    }
}

fn read_sources(bytes: &[u8], count: usize) -> Result<(Vec<Ipv4Addr>, &[u8]), PacketError> {
    let needed = count * 4;
    if needed > bytes.len() {
        return Err(PacketError::TruncatedPayload {
            declared: needed,
            available: bytes.len(),
        });
    }
    let (head, rest) = bytes.split_at(needed);
    let sources = head
        .chunks_exact(4)
        .map(|chunk| Ipv4Addr::new(chunk[0], chunk[1], chunk[2], chunk[3]))
        .collect();
    Ok((sources, rest))
}

fn write_sources(bytes: &mut Vec<u8>, sources: &[Ipv4Addr]) {
    for source in sources {
        bytes.extend_from_slice(&source.octets());
    }
}
