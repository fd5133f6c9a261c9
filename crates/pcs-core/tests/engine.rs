use std::any::Any;
use std::net::Ipv4Addr;

use pcs_core::protocols::ethernet::Ethernet;
use pcs_core::protocols::igmp::{self, GroupRecord, Igmp, IgmpV2, IgmpV3Report};
use pcs_core::protocols::ipv4::Ipv4;
use pcs_core::protocols::udp::{self, Udp};
use pcs_core::{
    ChecksumStatus, DecodeContext, DecodeOptions, DispatchEntry, DispatchTable, Field, Layout,
    Packet, PacketBase, PacketError, PacketKind, PacketType, Payload, decode_next, finalize,
    render_chain, verify,
};

// A protocol declared entirely outside the crate: 4-bit next type,
// 1-bit flag, 11-bit length.
const TOY_KIND: PacketKind = PacketKind::new("toy");

static TOY_MAP: DispatchTable = DispatchTable::new(&[
    DispatchEntry::of::<Toy>(1),
    DispatchEntry::of::<Udp>(2),
]);

#[derive(Debug)]
struct Toy {
    base: PacketBase,
}

fn toy_layout() -> Layout {
    Layout::from_fields([
        Field::new("next", 4).discriminator(),
        Field::new("flag", 1),
        Field::new("len", 11),
    ])
    .unwrap()
}

impl Toy {
    fn new() -> Self {
        Self {
            base: PacketBase::new(toy_layout(), "Toy"),
        }
    }
}

impl PacketType for Toy {
    const KIND: PacketKind = TOY_KIND;

    fn decode(bytes: &[u8], ctx: &DecodeContext) -> Result<Self, PacketError> {
        let (base, rest) = PacketBase::unpack(toy_layout(), "Toy", bytes, ctx)?;
        let mut packet = Self { base };
        let next = packet.base.layout().discriminator_value();
        let data = decode_next(&TOY_MAP, next, rest, ctx)?;
        packet.base.set_data(data);
        Ok(packet)
    }
}

impl Packet for Toy {
    fn kind(&self) -> PacketKind {
        TOY_KIND
    }

    fn base(&self) -> &PacketBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PacketBase {
        &mut self.base
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn dispatch(&self) -> Option<&'static DispatchTable> {
        Some(&TOY_MAP)
    }
}

fn ethernet_igmp(body: Payload, message_type: u8) -> Ethernet {
    let mut igmp = Igmp::new().unwrap();
    igmp.set_message_type(message_type).unwrap();
    igmp.set_data(Some(body));

    let mut ip = Ipv4::new().unwrap();
    ip.set_src_addr(Ipv4Addr::new(192, 168, 1, 10)).unwrap();
    ip.set_dst_addr(Ipv4Addr::new(224, 0, 0, 22)).unwrap();
    ip.set_ttl(1).unwrap();
    ip.encapsulate(Payload::packet(igmp)).unwrap();
    ip.update_length().unwrap();

    let mut eth = Ethernet::new().unwrap();
    eth.set_dst_mac([0x01, 0x00, 0x5e, 0, 0, 0x16]).unwrap();
    eth.set_src_mac([0x02, 0, 0, 0, 0, 1]).unwrap();
    eth.encapsulate(Payload::packet(ip)).unwrap();
    finalize(&mut eth).unwrap();
    eth
}

#[test]
fn user_defined_protocol_nests_and_round_trips() {
    let mut udp = Udp::new().unwrap();
    udp.set_sport(7).unwrap();
    let mut inner = Toy::new();
    inner.encapsulate(Payload::packet(udp)).unwrap();
    let mut outer = Toy::new();
    outer.base_mut().layout_mut().set_by_name("flag", 1).unwrap();
    assert_eq!(outer.encapsulate(Payload::packet(inner)).unwrap(), 1);

    let bytes = outer.bytes();
    assert_eq!(&bytes[..4], &[0x18, 0x00, 0x20, 0x00]);

    let decoded = Toy::decode(&bytes, &DecodeContext::default()).unwrap();
    let inner = decoded.data().unwrap().downcast_ref::<Toy>().unwrap();
    assert_eq!(inner.data().unwrap().kind(), Some(udp::KIND));
    assert_eq!(decoded.bytes(), bytes);
}

#[test]
fn igmp_v3_report_is_decoded_through_the_chain() {
    let eth = ethernet_igmp(
        Payload::packet(IgmpV3Report::new().unwrap()),
        igmp::layout::V3_HOST_MEMBERSHIP_REPORT,
    );
    let bytes = eth.bytes();

    let decoded = Ethernet::decode(&bytes, &DecodeContext::default()).unwrap();
    let ip = decoded.data().unwrap().downcast_ref::<Ipv4>().unwrap();
    let igmp = ip.data().unwrap().downcast_ref::<Igmp>().unwrap();
    assert_eq!(igmp.description(), "IGMPv3 Report");
    assert_eq!(igmp.data().unwrap().kind(), Some(igmp::v3::REPORT_KIND));
    assert_eq!(decoded.bytes(), bytes);
    assert!(
        verify(&decoded)
            .iter()
            .all(|report| !matches!(report.status, ChecksumStatus::Invalid { .. }))
    );
}

#[test]
fn unknown_igmp_type_keeps_the_rest_opaque() {
    let eth = ethernet_igmp(Payload::opaque(vec![0xde, 0xad, 0xbe, 0xef]), 0x99);
    let decoded = Ethernet::decode(&eth.bytes(), &DecodeContext::default()).unwrap();
    let ip = decoded.data().unwrap().downcast_ref::<Ipv4>().unwrap();
    let igmp = ip.data().unwrap().downcast_ref::<Igmp>().unwrap();
    assert_eq!(
        igmp.data().and_then(Payload::as_opaque),
        Some(&[0xde, 0xad, 0xbe, 0xef][..])
    );
    let rendered = render_chain(&decoded);
    assert!(rendered.contains("IGMP\n"));
    assert!(rendered.ends_with("payload deadbeef\n"));
}

#[test]
fn group_record_bytes_follow_the_message_type() {
    let mut record =
        GroupRecord::new(igmp::layout::MODE_IS_EXCLUDE, Ipv4Addr::new(239, 1, 2, 3)).unwrap();
    record.push_source(Ipv4Addr::new(10, 0, 0, 7)).unwrap();
    record.push_source(Ipv4Addr::new(10, 0, 0, 8)).unwrap();
    let mut report = IgmpV3Report::new().unwrap();
    report.push_record(record.clone()).unwrap();

    let mut header = Igmp::new().unwrap();
    header.encapsulate(Payload::packet(report)).unwrap();
    assert_eq!(header.message_type(), igmp::layout::V3_HOST_MEMBERSHIP_REPORT);
    let mut bytes = header.bytes();
    let trailing = bytes[igmp::layout::HEADER_LEN..].to_vec();

    let decoded = Igmp::decode(&bytes, &DecodeContext::default()).unwrap();
    let report = decoded
        .data()
        .unwrap()
        .downcast_ref::<IgmpV3Report>()
        .unwrap();
    assert_eq!(report.records(), &[record]);
    assert_eq!(report.records()[0].sources().len(), 2);

    bytes[0] = 0x99;
    let decoded = Igmp::decode(&bytes, &DecodeContext::default()).unwrap();
    assert_eq!(
        decoded.data().and_then(Payload::as_opaque),
        Some(trailing.as_slice())
    );
    let mut rebuilt = decoded.header_bytes();
    rebuilt.extend_from_slice(&trailing);
    assert_eq!(rebuilt, bytes);
}

#[test]
fn encapsulate_sets_only_the_discriminator() {
    let mut igmp = Igmp::new().unwrap();
    igmp.set_code(100).unwrap();
    igmp.set_checksum(0x1234).unwrap();
    let before = igmp.base().layout().clone();

    igmp.encapsulate(Payload::packet(IgmpV2::new().unwrap()))
        .unwrap();

    let after = igmp.base().layout();
    for (old, new) in before.iter().zip(after.iter()) {
        if new.is_discriminator() {
            assert_eq!(new.get(), 0x11);
        } else {
            assert_eq!(old.get(), new.get(), "{} changed", new.name());
        }
    }
}

#[test]
fn corrupted_payload_fails_only_the_covering_checksums() {
    let mut udp = Udp::new().unwrap();
    udp.set_sport(1024).unwrap();
    udp.set_dport(53).unwrap();
    udp.set_data(Some(Payload::opaque(b"query".to_vec())));
    udp.update_length().unwrap();
    let mut ip = Ipv4::new().unwrap();
    ip.set_src_addr(Ipv4Addr::new(10, 1, 1, 1)).unwrap();
    ip.set_dst_addr(Ipv4Addr::new(10, 1, 1, 2)).unwrap();
    ip.encapsulate(Payload::packet(udp)).unwrap();
    ip.update_length().unwrap();
    finalize(&mut ip).unwrap();

    let mut bytes = ip.bytes();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;
    let decoded = Ipv4::decode(&bytes, &DecodeContext::default()).unwrap();
    let reports = verify(&decoded);
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].status, ChecksumStatus::Valid);
    assert!(matches!(reports[1].status, ChecksumStatus::Invalid { .. }));
}

#[test]
fn strict_padding_rejects_dirty_bits() {
    let mut layout = Layout::from_fields([Field::new("a", 4), Field::new("b", 8)]).unwrap();
    let bytes = [0x12, 0x3f];
    assert_eq!(layout.unpack(&bytes).unwrap(), 2);
    assert_eq!(layout.value_of("b").unwrap(), 0x23);

    let err = layout
        .unpack_with(&bytes, &DecodeOptions::strict())
        .unwrap_err();
    assert_eq!(err, PacketError::Padding { bits: 0xf });
    assert_eq!(layout.pack(), vec![0x12, 0x30]);
}

#[test]
fn short_input_is_a_layout_error() {
    let err = Ipv4::decode(&[0x45, 0, 0], &DecodeContext::default()).unwrap_err();
    assert_eq!(
        err,
        PacketError::Layout {
            needed: 20,
            actual: 3
        }
    );
}
