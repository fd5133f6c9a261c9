use std::borrow::Cow;

use tracing::debug;

use crate::engine::{
    ChainView, ChecksumStatus, DecodeContext, DispatchEntry, DispatchTable, Packet, PacketBase,
    PacketError, PacketKind, PacketType, Payload, decode_next, internet_checksum,
};

use super::layout;
use super::v2::IgmpV2;
use super::v3::{self, IgmpV3Query, IgmpV3Report};

pub static IGMP_MAP: DispatchTable = DispatchTable::new(&[
    DispatchEntry::of::<IgmpV2>(layout::HOST_MEMBERSHIP_QUERY as u128),
    DispatchEntry::of::<IgmpV2>(layout::V1_HOST_MEMBERSHIP_REPORT as u128),
    DispatchEntry::of::<IgmpV2>(layout::V2_HOST_MEMBERSHIP_REPORT as u128),
    DispatchEntry::of::<IgmpV2>(layout::HOST_LEAVE_MESSAGE as u128),
    DispatchEntry::of::<IgmpV3Report>(layout::V3_HOST_MEMBERSHIP_REPORT as u128),
]);

/// Human-readable name of an IGMP message type.
pub fn describe(message_type: u8) -> &'static str {
    match message_type {
        layout::HOST_MEMBERSHIP_QUERY => "IGMPv2 Query",
        layout::V1_HOST_MEMBERSHIP_REPORT => "IGMPv1 Report",
        layout::DVMRP => "DVMRP",
        layout::V2_HOST_MEMBERSHIP_REPORT => "IGMPv2 Report",
        layout::HOST_LEAVE_MESSAGE => "IGMPv2 Leave",
        layout::MTRACE_REPLY => "MTRACE Reply",
        layout::MTRACE_QUERY => "MTRACE Query",
        layout::V3_HOST_MEMBERSHIP_REPORT => "IGMPv3 Report",
        _ => "IGMP",
    }
}

#[derive(Debug)]
pub struct Igmp {
    base: PacketBase,
}

impl Igmp {
    pub fn new() -> Result<Self, PacketError> {
        Ok(Self {
            base: PacketBase::new(layout::layout()?, "IGMP"),
        })
    }

    field_accessors! {
        message_type, set_message_type: u8 = layout::TYPE;
        /// Max response time in queries; unused elsewhere.
        code, set_code: u8 = layout::CODE;
        checksum, set_checksum: u16 = layout::CHECKSUM;
    }

    fn compute_checksum(&self, following: &[u8]) -> u16 {
        let header = self.base.layout().pack_zeroed(layout::CHECKSUM);
        internet_checksum(&[&header, following])
    }
}

impl PacketType for Igmp {
    const KIND: PacketKind = super::KIND;

    fn decode(bytes: &[u8], ctx: &DecodeContext) -> Result<Self, PacketError> {
        let (base, rest) = PacketBase::unpack(layout::layout()?, "IGMP", bytes, ctx)?;
        let mut packet = Self { base };
        let message_type = packet.message_type();
        let data = if message_type == layout::HOST_MEMBERSHIP_QUERY
            && bytes.len() >= layout::V3_QUERY_MINLEN
        {
            debug!(len = bytes.len(), "membership query long enough for IGMPv3");
            Some(Payload::packet(IgmpV3Query::decode(rest, ctx)?))
        } else {
            decode_next(&IGMP_MAP, Some(message_type.into()), rest, ctx)?
        };
        packet.base.set_data(data);
        Ok(packet)
    }
}

impl Packet for Igmp {
    packet_identity!();

    fn description(&self) -> Cow<'_, str> {
        Cow::Borrowed(describe(self.message_type()))
    }

    fn dispatch(&self) -> Option<&'static DispatchTable> {
        Some(&IGMP_MAP)
    }

    /// An IGMPv3 query has no table entry and maps to the membership query
    /// type; everything else uses the first matching entry.
    fn rdiscriminate(&mut self, payload: &Payload) -> Result<u128, PacketError> {
        let kind = payload.kind().ok_or_else(|| PacketError::Discrimination {
            kind: "opaque".to_string(),
        })?;
        let value = if kind == v3::QUERY_KIND {
            u128::from(layout::HOST_MEMBERSHIP_QUERY)
        } else {
            IGMP_MAP
                .reverse(kind)
                .ok_or_else(|| PacketError::Discrimination {
                    kind: kind.to_string(),
                })?
        };
        self.base.layout_mut().set_discriminator(value)?;
        Ok(value)
    }

    fn calc_checksum(&mut self, chain: &ChainView<'_>) -> Result<(), PacketError> {
        let checksum = self.compute_checksum(chain.following);
        self.set_checksum(checksum)
    }

    fn verify_checksum(&self, chain: &ChainView<'_>) -> ChecksumStatus {
        ChecksumStatus::compare(self.checksum(), self.compute_checksum(chain.following))
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::{IGMP_MAP, Igmp, describe};
    use crate::engine::{
        ChecksumStatus, DecodeContext, Packet, PacketError, PacketType, Payload, finalize,
        verify,
    };
    use crate::protocols::igmp::{self, IgmpV2, IgmpV3Query, IgmpV3Report, layout, v2, v3};

    fn v2_report() -> Igmp {
        let mut igmp = Igmp::new().unwrap();
        let mut body = IgmpV2::new().unwrap();
        body.set_group_addr(Ipv4Addr::new(224, 0, 0, 251)).unwrap();
        igmp.set_message_type(layout::V2_HOST_MEMBERSHIP_REPORT)
            .unwrap();
        igmp.set_data(Some(Payload::packet(body)));
        igmp
    }

    #[test]
    fn dispatch_table_is_valid() {
        IGMP_MAP.validate().unwrap();
    }

    #[test]
    fn checksum_covers_payload() {
        let mut igmp = v2_report();
        finalize(&mut igmp).unwrap();
        assert_eq!(igmp.checksum(), 0x0904);
        let reports = verify(&igmp);
        assert_eq!(reports[0].kind, igmp::KIND);
        assert_eq!(reports[0].status, ChecksumStatus::Valid);
    }

    #[test]
    fn v3_report_type_decodes_as_report() {
        let bytes = [0x22, 0, 0, 0, 0, 0, 0, 0];
        let igmp = Igmp::decode(&bytes, &DecodeContext::default()).unwrap();
        assert_eq!(igmp.data().unwrap().kind(), Some(v3::REPORT_KIND));
        assert_eq!(igmp.description(), "IGMPv3 Report");
    }

    #[test]
    fn unknown_type_keeps_bytes_opaque() {
        let bytes = [0x99, 0, 0, 0, 1, 2, 3, 4];
        let igmp = Igmp::decode(&bytes, &DecodeContext::default()).unwrap();
        assert_eq!(
            igmp.data().and_then(Payload::as_opaque),
            Some(&[1u8, 2, 3, 4][..])
        );
        assert_eq!(igmp.description(), "IGMP");
    }

    #[test]
    fn query_length_selects_version() {
        let short = [0x11, 100, 0, 0, 224, 0, 0, 1];
        let igmp = Igmp::decode(&short, &DecodeContext::default()).unwrap();
        assert_eq!(igmp.data().unwrap().kind(), Some(v2::KIND));

        let long = [0x11, 100, 0, 0, 0, 0, 0, 0, 0x02, 125, 0, 0];
        let igmp = Igmp::decode(&long, &DecodeContext::default()).unwrap();
        let query = igmp
            .data()
            .and_then(|data| data.downcast_ref::<IgmpV3Query>())
            .unwrap();
        assert_eq!(query.qrv(), 2);
        assert_eq!(query.qqic(), 125);
    }

    #[test]
    fn rdiscriminate_touches_only_the_type() {
        let mut igmp = Igmp::new().unwrap();
        igmp.set_code(7).unwrap();
        igmp.set_checksum(0xbeef).unwrap();
        let query = Payload::packet(IgmpV3Query::new().unwrap());
        assert_eq!(igmp.rdiscriminate(&query).unwrap(), 0x11);
        assert_eq!(igmp.message_type(), 0x11);
        assert_eq!(igmp.code(), 7);
        assert_eq!(igmp.checksum(), 0xbeef);

        let report = Payload::packet(IgmpV3Report::new().unwrap());
        assert_eq!(igmp.rdiscriminate(&report).unwrap(), 0x22);

        let v2 = Payload::packet(IgmpV2::new().unwrap());
        assert_eq!(igmp.rdiscriminate(&v2).unwrap(), 0x11);
    }

    #[test]
    fn rdiscriminate_rejects_opaque() {
        let mut igmp = Igmp::new().unwrap();
        let err = igmp.rdiscriminate(&Payload::opaque(vec![1])).unwrap_err();
        assert!(matches!(err, PacketError::Discrimination { .. }));
    }

    #[test]
    fn descriptions() {
        assert_eq!(describe(0x11), "IGMPv2 Query");
        assert_eq!(describe(0x12), "IGMPv1 Report");
        assert_eq!(describe(0x1f), "MTRACE Query");
        assert_eq!(describe(0x42), "IGMP");
    }
}
