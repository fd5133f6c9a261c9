//! Serializable per-frame summaries.
//!
//! A summary flattens a packet chain into one entry per layer, in chain
//! order, with field values as JSON numbers up to 64 bits and hex strings
//! above that (addresses of IPv6 and ND targets). Output is deterministic:
//! layers and fields keep wire order.
//!
//! Version française (résumé):
//! Un résumé aplatit la chaîne de paquets en une entrée par couche, dans
//! l'ordre de la chaîne. Les champs de plus de 64 bits sont rendus en
//! hexadécimal. La sortie est déterministe.

use serde::Serialize;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::engine::{ChecksumStatus, Packet, PacketKind, Payload, verify};

/// Summary of one decoded frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PacketSummary {
    /// RFC3339 capture time, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Encoded length of the whole chain in bytes.
    pub length: usize,
    pub layers: Vec<LayerSummary>,
    /// Bytes left undecoded at the end of the chain.
    pub opaque_len: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSummary {
    pub kind: PacketKind,
    pub description: String,
    pub fields: Vec<FieldSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<ChecksumStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSummary {
    pub name: String,
    pub width: u32,
    pub value: FieldValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(u64),
    /// `0x`-prefixed, for values wider than 64 bits.
    Hex(String),
}

impl From<u128> for FieldValue {
    fn from(value: u128) -> Self {
        match u64::try_from(value) {
            Ok(value) => Self::Number(value),
            Err(_) => Self::Hex(format!("{value:#x}")),
        }
    }
}

impl PacketSummary {
    /// Summarize `packet`; with `verify_checksums`, each layer also carries
    /// its checksum status.
    ///
    /// # Examples
    /// ```
    /// use pcs_core::protocols::udp::Udp;
    /// use pcs_core::summary::PacketSummary;
    ///
    /// let udp = Udp::new()?;
    /// let summary = PacketSummary::from_packet(&udp, false);
    /// assert_eq!(summary.layers.len(), 1);
    /// assert_eq!(summary.length, 8);
    /// # Ok::<(), pcs_core::PacketError>(())
    /// ```
    pub fn from_packet(packet: &dyn Packet, verify_checksums: bool) -> Self {
        let mut layers = Vec::new();
        let mut opaque_len = 0;
        let mut current = Some(packet);
        while let Some(layer) = current {
            layers.push(LayerSummary {
                kind: layer.kind(),
                description: layer.description().into_owned(),
                fields: layer
                    .base()
                    .layout()
                    .iter()
                    .map(|field| FieldSummary {
                        name: field.name().to_string(),
                        width: field.width(),
                        value: field.get().into(),
                    })
                    .collect(),
                checksum: None,
            });
            current = match layer.data() {
                Some(Payload::Packet(inner)) => Some(inner.as_ref()),
                Some(Payload::Opaque(bytes)) => {
                    opaque_len = bytes.len();
                    None
                }
                None => None,
            };
        }

        if verify_checksums {
            for (layer, report) in layers.iter_mut().zip(verify(packet)) {
                layer.checksum = Some(report.status);
            }
        }

        Self {
            timestamp: ts_to_rfc3339(packet.timestamp()),
            length: packet.bytes().len(),
            layers,
            opaque_len,
        }
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

fn ts_to_rfc3339(ts: Option<f64>) -> Option<String> {
    let ts = ts?;
    let nanos = (ts * 1_000_000_000.0) as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}

#[cfg(test)]
mod tests {
    use super::{FieldValue, PacketSummary, ts_to_rfc3339};
    use crate::engine::{DecodeContext, DecodeOptions, Packet, PacketType, Payload, finalize};
    use crate::protocols::ipv6::Ipv6;
    use crate::protocols::udp::Udp;

    #[test]
    fn wide_values_are_hex() {
        assert_eq!(FieldValue::from(7u128), FieldValue::Number(7));
        assert_eq!(
            FieldValue::from(1u128 << 64),
            FieldValue::Hex("0x10000000000000000".to_string())
        );
    }

    #[test]
    fn timestamps_render_as_rfc3339() {
        assert_eq!(
            ts_to_rfc3339(Some(0.0)).as_deref(),
            Some("1970-01-01T00:00:00Z")
        );
        assert_eq!(ts_to_rfc3339(None), None);
    }

    #[test]
    fn chain_summary_with_checksums() {
        let mut udp = Udp::new().unwrap();
        udp.set_data(Some(Payload::opaque(vec![1, 2, 3])));
        udp.update_length().unwrap();
        let mut ip = Ipv6::new().unwrap();
        ip.set_src(1).unwrap();
        ip.set_dst(u128::MAX).unwrap();
        ip.encapsulate(Payload::packet(udp)).unwrap();
        ip.update_length().unwrap();
        finalize(&mut ip).unwrap();

        let ctx = DecodeContext::new(Some(0.5), DecodeOptions::default());
        let decoded = Ipv6::decode(&ip.bytes(), &ctx).unwrap();
        let summary = PacketSummary::from_packet(&decoded, true);
        assert_eq!(summary.layers.len(), 2);
        assert_eq!(summary.layers[0].kind.name(), "ipv6");
        assert_eq!(summary.layers[1].kind.name(), "udp");
        assert_eq!(summary.opaque_len, 3);
        assert_eq!(summary.length, 51);
        assert!(summary.layers[1].checksum.unwrap().is_valid());

        let json: serde_json::Value =
            serde_json::from_str(&summary.to_json(false).unwrap()).unwrap();
        assert!(
            json["timestamp"]
                .as_str()
                .unwrap()
                .starts_with("1970-01-01T00:00:00.5")
        );
        assert_eq!(json["layers"][0]["fields"][7]["name"], "dst");
        assert_eq!(
            json["layers"][0]["fields"][7]["value"],
            "0xffffffffffffffffffffffffffffffff"
        );
        assert_eq!(json["layers"][1]["checksum"]["status"], "valid");
    }
}
