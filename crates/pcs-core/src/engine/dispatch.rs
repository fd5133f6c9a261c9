//! Discriminator dispatch tables.
//!
//! A table maps a discriminator field's value to the decoder of the next
//! layer. Tables are `static` slices declared by each protocol module, so
//! they are immutable after load and safe to share between threads.
//!
//! Reverse lookup scans in insertion order and returns the first value whose
//! entry produces the requested kind. When several values decode to the same
//! kind (IGMP maps four message types to IGMPv2) the earliest one wins.

use std::fmt;

use super::error::PacketError;
use super::kind::PacketKind;
use super::options::DecodeContext;
use super::packet::{Packet, PacketType};

pub type DecodeFn = fn(&[u8], &DecodeContext) -> Result<Box<dyn Packet>, PacketError>;

#[derive(Clone, Copy)]
pub struct DispatchEntry {
    value: u128,
    kind: PacketKind,
    decode: DecodeFn,
}

impl DispatchEntry {
    /// Entry selecting `P` when the discriminator equals `value`.
    pub const fn of<P: PacketType>(value: u128) -> Self {
        Self {
            value,
            kind: P::KIND,
            decode: decode_boxed::<P>,
        }
    }

    pub fn value(&self) -> u128 {
        self.value
    }

    pub fn kind(&self) -> PacketKind {
        self.kind
    }

    pub fn decode(
        &self,
        bytes: &[u8],
        ctx: &DecodeContext,
    ) -> Result<Box<dyn Packet>, PacketError> {
        (self.decode)(bytes, ctx)
    }
}

impl fmt::Debug for DispatchEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchEntry")
            .field("value", &self.value)
            .field("kind", &self.kind)
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DispatchTable {
    entries: &'static [DispatchEntry],
}

impl DispatchTable {
    pub const fn new(entries: &'static [DispatchEntry]) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &'static [DispatchEntry] {
        self.entries
    }

    /// Forward lookup. `None` means "opaque payload", not an error.
    pub fn lookup(&self, value: u128) -> Option<&'static DispatchEntry> {
        self.entries.iter().find(|entry| entry.value == value)
    }

    /// Reverse lookup: the first value, in insertion order, selecting `kind`.
    pub fn reverse(&self, kind: PacketKind) -> Option<u128> {
        self.entries
            .iter()
            .find(|entry| entry.kind == kind)
            .map(|entry| entry.value)
    }

    /// The derived kind-to-value mapping, one pair per distinct kind, in
    /// first-insertion order.
    pub fn reverse_map(&self) -> Vec<(PacketKind, u128)> {
        let mut map: Vec<(PacketKind, u128)> = Vec::new();
        for entry in self.entries {
            if !map.iter().any(|(kind, _)| *kind == entry.kind) {
                map.push((entry.kind, entry.value));
            }
        }
        map
    }

    /// Check that every value appears once.
    pub fn validate(&self) -> Result<(), PacketError> {
        for (i, entry) in self.entries.iter().enumerate() {
            if self.entries[..i].iter().any(|prev| prev.value == entry.value) {
                return Err(PacketError::DuplicateDispatchValue { value: entry.value });
            }
        }
        Ok(())
    }
}

fn decode_boxed<P: PacketType>(
    bytes: &[u8],
    ctx: &DecodeContext,
) -> Result<Box<dyn Packet>, PacketError> {
    Ok(Box::new(P::decode(bytes, ctx)?))
}

#[cfg(test)]
mod tests {
    use super::{DispatchEntry, DispatchTable};
    use crate::engine::{DecodeContext, PacketError, PacketType};
    use crate::protocols::ethernet::ETHERNET_MAP;
    use crate::protocols::icmpv6::ICMPV6_MAP;
    use crate::protocols::igmp::IGMP_MAP;
    use crate::protocols::ipv4::IPV4_MAP;
    use crate::protocols::ipv6::IPV6_MAP;
    use crate::protocols::tcp::Tcp;
    use crate::protocols::udp::Udp;

    static REPEATED_KIND: DispatchTable = DispatchTable::new(&[
        DispatchEntry::of::<Udp>(17),
        DispatchEntry::of::<Tcp>(6),
        DispatchEntry::of::<Udp>(136),
    ]);

    static REPEATED_VALUE: DispatchTable = DispatchTable::new(&[
        DispatchEntry::of::<Udp>(17),
        DispatchEntry::of::<Tcp>(17),
    ]);

    #[test]
    fn earliest_value_wins_reverse_lookup() {
        assert_eq!(REPEATED_KIND.reverse(Udp::KIND), Some(17));
        assert_eq!(REPEATED_KIND.reverse(Tcp::KIND), Some(6));
        assert_eq!(
            REPEATED_KIND.reverse_map(),
            vec![(Udp::KIND, 17), (Tcp::KIND, 6)]
        );
        REPEATED_KIND.validate().unwrap();
    }

    #[test]
    fn repeated_value_fails_validation() {
        assert_eq!(
            REPEATED_VALUE.validate(),
            Err(PacketError::DuplicateDispatchValue { value: 17 })
        );
        assert_eq!(REPEATED_VALUE.lookup(17).map(|e| e.kind()), Some(Udp::KIND));
    }

    #[test]
    fn unknown_value_has_no_entry() {
        assert!(REPEATED_KIND.lookup(99).is_none());
        let bytes = [0u8; 8];
        let packet = REPEATED_KIND
            .lookup(136)
            .unwrap()
            .decode(&bytes, &DecodeContext::default())
            .unwrap();
        assert_eq!(packet.kind(), Udp::KIND);
    }

    #[test]
    fn protocol_tables_reverse_to_their_first_value() {
        for table in [&ETHERNET_MAP, &IPV4_MAP, &IPV6_MAP, &ICMPV6_MAP, &IGMP_MAP] {
            table.validate().unwrap();
            let entries = table.entries();
            for (i, entry) in entries.iter().enumerate() {
                let shadowed = entries[..i].iter().any(|prev| prev.kind() == entry.kind());
                if !shadowed {
                    assert_eq!(table.reverse(entry.kind()), Some(entry.value()), "{entry:?}");
                }
                assert!(table.reverse_map().contains(&(
                    entry.kind(),
                    table.reverse(entry.kind()).unwrap()
                )));
            }
        }
    }
}
