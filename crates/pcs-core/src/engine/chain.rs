//! Checksum passes over a packet chain.
//!
//! A nested packet does not hold a reference to the packet that owns it.
//! Instead, the chain walk hands each layer a [`ChainView`]: a borrowed copy
//! of the enclosing header (for pseudo headers) and every byte that follows
//! this layer's header up to the end of the outermost packet's payload.
//! Because payloads are owned by the layer in front of them, that span is the
//! encoded payload chain of the layer itself.
//!
//! Checksums are computed innermost first, so each outer layer sums payload
//! bytes that already carry their final checksums.

use serde::Serialize;

use super::checksum::ChecksumStatus;
use super::error::PacketError;
use super::kind::PacketKind;
use super::packet::{Packet, Payload};

/// Header bytes of the layer that encloses the current one.
#[derive(Debug, Clone, Copy)]
pub struct Enclosing<'a> {
    pub kind: PacketKind,
    pub header: &'a [u8],
}

/// What a layer can see of the chain around it when computing a checksum.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainView<'a> {
    pub enclosing: Option<Enclosing<'a>>,
    pub following: &'a [u8],
}

impl<'a> ChainView<'a> {
    /// A view for a packet with no enclosing layer.
    pub fn detached(following: &'a [u8]) -> Self {
        Self {
            enclosing: None,
            following,
        }
    }
}

/// Per-layer checksum verdict produced by [`verify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChecksumReport {
    pub kind: PacketKind,
    pub status: ChecksumStatus,
}

/// Compute every checksum in the chain rooted at `packet`, innermost first.
pub fn finalize(packet: &mut dyn Packet) -> Result<(), PacketError> {
    finalize_layer(packet, None)
}

fn finalize_layer(
    packet: &mut dyn Packet,
    enclosing: Option<Enclosing<'_>>,
) -> Result<(), PacketError> {
    let header = packet.header_bytes();
    let kind = packet.kind();
    if let Some(Payload::Packet(inner)) = packet.data_mut() {
        let outer = Enclosing {
            kind,
            header: &header,
        };
        finalize_layer(inner.as_mut(), Some(outer))?;
    }
    let following = following_bytes(packet);
    packet.calc_checksum(&ChainView {
        enclosing,
        following: &following,
    })
}

/// Verify every checksum in the chain rooted at `packet`, outermost first.
pub fn verify(packet: &dyn Packet) -> Vec<ChecksumReport> {
    let mut reports = Vec::new();
    verify_layer(packet, None, &mut reports);
    reports
}

fn verify_layer(
    packet: &dyn Packet,
    enclosing: Option<Enclosing<'_>>,
    reports: &mut Vec<ChecksumReport>,
) {
    let following = following_bytes(packet);
    reports.push(ChecksumReport {
        kind: packet.kind(),
        status: packet.verify_checksum(&ChainView {
            enclosing,
            following: &following,
        }),
    });
    if let Some(Payload::Packet(inner)) = packet.data() {
        let header = packet.header_bytes();
        let outer = Enclosing {
            kind: packet.kind(),
            header: &header,
        };
        verify_layer(inner.as_ref(), Some(outer), reports);
    }
}

// Trailers (link padding after an IP datagram) are outside every payload
// and never part of a following span.
fn following_bytes(packet: &dyn Packet) -> Vec<u8> {
    packet.data().map(Payload::bytes).unwrap_or_default()
}
