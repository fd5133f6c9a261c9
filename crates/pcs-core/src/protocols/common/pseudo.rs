use crate::engine::{ChainView, ChecksumStatus, Enclosing, PacketError, internet_checksum};
use crate::protocols::{ipv4, ipv6};

/// Build the IPv4 or IPv6 pseudo header for an upper-layer checksum.
///
/// Returns `None` when the enclosing layer is not IP or its header is too
/// short to hold the addresses.
pub(crate) fn pseudo_header(
    enclosing: Option<&Enclosing<'_>>,
    protocol: u8,
    length: usize,
) -> Option<Vec<u8>> {
    let enclosing = enclosing?;
    let header = enclosing.header;
    if enclosing.kind == ipv4::KIND {
        let addrs = header.get(ipv4::layout::ADDRESSES_RANGE)?;
        let mut pseudo = Vec::with_capacity(12);
        pseudo.extend_from_slice(addrs);
        pseudo.push(0);
        pseudo.push(protocol);
        pseudo.extend_from_slice(&(length as u16).to_be_bytes());
        Some(pseudo)
    } else if enclosing.kind == ipv6::KIND {
        let addrs = header.get(ipv6::layout::ADDRESSES_RANGE)?;
        let mut pseudo = Vec::with_capacity(40);
        pseudo.extend_from_slice(addrs);
        pseudo.extend_from_slice(&(length as u32).to_be_bytes());
        pseudo.extend_from_slice(&[0, 0, 0, protocol]);
        Some(pseudo)
    } else {
        None
    }
}

/// Checksum over pseudo header, the zeroed header and the following bytes.
pub(crate) fn transport_checksum(
    chain: &ChainView<'_>,
    protocol: u8,
    zeroed_header: &[u8],
    kind: &'static str,
) -> Result<u16, PacketError> {
    let length = zeroed_header.len() + chain.following.len();
    let pseudo = pseudo_header(chain.enclosing.as_ref(), protocol, length)
        .ok_or(PacketError::MissingPseudoHeader { kind })?;
    Ok(internet_checksum(&[&pseudo, zeroed_header, chain.following]))
}

/// Verification counterpart of [`transport_checksum`]; without an IP layer
/// there is nothing to compare against.
pub(crate) fn verify_transport(
    chain: &ChainView<'_>,
    protocol: u8,
    zeroed_header: &[u8],
    stored: u16,
    kind: &'static str,
) -> ChecksumStatus {
    match transport_checksum(chain, protocol, zeroed_header, kind) {
        Ok(computed) => ChecksumStatus::compare(stored, computed),
        Err(_) => ChecksumStatus::NotApplicable,
    }
}
