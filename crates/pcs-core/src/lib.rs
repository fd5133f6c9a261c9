//! PCS core library: build, decode and re-encode network packets.
//!
//! Packets are described declaratively. A protocol lists its fields with
//! their bit widths, marks at most one of them as the discriminator, and
//! publishes a static table mapping discriminator values to the decoder of
//! the next layer. The engine then packs and unpacks headers bit-exactly,
//! walks payload chains on decode, reverse-maps payloads to discriminator
//! values on build, and computes Internet checksums over whole chains.
//!
//! Layers:
//! - `engine`: fields, layouts, the `Packet` trait, dispatch and checksums
//! - `protocols`: Ethernet, IPv4, IPv6, TCP, UDP, ICMPv6, ND6 and IGMP
//! - `source`: pcap/pcapng frame sources and a pcap sink (all file I/O)
//! - `link`: link type to outermost decoder
//! - `summary`: deterministic JSON-ready summaries of decoded frames
//!
//! Invariants:
//! - Decoding then encoding an unmodified chain reproduces the input bytes.
//! - Unknown discriminator values never fail a decode; the rest of the
//!   frame is kept as an opaque payload.
//! - Declared lengths that exceed the input always fail.
//!
//! Version française (résumé):
//! Cette crate décrit les paquets de façon déclarative (champs à largeur en
//! bits, discriminant, table de dispatch) et fournit l'encodage, le décodage
//! en chaîne et le calcul des sommes de contrôle Internet. Les E/S restent
//! dans `source`.
//!
//! # Examples
//! ```
//! use pcs_core::protocols::ipv4::Ipv4;
//! use pcs_core::protocols::udp::Udp;
//! use pcs_core::{DecodeContext, Packet, PacketType, Payload, finalize};
//!
//! let mut udp = Udp::new()?;
//! udp.set_dport(53)?;
//! udp.set_data(Some(Payload::opaque(vec![0u8; 4])));
//! udp.update_length()?;
//!
//! let mut ip = Ipv4::new()?;
//! ip.encapsulate(Payload::packet(udp))?;
//! ip.update_length()?;
//! finalize(&mut ip)?;
//!
//! let bytes = ip.bytes();
//! let decoded = Ipv4::decode(&bytes, &DecodeContext::default())?;
//! assert_eq!(decoded.protocol(), 17);
//! assert_eq!(decoded.bytes(), bytes);
//! # Ok::<(), pcs_core::PacketError>(())
//! ```

#[macro_use]
mod macros;

pub mod engine;
pub mod link;
pub mod protocols;
pub mod source;
pub mod summary;

pub use engine::{
    ChainView, ChecksumReport, ChecksumStatus, DecodeContext, DecodeOptions, DispatchEntry,
    DispatchTable, Enclosing, Field, InternetChecksum, Layout, MAX_FIELD_WIDTH, Packet,
    PacketBase, PacketError, PacketKind, PacketType, Payload, decode_next, finalize,
    internet_checksum, opaque_tail, render_chain, verify,
};
pub use source::{
    Frame, FrameSink, FrameSource, Linktype, PcapFileSink, PcapFileSource, SourceError,
};
pub use summary::{FieldSummary, FieldValue, LayerSummary, PacketSummary};
