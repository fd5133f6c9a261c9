//! Packet construction engine.
//!
//! The engine is protocol-agnostic and follows a layered structure:
//! - `field` / `layout`: named bit-width cells and their wire order
//! - `bits`: the MSB-first bit cursor behind pack and unpack
//! - `packet`: the packet base, payload chaining and the `Packet` trait
//! - `dispatch`: discriminator value to next-layer decoder, and back
//! - `checksum` / `chain`: Internet checksums over header plus chain bytes
//! - `error`: explicit, actionable errors
//!
//! Adding a protocol never touches this module: a protocol declares its
//! fields, a static dispatch table and, optionally, checksum hooks.

pub mod bits;
pub mod chain;
pub mod checksum;
pub mod dispatch;
pub mod error;
pub mod field;
pub mod kind;
pub mod layout;
pub mod options;
pub mod packet;

pub use chain::{ChainView, ChecksumReport, Enclosing, finalize, verify};
pub use checksum::{ChecksumStatus, InternetChecksum, internet_checksum};
pub use dispatch::{DecodeFn, DispatchEntry, DispatchTable};
pub use error::PacketError;
pub use field::{Field, MAX_FIELD_WIDTH};
pub use kind::PacketKind;
pub use layout::Layout;
pub use options::{DecodeContext, DecodeOptions};
pub use packet::{Packet, PacketBase, PacketType, Payload, decode_next, opaque_tail, render_chain};
