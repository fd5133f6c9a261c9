//! Protocol modules built on the packet engine.
//!
//! Each protocol follows the same structure:
//! - `layout`: field indices, wire constants and the field declaration
//! - `packet`: the packet type, typed accessors, its dispatch table and
//!   checksum hooks
//! - `KIND` in the module root: the identity used by dispatch tables
//!
//! Decoders are pure and contain no I/O.

pub(crate) mod common;
pub mod ethernet;
pub mod icmpv6;
pub mod igmp;
pub mod ipv4;
pub mod ipv6;
pub mod nd6;
pub mod tcp;
pub mod udp;
