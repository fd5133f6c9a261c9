//! PCAP/PCAPNG connector.
//!
//! Reading goes through `pcap-parser` and accepts legacy pcap as well as
//! pcapng, picked by magic bytes. Writing always produces legacy
//! little-endian pcap with microsecond timestamps, the format every
//! capture tool reads.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;
pub mod writer;

pub use parser::PcapFileSource;
pub use writer::PcapFileSink;
