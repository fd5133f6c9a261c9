use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use pcap_parser::Linktype;
use pcs_core::{
    DecodeOptions, FrameSink, FrameSource, PcapFileSink, PcapFileSource, SourceError, link,
};

fn temp_path(name: &str, ext: &str) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("pcs_{name}_{unique}.{ext}"))
}

fn raw_ipv4_frame(last_octet: u8) -> Vec<u8> {
    let mut frame = vec![0x45, 0, 0, 20, 0, 0, 0, 0, 64, 0xfd, 0, 0];
    frame.extend_from_slice(&[10, 0, 0, 1, 10, 0, 0, last_octet]);
    frame
}

#[test]
fn sink_output_reads_back_through_source() {
    let path = temp_path("roundtrip", "pcap");
    let mut sink = PcapFileSink::create(&path, Linktype::RAW).unwrap();
    sink.write_frame(Some(1.5), &raw_ipv4_frame(2)).unwrap();
    sink.write_frame(Some(2.25), &raw_ipv4_frame(3)).unwrap();
    sink.flush().unwrap();
    drop(sink);

    let mut source = PcapFileSource::open(&path).unwrap();
    let mut frames = Vec::new();
    while let Some(frame) = source.next_frame().unwrap() {
        frames.push(frame);
    }
    let _ = fs::remove_file(&path);

    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].linktype, Linktype::RAW);
    assert_eq!(frames[0].ts, Some(1.5));
    assert_eq!(frames[1].data, raw_ipv4_frame(3));

    let packet = link::unpack_frame(&frames[1], DecodeOptions::default()).unwrap();
    assert_eq!(packet.kind().name(), "ipv4");
    assert_eq!(packet.timestamp(), Some(2.25));
}

#[test]
fn pcapng_frames_carry_interface_linktype() {
    let frame = raw_ipv4_frame(9);
    let mut output = Vec::new();
    output.extend_from_slice(&pcapng_block(0x0A0D0D0A, &section_header_body()));
    output.extend_from_slice(&pcapng_block(1, &interface_desc_body(Linktype::RAW)));
    output.extend_from_slice(&pcapng_block(6, &enhanced_packet_body(3_000_000, &frame)));

    let path = temp_path("ng", "pcapng");
    fs::write(&path, output).unwrap();
    let mut source = PcapFileSource::open(&path).unwrap();
    let first = source.next_frame().unwrap().unwrap();
    let end = source.next_frame().unwrap();
    let _ = fs::remove_file(&path);

    assert_eq!(first.linktype, Linktype::RAW);
    assert_eq!(first.ts, Some(3.0));
    assert_eq!(first.data, frame);
    assert!(end.is_none());
}

#[test]
fn pcap_source_rejects_truncated_file() {
    let path = temp_path("truncated", "pcapng");
    fs::write(&path, [0x0a, 0x0d, 0x0d]).unwrap();
    let err = match PcapFileSource::open(&path) {
        Ok(_) => panic!("expected truncated file to be rejected"),
        Err(err) => err,
    };
    let _ = fs::remove_file(&path);

    assert!(matches!(err, SourceError::Io(_)));
}

fn pcapng_block(block_type: u32, body: &[u8]) -> Vec<u8> {
    let total_len = (8 + body.len() + 4) as u32;
    let mut block = Vec::with_capacity(total_len as usize);
    block.extend_from_slice(&block_type.to_be_bytes());
    block.extend_from_slice(&total_len.to_be_bytes());
    block.extend_from_slice(body);
    block.extend_from_slice(&total_len.to_be_bytes());
    block
}

fn section_header_body() -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&0x1A2B3C4Du32.to_be_bytes());
    body.extend_from_slice(&1u16.to_be_bytes());
    body.extend_from_slice(&0u16.to_be_bytes());
    body.extend_from_slice(&(-1i64).to_be_bytes());
    body
}

fn interface_desc_body(linktype: Linktype) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&(linktype.0 as u16).to_be_bytes());
    body.extend_from_slice(&0u16.to_be_bytes());
    body.extend_from_slice(&65535u32.to_be_bytes());
    body
}

fn enhanced_packet_body(ts_us: u64, data: &[u8]) -> Vec<u8> {
    let cap_len = data.len() as u32;
    let mut body = Vec::new();
    body.extend_from_slice(&0u32.to_be_bytes());
    body.extend_from_slice(&((ts_us >> 32) as u32).to_be_bytes());
    body.extend_from_slice(&(ts_us as u32).to_be_bytes());
    body.extend_from_slice(&cap_len.to_be_bytes());
    body.extend_from_slice(&cap_len.to_be_bytes());
    body.extend_from_slice(data);
    body.resize(body.len() + (4 - data.len() % 4) % 4, 0);
    body
}
