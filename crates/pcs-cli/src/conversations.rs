//! TCP conversation splitting for `pcs split`.
//!
//! A conversation is keyed by its unordered endpoint pair, so both
//! directions land in the same file. Files are numbered in order of first
//! appearance and receive the captured frame bytes, not a re-encoding.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pcs_core::protocols::ipv4::Ipv4;
use pcs_core::protocols::ipv6::Ipv6;
use pcs_core::protocols::tcp::Tcp;
use pcs_core::{Frame, FrameSink, Packet, PcapFileSink};
use serde::Serialize;
use tracing::debug;

pub type Endpoint = (IpAddr, u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConversationKey {
    pub low: Endpoint,
    pub high: Endpoint,
}

impl ConversationKey {
    pub fn new(x: Endpoint, y: Endpoint) -> Self {
        if x <= y {
            Self { low: x, high: y }
        } else {
            Self { low: y, high: x }
        }
    }
}

/// Key of the TCP conversation `packet` belongs to, if it carries TCP over IP.
pub fn tcp_conversation(packet: &dyn Packet) -> Option<ConversationKey> {
    let mut layer = packet;
    loop {
        if let Some(ip) = layer.as_any().downcast_ref::<Ipv4>() {
            let tcp = ip.data()?.downcast_ref::<Tcp>()?;
            return Some(ConversationKey::new(
                (IpAddr::V4(ip.src_addr()), tcp.sport()),
                (IpAddr::V4(ip.dst_addr()), tcp.dport()),
            ));
        }
        if let Some(ip) = layer.as_any().downcast_ref::<Ipv6>() {
            let tcp = ip.data()?.downcast_ref::<Tcp>()?;
            return Some(ConversationKey::new(
                (IpAddr::V6(ip.src_addr()), tcp.sport()),
                (IpAddr::V6(ip.dst_addr()), tcp.dport()),
            ));
        }
        layer = layer.data()?.as_packet()?;
    }
}

/// One line of the `conversations.json` index.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationEntry {
    pub file: String,
    pub endpoints: [String; 2],
    pub frames: u64,
}

struct OpenConversation {
    key: ConversationKey,
    file: String,
    sink: PcapFileSink,
    frames: u64,
}

pub struct Splitter {
    dir: PathBuf,
    index: HashMap<ConversationKey, usize>,
    open: Vec<OpenConversation>,
}

impl Splitter {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            index: HashMap::new(),
            open: Vec::new(),
        }
    }

    /// Append `frame` to the file for `key`, creating it on first use.
    pub fn add(&mut self, key: ConversationKey, frame: &Frame) -> Result<()> {
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = self.open.len();
                let file = format!("conversation-{:04}.pcap", slot + 1);
                let path = self.dir.join(&file);
                let sink = PcapFileSink::create(&path, frame.linktype)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                debug!(file = %file, low = ?key.low, high = ?key.high, "new conversation");
                self.open.push(OpenConversation {
                    key,
                    file,
                    sink,
                    frames: 0,
                });
                self.index.insert(key, slot);
                slot
            }
        };
        let conversation = &mut self.open[slot];
        conversation
            .sink
            .write_frame(frame.ts, &frame.data)
            .with_context(|| format!("Failed to write {}", conversation.file))?;
        conversation.frames += 1;
        Ok(())
    }

    /// Flush every file and return the index in order of first appearance.
    pub fn finish(self) -> Result<Vec<ConversationEntry>> {
        let mut entries = Vec::with_capacity(self.open.len());
        for mut conversation in self.open {
            conversation
                .sink
                .flush()
                .with_context(|| format!("Failed to flush {}", conversation.file))?;
            entries.push(ConversationEntry {
                file: conversation.file,
                endpoints: [
                    SocketAddr::from(conversation.key.low).to_string(),
                    SocketAddr::from(conversation.key.high).to_string(),
                ],
                frames: conversation.frames,
            });
        }
        Ok(entries)
    }
}
