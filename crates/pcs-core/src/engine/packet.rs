use std::any::Any;
use std::borrow::Cow;
use std::fmt::{self, Write as _};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, trace};

use super::chain::ChainView;
use super::checksum::ChecksumStatus;
use super::dispatch::DispatchTable;
use super::error::PacketError;
use super::kind::PacketKind;
use super::layout::Layout;
use super::options::DecodeContext;

/// State shared by every concrete packet: the bound layout, timestamp,
/// description and the owned payload.
#[derive(Debug)]
pub struct PacketBase {
    layout: Layout,
    timestamp: Option<f64>,
    description: Cow<'static, str>,
    data: Option<Payload>,
}

impl PacketBase {
    /// Build path: defaults everywhere, creation time as timestamp.
    pub fn new(layout: Layout, description: impl Into<Cow<'static, str>>) -> Self {
        Self {
            layout,
            timestamp: now(),
            description: description.into(),
            data: None,
        }
    }

    /// Decode path: unpack `layout` from the head of `bytes` and return the
    /// base together with the bytes that follow it.
    pub fn unpack<'a>(
        mut layout: Layout,
        description: impl Into<Cow<'static, str>>,
        bytes: &'a [u8],
        ctx: &DecodeContext,
    ) -> Result<(Self, &'a [u8]), PacketError> {
        let used = layout.unpack_with(bytes, &ctx.options)?;
        let base = Self {
            layout,
            timestamp: ctx.timestamp,
            description: description.into(),
            data: None,
        };
        Ok((base, &bytes[used..]))
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut Layout {
        &mut self.layout
    }

    pub fn timestamp(&self) -> Option<f64> {
        self.timestamp
    }

    pub fn set_timestamp(&mut self, timestamp: Option<f64>) {
        self.timestamp = timestamp;
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<Cow<'static, str>>) {
        self.description = description.into();
    }

    pub fn data(&self) -> Option<&Payload> {
        self.data.as_ref()
    }

    pub fn data_mut(&mut self) -> Option<&mut Payload> {
        self.data.as_mut()
    }

    pub fn set_data(&mut self, data: Option<Payload>) {
        self.data = data;
    }

    pub fn take_data(&mut self) -> Option<Payload> {
        self.data.take()
    }
}

/// What follows a header: another packet, or bytes nothing could decode.
#[derive(Debug)]
pub enum Payload {
    Packet(Box<dyn Packet>),
    /// Unparsed span, preserved verbatim for re-encoding.
    Opaque(Vec<u8>),
}

impl Payload {
    pub fn packet(packet: impl Packet) -> Self {
        Self::Packet(Box::new(packet))
    }

    pub fn opaque(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Opaque(bytes.into())
    }

    pub fn bytes(&self) -> Vec<u8> {
        match self {
            Self::Packet(packet) => packet.bytes(),
            Self::Opaque(bytes) => bytes.clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Packet(packet) => packet.bytes().len(),
            Self::Opaque(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Kind of the nested packet; `None` for opaque bytes.
    pub fn kind(&self) -> Option<PacketKind> {
        self.as_packet().map(|packet| packet.kind())
    }

    pub fn as_packet(&self) -> Option<&dyn Packet> {
        match self {
            Self::Packet(packet) => Some(packet.as_ref()),
            Self::Opaque(_) => None,
        }
    }

    pub fn as_packet_mut(&mut self) -> Option<&mut dyn Packet> {
        match self {
            Self::Packet(packet) => Some(packet.as_mut()),
            Self::Opaque(_) => None,
        }
    }

    pub fn as_opaque(&self) -> Option<&[u8]> {
        match self {
            Self::Opaque(bytes) => Some(bytes),
            Self::Packet(_) => None,
        }
    }

    pub fn downcast_ref<P: Packet>(&self) -> Option<&P> {
        self.as_packet()?.as_any().downcast_ref::<P>()
    }

    pub fn downcast_mut<P: Packet>(&mut self) -> Option<&mut P> {
        self.as_packet_mut()?.as_any_mut().downcast_mut::<P>()
    }
}

/// A decoded or to-be-encoded header plus its optional nested payload.
///
/// Concrete types store a [`PacketBase`] and expose typed accessors for
/// their fields; everything else has a default implementation here.
pub trait Packet: fmt::Debug + Send + Sync + 'static {
    fn kind(&self) -> PacketKind;

    fn base(&self) -> &PacketBase;

    fn base_mut(&mut self) -> &mut PacketBase;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Encoded header, including any variable-length tail the type owns.
    fn header_bytes(&self) -> Vec<u8> {
        self.base().layout().pack()
    }

    /// Bytes that follow the payload but belong to this layer.
    fn trailer_bytes(&self) -> &[u8] {
        &[]
    }

    /// Length of this packet's own header; excludes the payload.
    fn sizeof(&self) -> usize {
        self.header_bytes().len()
    }

    /// Full on-wire representation of this packet and everything it carries.
    fn bytes(&self) -> Vec<u8> {
        let mut bytes = self.header_bytes();
        if let Some(data) = self.data() {
            bytes.extend_from_slice(&data.bytes());
        }
        bytes.extend_from_slice(self.trailer_bytes());
        bytes
    }

    fn data(&self) -> Option<&Payload> {
        self.base().data()
    }

    fn data_mut(&mut self) -> Option<&mut Payload> {
        self.base_mut().data_mut()
    }

    fn set_data(&mut self, data: Option<Payload>) {
        self.base_mut().set_data(data);
    }

    fn take_data(&mut self) -> Option<Payload> {
        self.base_mut().take_data()
    }

    fn timestamp(&self) -> Option<f64> {
        self.base().timestamp()
    }

    fn description(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.base().description())
    }

    /// Table mapping this packet's discriminator to the next layer.
    fn dispatch(&self) -> Option<&'static DispatchTable> {
        None
    }

    /// Set the discriminator field to the value that selects `payload`'s
    /// kind. No other field is touched.
    ///
    /// # Errors
    /// [`PacketError::Discrimination`] when the payload is opaque, this type
    /// has no dispatch table, or no entry produces that kind.
    fn rdiscriminate(&mut self, payload: &Payload) -> Result<u128, PacketError> {
        let kind = payload.kind().ok_or_else(|| PacketError::Discrimination {
            kind: "opaque".to_string(),
        })?;
        let value = self
            .dispatch()
            .and_then(|table| table.reverse(kind))
            .ok_or_else(|| PacketError::Discrimination {
                kind: kind.to_string(),
            })?;
        self.base_mut().layout_mut().set_discriminator(value)?;
        Ok(value)
    }

    /// Reverse-discriminate `payload`, then take ownership of it.
    fn encapsulate(&mut self, payload: Payload) -> Result<u128, PacketError> {
        let value = self.rdiscriminate(&payload)?;
        self.set_data(Some(payload));
        Ok(value)
    }

    /// Compute and store this layer's checksum, if it has one.
    fn calc_checksum(&mut self, _chain: &ChainView<'_>) -> Result<(), PacketError> {
        Ok(())
    }

    fn verify_checksum(&self, _chain: &ChainView<'_>) -> ChecksumStatus {
        ChecksumStatus::NotApplicable
    }

    /// Description line followed by one `name value` line per field.
    fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.description());
        for field in self.base().layout() {
            let _ = writeln!(out, "{} {}", field.name(), field.get());
        }
        out
    }
}

/// A [`Packet`] that can be decoded from bytes and named in a dispatch table.
pub trait PacketType: Packet + Sized {
    const KIND: PacketKind;

    fn decode(bytes: &[u8], ctx: &DecodeContext) -> Result<Self, PacketError>;
}

/// Decode `rest` as whatever `discriminator` selects in `table`.
///
/// Unknown values, and headers without a discriminator, yield an opaque
/// payload. Empty input yields no payload at all.
pub fn decode_next(
    table: &DispatchTable,
    discriminator: Option<u128>,
    rest: &[u8],
    ctx: &DecodeContext,
) -> Result<Option<Payload>, PacketError> {
    if rest.is_empty() {
        return Ok(None);
    }
    match discriminator.and_then(|value| table.lookup(value)) {
        Some(entry) => {
            trace!(kind = %entry.kind(), len = rest.len(), "decoding next layer");
            Ok(Some(Payload::Packet(entry.decode(rest, ctx)?)))
        }
        None => {
            debug!(
                discriminator = ?discriminator,
                len = rest.len(),
                "no decoder for discriminator, keeping opaque payload"
            );
            Ok(Some(Payload::Opaque(rest.to_vec())))
        }
    }
}

/// Wrap `rest` as an opaque payload, or nothing when empty.
pub fn opaque_tail(rest: &[u8]) -> Option<Payload> {
    if rest.is_empty() {
        None
    } else {
        Some(Payload::Opaque(rest.to_vec()))
    }
}

/// Render every layer of a chain, ending with a hex line for opaque bytes.
pub fn render_chain(packet: &dyn Packet) -> String {
    let mut out = packet.render();
    let mut next = packet.data();
    while let Some(payload) = next {
        match payload {
            Payload::Packet(inner) => {
                out.push_str(&inner.render());
                next = inner.data();
            }
            Payload::Opaque(bytes) => {
                let _ = writeln!(out, "payload {}", hex(bytes));
                next = None;
            }
        }
    }
    out
}

pub(crate) fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn now() -> Option<f64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|elapsed| elapsed.as_secs_f64())
}
