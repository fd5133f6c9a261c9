//! Bit-stream cursors shared by [`Layout::pack`](super::Layout::pack) and
//! [`Layout::unpack`](super::Layout::unpack).
//!
//! Values are written most-significant bit first. A value may start and end
//! anywhere inside a byte; the cursor moves in chunks of at most one byte so
//! both directions visit the same bit positions in the same order.

/// Appends values to a zero-initialised buffer, one bit range at a time.
pub struct BitWriter {
    buf: Vec<u8>,
    pos: usize,
}

impl BitWriter {
    pub fn with_bits(bits: usize) -> Self {
        Self {
            buf: vec![0u8; bits.div_ceil(8)],
            pos: 0,
        }
    }

    /// Write the low `width` bits of `value`. The caller guarantees the value
    /// fits and that the buffer was sized for every write.
    pub fn write(&mut self, value: u128, width: u32) {
        let mut remaining = width;
        while remaining > 0 {
            let bit_offset = (self.pos % 8) as u32;
            let space = 8 - bit_offset;
            let take = space.min(remaining);
            let chunk = (value >> (remaining - take)) & low_mask(take);
            self.buf[self.pos / 8] |= (chunk << (space - take)) as u8;
            self.pos += take as usize;
            remaining -= take;
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Reads bit ranges back using the same discipline as [`BitWriter`].
pub struct BitReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Read `width` bits. The caller checks the buffer length up front.
    pub fn read(&mut self, width: u32) -> u128 {
        let mut value = 0u128;
        let mut remaining = width;
        while remaining > 0 {
            let bit_offset = (self.pos % 8) as u32;
            let space = 8 - bit_offset;
            let take = space.min(remaining);
            let byte = self.bytes[self.pos / 8] as u128;
            let chunk = (byte >> (space - take)) & low_mask(take);
            value = (value << take) | chunk;
            self.pos += take as usize;
            remaining -= take;
        }
        value
    }

    /// Bits left before the next byte boundary, or 0 when aligned.
    pub fn padding_bits(&self) -> u32 {
        ((8 - self.pos % 8) % 8) as u32
    }

    pub fn position(&self) -> usize {
        self.pos
    }
}

fn low_mask(bits: u32) -> u128 {
    (1u128 << bits) - 1
}
