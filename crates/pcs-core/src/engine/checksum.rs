use serde::{Deserialize, Serialize};

/// Streaming RFC 1071 ones'-complement sum.
///
/// Chunks may have odd lengths; a dangling byte is paired with the first
/// byte of the next chunk so the result equals the sum over the
/// concatenation.
///
/// # Examples
/// ```
/// use pcs_core::InternetChecksum;
///
/// let mut sum = InternetChecksum::new();
/// sum.add(&[0x00, 0x01, 0xf2]);
/// sum.add(&[0x03, 0xf4, 0xf5, 0xf6, 0xf7]);
/// assert_eq!(sum.finish(), 0x220d);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InternetChecksum {
    accum: u64,
    pending: Option<u8>,
}

impl InternetChecksum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, mut data: &[u8]) {
        if let Some(high) = self.pending.take() {
            match data.split_first() {
                Some((&low, rest)) => {
                    self.accum += u16::from_be_bytes([high, low]) as u64;
                    data = rest;
                }
                None => {
                    self.pending = Some(high);
                    return;
                }
            }
        }
        let mut words = data.chunks_exact(2);
        for word in &mut words {
            self.accum += u16::from_be_bytes([word[0], word[1]]) as u64;
        }
        if let [last] = words.remainder() {
            self.pending = Some(*last);
        }
    }

    /// Fold carries into 16 bits without complementing.
    pub fn sum(&self) -> u16 {
        let mut accum = self.accum;
        if let Some(high) = self.pending {
            accum += (high as u64) << 8;
        }
        while accum >> 16 != 0 {
            accum = (accum >> 16) + (accum & 0xffff);
        }
        accum as u16
    }

    /// The checksum to store in a header: the complement of [`Self::sum`].
    pub fn finish(&self) -> u16 {
        !self.sum()
    }
}

/// Checksum over the concatenation of `chunks`.
pub fn internet_checksum(chunks: &[&[u8]]) -> u16 {
    let mut sum = InternetChecksum::new();
    for chunk in chunks {
        sum.add(chunk);
    }
    sum.finish()
}

/// Outcome of checking a stored checksum against a recomputed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChecksumStatus {
    Valid,
    Invalid { stored: u16, computed: u16 },
    NotApplicable,
}

impl ChecksumStatus {
    pub fn compare(stored: u16, computed: u16) -> Self {
        if stored == computed {
            Self::Valid
        } else {
            Self::Invalid { stored, computed }
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}
