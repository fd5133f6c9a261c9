use std::borrow::Cow;

use super::error::PacketError;

/// Widest value a single field can hold.
pub const MAX_FIELD_WIDTH: u32 = 128;

/// A named, fixed-width value slot within a header.
///
/// Fields are declared once per protocol and owned by a [`Layout`](super::Layout).
/// Width validation happens when the field is appended to a layout; value
/// validation happens on every [`Field::set`].
///
/// # Examples
/// ```
/// use pcs_core::Field;
///
/// let mut version = Field::new("version", 4).with_default(4);
/// assert_eq!(version.get(), 4);
/// assert!(version.set(16).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    name: Cow<'static, str>,
    width: u32,
    value: u128,
    default: u128,
    discriminator: bool,
}

impl Field {
    pub fn new(name: impl Into<Cow<'static, str>>, width: u32) -> Self {
        Self {
            name: name.into(),
            width,
            value: 0,
            default: 0,
            discriminator: false,
        }
    }

    /// Set the default, which is also the initial value.
    pub fn with_default(mut self, default: u128) -> Self {
        self.default = default;
        self.value = default;
        self
    }

    /// Mark this field as the layout's discriminator.
    pub fn discriminator(mut self) -> Self {
        self.discriminator = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn default_value(&self) -> u128 {
        self.default
    }

    pub fn is_discriminator(&self) -> bool {
        self.discriminator
    }

    pub fn get(&self) -> u128 {
        self.value
    }

    /// Assign a value, rejecting anything wider than the declared width.
    pub fn set(&mut self, value: u128) -> Result<(), PacketError> {
        if !fits(value, self.width) {
            return Err(PacketError::Range {
                field: self.name.to_string(),
                width: self.width,
                value,
            });
        }
        self.value = value;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.value = self.default;
    }

    pub(crate) fn validate(&self) -> Result<(), PacketError> {
        if self.width == 0 || self.width > MAX_FIELD_WIDTH {
            return Err(PacketError::InvalidWidth {
                field: self.name.to_string(),
                width: self.width,
            });
        }
        if !fits(self.default, self.width) {
            return Err(PacketError::Range {
                field: self.name.to_string(),
                width: self.width,
                value: self.default,
            });
        }
        Ok(())
    }

    /// Store a value read from the wire; the reader never yields more bits
    /// than the width.
    pub(crate) fn store(&mut self, value: u128) {
        self.value = value;
    }
}

pub(crate) fn fits(value: u128, width: u32) -> bool {
    width >= MAX_FIELD_WIDTH || value >> width == 0
}
