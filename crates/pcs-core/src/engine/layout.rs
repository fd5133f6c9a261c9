use super::bits::{BitReader, BitWriter};
use super::error::PacketError;
use super::field::Field;
use super::options::DecodeOptions;

/// Ordered collection of [`Field`]s describing one header's wire shape.
///
/// Field order is wire order. Packing is a contiguous bit stream: a field can
/// start in the middle of a byte, and a layout whose total width is not a
/// multiple of eight is padded with zero bits up to the next byte.
///
/// # Examples
/// ```
/// use pcs_core::{Field, Layout};
///
/// let mut layout = Layout::from_fields([
///     Field::new("version", 4).with_default(4),
///     Field::new("hlen", 4).with_default(5),
///     Field::new("flags", 3),
/// ])?;
/// layout.set_by_name("flags", 0b010)?;
/// assert_eq!(layout.sizeof_bits(), 11);
/// assert_eq!(layout.pack(), vec![0x45, 0x40]);
/// # Ok::<(), pcs_core::PacketError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    fields: Vec<Field>,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fields(fields: impl IntoIterator<Item = Field>) -> Result<Self, PacketError> {
        let mut layout = Self::new();
        for field in fields {
            layout.append(field)?;
        }
        Ok(layout)
    }

    /// Append a field at the end of the wire order.
    ///
    /// # Errors
    /// Fails on a duplicate name, a second discriminator, a width outside
    /// `1..=128` or a default that does not fit the width.
    pub fn append(&mut self, field: Field) -> Result<(), PacketError> {
        field.validate()?;
        if self.index_of(field.name()).is_some() {
            return Err(PacketError::DuplicateField {
                field: field.name().to_string(),
            });
        }
        if field.is_discriminator() {
            if let Some(existing) = self.discriminator() {
                return Err(PacketError::DuplicateDiscriminator {
                    existing: existing.name().to_string(),
                    field: field.name().to_string(),
                });
            }
        }
        self.fields.push(field);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn sizeof_bits(&self) -> usize {
        self.fields.iter().map(|f| f.width() as usize).sum()
    }

    pub fn sizeof_bytes(&self) -> usize {
        self.sizeof_bits().div_ceil(8)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name() == name)
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Value of the field at `index`. Indices come from each protocol's
    /// `layout` module and are fixed at declaration time.
    pub fn get(&self, index: usize) -> u128 {
        self.fields[index].get()
    }

    pub fn set(&mut self, index: usize, value: u128) -> Result<(), PacketError> {
        self.fields[index].set(value)
    }

    pub fn value_of(&self, name: &str) -> Result<u128, PacketError> {
        self.field(name)
            .map(Field::get)
            .ok_or_else(|| PacketError::UnknownField {
                field: name.to_string(),
            })
    }

    pub fn set_by_name(&mut self, name: &str, value: u128) -> Result<(), PacketError> {
        let index = self.index_of(name).ok_or_else(|| PacketError::UnknownField {
            field: name.to_string(),
        })?;
        self.set(index, value)
    }

    pub fn discriminator(&self) -> Option<&Field> {
        self.fields.iter().find(|f| f.is_discriminator())
    }

    pub fn discriminator_value(&self) -> Option<u128> {
        self.discriminator().map(Field::get)
    }

    pub fn set_discriminator(&mut self, value: u128) -> Result<(), PacketError> {
        let field = self
            .fields
            .iter_mut()
            .find(|f| f.is_discriminator())
            .ok_or(PacketError::NoDiscriminator)?;
        field.set(value)
    }

    /// Restore every field to its default.
    pub fn reset(&mut self) {
        self.fields.iter_mut().for_each(Field::reset);
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut writer = BitWriter::with_bits(self.sizeof_bits());
        for field in &self.fields {
            writer.write(field.get(), field.width());
        }
        writer.into_bytes()
    }

    /// Pack with the field at `index` written as zero, leaving the stored
    /// value untouched. Checksums are computed over this form.
    pub fn pack_zeroed(&self, index: usize) -> Vec<u8> {
        let mut writer = BitWriter::with_bits(self.sizeof_bits());
        for (i, field) in self.fields.iter().enumerate() {
            let value = if i == index { 0 } else { field.get() };
            writer.write(value, field.width());
        }
        writer.into_bytes()
    }

    /// Read field values from the head of `bytes`, ignoring padding bits.
    /// Returns the number of bytes consumed.
    pub fn unpack(&mut self, bytes: &[u8]) -> Result<usize, PacketError> {
        self.unpack_with(bytes, &DecodeOptions::default())
    }

    /// Like [`Layout::unpack`], with padding checked when
    /// `options.strict_padding` is set.
    pub fn unpack_with(
        &mut self,
        bytes: &[u8],
        options: &DecodeOptions,
    ) -> Result<usize, PacketError> {
        let needed = self.sizeof_bytes();
        if bytes.len() < needed {
            return Err(PacketError::Layout {
                needed,
                actual: bytes.len(),
            });
        }
        let mut reader = BitReader::new(bytes);
        let mut values = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            values.push(reader.read(field.width()));
        }
        if options.strict_padding {
            let padding = reader.padding_bits();
            if padding > 0 {
                let bits = reader.read(padding) as u8;
                if bits != 0 {
                    return Err(PacketError::Padding { bits });
                }
            }
        }
        for (field, value) in self.fields.iter_mut().zip(values) {
            field.store(value);
        }
        Ok(needed)
    }
}

impl<'a> IntoIterator for &'a Layout {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
