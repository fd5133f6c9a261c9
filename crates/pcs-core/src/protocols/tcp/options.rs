use crate::engine::{Field, Layout, PacketError};

use super::layout::{OPT_EOL, OPT_NOP};

/// Longest option value held in a single field.
const MAX_VALUE_LEN: usize = 16;

/// Parse an options area into type-length-value fields.
///
/// Each option `N` becomes `optN_kind`, `optN_len` and `optN_value`; the
/// single-byte kinds (end of list, no-op) carry only `optN_kind`. Once an
/// option cannot be parsed, or after end of list, every remaining byte is
/// kept as its own `optN_byte` field.
pub(crate) fn parse(bytes: &[u8]) -> Result<Layout, PacketError> {
    let mut options = Layout::new();
    let mut index = 0usize;
    let mut pos = 0usize;

    while pos < bytes.len() {
        let kind = bytes[pos];
        if kind == OPT_EOL || kind == OPT_NOP {
            append(&mut options, format!("opt{index}_kind"), 8, kind.into())?;
            index += 1;
            pos += 1;
            if kind == OPT_EOL {
                break;
            }
            continue;
        }

        let len = bytes.get(pos + 1).map(|&len| usize::from(len));
        match len {
            Some(len) if len >= 2 && len - 2 <= MAX_VALUE_LEN && pos + len <= bytes.len() => {
                append(&mut options, format!("opt{index}_kind"), 8, kind.into())?;
                append(&mut options, format!("opt{index}_len"), 8, len as u128)?;
                let value = &bytes[pos + 2..pos + len];
                if !value.is_empty() {
                    append(
                        &mut options,
                        format!("opt{index}_value"),
                        value.len() as u32 * 8,
                        be_value(value),
                    )?;
                }
                index += 1;
                pos += len;
            }
            _ => break,
        }
    }

    for &byte in &bytes[pos..] {
        append(&mut options, format!("opt{index}_byte"), 8, byte.into())?;
        index += 1;
    }
    Ok(options)
}

/// Append one option at the end of `options`.
///
/// `kind` values of 0 and 1 are single bytes and must have no value.
pub(crate) fn push(options: &mut Layout, kind: u8, value: &[u8]) -> Result<(), PacketError> {
    let index = next_index(options);
    if kind == OPT_EOL || kind == OPT_NOP {
        if !value.is_empty() {
            return Err(PacketError::InvalidField {
                field: "option",
                value: kind.into(),
                reason: "single-byte option kinds take no value",
            });
        }
        return append(options, format!("opt{index}_kind"), 8, kind.into());
    }
    if value.len() > MAX_VALUE_LEN {
        return Err(PacketError::InvalidField {
            field: "option",
            value: value.len() as u128,
            reason: "option value longer than 16 bytes",
        });
    }
    append(options, format!("opt{index}_kind"), 8, kind.into())?;
    append(
        options,
        format!("opt{index}_len"),
        8,
        (value.len() + 2) as u128,
    )?;
    if !value.is_empty() {
        append(
            options,
            format!("opt{index}_value"),
            value.len() as u32 * 8,
            be_value(value),
        )?;
    }
    Ok(())
}

/// End the list and zero-fill up to the next 32-bit boundary.
///
/// Produces the same fields [`parse`] yields for the padded bytes.
pub(crate) fn pad(options: &mut Layout) -> Result<(), PacketError> {
    if options.sizeof_bytes() % 4 == 0 {
        return Ok(());
    }
    let index = next_index(options);
    append(options, format!("opt{index}_kind"), 8, OPT_EOL.into())?;
    while options.sizeof_bytes() % 4 != 0 {
        let index = next_index(options);
        append(options, format!("opt{index}_byte"), 8, 0)?;
    }
    Ok(())
}

/// Value of the first option of `kind`, if it carries one.
pub(crate) fn find(options: &Layout, kind: u8) -> Option<u128> {
    let mut index = 0;
    loop {
        let found = options.value_of(&format!("opt{index}_kind")).ok();
        let byte = options.value_of(&format!("opt{index}_byte")).ok();
        match (found, byte) {
            (Some(found), _) if found == u128::from(kind) => {
                return options.value_of(&format!("opt{index}_value")).ok();
            }
            (None, None) => return None,
            _ => index += 1,
        }
    }
}

fn next_index(options: &Layout) -> usize {
    options
        .iter()
        .filter_map(|field| {
            let rest = field.name().strip_prefix("opt")?;
            let (index, _) = rest.split_once('_')?;
            index.parse::<usize>().ok()
        })
        .max()
        .map_or(0, |max| max + 1)
}

fn append(options: &mut Layout, name: String, width: u32, value: u128) -> Result<(), PacketError> {
    options.append(Field::new(name, width).with_default(value))
}

fn be_value(bytes: &[u8]) -> u128 {
    bytes
        .iter()
        .fold(0u128, |acc, &byte| (acc << 8) | u128::from(byte))
}
