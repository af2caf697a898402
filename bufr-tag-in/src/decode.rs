//! Field-level extraction from encoded messages.
//!
//! Numeric fields invert the encoding transform: the raw unsigned integer is
//! shifted by the reference value and divided by `10^scale`. Code-table
//! fields additionally pair the figure with its entry name from the bundled
//! tables.
//!
//! NB: The byte span reported for a field is `(bit_len + r) / 8 + 1` bytes
//! from the field's first byte, one more than strictly necessary when the
//! field ends on a byte boundary. Reads are clamped to the buffer, so the
//! extra byte is never dereferenced; the span is kept for compatibility with
//! the offsets long-standing downstream tooling expects.
use bufr_tag_core::bitmath::{read_ascii, read_uint};
use bufr_tag_core::errors::BufrError;
use bufr_tag_core::tables::registry;
use bufr_tag_core::{Fxy, EDITION, MAGIC, SECTION0_LEN, TERMINATOR, TOTAL_LEN_OFFSET};

/// Where the data being decoded sits within the whole message; reported
/// field offsets are absolute.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeContext {
    /// Byte offset of the decoded slice within the message.
    pub offset: usize,
}

/// A decoded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedValue {
    Numeric(f64),
    /// A code-table figure paired with its entry name.
    Coded { figure: f64, meaning: String },
    Text(String),
    Empty,
}

/// One decoded field, with the byte span it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedField {
    pub text: String,
    /// Absolute byte offset of the field's first byte.
    pub offset: usize,
    /// Reported byte span (see the module note).
    pub length: usize,
    pub bit_offset: usize,
    pub fxy: Option<Fxy>,
    pub value: DecodedValue,
}

fn field_span(bit_offset: usize, bit_len: usize) -> (usize, usize, usize) {
    let start = bit_offset / 8;
    let r = bit_offset % 8;
    let byte_len = (bit_len + r) / 8 + 1;
    (start, r, byte_len)
}

/// Decodes a numeric field, inverting scale and reference.
#[allow(clippy::too_many_arguments)]
pub fn decode_numeric(
    data: &[u8],
    context: DecodeContext,
    bit_offset: usize,
    bit_len: usize,
    text: &str,
    scale: i32,
    reference: i64,
    fxy: Option<Fxy>,
    code_table: bool,
) -> Result<DecodedField, BufrError> {
    let (start, _r, byte_len) = field_span(bit_offset, bit_len);
    let raw = read_uint(data, bit_offset, bit_len)?;
    let mut value = raw as f64 + reference as f64;
    if scale != 0 {
        value /= 10f64.powi(scale);
    }
    let decoded = if code_table {
        match code_table_meaning(fxy, value) {
            Some(meaning) => DecodedValue::Coded {
                figure: value,
                meaning,
            },
            None => DecodedValue::Numeric(value),
        }
    } else {
        DecodedValue::Numeric(value)
    };
    Ok(DecodedField {
        text: text.to_string(),
        offset: context.offset + start,
        length: byte_len,
        bit_offset,
        fxy,
        value: decoded,
    })
}

fn code_table_meaning(fxy: Option<Fxy>, value: f64) -> Option<String> {
    let fxy = fxy?;
    if value < 0.0 || value.fract() != 0.0 {
        return None;
    }
    let reg = registry().ok()?;
    reg.code_flag(fxy, value as u64)
        .ok()
        .map(|entry| entry.entry_name.clone())
}

/// Decodes an ASCII field; non-ASCII content yields the `INVALID` marker.
pub fn decode_ascii(
    data: &[u8],
    context: DecodeContext,
    bit_offset: usize,
    bit_len: usize,
    text: &str,
    fxy: Option<Fxy>,
) -> Result<DecodedField, BufrError> {
    let (start, _r, byte_len) = field_span(bit_offset, bit_len);
    let value = read_ascii(data, bit_offset, bit_len)?;
    Ok(DecodedField {
        text: text.to_string(),
        offset: context.offset + start,
        length: byte_len,
        bit_offset,
        fxy,
        value: DecodedValue::Text(value),
    })
}

/// A tag for a skipped or structural span, carrying no decoded value.
pub fn decode_empty(
    context: DecodeContext,
    bit_offset: usize,
    bit_len: usize,
    text: &str,
    fxy: Option<Fxy>,
) -> DecodedField {
    let (start, _r, byte_len) = field_span(bit_offset, bit_len);
    DecodedField {
        text: text.to_string(),
        offset: context.offset + start,
        length: byte_len,
        bit_offset,
        fxy,
        value: DecodedValue::Empty,
    }
}

/// Byte offsets of every section of an encoded message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionIndex {
    pub section0: usize,
    pub section1: usize,
    pub section3: usize,
    pub section4: usize,
    pub section5: usize,
    /// Offset of the bit-packed data area inside section 4 (after the
    /// length and reserved bytes).
    pub section4_data: usize,
    pub total_len: usize,
}

/// Walks the sections of an encoded message, validating the framing.
///
/// Checks the `BUFR` magic, the edition byte, that each section length stays
/// within the message, and that the message ends with `7777` exactly where
/// the total length says it should.
pub fn index_sections(data: &[u8]) -> Result<SectionIndex, BufrError> {
    if data.len() < SECTION0_LEN {
        return Err(BufrError::ShortBuffer {
            need: SECTION0_LEN,
            have: data.len(),
        });
    }
    if &data[0..4] != MAGIC {
        return Err(BufrError::BadInput {
            msg: "Message does not start with BUFR".to_string(),
        });
    }
    if data[7] != EDITION {
        return Err(BufrError::BadInput {
            msg: format!("Unsupported BUFR edition {}", data[7]),
        });
    }
    let total_len = read_uint(data, TOTAL_LEN_OFFSET * 8, 24)? as usize;
    if total_len != data.len() {
        return Err(BufrError::BadInput {
            msg: format!(
                "Total length field says {} but the message is {} bytes",
                total_len,
                data.len()
            ),
        });
    }

    let section1 = SECTION0_LEN;
    let section3 = section1 + section_len(data, section1)?;
    let section4 = section3 + section_len(data, section3)?;
    let section5 = section4 + section_len(data, section4)?;
    if section5 + 4 != total_len {
        return Err(BufrError::BadInput {
            msg: "Section lengths do not add up to the total length".to_string(),
        });
    }
    if &data[section5..section5 + 4] != TERMINATOR {
        return Err(BufrError::BadInput {
            msg: "Message does not end with 7777".to_string(),
        });
    }
    Ok(SectionIndex {
        section0: 0,
        section1,
        section3,
        section4,
        section5,
        section4_data: section4 + 4,
        total_len,
    })
}

fn section_len(data: &[u8], at: usize) -> Result<usize, BufrError> {
    let length = read_uint(data, at * 8, 24)? as usize;
    if length < 4 || at + length > data.len() {
        return Err(BufrError::BadInput {
            msg: format!("Section at byte {} has bad length {}", at, length),
        });
    }
    Ok(length)
}
