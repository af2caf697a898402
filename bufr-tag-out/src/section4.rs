//! The bit-packed data section encoder.
//!
//! Section 4 is produced by walking an ordered, value-bound field sequence.
//! The walk keeps two pieces of operator state: an ASCII width override
//! (2-08-YYY, `Y * 8` bits, `Y = 0` cancels) and a numeric width override
//! (2-01-129 sets 24 bits, 2-01-000 cancels). Overrides persist across
//! sibling sequence boundaries until explicitly cancelled.
//!
//! NB: When an override is active, the overridden width is written but the
//! cursor still advances by the field's *own* width. This mirrors the
//! behavior of the encoders this one must stay byte-for-byte compatible
//! with, even though it smells like a bug in the upstream lineage; do not
//! "fix" it without re-baselining every reference message.
use bufr_tag_core::bitmath::{write_ascii, write_uint};
use bufr_tag_core::enums::FieldType;
use bufr_tag_core::errors::BufrError;
use bufr_tag_core::expand::{FieldValue, FlatField};
use bufr_tag_core::Fxy;
use num::ToPrimitive;

use crate::buffer::MessageBuf;

/// Encodes the bound sequence as section 4 and appends it to the message.
pub fn write_section4(buf: &mut MessageBuf, sequence: &[FlatField]) -> Result<(), BufrError> {
    buf.begin_section();
    buf.push_u8(0); // reserved

    let mut data: Vec<u8> = Vec::new();
    let mut bit_offset = 0usize;
    let mut ascii_override: Option<usize> = None;
    let mut numeric_override: Option<usize> = None;

    for field in sequence {
        match field.kind {
            FieldType::Operator => {
                apply_operator(field.fxy, &mut ascii_override, &mut numeric_override);
            }
            // Replication and sequence markers guide the walk only; the
            // value list is already fully expanded by the projector.
            FieldType::Replication | FieldType::Sequence => {}
            FieldType::Numeric => {
                if field.bit_len == 0 {
                    continue;
                }
                let own = field.bit_len as usize;
                let eff = numeric_override.unwrap_or(own);
                let raw = numeric_raw_value(field, eff)?;
                write_uint(&mut data, raw, bit_offset, eff)?;
                bit_offset += own;
            }
            FieldType::String => {
                if field.bit_len == 0 {
                    continue;
                }
                let own = field.bit_len as usize;
                let eff = ascii_override.unwrap_or(own);
                let text = match &field.value {
                    FieldValue::Text(s) => s.clone(),
                    FieldValue::Numeric(v) => v.to_string(),
                    FieldValue::Missing => String::new(),
                };
                write_ascii(&mut data, &text, bit_offset, eff)?;
                bit_offset += own;
            }
        }
    }

    // Pad the data area out to a whole byte; the section length covers it.
    let padded = (bit_offset + 7) / 8;
    if data.len() < padded {
        data.resize(padded, 0);
    }
    buf.push_slice(&data);
    buf.end_section()
}

fn apply_operator(fxy: Fxy, ascii: &mut Option<usize>, numeric: &mut Option<usize>) {
    if fxy.x == 8 {
        *ascii = if fxy.y > 0 {
            Some(fxy.y as usize * 8)
        } else {
            None
        };
    }
    if (fxy.x, fxy.y) == (1, 0) {
        *numeric = None;
    }
    // Domain-specific: the templates here only ever widen numerics to 24.
    if (fxy.x, fxy.y) == (1, 129) {
        *numeric = Some(24);
    }
}

/// The raw integer to pack for a numeric field.
///
/// A missing value becomes the all-ones pattern at the effective width, with
/// no scale or reference applied. A present value is scaled by `10^scale`,
/// shifted by the reference value and rounded to the nearest integer (ties
/// away from zero).
fn numeric_raw_value(field: &FlatField, eff_bits: usize) -> Result<u64, BufrError> {
    if eff_bits > 64 {
        return Err(BufrError::WidthOverflow {
            value: 0,
            bits: eff_bits,
        });
    }
    let value = match &field.value {
        FieldValue::Missing => return Ok(all_ones(eff_bits)),
        FieldValue::Numeric(v) if v.is_nan() => return Ok(all_ones(eff_bits)),
        FieldValue::Numeric(v) => *v,
        FieldValue::Text(text) => {
            return Err(BufrError::BadInput {
                msg: format!("Numeric field {} bound to text {:?}", field.fxy, text),
            })
        }
    };
    let mut scaled = value;
    if field.scale != 0 {
        scaled *= 10f64.powi(field.scale);
    }
    if field.reference != 0 {
        scaled -= field.reference as f64;
    }
    let raw = scaled.round().to_i128().ok_or(BufrError::WidthOverflow {
        value: i128::MAX,
        bits: eff_bits,
    })?;
    if raw < 0 || raw >= 1i128 << eff_bits {
        return Err(BufrError::WidthOverflow {
            value: raw,
            bits: eff_bits,
        });
    }
    Ok(raw as u64)
}

fn all_ones(bits: usize) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}
