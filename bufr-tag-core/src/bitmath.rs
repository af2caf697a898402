//! This submodule deals with packing and unpacking unsigned integers and
//! ASCII text at arbitrary bit offsets in a byte buffer.
//!
//! A buffer is viewed as a big-endian bit stream: bit 0 is the most
//! significant bit of byte 0. These functions are the only code in the
//! workspace that touches raw bits; everything above works in terms of
//! `(bit_offset, bit_len)` pairs.
use crate::errors::BufrError;

/// Shifts a value into position and returns the bytes of the shifted value.
///
/// The result is `full_bit_len / 8` bytes in which the low `bit_len` bits of
/// `value` sit at `bit_offset`, all other bits zero.
pub fn shift_uint(value: u64, full_bit_len: usize, bit_offset: usize, bit_len: usize) -> Vec<u8> {
    let value = value as u128;
    let shift = full_bit_len as i64 - bit_len as i64 - bit_offset as i64;
    let mut output = vec![0u8; full_bit_len / 8];
    for (i, byte) in output.iter_mut().enumerate() {
        let byteshift = full_bit_len as i64 - ((i as i64 + 1) * 8);
        let relshift = shift - byteshift;
        if relshift < 0 {
            let s = (-relshift) as u32;
            *byte = if s >= 128 { 0 } else { (value >> s) as u8 };
        } else if relshift < 8 {
            *byte = (value << relshift) as u8;
        }
    }
    output
}

/// Returns a copy of `data` with `value` embedded at `bit_offset` over
/// `bit_len` bits.
///
/// All bits of `data` outside `[bit_offset, bit_offset + bit_len)` are
/// preserved.
///
/// ```
/// use bufr_tag_core::bitmath::encode_uint;
///
/// let out = encode_uint(b"\xcc\xdd\x88", 0x12, 3, 14).unwrap();
/// assert_eq!(out, b"\xc0\x09\x08");
/// ```
pub fn encode_uint(
    data: &[u8],
    value: u64,
    bit_offset: usize,
    bit_len: usize,
) -> Result<Vec<u8>, BufrError> {
    check_width(value, bit_len)?;
    let full_bit_len = data.len() * 8;
    let mask_value = if bit_len >= 64 {
        u64::MAX
    } else {
        (1u64 << bit_len) - 1
    };
    let mask = shift_uint(mask_value, full_bit_len, bit_offset, bit_len);
    let shifted = shift_uint(value, full_bit_len, bit_offset, bit_len);
    let mut output = vec![0u8; data.len()];
    for i in 0..data.len() {
        output[i] = data[i] ^ ((data[i] ^ shifted[i]) & mask[i]);
    }
    Ok(output)
}

/// Writes an unsigned integer occupying `bit_len` bits at `bit_offset`,
/// growing the buffer as needed.
///
/// Bytes that are only partially covered keep their untouched bits (the
/// window is read, masked and written back).
pub fn write_uint(
    buf: &mut Vec<u8>,
    value: u64,
    bit_offset: usize,
    bit_len: usize,
) -> Result<(), BufrError> {
    let byte_start = bit_offset / 8;
    let r = bit_offset % 8;
    let byte_len = (bit_len + r + 7) / 8;
    if buf.len() < byte_start + byte_len {
        buf.resize(byte_start + byte_len, 0);
    }
    let window = buf[byte_start..byte_start + byte_len].to_vec();
    let encoded = encode_uint(&window, value, r, bit_len)?;
    buf[byte_start..byte_start + byte_len].copy_from_slice(&encoded);
    Ok(())
}

/// Reads back an unsigned integer of `bit_len` bits at `bit_offset`.
pub fn read_uint(buf: &[u8], bit_offset: usize, bit_len: usize) -> Result<u64, BufrError> {
    if bit_len > 64 {
        return Err(BufrError::WidthOverflow {
            value: 0,
            bits: bit_len,
        });
    }
    let byte_start = bit_offset / 8;
    let r = bit_offset % 8;
    let byte_len = (bit_len + r + 7) / 8;
    if byte_start + byte_len > buf.len() {
        return Err(BufrError::ShortBuffer {
            need: byte_start + byte_len,
            have: buf.len(),
        });
    }
    let mut acc: u128 = 0;
    for byte in &buf[byte_start..byte_start + byte_len] {
        acc = (acc << 8) | *byte as u128;
    }
    let tail = byte_len * 8 - r - bit_len;
    let mask = if bit_len == 64 {
        u64::MAX as u128
    } else {
        (1u128 << bit_len) - 1
    };
    Ok(((acc >> tail) & mask) as u64)
}

/// Writes ASCII text right-justified in a `bit_len / 8` byte field.
///
/// The text is padded on the left with spaces, or truncated to the field
/// width if it is too long. Each byte is written at successive 8-bit
/// increments, so the field may start at any bit offset.
pub fn write_ascii(
    buf: &mut Vec<u8>,
    text: &str,
    bit_offset: usize,
    bit_len: usize,
) -> Result<(), BufrError> {
    if bit_len % 8 != 0 {
        return Err(BufrError::BadAsciiWidth { bits: bit_len });
    }
    if !text.is_ascii() {
        return Err(BufrError::NonAsciiText {
            text: text.to_string(),
        });
    }
    let width = bit_len / 8;
    let bytes = text.as_bytes();
    for i in 0..width {
        let pad = width - bytes.len().min(width);
        let byte = if i < pad { b' ' } else { bytes[i - pad] };
        write_uint(buf, byte as u64, bit_offset + i * 8, 8)?;
    }
    Ok(())
}

/// Reads an ASCII field back, trimming surrounding whitespace.
///
/// Bytes outside the printable ASCII range yield the literal `INVALID`
/// marker rather than an error.
pub fn read_ascii(buf: &[u8], bit_offset: usize, bit_len: usize) -> Result<String, BufrError> {
    if bit_len % 8 != 0 {
        return Err(BufrError::BadAsciiWidth { bits: bit_len });
    }
    let mut bytes = Vec::with_capacity(bit_len / 8);
    for i in 0..bit_len / 8 {
        bytes.push(read_uint(buf, bit_offset + i * 8, 8)? as u8);
    }
    if !bytes.is_ascii() {
        return Ok("INVALID".to_string());
    }
    let text = String::from_utf8_lossy(&bytes);
    Ok(text.trim().to_string())
}

fn check_width(value: u64, bit_len: usize) -> Result<(), BufrError> {
    if bit_len < 64 && value >= (1u64 << bit_len) {
        return Err(BufrError::WidthOverflow {
            value: value as i128,
            bits: bit_len,
        });
    }
    Ok(())
}
