//! The growable message buffer that all sections are written into.
//!
//! BUFR prefixes most sections with their own byte length, which is only
//! known once the section body is complete. Instead of seeking back and
//! forth, [`MessageBuf`] is an append-only byte vector plus a small stack of
//! patch sites: `begin_section` reserves the three length bytes and records
//! the cursor, `end_section` patches the length in. The total message length
//! in section 0 is patched the same way during finalization.
use bufr_tag_core::bitmath::shift_uint;
use bufr_tag_core::errors::BufrError;
use tinyvec::TinyVec;

/// An append-only byte buffer with section length back-patching.
#[derive(Debug, Default)]
pub struct MessageBuf {
    bytes: Vec<u8>,
    open_sections: TinyVec<[usize; 4]>,
}

impl MessageBuf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn push_u8(&mut self, value: u8) {
        self.bytes.push(value);
    }

    pub fn push_u16_be(&mut self, value: u16) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    pub fn push_slice(&mut self, data: &[u8]) {
        self.bytes.extend_from_slice(data);
    }

    /// Records the section start and reserves the three length bytes.
    pub fn begin_section(&mut self) {
        self.open_sections.push(self.bytes.len());
        self.bytes.extend_from_slice(&[0, 0, 0]);
    }

    /// Closes the innermost open section, patching its 24-bit length
    /// (inclusive of the length field itself).
    pub fn end_section(&mut self) -> Result<(), BufrError> {
        let start = self.open_sections.pop().ok_or_else(|| BufrError::BadInput {
            msg: "end_section without begin_section".to_string(),
        })?;
        let length = self.bytes.len() - start;
        self.patch_u24(start, length)
    }

    /// Writes a 24-bit big-endian value over three already-reserved bytes.
    pub fn patch_u24(&mut self, at: usize, value: usize) -> Result<(), BufrError> {
        if value >= 1 << 24 {
            return Err(BufrError::WidthOverflow {
                value: value as i128,
                bits: 24,
            });
        }
        if at + 3 > self.bytes.len() {
            return Err(BufrError::ShortBuffer {
                need: at + 3,
                have: self.bytes.len(),
            });
        }
        let encoded = shift_uint(value as u64, 24, 0, 24);
        self.bytes[at..at + 3].copy_from_slice(&encoded);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_lengths_are_back_patched() {
        let mut buf = MessageBuf::new();
        buf.push_slice(b"head");
        buf.begin_section();
        buf.push_u8(0);
        buf.push_u16_be(0xBEEF);
        buf.end_section().unwrap();

        // 3 length bytes + 3 body bytes.
        assert_eq!(&buf.bytes()[4..10], &[0, 0, 6, 0, 0xBE, 0xEF]);
    }

    #[test]
    fn unbalanced_end_section_fails() {
        let mut buf = MessageBuf::new();
        assert!(buf.end_section().is_err());
    }

    #[test]
    fn patch_rejects_out_of_range_lengths() {
        let mut buf = MessageBuf::new();
        buf.begin_section();
        assert!(buf.patch_u24(0, 1 << 24).is_err());
        assert!(buf.patch_u24(4, 1).is_err());
    }
}
