//! This submodule emits the fixed-layout sections of a BUFR message.
//!
//! Sections must be written in order (0, 1, 3, 4, 5): the total length in
//! section 0 and every section length field are back-patched through
//! [`MessageBuf`], and byte offsets into earlier sections would shift if
//! anything were reordered. All multi-byte header integers are big-endian.
use bufr_tag_core::errors::BufrError;
use bufr_tag_core::sections::{Section1, Section3};
use bufr_tag_core::{EDITION, MAGIC, TERMINATOR, TOTAL_LEN_OFFSET};

use crate::buffer::MessageBuf;

/// Section 0: the `BUFR` marker, a placeholder total length and the edition.
pub fn write_section0(buf: &mut MessageBuf) {
    buf.push_slice(MAGIC);
    // Patched by `finalize` once section 5 is in place.
    buf.push_slice(&[0, 0, 0]);
    buf.push_u8(EDITION);
}

/// Section 1: identification of the message.
pub fn write_section1(buf: &mut MessageBuf, section1: &Section1) -> Result<(), BufrError> {
    buf.begin_section();
    buf.push_u8(0); // BUFR master table 0
    buf.push_u16_be(section1.originating_centre);
    buf.push_u16_be(section1.sub_centre);
    buf.push_u8(section1.seq_no);
    buf.push_u8(0); // no section 2
    buf.push_u8(section1.data_category);
    buf.push_u8(section1.sub_category);
    buf.push_u8(section1.local_category);
    buf.push_u8(section1.master_table_version);
    buf.push_u8(section1.local_table_version);
    buf.push_u16_be(section1.year);
    buf.push_u8(section1.month);
    buf.push_u8(section1.day);
    buf.push_u8(section1.hour);
    buf.push_u8(section1.minute);
    buf.push_u8(section1.second);
    buf.end_section()
}

/// Section 3: subset count, flags and the descriptor list.
pub fn write_section3(buf: &mut MessageBuf, section3: &Section3) -> Result<(), BufrError> {
    buf.begin_section();
    buf.push_u8(0); // reserved, set to 0 per standard
    buf.push_u16_be(section3.number_of_subsets);
    let mut flags = 0u8;
    if section3.observed_flag {
        flags |= 0x80;
    }
    if section3.compressed_flag {
        flags |= 0x40;
    }
    buf.push_u8(flags);
    for descriptor in &section3.descriptors {
        buf.push_slice(&descriptor.section3_bytes());
    }
    buf.end_section()
}

/// Section 5: the end-of-message marker.
pub fn write_section5(buf: &mut MessageBuf) {
    buf.push_slice(TERMINATOR);
}

/// Patches the total message length into section 0 and returns the bytes.
pub fn finalize(mut buf: MessageBuf) -> Result<Vec<u8>, BufrError> {
    let total = buf.len();
    buf.patch_u24(TOTAL_LEN_OFFSET, total)?;
    Ok(buf.into_bytes())
}
