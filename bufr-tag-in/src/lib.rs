//! This is a library for reading individual fields back out of encoded BUFR
//! edition 4 messages. It is a verification aid, not a general decoder: a
//! caller who knows where a field sits (bit offset, width, scale, reference)
//! can extract and invert it, optionally pairing code-table figures with
//! their table entry names.
extern crate bufr_tag_core;

pub mod decode;

pub use bufr_tag_core::errors::*;
pub use bufr_tag_core::Fxy;

pub use crate::decode::{
    decode_ascii, decode_empty, decode_numeric, index_sections, DecodeContext, DecodedField,
    DecodedValue, SectionIndex,
};
