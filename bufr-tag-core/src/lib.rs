//! This library is the foundation for the `bufr-tag-in` and `bufr-tag-out` crates.
//! It holds the pieces both sides of the codec share: the bit-level packing
//! primitives, the FXY descriptor reference, the bundled BUFR table registry
//! and the expansion of table D sequences into flat field lists.
//!
//! The library was designed around WMO FM-94 BUFR edition 4, specialized for
//! the animal-tag profile sequence 3-15-023. It does not aim to be a general
//! purpose BUFR toolkit: only the descriptors that the animal-tag templates
//! reach are bundled.
#![allow(clippy::derive_partial_eq_without_eq)]
extern crate num;
#[macro_use]
extern crate num_derive;

#[cfg(feature = "to_json")]
extern crate serde_json;

pub mod bitmath;
pub mod enums;
pub mod errors;
pub mod expand;
pub mod fxy;
pub mod sections;
pub mod tables;

pub use errors::BufrError;

pub use enums::*;
pub use expand::{expand_descriptor, FieldValue, FlatField};
pub use fxy::Fxy;
pub use sections::{MessageDescription, Section1, Section3};

/// The four byte start-of-message marker of section 0.
pub const MAGIC: &[u8; 4] = b"BUFR";
/// The four byte end-of-message marker of section 5.
pub const TERMINATOR: &[u8; 4] = b"7777";
/// The BUFR edition this workspace reads and writes.
pub const EDITION: u8 = 4;
/// Byte length of section 0 (`BUFR` + 24-bit total length + edition).
pub const SECTION0_LEN: usize = 8;
/// Byte offset of the 24-bit total message length within section 0.
pub const TOTAL_LEN_OFFSET: usize = 4;
/// The top-level sequence descriptor for animal tagged data.
pub const ANIMAL_TAG_SEQUENCE: Fxy = Fxy { f: 3, x: 15, y: 23 };

#[cfg(feature = "to_json")]
impl FlatField {
    /// JSON form of a flattened field, for diagnostics and tooling.
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string(&self).map_err(|e| e.to_string())
    }
}
