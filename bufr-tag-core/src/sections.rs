//! Header structures for the fixed-layout parts of a BUFR edition 4 message.
//!
//! A message is a concatenation of five sections; sections 1 and 3 carry
//! small fixed-layout headers whose fields are represented here as plain
//! structs. All multi-byte integers are written big-endian by the assembler.
//! Section lengths are not stored here: they are computed and back-patched
//! while the message is written.
use serde::{Deserialize, Serialize};

use crate::expand::FlatField;
use crate::fxy::Fxy;

/// The identification section (section 1) of a BUFR edition 4 message.
///
/// `master_table_version` is deliberately a plain field rather than a
/// constant: published encoders disagree on the value (33 and 39 are both
/// seen in the wild), so the caller decides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section1 {
    pub originating_centre: u16,
    pub sub_centre: u16,
    /// Update sequence number; 0 for an original message.
    pub seq_no: u8,
    pub data_category: u8,
    pub sub_category: u8,
    pub local_category: u8,
    pub master_table_version: u8,
    pub local_table_version: u8,
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// The data description section (section 3) of a BUFR message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section3 {
    pub number_of_subsets: u16,
    /// Bit 7 of the section flags byte.
    pub observed_flag: bool,
    /// Bit 6 of the section flags byte. Compressed subsets are not produced
    /// by this workspace.
    pub compressed_flag: bool,
    pub descriptors: Vec<Fxy>,
}

/// A full description of a message to encode: the section 1 and 3 headers
/// plus the value-bound record sequence for section 4.
///
/// This is the direct encoding input; it can be deserialized from JSON, with
/// the record list optionally loaded from a separate CSV file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDescription {
    pub section1: Section1,
    pub section3: Section3,
    #[serde(default)]
    pub section4: Vec<FlatField>,
}
