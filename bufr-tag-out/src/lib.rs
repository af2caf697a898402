//! This is a library for writing BUFR edition 4 messages for animal-tag
//! (marine mammal) profile data. It assembles the five message sections in
//! order, back-patching the section and total lengths, and projects a tidy
//! observation table onto the 3-15-023 "Animal tagged data" template.
//!
//! The library is an encoder; it is not designed for editing existing BUFR
//! files. The companion `bufr_tag_in` crate reads individual fields back out
//! of encoded messages for verification.
extern crate bufr_tag_core;
extern crate chrono;
extern crate fnv;
extern crate num;
extern crate tinyvec;
#[cfg(test)]
extern crate bufr_tag_in;
#[cfg(test)]
extern crate tempfile;

pub mod animal_tag;
pub mod buffer;
pub mod gis;
#[cfg(test)]
mod integration_tests;
pub mod message;
pub mod observations;
pub mod section4;
pub mod write_sections;

pub use bufr_tag_core::enums;
pub use bufr_tag_core::errors::*;
pub use bufr_tag_core::{
    expand_descriptor, FieldValue, FlatField, Fxy, MessageDescription, Section1, Section3,
    ANIMAL_TAG_SEQUENCE,
};

pub use crate::animal_tag::{animal_tag_section1, animal_tag_section3, encode_animal_tag};
pub use crate::buffer::MessageBuf;
pub use crate::message::encode_message;
pub use crate::observations::{Observation, ObservationSet, TagMetadata};
