//! This module uses `bufr_tag_out` and `bufr_tag_in` together to make
//! round-trip tests: messages are encoded here, then individual fields are
//! read back out through the verification decoder and compared against the
//! observations they came from.
use bufr_tag_core::sections::{MessageDescription, Section1};

mod animal_tag_roundtrip;
mod description_roundtrip;

/// The section 1 header used by all integration scenarios; a fixed date
/// keeps the encoded bytes reproducible.
pub(crate) fn test_section1() -> Section1 {
    Section1 {
        originating_centre: 177,
        sub_centre: 0,
        seq_no: 0,
        data_category: 31,
        sub_category: 4,
        local_category: 0,
        master_table_version: 33,
        local_table_version: 255,
        year: 2021,
        month: 6,
        day: 15,
        hour: 12,
        minute: 30,
        second: 0,
    }
}

pub(crate) fn empty_description() -> MessageDescription {
    MessageDescription {
        section1: test_section1(),
        section3: crate::animal_tag::animal_tag_section3(),
        section4: Vec::new(),
    }
}
