//! Encoding of a fully described message, without any observation table.
//!
//! A [`MessageDescription`] carries the section 1 and 3 headers plus an
//! already value-bound section 4 record list. Descriptions are read from
//! JSON; the record list can also come from a separate CSV file with the
//! columns `fxy,text,type,scale,offset,bit_len,value`.
use std::path::Path;

use bufr_tag_core::enums::FieldType;
use bufr_tag_core::errors::BufrError;
use bufr_tag_core::expand::{FieldValue, FlatField};
use bufr_tag_core::sections::MessageDescription;
use bufr_tag_core::Fxy;
use serde::Deserialize;

use crate::buffer::MessageBuf;
use crate::section4::write_section4;
use crate::write_sections::{finalize, write_section0, write_section1, write_section3, write_section5};

/// Encodes a complete message from its description.
pub fn encode_message(description: &MessageDescription) -> Result<Vec<u8>, BufrError> {
    let mut buf = MessageBuf::new();
    write_section0(&mut buf);
    write_section1(&mut buf, &description.section1)?;
    write_section3(&mut buf, &description.section3)?;
    write_section4(&mut buf, &description.section4)?;
    write_section5(&mut buf);
    finalize(buf)
}

/// Parses a JSON message description.
pub fn description_from_json(text: &str) -> Result<MessageDescription, BufrError> {
    serde_json::from_str(text).map_err(|e| BufrError::BadInput {
        msg: format!("Bad message description: {}", e),
    })
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    fxy: Fxy,
    #[serde(default)]
    text: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    scale: i32,
    #[serde(default)]
    offset: i64,
    #[serde(default)]
    bit_len: u16,
    #[serde(default)]
    value: String,
}

/// Loads a section 4 record list from a CSV file.
pub fn records_from_csv_path<P: AsRef<Path>>(path: P) -> Result<Vec<FlatField>, BufrError> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    records_from_csv(&mut reader)
}

/// Loads a section 4 record list from any CSV reader.
pub fn records_from_csv<R: std::io::Read>(
    reader: &mut csv::Reader<R>,
) -> Result<Vec<FlatField>, BufrError> {
    let mut records = Vec::new();
    for row in reader.deserialize() {
        let row: RawRecord = row?;
        let kind = FieldType::new(&row.kind)?;
        let value = match kind {
            FieldType::String => FieldValue::Text(row.value.clone()),
            _ if row.value.trim().is_empty() => FieldValue::Missing,
            _ => {
                let number: f64 = row.value.trim().parse().map_err(|_| BufrError::BadInput {
                    msg: format!("Bad numeric value {:?} for {}", row.value, row.fxy),
                })?;
                FieldValue::Numeric(number)
            }
        };
        records.push(FlatField {
            parent: row.fxy,
            fxy: row.fxy,
            title: row.text,
            kind,
            bit_len: row.bit_len,
            scale: row.scale,
            reference: row.offset,
            value,
        });
    }
    Ok(records)
}
