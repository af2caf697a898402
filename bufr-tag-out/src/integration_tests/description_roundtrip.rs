//! Round trips for the direct message-description path.
use bufr_tag_in::decode::index_sections;

use crate::integration_tests::empty_description;
use crate::message::{description_from_json, encode_message, records_from_csv};

#[test]
fn empty_description_encodes_the_bare_framing() {
    let message = encode_message(&empty_description()).unwrap();

    assert_eq!(&message[0..4], b"BUFR");
    assert_eq!(message[7], 4);
    assert_eq!(&message[message.len() - 4..], b"7777");
    // Sections 0 (8) + 1 (22) + 3 (9) + 4 (4) + 5 (4).
    assert_eq!(message.len(), 47);

    let index = index_sections(&message).unwrap();
    assert_eq!(index.total_len, 47);
    assert_eq!(index.section4_data, 43);

    // The single descriptor, 3-15-023, sits at byte 37.
    assert_eq!(message[37] >> 6, 3);
    assert_eq!(message[37] & 0x3F, 15);
    assert_eq!(message[38], 23);
}

#[test]
fn records_from_csv_encode_into_section4() {
    let records = "\
fxy,text,type,scale,offset,bit_len,value
031001,Delayed descriptor replication factor (Numeric),numeric,0,0,8,42
001079,Unique identifier for the profile (CCITT IA5),string,0,0,16,ab
008021,Time significance (Code table),numeric,0,0,7,13
";
    let mut reader = csv::Reader::from_reader(records.as_bytes());
    let section4 = records_from_csv(&mut reader).unwrap();
    assert_eq!(section4.len(), 3);

    let mut description = empty_description();
    description.section4 = section4;
    let message = encode_message(&description).unwrap();

    // 8 + 16 + 7 bits of payload pad to 4 bytes on top of the empty frame.
    assert_eq!(message.len(), 51);
    let index = index_sections(&message).unwrap();

    let data = &message[index.section4_data..index.section5];
    use bufr_tag_core::bitmath::{read_ascii, read_uint};
    assert_eq!(read_uint(data, 0, 8).unwrap(), 42);
    assert_eq!(read_ascii(data, 8, 16).unwrap(), "ab");
    assert_eq!(read_uint(data, 24, 7).unwrap(), 13);
}

#[test]
fn json_descriptions_parse_and_encode() {
    let text = r#"{
        "section1": {
            "originating_centre": 177, "sub_centre": 0, "seq_no": 0,
            "data_category": 31, "sub_category": 4, "local_category": 0,
            "master_table_version": 33, "local_table_version": 255,
            "year": 2021, "month": 6, "day": 15,
            "hour": 12, "minute": 30, "second": 0
        },
        "section3": {
            "number_of_subsets": 1,
            "observed_flag": true,
            "compressed_flag": false,
            "descriptors": ["315023"]
        },
        "section4": [
            {"fxy": "031001", "type": "numeric", "bit_len": 8, "value": 3},
            {"fxy": "008021", "type": "numeric", "bit_len": 5, "value": null}
        ]
    }"#;
    let description = description_from_json(text).unwrap();
    assert_eq!(description.section4.len(), 2);
    assert!(description.section4[1].value.is_missing());

    let message = encode_message(&description).unwrap();
    // 13 bits of payload pad to 2 bytes.
    assert_eq!(message.len(), 49);
    let index = index_sections(&message).unwrap();
    let data = &message[index.section4_data..index.section5];
    use bufr_tag_core::bitmath::read_uint;
    assert_eq!(read_uint(data, 0, 8).unwrap(), 3);
    // The unbound field is the all-ones missing pattern.
    assert_eq!(read_uint(data, 8, 5).unwrap(), 31);
}

#[test]
fn encoding_the_same_description_twice_is_identical() {
    let description = empty_description();
    assert_eq!(
        encode_message(&description).unwrap(),
        encode_message(&description).unwrap()
    );
}
