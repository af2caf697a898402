//! End-to-end encoding of a small animal-tag dataset, verified field by
//! field through the decoder crate.
use bufr_tag_core::Fxy;
use bufr_tag_in::decode::{decode_ascii, decode_numeric, index_sections, DecodeContext, DecodedValue};
use chrono::NaiveDate;

use crate::animal_tag::{encode_animal_tag, project_sequence};
use crate::integration_tests::test_section1;
use crate::observations::{Observation, ObservationSet, TagMetadata};

fn observation(
    time: &str,
    profile: i64,
    lat: f64,
    lon: f64,
    z: f64,
    temperature: f64,
    salinity: f64,
    pressure: f64,
) -> Observation {
    let time = NaiveDate::parse_from_str(&time[..10], "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(1, 30, 0)
        .unwrap();
    Observation {
        time,
        profile,
        lat,
        lon,
        z,
        temperature,
        salinity,
        pressure,
    }
}

/// Two profiles two days apart across the Celtic Sea: one trajectory leg
/// with a known distance and bearing, five samples in total.
fn example_observations() -> ObservationSet {
    let lat1 = 50.06638888888889;
    let lon1 = -5.714722222222222;
    let lat2 = 58.64388888888889;
    let lon2 = 3.0700000000000003;
    ObservationSet::new(vec![
        observation("2021-06-01", 7, lat1, lon1, 5.0, 11.19, 35.1, 5.0),
        observation("2021-06-01", 7, lat1, lon1, 10.0, 10.8, 35.0, 10.0),
        observation("2021-06-03", 9, lat2, lon2, 4.0, 11.5, 34.9, 4.0),
        observation("2021-06-03", 9, lat2, lon2, 8.0, 11.1, 34.8, 8.0),
        observation("2021-06-03", 9, lat2, lon2, 12.0, 10.7, f64::NAN, 12.0),
    ])
}

fn example_metadata() -> TagMetadata {
    let mut metadata = TagMetadata::default();
    metadata.uuid = "58112217efec720cd46e264e".to_string();
    metadata.ptt = "160376".to_string();
    metadata
}

#[test]
fn projected_sequence_has_the_expected_shape() {
    let sequence = project_sequence(&example_observations(), &example_metadata()).unwrap();

    // 5 WIGOS + 10 platform + (1 + 1 * 19) trajectory
    // + 1 + 2 * (13 + 1) + (2 + 3) * 12 profile entries.
    assert_eq!(sequence.len(), 5 + 10 + 20 + 1 + 28 + 60);

    // The trajectory count comes right after the platform block.
    let count = &sequence[15];
    assert_eq!(count.fxy, Fxy::new(0, 31, 1));
    assert_eq!(count.bit_len, 8);

    // One leg: the last profile has no successor.
    assert_eq!(count.value, bufr_tag_core::FieldValue::Numeric(1.0));
}

#[test]
fn encoded_message_is_verified_field_by_field() {
    let message = encode_animal_tag(
        &example_observations(),
        &example_metadata(),
        &test_section1(),
    )
    .unwrap();

    assert_eq!(&message[0..4], b"BUFR");
    assert_eq!(&message[message.len() - 4..], b"7777");
    assert_eq!(message.len(), 250);

    let index = index_sections(&message).unwrap();
    assert_eq!(index.total_len, 250);
    assert_eq!(index.section1, 8);
    assert_eq!(index.section3, 30);
    assert_eq!(index.section4, 39);
    assert_eq!(index.section4_data, 43);

    // Descriptor 3-15-023 at byte 37.
    assert_eq!(message[37] >> 6, 3);
    assert_eq!(message[37] & 0x3F, 15);
    assert_eq!(message[38], 23);

    let data = &message[index.section4_data..index.section5];
    let ctx = DecodeContext {
        offset: index.section4_data,
    };
    let numeric = |bit_offset: usize, bit_len: usize, scale: i32, reference: i64| {
        let field =
            decode_numeric(data, ctx, bit_offset, bit_len, "", scale, reference, None, false)
                .unwrap();
        match field.value {
            DecodedValue::Numeric(v) => v,
            other => panic!("expected numeric, got {:?}", other),
        }
    };
    let ascii = |bit_offset: usize, bit_len: usize| {
        let field = decode_ascii(data, ctx, bit_offset, bit_len, "", None).unwrap();
        match field.value {
            DecodedValue::Text(v) => v,
            other => panic!("expected text, got {:?}", other),
        }
    };

    // WIGOS identifier block.
    assert_eq!(numeric(0, 4, 0, 0), 0.0);
    assert_eq!(numeric(4, 17, 0, 0), 2202.0);
    assert_eq!(numeric(21, 17, 0, 0), 0.0);
    assert_eq!(ascii(38, 128), "to be determined");

    // Platform block: no WMO id assigned, uuid and ptt as given.
    assert_eq!(numeric(166, 23, 0, 0), 0.0);
    assert_eq!(ascii(189, 256), "58112217efec720cd46e264e");
    assert_eq!(numeric(445, 6, 0, 0), 10.0); // marine animal
    assert_eq!(numeric(451, 10, 0, 0), 995.0); // attached to marine animal
    assert_eq!(ascii(461, 96), "160376");
    assert_eq!(numeric(557, 5, 0, 0), 1.0); // Argos

    // Trajectory: one leg.
    assert_eq!(numeric(562, 8, 0, 0), 1.0);
    let coded = decode_numeric(
        data,
        ctx,
        570,
        5,
        "",
        0,
        0,
        Some(Fxy::new(0, 8, 21)),
        true,
    )
    .unwrap();
    assert_eq!(
        coded.value,
        DecodedValue::Coded {
            figure: 26.0,
            meaning: "Time of last known position".to_string(),
        }
    );
    assert_eq!(numeric(575, 12, 0, 0), 2021.0);
    assert_eq!(numeric(587, 4, 0, 0), 6.0);
    assert_eq!(numeric(591, 6, 0, 0), 1.0);
    assert_eq!(numeric(597, 5, 0, 0), 1.0);
    assert_eq!(numeric(602, 6, 0, 0), 30.0);
    assert_eq!(numeric(608, 25, 5, -9000000), 50.06639);
    assert_eq!(numeric(633, 26, 5, -18000000), -5.71472);
    // The 1109.9 km leg over two days: bearing 27 degrees at 6 m/s.
    assert_eq!(numeric(659, 9, 0, 0), 27.0);
    assert_eq!(numeric(668, 10, 0, 0), 6.0);
    assert_eq!(numeric(685, 20, 2, 0), 5.0);
    assert_eq!(numeric(705, 19, 3, 0), 284.34);
    assert_eq!(numeric(724, 5, 0, 0), 31.0);

    // Two profiles.
    assert_eq!(numeric(729, 8, 0, 0), 2.0);
    assert_eq!(numeric(737, 12, 0, 0), 2021.0);
    assert_eq!(ascii(821, 64), "7");
    assert_eq!(numeric(885, 2, 0, 0), 1.0); // downward profile
    assert_eq!(numeric(887, 16, 0, 0), 2.0);

    // First sample of the first profile.
    assert_eq!(numeric(903, 20, 2, 0), 5.0);
    assert_eq!(numeric(923, 6, 0, 0), 13.0);
    assert_eq!(numeric(929, 4, 0, 0), 0.0);
    assert_eq!(numeric(933, 17, -3, 0), 50000.0); // 5 dbar in Pa
    assert_eq!(numeric(950, 6, 0, 0), 10.0);
    assert_eq!(numeric(960, 19, 3, 0), 284.34);
    assert_eq!(numeric(989, 14, 2, 0), 35.1);

    // The missing salinity of the last sample is the all-ones pattern.
    // Two 110-bit samples, the second profile's header (150) and count (16),
    // two more samples, then 86 bits into the final one.
    let last_salinity_offset = 903 + 2 * 110 + 150 + 16 + 2 * 110 + 86;
    assert_eq!(
        numeric(last_salinity_offset, 14, 0, 0),
        ((1u64 << 14) - 1) as f64
    );
}

#[test]
fn encoded_messages_survive_a_file_round_trip() {
    let dir = tempfile::tempdir().expect("Couldn't get tempfile.");
    let path = dir.path().join("animal-tag.bufr");

    let message = encode_animal_tag(
        &example_observations(),
        &example_metadata(),
        &test_section1(),
    )
    .unwrap();
    std::fs::write(&path, &message).unwrap();

    let read_back = std::fs::read(&path).unwrap();
    assert_eq!(read_back, message);
    assert!(index_sections(&read_back).is_ok());
}

#[test]
fn encoding_is_idempotent() {
    let observations = example_observations();
    let metadata = example_metadata();
    let first = encode_animal_tag(&observations, &metadata, &test_section1()).unwrap();
    let second = encode_animal_tag(&observations, &metadata, &test_section1()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn stationary_datasets_have_no_trajectory() {
    // Both profiles at the same place and far apart in time: drift 0, so
    // the trajectory replication is empty.
    let observations = ObservationSet::new(vec![
        observation("2021-06-01", 1, 50.0, -5.0, 5.0, 11.0, 35.0, 5.0),
        observation("2021-06-03", 2, 50.0, -5.0, 5.0, 11.2, 35.0, 5.0),
    ]);
    let sequence = project_sequence(&observations, &example_metadata()).unwrap();
    let count = &sequence[15];
    assert_eq!(count.fxy, Fxy::new(0, 31, 1));
    assert_eq!(count.value, bufr_tag_core::FieldValue::Numeric(0.0));
}

#[test]
fn empty_observation_tables_are_rejected() {
    let err = project_sequence(&ObservationSet::default(), &example_metadata()).unwrap_err();
    assert!(matches!(err, bufr_tag_core::BufrError::BadInput { .. }));
}
