//! Projection of animal-tag profile observations onto sequence 3-15-023.
//!
//! The projector turns the tidy observation table into the ordered,
//! value-bound field list that the section 4 encoder walks. The flattened
//! expansion of 3-15-023 is computed once per message; the trajectory and
//! profile parts re-use cloned slices of it, one per point or sample.
use bufr_tag_core::enums::{
    GtsppQualifier, GtsppQualityFlag, LocationQuality, LocationQualityClass, LocationSystem,
    ObservingPlatform, ProfileDirection, SensorAttachment, TimeSignificance, TransmissionQuality,
};
use bufr_tag_core::errors::BufrError;
use bufr_tag_core::expand::{expand_descriptor, FieldValue, FlatField};
use bufr_tag_core::sections::{Section1, Section3};
use bufr_tag_core::{Fxy, ANIMAL_TAG_SEQUENCE};
use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::buffer::MessageBuf;
use crate::gis::{azimuth, haversine_distance, to_degrees, to_radians, EARTH_RADIUS_M};
use crate::observations::{Observation, ObservationSet, TagMetadata};
use crate::section4::write_section4;
use crate::write_sections::{finalize, write_section0, write_section1, write_section3, write_section5};

/// The WIGOS identifier sequence bound ahead of the platform block.
const WIGOS_SEQUENCE: Fxy = Fxy { f: 3, x: 1, y: 150 };

/// Positions of the re-used blocks within the flattened 3-15-023 expansion.
const PLATFORM_BLOCK: std::ops::Range<usize> = 6..16;
const TRAJECTORY_BLOCK: std::ops::Range<usize> = 18..37;
const PROFILE_HEADER_BLOCK: std::ops::Range<usize> = 39..52;
const PROFILE_DATA_BLOCK: std::ops::Range<usize> = 55..67;

/// Section 1 defaults for an animal-tag message issued at `now`.
pub fn animal_tag_section1(now: NaiveDateTime, master_table_version: u8) -> Section1 {
    Section1 {
        originating_centre: 177,
        sub_centre: 0,
        seq_no: 0,
        data_category: 31, // oceanographic data
        sub_category: 4,   // subsurface float (profile)
        local_category: 0,
        master_table_version,
        local_table_version: 255,
        year: now.year() as u16,
        month: now.month() as u8,
        day: now.day() as u8,
        hour: now.hour() as u8,
        minute: now.minute() as u8,
        second: now.second() as u8,
    }
}

/// Section 3 for a single uncompressed observed subset of 3-15-023.
pub fn animal_tag_section3() -> Section3 {
    Section3 {
        number_of_subsets: 1,
        observed_flag: true,
        compressed_flag: false,
        descriptors: vec![ANIMAL_TAG_SEQUENCE],
    }
}

/// Encodes one complete animal-tag message.
pub fn encode_animal_tag(
    observations: &ObservationSet,
    metadata: &TagMetadata,
    section1: &Section1,
) -> Result<Vec<u8>, BufrError> {
    let mut buf = MessageBuf::new();
    write_section0(&mut buf);
    write_section1(&mut buf, section1)?;
    write_section3(&mut buf, &animal_tag_section3())?;
    let sequence = project_sequence(observations, metadata)?;
    write_section4(&mut buf, &sequence)?;
    write_section5(&mut buf);
    finalize(buf)
}

/// Produces the full value-bound field sequence for section 4.
pub fn project_sequence(
    observations: &ObservationSet,
    metadata: &TagMetadata,
) -> Result<Vec<FlatField>, BufrError> {
    if observations.is_empty() {
        return Err(BufrError::BadInput {
            msg: "Observation table has no rows".to_string(),
        });
    }
    let expansion = expand_descriptor(ANIMAL_TAG_SEQUENCE)?;

    let mut sequence = wigos_block(metadata)?;
    sequence.extend(platform_block(&expansion, metadata)?);
    sequence.extend(trajectory_block(&expansion, observations)?);
    sequence.extend(profile_blocks(&expansion, observations)?);
    Ok(sequence)
}

fn wigos_block(metadata: &TagMetadata) -> Result<Vec<FlatField>, BufrError> {
    let wigos = expand_descriptor(WIGOS_SEQUENCE)?;
    bind(
        &wigos,
        vec![
            FieldValue::Missing, // sequence marker
            FieldValue::Numeric(0.0),
            FieldValue::Numeric(metadata.wigos_issuer as f64),
            FieldValue::Numeric(0.0),
            FieldValue::Text(metadata.wigos_local_identifier.clone()),
        ],
    )
}

fn platform_block(
    expansion: &[FlatField],
    metadata: &TagMetadata,
) -> Result<Vec<FlatField>, BufrError> {
    let wmo_id = metadata.wmo_platform_code.unwrap_or(0);
    bind(
        &expansion[PLATFORM_BLOCK],
        vec![
            FieldValue::Missing, // width operator
            FieldValue::Numeric(wmo_id as f64),
            FieldValue::Missing, // cancel operator
            FieldValue::Missing, // IA5 width operator
            FieldValue::Text(truncated(&metadata.uuid, 32)),
            FieldValue::Missing, // cancel operator
            FieldValue::Numeric(ObservingPlatform::MarineAnimal.figure()),
            FieldValue::Numeric(SensorAttachment::AttachedToMarineAnimal.figure()),
            FieldValue::Text(truncated(&metadata.ptt, 12)),
            FieldValue::Numeric(LocationSystem::Argos.figure()),
        ],
    )
}

/// One surfacing position per profile, with drift derived between them.
struct TrajectoryPoint<'a> {
    head: &'a Observation,
    direction: f64,
    speed: f64,
}

fn trajectory_block(
    expansion: &[FlatField],
    observations: &ObservationSet,
) -> Result<Vec<FlatField>, BufrError> {
    let heads = observations.profile_heads();
    let times: Vec<f64> = heads
        .iter()
        .map(|o| o.time.and_utc().timestamp() as f64)
        .collect();
    let x: Vec<f64> = heads.iter().map(|o| to_radians(o.lon)).collect();
    let y: Vec<f64> = heads.iter().map(|o| to_radians(o.lat)).collect();

    let ds = haversine_distance(&x, &y, EARTH_RADIUS_M);
    let theta = azimuth(&x, &y);

    // The last profile has no successor, so it contributes no point; points
    // that do not move contribute no drift either and are dropped.
    let mut points = Vec::new();
    for i in 0..ds.len() {
        let dt = times[i + 1] - times[i];
        let speed = if ds[i].abs() < 1e-4 && dt.abs() < 1e-4 {
            0.0
        } else {
            ds[i] / dt
        };
        if speed <= 0.0 {
            continue;
        }
        let direction = (to_degrees(theta[i]) + 360.0) % 360.0;
        points.push(TrajectoryPoint {
            head: heads[i],
            direction,
            speed,
        });
    }

    let mut sequence = vec![FlatField::replication_count(8, points.len())];
    for point in &points {
        sequence.extend(trajectory_point(expansion, point)?);
    }
    Ok(sequence)
}

fn trajectory_point(
    expansion: &[FlatField],
    point: &TrajectoryPoint<'_>,
) -> Result<Vec<FlatField>, BufrError> {
    let time = point.head.time;
    bind(
        &expansion[TRAJECTORY_BLOCK],
        vec![
            FieldValue::Numeric(TimeSignificance::TimeOfLastKnownPosition.figure()),
            FieldValue::Missing, // date sequence marker
            FieldValue::Numeric(time.year() as f64),
            FieldValue::Numeric(time.month() as f64),
            FieldValue::Numeric(time.day() as f64),
            FieldValue::Missing, // time sequence marker
            FieldValue::Numeric(time.hour() as f64),
            FieldValue::Numeric(time.minute() as f64),
            FieldValue::Missing, // lat/lon sequence marker
            FieldValue::Numeric(point.head.lat),
            FieldValue::Numeric(point.head.lon),
            FieldValue::Numeric(point.direction),
            FieldValue::Numeric(point.speed),
            FieldValue::Numeric(TransmissionQuality::Good.figure()),
            FieldValue::Numeric(LocationQuality::Good.figure()),
            FieldValue::Numeric(LocationQualityClass::Radius500mTo1500m.figure()),
            FieldValue::Numeric(point.head.z.max(0.0)),
            FieldValue::Numeric(point.head.temperature + 273.15),
            FieldValue::Numeric(TimeSignificance::MissingValue.figure()),
        ],
    )
}

fn profile_blocks(
    expansion: &[FlatField],
    observations: &ObservationSet,
) -> Result<Vec<FlatField>, BufrError> {
    let profiles = observations.profiles();
    let mut sequence = vec![FlatField::replication_count(8, profiles.len())];
    for profile in profiles {
        let rows = observations.profile_rows(profile);
        sequence.extend(profile_header(expansion, profile, &rows)?);
        sequence.push(FlatField::replication_count(16, rows.len()));
        for row in &rows {
            sequence.extend(profile_sample(expansion, row)?);
        }
    }
    Ok(sequence)
}

fn profile_header(
    expansion: &[FlatField],
    profile: i64,
    rows: &[&Observation],
) -> Result<Vec<FlatField>, BufrError> {
    let head = rows[0];
    let time = head.time;
    let mean_z = rows.iter().map(|r| r.z).sum::<f64>() / rows.len() as f64;
    let direction = if mean_z < 0.0 {
        ProfileDirection::Upward
    } else {
        ProfileDirection::Downward
    };
    bind(
        &expansion[PROFILE_HEADER_BLOCK],
        vec![
            FieldValue::Missing, // date sequence marker
            FieldValue::Numeric(time.year() as f64),
            FieldValue::Numeric(time.month() as f64),
            FieldValue::Numeric(time.day() as f64),
            FieldValue::Missing, // time sequence marker
            FieldValue::Numeric(time.hour() as f64),
            FieldValue::Numeric(time.minute() as f64),
            FieldValue::Missing, // lat/lon sequence marker
            FieldValue::Numeric(head.lat),
            FieldValue::Numeric(head.lon),
            FieldValue::Text(profile.to_string()),
            FieldValue::Missing, // profile sequence marker
            FieldValue::Numeric(direction.figure()),
        ],
    )
}

fn profile_sample(
    expansion: &[FlatField],
    row: &Observation,
) -> Result<Vec<FlatField>, BufrError> {
    bind(
        &expansion[PROFILE_DATA_BLOCK],
        vec![
            FieldValue::Numeric(row.z.max(0.0)),
            FieldValue::Numeric(GtsppQualifier::WaterDepthAtLevel.figure()),
            FieldValue::Numeric(GtsppQualityFlag::Unqualified.figure()),
            FieldValue::Numeric(row.pressure * 10000.0), // dbar -> Pa
            FieldValue::Numeric(GtsppQualifier::WaterPressureAtLevel.figure()),
            FieldValue::Numeric(GtsppQualityFlag::Unqualified.figure()),
            FieldValue::Numeric(row.temperature + 273.15),
            FieldValue::Numeric(GtsppQualifier::WaterTemperatureAtLevel.figure()),
            FieldValue::Numeric(GtsppQualityFlag::Unqualified.figure()),
            FieldValue::Numeric(row.salinity),
            FieldValue::Numeric(GtsppQualifier::SalinityAtLevel.figure()),
            FieldValue::Numeric(GtsppQualityFlag::Unqualified.figure()),
        ],
    )
}

/// Clones a template slice with one value per field.
fn bind(template: &[FlatField], values: Vec<FieldValue>) -> Result<Vec<FlatField>, BufrError> {
    if template.len() != values.len() {
        return Err(BufrError::BadInput {
            msg: format!(
                "Binding {} values onto a {} field template",
                values.len(),
                template.len()
            ),
        });
    }
    Ok(template
        .iter()
        .zip(values)
        .map(|(field, value)| field.with_value(value))
        .collect())
}

fn truncated(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
