//! This contains the enums used for BUFR code-table figures and field kinds.
//!
//! BUFR element descriptors with a `Code table` unit take a small set of
//! integer figures whose meanings live in the bundled code/flag tables. The
//! figures that the animal-tag projector binds are represented here as enums
//! so that call sites read as meanings rather than magic integers. Each enum
//! has a `new` constructor that fails on unknown figures.
use num::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::errors::BufrError;

/// The kind of a flattened field, driving the section-4 emission rules.
///
/// `Operator`, `Replication` and `Sequence` entries are structural markers
/// that occupy no bits of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Numeric,
    String,
    Operator,
    Replication,
    Sequence,
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FieldType::Numeric => "numeric",
            FieldType::String => "string",
            FieldType::Operator => "operator",
            FieldType::Replication => "replication",
            FieldType::Sequence => "sequence",
        };
        write!(f, "{}", name)
    }
}

impl FieldType {
    pub fn new(source: &str) -> Result<Self, BufrError> {
        match source {
            "numeric" => Ok(FieldType::Numeric),
            "string" => Ok(FieldType::String),
            "operator" => Ok(FieldType::Operator),
            "replication" => Ok(FieldType::Replication),
            "sequence" => Ok(FieldType::Sequence),
            _ => Err(BufrError::BadInput {
                msg: format!("Unknown field type {:?}", source),
            }),
        }
    }
}

/// Code table 0-08-021 (time significance).
#[derive(Debug, Clone, Copy, PartialEq, FromPrimitive, ToPrimitive)]
pub enum TimeSignificance {
    TimeOfLastKnownPosition = 26,
    MissingValue = 31,
}

/// Code table 0-08-080 (qualifier for GTSPP quality flag).
#[derive(Debug, Clone, Copy, PartialEq, FromPrimitive, ToPrimitive)]
pub enum GtsppQualifier {
    WaterPressureAtLevel = 10,
    WaterTemperatureAtLevel = 11,
    SalinityAtLevel = 12,
    WaterDepthAtLevel = 13,
}

/// Code table 0-33-050 (global GTSPP quality flag).
#[derive(Debug, Clone, Copy, PartialEq, FromPrimitive, ToPrimitive)]
pub enum GtsppQualityFlag {
    Unqualified = 0,
    CorrectValue = 1,
    ProbablyGoodValue = 2,
    ProbablyBadValue = 3,
    BadValue = 4,
}

/// Code table 0-02-149 (type of observing platform).
#[derive(Debug, Clone, Copy, PartialEq, FromPrimitive, ToPrimitive)]
pub enum ObservingPlatform {
    Unspecified = 0,
    MarineAnimal = 10,
}

/// Code table 0-02-204 (attachment of the sensor package).
#[derive(Debug, Clone, Copy, PartialEq, FromPrimitive, ToPrimitive)]
pub enum SensorAttachment {
    FreeFloating = 0,
    AttachedToMarineAnimal = 995,
}

/// Code table 0-02-148 (data collection and/or location system).
#[derive(Debug, Clone, Copy, PartialEq, FromPrimitive, ToPrimitive)]
pub enum LocationSystem {
    Argos = 1,
    Gps = 2,
    Iridium = 3,
}

/// Code table 0-33-022 (quality of buoy satellite transmission).
#[derive(Debug, Clone, Copy, PartialEq, FromPrimitive, ToPrimitive)]
pub enum TransmissionQuality {
    Good = 0,
    Dubious = 1,
}

/// Code table 0-33-023 (quality of buoy location).
#[derive(Debug, Clone, Copy, PartialEq, FromPrimitive, ToPrimitive)]
pub enum LocationQuality {
    Good = 0,
    Latest = 1,
}

/// Code table 0-33-027 (location quality class, radius of 66% confidence).
#[derive(Debug, Clone, Copy, PartialEq, FromPrimitive, ToPrimitive)]
pub enum LocationQualityClass {
    RadiusUnder500m = 0,
    Radius500mTo1500m = 1,
    RadiusOver1500m = 2,
}

/// Code table 0-22-056 (direction of profile).
#[derive(Debug, Clone, Copy, PartialEq, FromPrimitive, ToPrimitive)]
pub enum ProfileDirection {
    Upward = 0,
    Downward = 1,
}

macro_rules! code_enum_new {
    ($($name:ident),*) => {
        $(impl $name {
            /// NB: We give a result here to make life simpler for ourselves
            /// down the line.
            pub fn new(source: u16) -> Result<Self, BufrError> {
                $name::from_u16(source).ok_or_else(|| BufrError::ParseEnum {
                    f: stringify!($name).to_string(),
                    code: source,
                })
            }

            /// The raw code figure, as bound into a sequence.
            pub fn figure(self) -> f64 {
                self as u16 as f64
            }
        })*
    };
}

code_enum_new!(
    TimeSignificance,
    GtsppQualifier,
    GtsppQualityFlag,
    ObservingPlatform,
    SensorAttachment,
    LocationSystem,
    TransmissionQuality,
    LocationQuality,
    LocationQualityClass,
    ProfileDirection
);
