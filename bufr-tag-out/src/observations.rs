//! The tidy in-memory observation table the projector consumes.
//!
//! External loaders (netCDF, Parquet, ...) are expected to deliver this
//! shape; only the CSV loader is provided here. Each row is one sample of
//! one profile; rows of a profile are kept in input order.
use std::collections::HashMap;
use std::path::Path;

use bufr_tag_core::errors::BufrError;
use chrono::NaiveDateTime;
use fnv::FnvHashMap;
use serde::Deserialize;

/// One profile sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub time: NaiveDateTime,
    pub profile: i64,
    pub lat: f64,
    pub lon: f64,
    /// Depth below the sea surface in metres.
    pub z: f64,
    /// In-situ temperature in degrees Celsius.
    pub temperature: f64,
    /// Practical salinity; NaN when not sampled.
    pub salinity: f64,
    /// Pressure in dbar; NaN when not sampled.
    pub pressure: f64,
}

/// An ordered set of profile observations.
#[derive(Debug, Clone, Default)]
pub struct ObservationSet {
    rows: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    time: String,
    profile: i64,
    lat: f64,
    lon: f64,
    z: f64,
    temperature: f64,
    salinity: Option<f64>,
    pressure: Option<f64>,
}

impl ObservationSet {
    pub fn new(rows: Vec<Observation>) -> Self {
        ObservationSet { rows }
    }

    /// Loads a tidy CSV with columns
    /// `time,profile,lat,lon,z,temperature[,salinity][,pressure]`.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, BufrError> {
        let mut reader = csv::Reader::from_path(path.as_ref())?;
        Self::from_csv_reader(&mut reader)
    }

    /// Loads the same shape from any reader (used by the tests).
    pub fn from_csv_reader<R: std::io::Read>(
        reader: &mut csv::Reader<R>,
    ) -> Result<Self, BufrError> {
        {
            let headers = reader.headers()?;
            for required in ["time", "profile", "lat", "lon", "z", "temperature"] {
                if !headers.iter().any(|h| h == required) {
                    return Err(BufrError::BadInput {
                        msg: format!("Observation table is missing column {:?}", required),
                    });
                }
            }
        }
        let mut rows = Vec::new();
        for row in reader.deserialize() {
            let row: CsvRow = row?;
            rows.push(Observation {
                time: parse_time(&row.time)?,
                profile: row.profile,
                lat: row.lat,
                lon: row.lon,
                z: row.z,
                temperature: row.temperature,
                salinity: row.salinity.unwrap_or(f64::NAN),
                pressure: row.pressure.unwrap_or(f64::NAN),
            });
        }
        Ok(ObservationSet { rows })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    /// Profile ids in order of first appearance.
    pub fn profiles(&self) -> Vec<i64> {
        let mut seen = FnvHashMap::default();
        let mut ordered = Vec::new();
        for row in &self.rows {
            if seen.insert(row.profile, ()).is_none() {
                ordered.push(row.profile);
            }
        }
        ordered
    }

    /// All samples of one profile, in input order.
    pub fn profile_rows(&self, profile: i64) -> Vec<&Observation> {
        self.rows.iter().filter(|r| r.profile == profile).collect()
    }

    /// The first sample of each profile, in profile order.
    pub fn profile_heads(&self) -> Vec<&Observation> {
        self.profiles()
            .into_iter()
            .filter_map(|p| self.rows.iter().find(|r| r.profile == p))
            .collect()
    }
}

/// Timestamps are accepted in RFC 3339 form or as plain
/// `YYYY-mm-dd HH:MM:SS` / `YYYY-mm-ddTHH:MM:SS`.
fn parse_time(raw: &str) -> Result<NaiveDateTime, BufrError> {
    for format in ["%Y-%m-%dT%H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(t);
        }
    }
    Err(BufrError::BadInput {
        msg: format!("Could not parse timestamp {:?}", raw),
    })
}

/// Platform identification delivered next to the observation table.
///
/// Built from a loose string map so loaders can forward whatever attributes
/// their format carries; unknown keys are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct TagMetadata {
    /// Platform unique identifier, bound to the long station name field.
    pub uuid: String,
    /// Platform transmitter id.
    pub ptt: String,
    /// WMO marine observing platform identifier, when assigned.
    pub wmo_platform_code: Option<u32>,
    pub wigos_issuer: u16,
    pub wigos_local_identifier: String,
}

impl Default for TagMetadata {
    fn default() -> Self {
        TagMetadata {
            uuid: String::new(),
            ptt: String::new(),
            wmo_platform_code: None,
            wigos_issuer: 2202,
            wigos_local_identifier: "to be determined".to_string(),
        }
    }
}

impl TagMetadata {
    pub fn from_map(attributes: &HashMap<String, String>) -> Self {
        let mut meta = TagMetadata::default();
        for (key, value) in attributes {
            match key.as_str() {
                "uuid" => meta.uuid = value.clone(),
                "ptt" => meta.ptt = value.clone(),
                "wmo_platform_code" => meta.wmo_platform_code = value.parse().ok(),
                "wigos_issuer" => {
                    if let Ok(issuer) = value.parse() {
                        meta.wigos_issuer = issuer;
                    }
                }
                "wigos_local_identifier" => meta.wigos_local_identifier = value.clone(),
                // Loaders forward everything they have; anything else is noise.
                _ => {}
            }
        }
        meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
time,profile,lat,lon,z,temperature,salinity
2021-06-01T00:00:00,7,50.1,-5.7,5.0,11.2,35.1
2021-06-01T00:10:00,7,50.1,-5.7,10.0,10.8,35.0
2021-06-02T00:00:00,9,50.4,-5.2,4.0,11.5,34.9
";

    fn set() -> ObservationSet {
        let mut reader = csv::Reader::from_reader(CSV.as_bytes());
        ObservationSet::from_csv_reader(&mut reader).unwrap()
    }

    #[test]
    fn csv_rows_parse_in_order() {
        let obs = set();
        assert_eq!(obs.len(), 3);
        assert_eq!(obs.profiles(), vec![7, 9]);
        assert_eq!(obs.profile_rows(7).len(), 2);
        assert_eq!(obs.profile_heads()[1].lat, 50.4);
        // Pressure column is absent, so it comes back as missing.
        assert!(obs.rows()[0].pressure.is_nan());
        assert_eq!(obs.rows()[0].salinity, 35.1);
    }

    #[test]
    fn missing_required_columns_are_reported() {
        let broken = "time,profile,lat,lon,z\n2021-06-01T00:00:00,7,50.1,-5.7,5.0\n";
        let mut reader = csv::Reader::from_reader(broken.as_bytes());
        let err = ObservationSet::from_csv_reader(&mut reader).unwrap_err();
        assert!(matches!(err, BufrError::BadInput { .. }));
    }

    #[test]
    fn bad_timestamps_are_reported() {
        let broken = "time,profile,lat,lon,z,temperature\nyesterday,7,50.1,-5.7,5.0,11.2\n";
        let mut reader = csv::Reader::from_reader(broken.as_bytes());
        let err = ObservationSet::from_csv_reader(&mut reader).unwrap_err();
        assert!(matches!(err, BufrError::BadInput { .. }));
    }

    #[test]
    fn metadata_ignores_unknown_keys() {
        let mut map = HashMap::new();
        map.insert("uuid".to_string(), "58112217efec720cd46e264e".to_string());
        map.insert("ptt".to_string(), "160376".to_string());
        map.insert("wigos_issuer".to_string(), "1000".to_string());
        map.insert("instrument_vendor".to_string(), "acme".to_string());
        let meta = TagMetadata::from_map(&map);
        assert_eq!(meta.uuid, "58112217efec720cd46e264e");
        assert_eq!(meta.ptt, "160376");
        assert_eq!(meta.wigos_issuer, 1000);
        assert_eq!(meta.wmo_platform_code, None);
        assert_eq!(meta.wigos_local_identifier, "to be determined");
    }
}
