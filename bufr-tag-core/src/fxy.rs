//! The FXY descriptor reference used throughout the BUFR tables.
//!
//! Every entry of the BUFR tables is addressed by a three-part reference
//! written as a six character string `FXXYYY`. `F` selects the descriptor
//! class (0 = element, 1 = replication, 2 = operator, 3 = sequence), `X`
//! the class/table chapter and `Y` the entry within it.
use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::BufrError;

/// A parsed BUFR descriptor reference.
///
/// ```
/// use bufr_tag_core::fxy::Fxy;
///
/// let fxy: Fxy = "315023".parse().unwrap();
/// assert_eq!(fxy, Fxy::new(3, 15, 23));
/// assert_eq!(fxy.to_string(), "315023");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fxy {
    pub f: u8,
    pub x: u8,
    pub y: u8,
}

impl Fxy {
    pub fn new(f: u8, x: u8, y: u8) -> Self {
        Fxy { f, x, y }
    }

    /// Parse the canonical six-digit string form.
    pub fn parse(source: &str) -> Result<Self, BufrError> {
        let bad = || BufrError::BadDescriptor {
            fxy: source.to_string(),
        };
        if source.len() != 6 || !source.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        let f: u8 = source[0..1].parse().map_err(|_| bad())?;
        let x: u8 = source[1..3].parse().map_err(|_| bad())?;
        let y: u16 = source[3..6].parse().map_err(|_| bad())?;
        if f > 3 || x > 63 || y > 255 {
            return Err(bad());
        }
        Ok(Fxy { f, x, y: y as u8 })
    }

    /// The two byte packing used by section 3: `F` in the top two bits and
    /// `X` in the low six bits of the first byte, `Y` as the second byte.
    pub fn section3_bytes(self) -> [u8; 2] {
        [(self.f << 6) | (self.x & 0x3F), self.y]
    }

    /// True for element descriptors (Table B).
    pub fn is_element(self) -> bool {
        self.f == 0
    }

    /// True for sequence descriptors (Table D).
    pub fn is_sequence(self) -> bool {
        self.f == 3
    }
}

impl fmt::Display for Fxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:02}{:03}", self.f, self.x, self.y)
    }
}

impl FromStr for Fxy {
    type Err = BufrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Fxy::parse(s)
    }
}

impl Serialize for Fxy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Fxy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Fxy::parse(&raw).map_err(D::Error::custom)
    }
}
