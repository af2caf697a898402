//! Expansion of hierarchical table D sequences into flat field lists.
//!
//! Encoding walks a flat, ordered list of fields; the nesting of the BUFR
//! tables (sequences referencing sequences, replications, operators) only
//! matters while that list is produced. The expansion here is depth-first
//! pre-order: every sequence contributes a zero-width marker entry followed
//! by the expansion of its children.
use serde::{Deserialize, Serialize};

use crate::errors::BufrError;
use crate::fxy::Fxy;
use crate::enums::FieldType;
use crate::tables::{registry, TableRegistry};

/// The unit label marking ASCII string elements in table B.
pub const ASCII_UNIT: &str = "CCITT IA5";

/// A value bound to a flattened field before encoding.
///
/// `Numeric(f64::NAN)` and `Missing` are equivalent: both encode as the
/// all-ones missing pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Numeric(f64),
    Text(String),
    Missing,
}

impl FieldValue {
    pub fn is_missing(&self) -> bool {
        match self {
            FieldValue::Missing => true,
            FieldValue::Numeric(v) => v.is_nan(),
            FieldValue::Text(_) => false,
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Missing
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Numeric(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

/// One entry of a flattened descriptor sequence.
///
/// Marker entries (`Operator`, `Replication`, `Sequence`) have `bit_len` 0
/// and never carry a value; element entries get their width, scale and
/// reference value from table B and are bound to a value before encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatField {
    /// The nearest enclosing F=3 sequence providing scope.
    #[serde(default = "FlatField::default_parent")]
    pub parent: Fxy,
    pub fxy: Fxy,
    /// Human text for diagnostics only.
    #[serde(rename = "text", default)]
    pub title: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
    #[serde(default)]
    pub bit_len: u16,
    /// Decimal scale exponent applied before encoding.
    #[serde(default)]
    pub scale: i32,
    /// Reference value subtracted after scaling.
    #[serde(rename = "offset", default)]
    pub reference: i64,
    #[serde(default)]
    pub value: FieldValue,
}

impl FlatField {
    fn default_parent() -> Fxy {
        Fxy::new(0, 0, 0)
    }

    /// A bound copy of this field.
    pub fn with_value(&self, value: FieldValue) -> Self {
        let mut field = self.clone();
        field.value = value;
        field
    }

    /// A standalone delayed-replication count record (0-31-001 / 0-31-002).
    pub fn replication_count(bit_len: u16, count: usize) -> Self {
        let fxy = if bit_len > 8 {
            Fxy::new(0, 31, 2)
        } else {
            Fxy::new(0, 31, 1)
        };
        FlatField {
            parent: fxy,
            fxy,
            title: "Delayed descriptor replication factor (Numeric)".to_string(),
            kind: FieldType::Numeric,
            bit_len,
            scale: 0,
            reference: 0,
            value: FieldValue::Numeric(count as f64),
        }
    }
}

/// Expands a top-level sequence descriptor into its flat field list.
///
/// The returned list starts with a marker for the sequence itself; element
/// entries carry the table B width/scale/reference, markers carry zeros.
/// Referencing a descriptor that is missing from the bundled tables fails
/// with [`BufrError::UnresolvedDescriptor`].
///
/// ```
/// use bufr_tag_core::expand::expand_descriptor;
/// use bufr_tag_core::fxy::Fxy;
///
/// let fields = expand_descriptor(Fxy::new(3, 1, 150)).unwrap();
/// assert_eq!(fields.len(), 5);
/// assert_eq!(fields[2].fxy, Fxy::new(0, 1, 126));
/// assert_eq!(fields[2].bit_len, 17);
/// ```
pub fn expand_descriptor(fxy: Fxy) -> Result<Vec<FlatField>, BufrError> {
    let reg = registry()?;
    let mut fields = Vec::new();
    expand_root(reg, fxy, &mut fields)?;
    Ok(fields)
}

fn expand_root(
    reg: &TableRegistry,
    fxy: Fxy,
    fields: &mut Vec<FlatField>,
) -> Result<(), BufrError> {
    let rows = reg.table_d(fxy)?;
    let title = rows
        .first()
        .map(|r| r.title.clone())
        .unwrap_or_default();
    fields.push(marker(fxy, fxy, FieldType::Sequence, format!("{} (Sequence)", title)));
    expand_children(reg, fxy, fields)
}

fn expand_children(
    reg: &TableRegistry,
    parent: Fxy,
    fields: &mut Vec<FlatField>,
) -> Result<(), BufrError> {
    for row in reg.table_d(parent)? {
        let child = row.child;
        match child.f {
            0 => {
                let element = reg.table_b(child).map_err(|_| {
                    BufrError::UnresolvedDescriptor { fxy: child }
                })?;
                let kind = if element.unit == ASCII_UNIT {
                    FieldType::String
                } else {
                    FieldType::Numeric
                };
                fields.push(FlatField {
                    parent,
                    fxy: child,
                    title: format!("{} ({})", row.element_name, element.unit),
                    kind,
                    bit_len: element.width,
                    scale: element.scale,
                    reference: element.reference,
                    value: FieldValue::Missing,
                });
            }
            1 => {
                let title = if child.y == 0 {
                    format!("Delayed Replication: {} (Replication)", child.x)
                } else {
                    format!("Replication {} x {} (Replication)", child.x, child.y)
                };
                fields.push(marker(parent, child, FieldType::Replication, title));
            }
            2 => {
                fields.push(marker(
                    parent,
                    child,
                    FieldType::Operator,
                    format!("{} (Operator)", row.element_name),
                ));
            }
            3 => {
                if reg.table_d(child).is_err() {
                    return Err(BufrError::UnresolvedDescriptor { fxy: child });
                }
                fields.push(marker(
                    parent,
                    child,
                    FieldType::Sequence,
                    format!("{} (Sequence)", row.element_name),
                ));
                expand_children(reg, child, fields)?;
            }
            _ => {
                return Err(BufrError::BadDescriptor {
                    fxy: child.to_string(),
                })
            }
        }
    }
    Ok(())
}

fn marker(parent: Fxy, fxy: Fxy, kind: FieldType, title: String) -> FlatField {
    FlatField {
        parent,
        fxy,
        title,
        kind,
        bit_len: 0,
        scale: 0,
        reference: 0,
        value: FieldValue::Missing,
    }
}
