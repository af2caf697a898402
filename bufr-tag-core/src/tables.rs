//! The bundled BUFR table resources and their in-process registry.
//!
//! The WMO-style table files (Tables A, B and D plus the code/flag tables)
//! are CSV resources compiled into the library. They are parsed exactly once
//! into an immutable [`TableRegistry`] on first access; every later access
//! is a lock-free read of the cached registry. The loader does no validation
//! beyond the stated column schema.
use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::errors::BufrError;
use crate::fxy::Fxy;

/// A data category row of Table A.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TableA {
    #[serde(rename = "CodeFigure")]
    pub code: u16,
    #[serde(rename = "Meaning_en")]
    pub meaning: String,
}

/// An element row of Table B.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TableB {
    #[serde(rename = "FXY")]
    pub fxy: Fxy,
    #[serde(rename = "ClassName_en")]
    pub class_name: String,
    #[serde(rename = "ElementName_en")]
    pub element_name: String,
    #[serde(rename = "BUFR_Unit")]
    pub unit: String,
    #[serde(rename = "BUFR_Scale")]
    pub scale: i32,
    #[serde(rename = "BUFR_ReferenceValue")]
    pub reference: i64,
    #[serde(rename = "BUFR_DataWidth_Bits")]
    pub width: u16,
}

/// One child row of a Table D sequence definition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TableD {
    #[serde(rename = "FXY1")]
    pub parent: Fxy,
    #[serde(rename = "FXY2")]
    pub child: Fxy,
    #[serde(rename = "Title_en")]
    pub title: String,
    #[serde(rename = "ElementName_en")]
    pub element_name: String,
    #[serde(rename = "ElementDescription_en", default)]
    pub element_description: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct CodeFlagRow {
    #[serde(rename = "FXY")]
    fxy: Fxy,
    #[serde(rename = "CodeFigure")]
    code_figure: String,
    #[serde(rename = "EntryName_en")]
    entry_name: String,
}

/// The key of a code/flag table entry: a single figure or an inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeFigure {
    Single(u64),
    Range(u64, u64),
}

impl CodeFigure {
    fn parse(raw: &str) -> Result<Self, BufrError> {
        let bad = || BufrError::TableInit {
            msg: format!("Bad code figure key {:?}", raw),
        };
        if let Some((start, end)) = raw.split_once('-') {
            let start = start.trim().parse().map_err(|_| bad())?;
            let end = end.trim().parse().map_err(|_| bad())?;
            Ok(CodeFigure::Range(start, end))
        } else {
            Ok(CodeFigure::Single(raw.trim().parse().map_err(|_| bad())?))
        }
    }

    fn contains(self, figure: u64) -> bool {
        match self {
            CodeFigure::Single(v) => v == figure,
            CodeFigure::Range(start, end) => start <= figure && figure <= end,
        }
    }
}

/// An entry of a code/flag table.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeFlag {
    pub fxy: Fxy,
    pub figure: CodeFigure,
    pub entry_name: String,
}

/// The immutable registry of all bundled table resources.
pub struct TableRegistry {
    table_a: BTreeMap<u16, TableA>,
    table_b: HashMap<Fxy, TableB>,
    table_d: HashMap<Fxy, Vec<TableD>>,
    code_flags: HashMap<Fxy, Vec<CodeFlag>>,
}

impl TableRegistry {
    /// A Table A data category row.
    pub fn table_a(&self, code: u16) -> Option<&TableA> {
        self.table_a.get(&code)
    }

    /// The element row for an F=0 descriptor.
    pub fn table_b(&self, fxy: Fxy) -> Result<&TableB, BufrError> {
        self.table_b.get(&fxy).ok_or_else(|| BufrError::BadDescriptor {
            fxy: fxy.to_string(),
        })
    }

    /// The ordered child rows for an F=3 sequence descriptor.
    pub fn table_d(&self, fxy: Fxy) -> Result<&[TableD], BufrError> {
        self.table_d
            .get(&fxy)
            .map(|rows| rows.as_slice())
            .ok_or_else(|| BufrError::BadDescriptor {
                fxy: fxy.to_string(),
            })
    }

    /// The code/flag entry matching `figure`, honoring inclusive range keys.
    pub fn code_flag(&self, fxy: Fxy, figure: u64) -> Result<&CodeFlag, BufrError> {
        self.code_flags
            .get(&fxy)
            .and_then(|entries| entries.iter().find(|e| e.figure.contains(figure)))
            .ok_or(BufrError::MissingCodeFigure { fxy, code: figure })
    }

    fn from_bundled() -> Result<Self, BufrError> {
        let mut registry = TableRegistry {
            table_a: BTreeMap::new(),
            table_b: HashMap::new(),
            table_d: HashMap::new(),
            code_flags: HashMap::new(),
        };
        for (name, text) in BUNDLED {
            registry.load_resource(name, text)?;
        }
        Ok(registry)
    }

    fn load_resource(&mut self, name: &str, text: &str) -> Result<(), BufrError> {
        let mut reader = csv::Reader::from_reader(text.as_bytes());
        if name.starts_with("BUFR_TableA") {
            for row in reader.deserialize() {
                let row: TableA = row?;
                self.table_a.insert(row.code, row);
            }
        } else if name.starts_with("BUFRCREX_TableB") {
            for row in reader.deserialize() {
                let row: TableB = row?;
                self.table_b.insert(row.fxy, row);
            }
        } else if name.starts_with("BUFR_TableD") {
            for row in reader.deserialize() {
                let row: TableD = row?;
                self.table_d.entry(row.parent).or_default().push(row);
            }
        } else if name.starts_with("BUFRCREX_CodeFlag") {
            for row in reader.deserialize() {
                let row: CodeFlagRow = row?;
                let entry = CodeFlag {
                    fxy: row.fxy,
                    figure: CodeFigure::parse(&row.code_figure)?,
                    entry_name: row.entry_name,
                };
                self.code_flags.entry(row.fxy).or_default().push(entry);
            }
        } else {
            return Err(BufrError::TableInit {
                msg: format!("Unrecognized table resource {:?}", name),
            });
        }
        Ok(())
    }
}

/// The bundled table resources. The file names (and column schemas) follow
/// the WMO distribution layout.
const BUNDLED: &[(&str, &str)] = &[
    ("BUFR_TableA_en.csv", include_str!("../tables/BUFR_TableA_en.csv")),
    (
        "BUFRCREX_TableB_en_01.csv",
        include_str!("../tables/BUFRCREX_TableB_en_01.csv"),
    ),
    (
        "BUFRCREX_TableB_en_02.csv",
        include_str!("../tables/BUFRCREX_TableB_en_02.csv"),
    ),
    (
        "BUFRCREX_TableB_en_04.csv",
        include_str!("../tables/BUFRCREX_TableB_en_04.csv"),
    ),
    (
        "BUFRCREX_TableB_en_05.csv",
        include_str!("../tables/BUFRCREX_TableB_en_05.csv"),
    ),
    (
        "BUFRCREX_TableB_en_06.csv",
        include_str!("../tables/BUFRCREX_TableB_en_06.csv"),
    ),
    (
        "BUFRCREX_TableB_en_07.csv",
        include_str!("../tables/BUFRCREX_TableB_en_07.csv"),
    ),
    (
        "BUFRCREX_TableB_en_08.csv",
        include_str!("../tables/BUFRCREX_TableB_en_08.csv"),
    ),
    (
        "BUFRCREX_TableB_en_22.csv",
        include_str!("../tables/BUFRCREX_TableB_en_22.csv"),
    ),
    (
        "BUFRCREX_TableB_en_31.csv",
        include_str!("../tables/BUFRCREX_TableB_en_31.csv"),
    ),
    (
        "BUFRCREX_TableB_en_33.csv",
        include_str!("../tables/BUFRCREX_TableB_en_33.csv"),
    ),
    (
        "BUFR_TableD_en_01.csv",
        include_str!("../tables/BUFR_TableD_en_01.csv"),
    ),
    (
        "BUFR_TableD_en_06.csv",
        include_str!("../tables/BUFR_TableD_en_06.csv"),
    ),
    (
        "BUFR_TableD_en_15.csv",
        include_str!("../tables/BUFR_TableD_en_15.csv"),
    ),
    (
        "BUFRCREX_CodeFlag_en_02.csv",
        include_str!("../tables/BUFRCREX_CodeFlag_en_02.csv"),
    ),
    (
        "BUFRCREX_CodeFlag_en_08.csv",
        include_str!("../tables/BUFRCREX_CodeFlag_en_08.csv"),
    ),
    (
        "BUFRCREX_CodeFlag_en_22.csv",
        include_str!("../tables/BUFRCREX_CodeFlag_en_22.csv"),
    ),
    (
        "BUFRCREX_CodeFlag_en_33.csv",
        include_str!("../tables/BUFRCREX_CodeFlag_en_33.csv"),
    ),
];

static REGISTRY: Lazy<Result<TableRegistry, String>> =
    Lazy::new(|| TableRegistry::from_bundled().map_err(|e| e.to_string()));

/// The process-wide table registry, loaded on first access.
pub fn registry() -> Result<&'static TableRegistry, BufrError> {
    REGISTRY
        .as_ref()
        .map_err(|msg| BufrError::TableInit { msg: msg.clone() })
}
