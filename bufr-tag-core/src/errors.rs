use crate::fxy::Fxy;

/// Basic Error types.
#[derive(Debug)]
pub enum BufrError {
    /// IoError from the std library.
    StdIoError(std::io::Error),
    /// A wrapped CSV parsing error.
    CsvError(csv::Error),
    /// The bundled table resources could not be parsed.
    TableInit { msg: String },
    /// An FXY string does not parse, or references a row missing from its table.
    BadDescriptor { fxy: String },
    /// An F=3 expansion references a child FXY that is not in the tables.
    UnresolvedDescriptor { fxy: Fxy },
    /// A code figure is not found in the code/flag table for a descriptor.
    MissingCodeFigure { fxy: Fxy, code: u64 },
    /// A value does not fit in the bit width it must be encoded at.
    WidthOverflow { value: i128, bits: usize },
    /// A string field has a width that is not a multiple of 8 bits.
    BadAsciiWidth { bits: usize },
    /// A string bound for encoding contains non-ASCII characters.
    NonAsciiText { text: String },
    /// A read would run past the end of the buffer.
    ShortBuffer { need: usize, have: usize },
    /// The observation input is malformed (missing column, bad timestamp...).
    BadInput { msg: String },
    /// Enum creation error.
    ParseEnum { f: String, code: u16 },
    #[cfg(feature = "to_json")]
    /// Serialisation/Deserialisation error.
    SerdeError(serde_json::Error),
}

impl From<std::io::Error> for BufrError {
    fn from(e: std::io::Error) -> Self {
        Self::StdIoError(e)
    }
}

impl From<csv::Error> for BufrError {
    fn from(e: csv::Error) -> Self {
        Self::CsvError(e)
    }
}

impl std::fmt::Display for BufrError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use self::BufrError::*;
        match self {
            StdIoError(x) => write!(fmt, "{}", x),
            CsvError(x) => write!(fmt, "{}", x),
            #[cfg(feature = "to_json")]
            SerdeError(x) => write!(fmt, "{}", x),
            TableInit { msg } => write!(fmt, "Could not load bundled BUFR tables: {}", msg),
            BadDescriptor { fxy } => write!(fmt, "Bad descriptor reference: {:?}", fxy),
            UnresolvedDescriptor { fxy } => {
                write!(fmt, "Sequence expansion references unknown descriptor {}", fxy)
            }
            MissingCodeFigure { fxy, code } => {
                write!(fmt, "No entry for code figure {} in code table {}", code, fxy)
            }
            WidthOverflow { value, bits } => {
                write!(fmt, "Value {} does not fit in {} bits", value, bits)
            }
            BadAsciiWidth { bits } => {
                write!(fmt, "String width must be a multiple of 8 bits, got {}", bits)
            }
            NonAsciiText { text } => write!(fmt, "Cannot encode non-ASCII text {:?}", text),
            ShortBuffer { need, have } => {
                write!(fmt, "Buffer too short: need {} bytes but have {}", need, have)
            }
            BadInput { msg } => write!(fmt, "Bad observation input: {}", msg),
            ParseEnum { f, code } => write!(fmt, "Could not parse source ({}) to {}.", code, f),
        }
    }
}

impl From<BufrError> for String {
    fn from(e: BufrError) -> String {
        e.to_string()
    }
}

impl std::error::Error for BufrError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        use self::BufrError::*;
        match self {
            StdIoError(x) => x.source(),
            CsvError(x) => x.source(),
            #[cfg(feature = "to_json")]
            SerdeError(x) => x.source(),
            _ => None,
        }
    }
}
