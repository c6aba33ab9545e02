use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty prefix, bad table name, etc.).
    ConfigValidation(String),
    /// A mapped column is absent from an input file's header row.
    MissingColumn { entity: String, column: String },
    /// `total_price` (or another decimal column) could not be parsed.
    AmountParse { entity: String, row: usize, value: String },
    /// Malformed CSV (ragged rows, invalid UTF-8, unreadable header).
    Csv { entity: String, message: String },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingColumn { entity, column } => {
                write!(f, "{entity}: missing column '{column}'")
            }
            Self::AmountParse { entity, row, value } => {
                write!(f, "{entity}, row {row}: cannot parse amount '{value}'")
            }
            Self::Csv { entity, message } => write!(f, "{entity}: malformed CSV: {message}"),
        }
    }
}

impl std::error::Error for ReconError {}
