//! Error types for the encoder

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EncoderError>;

#[derive(Error, Debug)]
pub enum EncoderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Fewer than four uploads, or a required export kind is absent
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// A loaded file had no header row at all
    #[error("Table has no columns: {0}")]
    EmptyTable(String),

    #[error("Unknown branch: {0}")]
    UnknownBranch(String),
}

impl From<toml::de::Error> for EncoderError {
    fn from(e: toml::de::Error) -> Self {
        EncoderError::Config(e.to_string())
    }
}

impl From<toml_edit::TomlError> for EncoderError {
    fn from(e: toml_edit::TomlError) -> Self {
        EncoderError::Config(e.to_string())
    }
}

impl From<calamine::Error> for EncoderError {
    fn from(e: calamine::Error) -> Self {
        EncoderError::Spreadsheet(e.to_string())
    }
}
