use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while converting a Paprika export
#[derive(Error, Debug)]
pub enum ImportError {
    /// The input path is neither a recipe file, a bulk archive nor a directory of recipes
    #[error("Unrecognized input {}: {reason}", path.display())]
    InputFormatError { path: PathBuf, reason: String },

    /// A single recipe could not be decompressed or parsed
    #[error("Failed to decode {origin}: {reason}")]
    DecodeError { origin: String, reason: String },

    /// A decoded recipe lacks a field the target layout requires
    #[error("Cannot map {origin}: {reason}")]
    MappingError { origin: String, reason: String },

    /// Writing a recipe directory or the output root failed
    #[error("Failed to write {}: {source}", path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Builder configuration error
    #[error("Builder error: {0}")]
    BuilderError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}

impl ImportError {
    pub(crate) fn input_format(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ImportError::InputFormatError {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn decode(origin: impl Into<String>, reason: impl ToString) -> Self {
        ImportError::DecodeError {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn mapping(origin: impl Into<String>, reason: impl ToString) -> Self {
        ImportError::MappingError {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ImportError::WriteError {
            path: path.into(),
            source,
        }
    }

    /// Whether this error aborts the whole run rather than a single recipe.
    ///
    /// Decode, mapping and per-recipe write failures are recoverable: the converter
    /// records them and moves on to the next recipe.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ImportError::InputFormatError { .. }
                | ImportError::BuilderError(_)
                | ImportError::ConfigError(_)
        )
    }
}
