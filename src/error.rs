//! Error type returned by every docgen command.
use crate::generation::GenerationFailure;
use crate::ooxml::OoxmlError;
use thiserror::Error;

/// Main error type for docgen operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid setting, or an unknown template name
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Bad command input, such as an empty topic
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The model produced no usable outline
    #[error("generation failed: {0}")]
    GenerationFailed(#[from] GenerationFailure),

    /// The template could not be opened or the output could not be written
    #[error("assembly failed: {context}: {source}")]
    AssemblyFailed {
        context: String,
        #[source]
        source: OoxmlError,
    },

    /// A template directory or file is unusable
    #[error("template error: {0}")]
    Template(String),
}

impl Error {
    pub fn assembly(context: impl Into<String>, source: impl Into<OoxmlError>) -> Self {
        Self::AssemblyFailed {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Process exit status for this error; never zero.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidInput(_) => 2,
            Self::Configuration(_) => 3,
            Self::GenerationFailed(_) => 4,
            Self::AssemblyFailed { .. } => 5,
            Self::Template(_) => 6,
        }
    }
}

/// Result type for docgen operations.
pub type Result<T> = std::result::Result<T, Error>;
