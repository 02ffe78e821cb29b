//! Error types for loading vector tables and configuring quantization.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure while building a vector store from a vector table.
///
/// Every variant is fatal for the run: the table is either read completely
/// or not at all.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The vector table could not be opened.
    #[error("Input file not found: {}", path.display())]
    InputNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The declared word count and dimension do not fit in memory.
    #[error("Cannot allocate memory: {megabytes} MB")]
    Allocation { megabytes: u64 },

    /// End of input was reached inside the header or a vector.
    #[error("Input ended early: {0}")]
    TruncatedInput(String),

    /// The two-integer header could not be parsed.
    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    /// A text-mode feature value is not a decimal float.
    #[error("Invalid feature value '{value}' for '{token}'")]
    InvalidFeature { token: String, value: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Rejected quantization parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QuantizeError {
    #[error("Bit level {0} is not supported (use 0, 1, 2 or 4..={max})", max = crate::quantize::MAX_BIT_LEVEL)]
    UnsupportedBitLevel(u32),

    #[error("Bit level must be a non-negative integer")]
    NotANumber,
}
