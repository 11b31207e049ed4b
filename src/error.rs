use thiserror::Error;

use crate::decoder::DecoderStatus;

/// Error types for dive log conversion
///
/// Every variant maps to a stable process exit code so callers can branch on
/// the cause of a failed run. See [`DiveError::exit_code`].
#[derive(Error, Debug)]
pub enum DiveError {
    /// Invalid command-line usage
    #[error("usage error: {0}")]
    Usage(String),

    /// The input file could not be opened
    #[error("cannot open file {path}: {source}")]
    FileOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A record store could not grow
    #[error("cannot allocate memory for {store}: {reason}")]
    Allocation { store: &'static str, reason: String },

    /// The input file could not be read completely
    #[error("cannot read file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The decoding collaborator could not be initialised
    #[error("decoder context init failed with status {0}")]
    DecoderInit(DecoderStatus),

    /// No descriptor is registered for the requested device
    #[error("{vendor} {product} descriptor not found")]
    DescriptorNotFound { vendor: String, product: String },

    /// The collaborator refused to build a parser for the buffer
    #[error("parser init failed with status {status}: {message}")]
    ParserInit {
        status: DecoderStatus,
        message: String,
    },

    /// Writing the document failed
    #[error("output error: {0}")]
    Output(#[from] std::io::Error),

    /// An export file could not be written
    #[error("cannot write export {path}: {source}")]
    Export {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl DiveError {
    /// Exit code reported by the CLI for this failure class
    pub fn exit_code(&self) -> i32 {
        match self {
            DiveError::Usage(_) => 1,
            DiveError::FileOpen { .. } => 2,
            DiveError::Allocation { .. } => 3,
            DiveError::Read { .. } => 4,
            DiveError::DecoderInit(_) => 5,
            DiveError::DescriptorNotFound { .. } => 6,
            DiveError::ParserInit { .. } => 7,
            DiveError::Output(_) | DiveError::Export { .. } => 8,
        }
    }
}

#[cfg(feature = "csv")]
impl From<csv::Error> for DiveError {
    fn from(err: csv::Error) -> Self {
        match err.into_kind() {
            csv::ErrorKind::Io(io) => DiveError::Output(io),
            other => DiveError::Output(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("{other:?}"),
            )),
        }
    }
}

pub type Result<T> = std::result::Result<T, DiveError>;
