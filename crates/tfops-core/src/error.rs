//! Error types and result aliases for the resource model.

/// The result type used throughout `tfops-core`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding or validating resource documents.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A persisted state identifier did not match any known state.
    ///
    /// Unknown identifiers are rejected rather than silently defaulted so a
    /// version skew between the stored status and this engine is surfaced.
    #[error("unknown run state identifier: {value}")]
    UnknownState {
        /// The identifier that failed to parse.
        value: String,
    },

    /// A parent kind string did not match any known run kind.
    #[error("unknown run kind: {value}")]
    UnknownKind {
        /// The kind string that failed to parse.
        value: String,
    },

    /// A document failed validation.
    #[error("invalid document: {message}")]
    InvalidDocument {
        /// Description of what made the document invalid.
        message: String,
    },

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of the serialization failure.
        message: String,
    },
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}
