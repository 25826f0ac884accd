//! Pinning client error taxonomy.

use thiserror::Error;

/// Errors from the pinning service and gateway client.
#[derive(Error, Debug)]
pub enum PinError {
    /// Transport-level HTTP failure.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        /// The endpoint being called.
        endpoint: String,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// The service returned a non-success status. The body is passed
    /// through so the collaborator's own message reaches the caller.
    #[error("pinning service returned HTTP {status} for {endpoint}: {body}")]
    Api {
        /// The endpoint being called.
        endpoint: String,
        /// The HTTP status code.
        status: u16,
        /// The raw response body.
        body: String,
    },

    /// A well-formed HTTP response could not be decoded as expected.
    #[error("failed to decode {endpoint} response: {message}")]
    Deserialization {
        /// The endpoint being called.
        endpoint: String,
        /// What was wrong with the payload.
        message: String,
    },

    /// The document exceeds the size cap.
    #[error("file of {size} bytes exceeds the {limit}-byte limit")]
    FileTooLarge {
        /// Actual file size in bytes.
        size: usize,
        /// The configured limit in bytes.
        limit: usize,
    },

    /// The document's MIME type is not on the allow-list.
    #[error("unsupported media type \"{0}\" (allowed: JPEG, PNG, PDF)")]
    UnsupportedMediaType(String),

    /// A token URI could not be resolved to a gateway URL.
    #[error("invalid content URI: \"{0}\" (expected ipfs:// or http(s)://)")]
    InvalidUri(String),

    /// The service returned a content identifier that failed validation.
    #[error("pinning service returned an invalid content identifier: {0}")]
    InvalidCid(String),
}
