//! # hcred-ipfs — Pinning service and gateway client
//!
//! Typed access to the content-addressed storage network:
//!
//! - **File pinning** via `POST /pinning/pinFileToIPFS` (multipart, bearer
//!   token). Enforces the 10 MB size cap and the {JPEG, PNG, PDF} MIME
//!   allow-list before any bytes leave the process.
//! - **Metadata publishing** via `POST /pinning/pinJSONToIPFS`. Published
//!   documents are immutable — re-publishing produces a new identifier.
//! - **Metadata retrieval** via the HTTP gateway, resolving `ipfs://` URIs
//!   to gateway URLs.
//!
//! This crate is the only path by which the healthcred stack touches the
//! storage network.

pub mod client;
pub mod config;
pub mod error;
pub mod metadata;

pub use client::{PinClient, PinnedFile, PinnedJson};
pub use config::PinConfig;
pub use error::PinError;
pub use metadata::CredentialMetadata;

/// MIME types accepted for credential documents.
pub const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "application/pdf"];

/// Maximum accepted credential document size, in bytes (10 MB).
pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;

/// Whether a MIME type is accepted for credential documents.
pub fn is_allowed_mime(mime: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&mime)
}
