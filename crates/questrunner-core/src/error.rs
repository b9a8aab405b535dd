//! Error types for questrunner-core
//!
//! Two granularities matter: failures while loading the wallet/proxy source
//! files (`SourceError`) and failures that abort a single wallet's call
//! sequence (`SequenceError`). Sequence errors carry structured context from
//! the call site that raised them; nothing downstream inspects error text.

use thiserror::Error;

/// Failure raised while loading a wallet or proxy source file.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that was attempted
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// No usable private keys remained after filtering
    #[error("no valid 64-character hex private keys found in {path}")]
    NoWallets {
        /// Path of the wallet file
        path: String,
    },
}

/// Failure that aborts one wallet's sequence (steps 1-5).
///
/// A closed enumeration: each variant is produced directly at the call site
/// that raised it, with the context needed to format a single error line.
#[derive(Debug, Error)]
pub enum SequenceError {
    /// The remote returned a non-2xx status
    #[error("api error ({status}) on {method} {endpoint}: {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Request method
        method: &'static str,
        /// Endpoint path relative to the base URL
        endpoint: String,
        /// Response body, truncated for display
        body: String,
    },

    /// The request produced no response at all
    #[error("network error on {method} {endpoint}: {message}")]
    Network {
        /// Request method
        method: &'static str,
        /// Endpoint path relative to the base URL
        endpoint: String,
        /// Transport error description
        message: String,
    },

    /// The response body did not match the declared schema
    #[error("decode error on {endpoint}: {message}")]
    Decode {
        /// Endpoint path relative to the base URL
        endpoint: String,
        /// Decoder error description
        message: String,
    },

    /// Message signing failed
    #[error("signature error: {0}")]
    Signing(String),

    /// The HTTP client could not be constructed (bad proxy URL, bad header)
    #[error("client setup error: {0}")]
    Setup(String),
}

/// Result alias for sequence operations
pub type Result<T> = std::result::Result<T, SequenceError>;
