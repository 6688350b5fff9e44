//! Error types for the etcd v2 client

use std::fmt;

use thiserror::Error;

/// Errors that can occur when talking to an etcd v2 cluster
#[derive(Error, Debug)]
pub enum Error {
    /// The store rejected the operation with an application error code
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The server answered with an error status but no etcd error code
    /// (the auth layer does this for bad or missing credentials)
    #[error("Request rejected (status {status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Message from the body, or the raw body text
        message: String,
    },

    /// A client-side precondition failed before any request was sent
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// The response body could not be decoded
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Network or connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Request timeout
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// TLS/SSL error
    #[error("TLS error: {0}")]
    Tls(String),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns the etcd error code if this is an application error
    pub fn store_code(&self) -> Option<u64> {
        match self {
            Error::Store(e) => Some(e.code),
            _ => None,
        }
    }

    /// Returns the classified store error kind, if any
    pub fn store_kind(&self) -> Option<StoreErrorKind> {
        match self {
            Error::Store(e) => Some(e.kind()),
            _ => None,
        }
    }

    /// True when the store reported that the key already exists (code 105)
    pub fn is_already_exists(&self) -> bool {
        self.store_kind() == Some(StoreErrorKind::NodeExists)
    }

    /// True when the store reported that the key does not exist (code 100)
    pub fn is_not_found(&self) -> bool {
        self.store_kind() == Some(StoreErrorKind::KeyNotFound)
    }
}

/// Application-level error reported in an etcd response body
///
/// Carries the fields of `{"errorCode", "message", "cause", "index"}`
/// verbatim; use [`StoreError::kind`] to branch on the code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    /// Numeric etcd error code
    pub code: u64,
    /// Short description
    pub message: String,
    /// Implementation detail, usually the offending key
    pub cause: Option<String>,
    /// Store index at the time of the error
    pub index: Option<u64>,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{} (code {}, cause {})", self.message, self.code, cause),
            None => write!(f, "{} (code {})", self.message, self.code),
        }
    }
}

impl StoreError {
    /// Classify the error code
    pub fn kind(&self) -> StoreErrorKind {
        StoreErrorKind::from_code(self.code)
    }
}

/// Known etcd v2 error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// 100
    KeyNotFound,
    /// 101, compare-and-swap / compare-and-delete condition did not hold
    TestFailed,
    /// 102
    NotFile,
    /// 104
    NotDir,
    /// 105
    NodeExists,
    /// 107
    RootReadOnly,
    /// 108
    DirNotEmpty,
    /// 110
    Unauthorized,
    /// 201
    PrevValueRequired,
    /// 202
    TtlNotANumber,
    /// 203
    IndexNotANumber,
    /// 209
    InvalidField,
    /// 210
    InvalidForm,
    /// 300
    RaftInternal,
    /// 301
    LeaderElect,
    /// 400
    WatcherCleared,
    /// 401, the requested watch index has been compacted away
    EventIndexCleared,
    /// Any other code
    Other(u64),
}

impl StoreErrorKind {
    /// Map a raw error code onto its kind
    pub fn from_code(code: u64) -> Self {
        match code {
            100 => StoreErrorKind::KeyNotFound,
            101 => StoreErrorKind::TestFailed,
            102 => StoreErrorKind::NotFile,
            104 => StoreErrorKind::NotDir,
            105 => StoreErrorKind::NodeExists,
            107 => StoreErrorKind::RootReadOnly,
            108 => StoreErrorKind::DirNotEmpty,
            110 => StoreErrorKind::Unauthorized,
            201 => StoreErrorKind::PrevValueRequired,
            202 => StoreErrorKind::TtlNotANumber,
            203 => StoreErrorKind::IndexNotANumber,
            209 => StoreErrorKind::InvalidField,
            210 => StoreErrorKind::InvalidForm,
            300 => StoreErrorKind::RaftInternal,
            301 => StoreErrorKind::LeaderElect,
            400 => StoreErrorKind::WatcherCleared,
            401 => StoreErrorKind::EventIndexCleared,
            other => StoreErrorKind::Other(other),
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;
