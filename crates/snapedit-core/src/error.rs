//! Error handling for SnapEdit
//!
//! Provides error types for every layer of the editor:
//! - Session errors (tool activation, preconditions, reentrancy)
//! - Service errors (segmentation timeouts and rejections)
//! - Scene errors (snapshot encoding, raster decode, missing objects)
//! - Archive errors (grid slice packaging)
//!
//! All error types use `thiserror` for ergonomic error handling. None of them
//! are fatal: the worst outcome of any failure is an aborted operation with the
//! scene left as it was.

use thiserror::Error;

/// Session error type
///
/// Represents errors raised by the tool state machine and its sessions.
/// These are user-facing and abort the operation before any state is mutated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// A required precondition was not met (no image loaded, no crop frame, ...)
    #[error("Precondition failed: {reason}")]
    PreconditionFailed {
        /// Human readable reason shown to the user.
        reason: String,
    },

    /// Another operation is still in flight
    #[error("Editor busy: {operation} in progress")]
    Busy {
        /// The operation holding the editor.
        operation: String,
    },

    /// The scene does not have the layer layout an operation expects
    #[error("Layer layout mismatch: expected {expected}")]
    InvariantMismatch {
        /// Description of the expected layout.
        expected: String,
    },

    /// An argument was outside its accepted range
    #[error("Invalid value for '{field}': {reason}")]
    InvalidInput {
        /// The offending parameter.
        field: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl SessionError {
    /// Shorthand for a precondition failure
    pub fn precondition(reason: impl Into<String>) -> Self {
        Self::PreconditionFailed {
            reason: reason.into(),
        }
    }

    /// Shorthand for an invalid argument
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Service error type
///
/// Failures of asynchronous collaborators such as the segmentation service.
/// Reported to the user; the session state is preserved unmodified.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// The service did not answer in time
    #[error("{service} timed out after {timeout_ms}ms")]
    Timeout {
        /// Name of the service.
        service: String,
        /// The timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// The service answered with an error
    #[error("{service} rejected the request: {reason}")]
    Rejected {
        /// Name of the service.
        service: String,
        /// The reason reported by the service.
        reason: String,
    },

    /// A response arrived for a request that is no longer current
    #[error("Discarded stale response for request #{ticket}")]
    Stale {
        /// The ticket of the outdated request.
        ticket: u64,
    },
}

/// Scene error type
///
/// Errors from the canvas facade: snapshot (de)serialization, raster
/// encode/decode and object lookups.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// Snapshot could not be produced
    #[error("Failed to serialize scene: {reason}")]
    Serialize {
        /// The underlying serializer message.
        reason: String,
    },

    /// Snapshot could not be restored
    #[error("Failed to restore scene: {reason}")]
    Deserialize {
        /// The underlying deserializer message.
        reason: String,
    },

    /// Raster buffer could not be encoded
    #[error("Failed to encode raster: {reason}")]
    Encode {
        /// The codec message.
        reason: String,
    },

    /// Raster buffer could not be decoded
    #[error("Failed to decode raster: {reason}")]
    Decode {
        /// The codec message.
        reason: String,
    },

    /// Object id not present in the scene
    #[error("Object {id} not found")]
    ObjectNotFound {
        /// The missing object id.
        id: u64,
    },

    /// Rasterization target could not be allocated
    #[error("Cannot rasterize a {width}x{height} region")]
    Raster {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
}

/// Archive error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArchiveError {
    /// Writing an entry failed
    #[error("Failed to add archive entry {name}: {reason}")]
    Entry {
        /// Entry path inside the archive.
        name: String,
        /// The writer message.
        reason: String,
    },

    /// Finalizing the archive failed
    #[error("Failed to finalize archive: {reason}")]
    Finalize {
        /// The writer message.
        reason: String,
    },

    /// Background archive task did not complete
    #[error("Archive task aborted: {reason}")]
    TaskAborted {
        /// The join error message.
        reason: String,
    },
}

/// Main error type for SnapEdit
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Session error
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Service error
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Scene error
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// Archive error
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Service(ServiceError::Timeout { .. }))
    }

    /// Check if this is a failed precondition
    pub fn is_precondition(&self) -> bool {
        matches!(self, Error::Session(SessionError::PreconditionFailed { .. }))
    }

    /// Check if this is a transient service failure (retrying may succeed)
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Service(_))
    }

    /// Check if the editor rejected the call because another operation is in flight
    pub fn is_busy(&self) -> bool {
        matches!(self, Error::Session(SessionError::Busy { .. }))
    }

    /// Check if this is a layer layout mismatch
    pub fn is_invariant_mismatch(&self) -> bool {
        matches!(self, Error::Session(SessionError::InvariantMismatch { .. }))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
