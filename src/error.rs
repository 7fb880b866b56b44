// In: src/error.rs

//! This module defines the single, unified error type for the entire vartrans
//! library. It uses the `thiserror` crate to provide ergonomic, context-aware
//! error handling.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, TransformError>;

#[derive(Error, Debug)]
pub enum TransformError {
    // =========================================================================
    // === High-Level, Semantic Errors (Specific to our library's logic)
    // =========================================================================
    #[error("malformed transform directive {directive:?}: {reason}")]
    Parse { directive: String, reason: String },

    #[error("transform requested on unsupported variable '{0}' (scalar or string-typed)")]
    UnsupportedVariable(String),

    #[error("dimension product of variable '{0}' overflows u64")]
    DimensionOverflow(String),

    #[error("transform dispatch failed for variable '{var}' (transform '{transform}'): {reason}")]
    TransformDispatch {
        var: String,
        transform: String,
        reason: String,
    },

    #[error("transform spec handle {0} is freed or was never allocated")]
    SpecFreed(usize),

    #[error("characteristic framing error: {0}")]
    Characteristic(String),

    #[error("contract violation (this is a bug): {0}")]
    ContractViolation(String),

    // =========================================================================
    // === Resource & External Error Wrappers
    // =========================================================================
    /// Buffer growth failure. Propagated, never retried; the write
    /// transaction must be aborted by the caller.
    #[error("shared buffer growth failed while reserving {0} additional bytes")]
    Allocation(usize),

    /// An encode kernel reported a failure (zstd, zlib, or a plugin method).
    #[error("encode kernel failed: {0}")]
    Encode(String),

    /// An error from the Serde JSON library during configuration parsing.
    #[error("invalid writer configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// An error originating from the underlying I/O subsystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
