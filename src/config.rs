// In: src/config.rs

//! Writer configuration for the transform subsystem.
//!
//! A `WriterConfig` is created once at the application boundary (from JSON
//! or defaults) and passed down by reference. It owns the knobs the
//! transform layer itself cares about; everything transform-specific still
//! travels in the per-variable directive string.

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WriterConfig {
    /// Initial capacity of the transaction's shared write buffer, in bytes.
    #[serde(default = "default_buffer_capacity")]
    pub initial_buffer_capacity: usize,

    /// Whether transforms may write their output directly into the shared
    /// buffer. When false, every transform produces a private buffer and
    /// the caller copies.
    #[serde(default = "default_true")]
    pub allow_shared_buffer_output: bool,
}

fn default_buffer_capacity() -> usize {
    1 << 20
}

fn default_true() -> bool {
    true
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            initial_buffer_capacity: default_buffer_capacity(),
            allow_shared_buffer_output: default_true(),
        }
    }
}

impl WriterConfig {
    /// Parses a configuration from its JSON representation. Absent fields
    /// take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
