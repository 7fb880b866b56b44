//! This file is the root of the `vartrans` Rust crate.
//!
//! vartrans is the variable-transform management layer of a scientific
//! binary I/O writer: it parses per-variable transform directives, adapts
//! variable definitions for byte-oriented storage, runs the selected
//! transform against the variable's data with a shared-buffer ownership
//! protocol, estimates worst-case output sizes for buffer pre-sizing, and
//! serializes the index characteristic a reader needs to reverse the
//! transform.
//!
//! Everything here assumes one sequential buffer-fill pass per writer
//! instance; there is no internal locking, and independent writer instances
//! share no state.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//==================================================================================
// 1. Module Declarations
//==================================================================================
pub mod buffer;
pub mod capacity;
pub mod characteristic;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod methods;
pub mod spec;
pub mod types;
pub mod variable;


//==================================================================================
// 2. Crate-Level Re-exports
//==================================================================================
pub use config::WriterConfig;
pub use context::FileContext;
pub use error::{Result, TransformError};
pub use executor::{ApplyOutcome, OutputMode};
pub use spec::{SpecId, SpecStore, TransformSpec};
pub use types::{DataType, TransformType};
