//! Canonical type enums shared across the write path.

mod data_type;

pub use data_type::{DataType, TransformType};
