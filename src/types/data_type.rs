//! This module defines the canonical, type-safe representations of variable
//! element types and transform identifiers used throughout the write path.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The logical element type of a variable as declared by the application.
///
/// `Byte` is the opaque storage type every transformed variable is rewritten
/// to; `String` exists so the adapter can reject string variables explicitly
/// instead of computing a nonsensical byte size for them.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DataType {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Byte,
    String,
}

impl DataType {
    /// Returns the fixed element width in bytes, or `None` for `String`,
    /// which has no fixed width and is never transformable.
    pub fn size_of(&self) -> Option<u64> {
        match self {
            Self::Int8 | Self::UInt8 | Self::Byte => Some(1),
            Self::Int16 | Self::UInt16 => Some(2),
            Self::Int32 | Self::UInt32 | Self::Float32 => Some(4),
            Self::Int64 | Self::UInt64 | Self::Float64 => Some(8),
            Self::String => None,
        }
    }

    /// Returns `true` if the type is the variable-width string type.
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The enumerated identifier of a transform algorithm.
///
/// `None` is the no-transform sentinel. `Unknown` is a *legal* parse-time
/// value: a directive naming a transform this build does not know is still a
/// valid spec (its literal name is retained on the spec), and only becomes an
/// error if execution is actually attempted.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformType {
    None,
    Identity,
    Zlib,
    Zstd,
    Unknown,
}

impl TransformType {
    /// Maps a directive name to its enumerated type. Unrecognized names map
    /// to `Unknown` rather than failing; the caller keeps the literal name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "" | "none" => Self::None,
            "identity" => Self::Identity,
            "zlib" => Self::Zlib,
            "zstd" => Self::Zstd,
            _ => Self::Unknown,
        }
    }

    /// The canonical name for a known type. `Unknown` has no canonical name
    /// of its own; the spec's retained literal string is authoritative there.
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Identity => "identity",
            Self::Zlib => "zlib",
            Self::Zstd => "zstd",
            Self::Unknown => "unknown",
        }
    }

    /// The on-disk identifier byte used in the index characteristic.
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::Identity => 1,
            Self::Zlib => 2,
            Self::Zstd => 3,
            Self::Unknown => 0xFF,
        }
    }

    /// Decodes an on-disk identifier byte. Unassigned identifiers decode to
    /// `Unknown` so a newer writer's file can still be inspected.
    pub fn from_u8(byte: u8) -> Self {
        match byte {
            0 => Self::None,
            1 => Self::Identity,
            2 => Self::Zlib,
            3 => Self::Zstd,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for TransformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
