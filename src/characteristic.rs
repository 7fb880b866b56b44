// In: src/characteristic.rs

//! Serialization of the per-variable transform characteristic.
//!
//! The characteristic is the index record a reader needs to reverse a
//! transform: which algorithm ran, the pre-transform size in bytes (always
//! recorded, even though the post-transform size lives elsewhere in the
//! index), and an opaque transform-defined metadata payload. This module
//! owns the record's *framing* only; the payload's internal layout belongs
//! to the transform method that produced it.
//!
//! On-disk layout, little-endian:
//!
//! ```text
//! tag(1) | transform type id(1) | pre-transform size(8) | meta len(2) | meta
//! ```
//!
//! The flag count and byte length returned by [`serialize`] must agree
//! exactly with what the index serializer later consumes; a mismatch
//! corrupts the index for every variable after it in the same region.

use crate::buffer::WriteBuffer;
use crate::error::{Result, TransformError};
use crate::methods::MethodRegistry;
use crate::spec::SpecStore;
use crate::types::TransformType;
use crate::variable::{TransformState, Variable};

/// Tag byte marking "transform characteristic present" in the index region.
pub const CHARACTERISTIC_TRANSFORM_TAG: u8 = 0x54;

/// Fixed framing bytes: tag + type id + pre-size + metadata length prefix.
const FIXED_OVERHEAD: u64 = 1 + 1 + 8 + 2;

/// Largest metadata payload the u16 length prefix can frame.
pub const MAX_METADATA_LEN: usize = u16::MAX as usize;

/// The index metadata record describing a transform applied to one variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformCharacteristic {
    pub transform_type: TransformType,
    pub pre_transform_size: u64,
    pub metadata: Vec<u8>,
}

/// What [`serialize`] emitted: how many characteristic flag fields, and the
/// exact number of bytes appended to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializedCharacteristic {
    pub flags_written: u8,
    pub write_length: u64,
}

impl SerializedCharacteristic {
    const NOTHING: Self = Self {
        flags_written: 0,
        write_length: 0,
    };
}

/// Bytes this characteristic will occupy once serialized.
pub fn characteristic_overhead(ch: &TransformCharacteristic) -> u64 {
    FIXED_OVERHEAD + ch.metadata.len() as u64
}

/// Bytes this variable's transform characteristic will occupy in the index.
///
/// Usable both after `apply` (from the recorded characteristic) and before
/// it (from the registered method's metadata for the attached spec), so
/// upstream size planning can run ahead of the actual transform. A variable
/// with no transform contributes zero.
pub fn overhead(var: &Variable, specs: &SpecStore, registry: &MethodRegistry) -> Result<u64> {
    let Some(state) = var.transform.as_ref() else {
        return Ok(0);
    };
    if state.transform_type == TransformType::None {
        return Ok(0);
    }
    if let Some(ch) = state.characteristic.as_ref() {
        return Ok(characteristic_overhead(ch));
    }
    let spec = specs.get(state.spec)?;
    let metadata_len = registry
        .get(state.transform_type)
        .map(|m| m.characteristic_metadata(spec).len() as u64)
        .unwrap_or(0);
    Ok(FIXED_OVERHEAD + metadata_len)
}

/// Appends one length-prefixed characteristic record to `buffer`, growing it
/// as needed, and reports the flag count and exact byte length written.
pub fn serialize(
    ch: &TransformCharacteristic,
    buffer: &mut WriteBuffer,
) -> Result<SerializedCharacteristic> {
    if ch.metadata.len() > MAX_METADATA_LEN {
        return Err(TransformError::Characteristic(format!(
            "metadata payload of {} bytes exceeds the {}-byte framing limit",
            ch.metadata.len(),
            MAX_METADATA_LEN
        )));
    }

    let mut header = [0u8; FIXED_OVERHEAD as usize];
    header[0] = CHARACTERISTIC_TRANSFORM_TAG;
    header[1] = ch.transform_type.as_u8();
    header[2..10].copy_from_slice(&ch.pre_transform_size.to_le_bytes());
    header[10..12].copy_from_slice(&(ch.metadata.len() as u16).to_le_bytes());

    buffer.reserve(header.len() + ch.metadata.len())?;
    let start = buffer.append(&header)?;
    buffer.append(&ch.metadata)?;
    let write_length = buffer.offset() - start;

    debug_assert_eq!(write_length, characteristic_overhead(ch));
    Ok(SerializedCharacteristic {
        flags_written: 1,
        write_length,
    })
}

/// Serializes the characteristic of a variable, if it has one. A variable
/// with no transform (or one not yet applied) writes nothing: zero flags,
/// zero bytes.
pub fn serialize_var(var: &Variable, buffer: &mut WriteBuffer) -> Result<SerializedCharacteristic> {
    match var.transform.as_ref().and_then(|s| s.characteristic.as_ref()) {
        Some(ch) => serialize(ch, buffer),
        None => Ok(SerializedCharacteristic::NOTHING),
    }
}

/// Deep-copies the transform state (characteristic and underlying spec) from
/// `src` onto `dst`, replacing whatever `dst` carried. The two variables'
/// transform state is independently freeable afterward: the copy owns a
/// fresh spec handle.
pub fn copy_var_transform(
    specs: &mut SpecStore,
    dst: &mut Variable,
    src: &Variable,
) -> Result<()> {
    dst.transform = match src.transform.as_ref() {
        Some(state) => Some(TransformState {
            spec: specs.copy(state.spec)?,
            transform_type: state.transform_type,
            original_dtype: state.original_dtype,
            original_dims: state.original_dims.clone(),
            characteristic: state.characteristic.clone(),
        }),
        None => None,
    };
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DataType;
    use crate::variable::{define_var, Dimension};

    fn sample(metadata: Vec<u8>) -> TransformCharacteristic {
        TransformCharacteristic {
            transform_type: TransformType::Zstd,
            pre_transform_size: 400,
            metadata,
        }
    }

    #[test]
    fn test_serialize_layout_is_byte_exact() {
        let ch = sample(vec![0xAA, 0xBB]);
        let mut buffer = WriteBuffer::new();
        let result = serialize(&ch, &mut buffer).unwrap();

        assert_eq!(result.flags_written, 1);
        assert_eq!(result.write_length, buffer.offset());

        let bytes = buffer.as_slice();
        assert_eq!(bytes[0], CHARACTERISTIC_TRANSFORM_TAG);
        assert_eq!(bytes[1], TransformType::Zstd.as_u8());
        assert_eq!(u64::from_le_bytes(bytes[2..10].try_into().unwrap()), 400);
        assert_eq!(u16::from_le_bytes(bytes[10..12].try_into().unwrap()), 2);
        assert_eq!(&bytes[12..], &[0xAA, 0xBB]);
    }

    #[test]
    fn test_overhead_matches_serialized_length() {
        // Zero-length and large payloads must both agree exactly.
        for metadata in [Vec::new(), vec![7u8; 4096]] {
            let ch = sample(metadata);
            let mut buffer = WriteBuffer::new();
            let result = serialize(&ch, &mut buffer).unwrap();
            assert_eq!(characteristic_overhead(&ch), result.write_length);
        }
    }

    #[test]
    fn test_oversized_metadata_is_rejected() {
        let ch = sample(vec![0u8; MAX_METADATA_LEN + 1]);
        let mut buffer = WriteBuffer::new();
        assert!(matches!(
            serialize(&ch, &mut buffer),
            Err(TransformError::Characteristic(_))
        ));
        // No partial record may land in the buffer.
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_untransformed_variable_writes_zero_flags() {
        let var = Variable::new("plain", DataType::Int32, vec![Dimension::new(8)]);
        let mut buffer = WriteBuffer::new();
        let result = serialize_var(&var, &mut buffer).unwrap();
        assert_eq!(result.flags_written, 0);
        assert_eq!(result.write_length, 0);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_pre_apply_overhead_uses_method_metadata() {
        let mut specs = SpecStore::new();
        let registry = MethodRegistry::with_builtins();
        let spec = specs.parse_insert("zlib:level=5").unwrap();
        let mut var = Variable::new("t", DataType::Int32, vec![Dimension::new(100)]);
        define_var(&mut var, &specs, spec).unwrap();

        // zlib records a one-byte level payload.
        assert_eq!(overhead(&var, &specs, &registry).unwrap(), FIXED_OVERHEAD + 1);
    }

    #[test]
    fn test_copy_var_transform_is_independent() {
        let mut specs = SpecStore::new();
        let spec = specs.parse_insert("zstd:level=7").unwrap();
        let mut src = Variable::new("a", DataType::Float32, vec![Dimension::new(64)]);
        define_var(&mut src, &specs, spec).unwrap();

        let mut dst = Variable::new("b", DataType::Float32, vec![Dimension::new(64)]);
        copy_var_transform(&mut specs, &mut dst, &src).unwrap();

        let src_spec = src.transform.as_ref().unwrap().spec;
        let dst_spec = dst.transform.as_ref().unwrap().spec;
        assert_ne!(src_spec, dst_spec);

        // Freeing the copy's spec leaves the source's intact.
        specs.free(dst_spec).unwrap();
        assert_eq!(specs.get(src_spec).unwrap().lookup("level"), Some("7"));
    }
}
