// In: src/variable.rs

//! Variable definitions and their adaptation for byte-oriented transforms.
//!
//! A transformed variable is stored on disk as an opaque byte array, so the
//! adapter rewrites the variable's declared type while preserving the
//! original type and dimension list as recoverable metadata. The original
//! shape is held in a dedicated field that is never overwritten, so the
//! pre-transform size stays computable both before and after adaptation
//! (callers rely on both orders).

use serde::{Deserialize, Serialize};

use crate::characteristic::TransformCharacteristic;
use crate::error::{Result, TransformError};
use crate::spec::{SpecId, SpecStore};
use crate::types::{DataType, TransformType};

/// One dimension of a variable, as a local element extent.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimension {
    pub extent: u64,
}

impl Dimension {
    pub fn new(extent: u64) -> Self {
        Self { extent }
    }
}

/// Who owns a variable's data bytes.
///
/// This replaces a raw pointer plus a "free me" flag with an ownership state
/// the type system checks: `Owned` bytes are freed with the variable,
/// `InSharedBuffer` bytes belong to the write transaction's shared buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarPayload {
    Empty,
    Owned(Vec<u8>),
    InSharedBuffer { offset: u64, len: u64 },
}

impl VarPayload {
    pub fn len(&self) -> u64 {
        match self {
            Self::Empty => 0,
            Self::Owned(bytes) => bytes.len() as u64,
            Self::InSharedBuffer { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Transform bookkeeping attached to an adapted variable.
///
/// `original_dtype` / `original_dims` are the two-phase-mutation half of the
/// adapter contract: they are written once at adaptation and never touched
/// again. The spec is attached by handle; the `SpecStore` owns it.
#[derive(Debug, Clone)]
pub struct TransformState {
    pub spec: SpecId,
    pub transform_type: TransformType,
    pub original_dtype: DataType,
    pub original_dims: Vec<Dimension>,
    /// Filled in by the executor once the transform has run.
    pub characteristic: Option<TransformCharacteristic>,
}

/// A variable definition within a group.
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub dtype: DataType,
    pub dimensions: Vec<Dimension>,
    pub payload: VarPayload,
    pub transform: Option<TransformState>,
}

impl Variable {
    pub fn new(name: impl Into<String>, dtype: DataType, dimensions: Vec<Dimension>) -> Self {
        Self {
            name: name.into(),
            dtype,
            dimensions,
            payload: VarPayload::Empty,
            transform: None,
        }
    }

    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.payload = VarPayload::Owned(data);
        self
    }

    /// Attaches a typed data buffer, reinterpreted as raw bytes.
    pub fn with_typed_data<T: bytemuck::NoUninit>(self, data: &[T]) -> Self {
        self.with_data(bytemuck::cast_slice(data).to_vec())
    }

    pub fn is_transformed(&self) -> bool {
        self.transform.is_some()
    }
}

/// Rewrites `var` for byte-oriented transform storage.
///
/// Preconditions: the variable must be dimensioned (not scalar) and not
/// string-typed; both fail with `UnsupportedVariable` before any mutation.
/// Effects: the original type and dimension list move into a
/// [`TransformState`], the declared type becomes `DataType::Byte` with a
/// single dimension equal to the pre-transform byte size (rewritten by the
/// writer once the transformed size is known), and the spec is attached by
/// handle.
pub fn define_var(var: &mut Variable, specs: &SpecStore, spec_id: SpecId) -> Result<()> {
    let spec = specs.get(spec_id)?;

    if var.dimensions.is_empty() || var.dtype.is_string() {
        return Err(TransformError::UnsupportedVariable(var.name.clone()));
    }
    let byte_size = pre_transform_size(var)?;

    log::debug!(
        "adapting variable '{}' ({}, {} dim(s)) for transform '{}'",
        var.name,
        var.dtype,
        var.dimensions.len(),
        spec.type_name()
    );

    var.transform = Some(TransformState {
        spec: spec_id,
        transform_type: spec.transform_type(),
        original_dtype: var.dtype,
        original_dims: std::mem::take(&mut var.dimensions),
        characteristic: None,
    });
    var.dtype = DataType::Byte;
    var.dimensions = vec![Dimension::new(byte_size)];
    Ok(())
}

/// The size in bytes the variable's data occupies *before* any transform:
/// total elements times element width, computed from the original type and
/// dimensions. Works on both unadapted and adapted variables (the adapted
/// path reads the preserved original shape).
pub fn pre_transform_size(var: &Variable) -> Result<u64> {
    let (dtype, dims) = match var.transform.as_ref() {
        Some(state) => (state.original_dtype, state.original_dims.as_slice()),
        None => (var.dtype, var.dimensions.as_slice()),
    };

    let width = dtype
        .size_of()
        .ok_or_else(|| TransformError::UnsupportedVariable(var.name.clone()))?;
    if dims.is_empty() {
        return Err(TransformError::UnsupportedVariable(var.name.clone()));
    }

    let mut total = width;
    for dim in dims {
        total = total
            .checked_mul(dim.extent)
            .ok_or_else(|| TransformError::DimensionOverflow(var.name.clone()))?;
    }
    Ok(total)
}
