// In: src/executor.rs

//! Transform execution against a variable's data.
//!
//! This is the write-path step that turns a variable's raw bytes into their
//! on-disk transformed form. The shared-buffer protocol runs through here:
//! the caller states whether direct shared-buffer output is permitted
//! (`OutputMode`), the method reports where its output actually landed, and
//! the returned [`ApplyOutcome`] is the type-checked ownership answer the
//! writer needs to decide who frees what. A method claiming shared output
//! while it was disallowed is a programming error, not a data error, and is
//! rejected as `ContractViolation`.
//!
//! A failure after a method has started appending to the shared buffer
//! leaves the buffer's logical offset unspecified; the caller must abort
//! the whole write transaction (there is no rollback here).

use crate::buffer::WriteBuffer;
use crate::characteristic::TransformCharacteristic;
use crate::context::FileContext;
use crate::error::{Result, TransformError};
use crate::methods::{EncodeOutput, MethodRegistry, OutputTarget};
use crate::spec::SpecStore;
use crate::types::TransformType;
use crate::variable::{pre_transform_size, VarPayload, Variable};

/// Whether the transform may write directly into the shared buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    SharedAllowed,
    PrivateOnly,
}

/// Where the transformed bytes ended up, i.e. who owns them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The variable carries no transform (or the "none" type); its data was
    /// left untouched.
    NoTransform,
    /// The output lives in a fresh buffer owned by the variable; the writer
    /// frees it with the variable.
    PrivateBuffer,
    /// The output was appended to the shared buffer, which the write
    /// transaction owns.
    SharedBuffer,
}

/// Applies the transform attached to the group variable at `var_index`.
pub fn apply(
    fd: &mut FileContext,
    registry: &MethodRegistry,
    var_index: usize,
    mode: OutputMode,
) -> Result<ApplyOutcome> {
    let FileContext {
        buffer,
        specs,
        group,
        ..
    } = fd;
    let var = group.get_mut(var_index).ok_or_else(|| {
        TransformError::ContractViolation(format!("variable index {} out of range", var_index))
    })?;
    apply_to(buffer, specs, registry, var, mode)
}

/// Applies a variable's transform against an explicit buffer and spec store.
pub fn apply_to(
    buffer: &mut WriteBuffer,
    specs: &SpecStore,
    registry: &MethodRegistry,
    var: &mut Variable,
    mode: OutputMode,
) -> Result<ApplyOutcome> {
    let Some(state) = var.transform.as_ref() else {
        return Ok(ApplyOutcome::NoTransform);
    };
    let spec_id = state.spec;
    let transform_type = state.transform_type;
    if transform_type == TransformType::None {
        return Ok(ApplyOutcome::NoTransform);
    }

    let spec = specs.get(spec_id)?;
    debug_assert_eq!(spec.transform_type(), transform_type);

    // Parse time tolerates unknown transforms; execution time does not.
    let method = registry.get(transform_type).ok_or_else(|| {
        TransformError::TransformDispatch {
            var: var.name.clone(),
            transform: spec.type_name().to_string(),
            reason: "no method registered for this transform type".to_string(),
        }
    })?;

    let pre_size = pre_transform_size(var)?;
    let input: &[u8] = match &var.payload {
        VarPayload::Owned(bytes) => bytes,
        VarPayload::Empty => {
            return Err(TransformError::TransformDispatch {
                var: var.name.clone(),
                transform: spec.type_name().to_string(),
                reason: "variable has no data to transform".to_string(),
            })
        }
        VarPayload::InSharedBuffer { .. } => {
            return Err(TransformError::ContractViolation(format!(
                "variable '{}' data already lives in the shared buffer",
                var.name
            )))
        }
    };

    log::debug!(
        "applying transform '{}' to variable '{}' ({} bytes pre-transform, mode {:?})",
        spec.type_name(),
        var.name,
        pre_size,
        mode
    );

    let target = match mode {
        OutputMode::SharedAllowed => OutputTarget::Shared(buffer),
        OutputMode::PrivateOnly => OutputTarget::Private,
    };
    let output = method
        .encode(spec, input, pre_size, target)
        .map_err(|e| match e {
            TransformError::Encode(reason) => TransformError::TransformDispatch {
                var: var.name.clone(),
                transform: spec.type_name().to_string(),
                reason,
            },
            other => other,
        })?;

    let outcome = match output {
        EncodeOutput::Shared { start, len } => {
            if mode == OutputMode::PrivateOnly {
                log::warn!(
                    "transform '{}' claimed shared-buffer output for variable '{}' while it was disallowed",
                    spec.type_name(),
                    var.name
                );
                return Err(TransformError::ContractViolation(format!(
                    "transform '{}' reported shared-buffer output while it was disallowed",
                    spec.type_name()
                )));
            }
            var.payload = VarPayload::InSharedBuffer { offset: start, len };
            ApplyOutcome::SharedBuffer
        }
        EncodeOutput::Private(bytes) => {
            var.payload = VarPayload::Owned(bytes);
            ApplyOutcome::PrivateBuffer
        }
    };

    let metadata = method.characteristic_metadata(spec);
    if let Some(state) = var.transform.as_mut() {
        state.characteristic = Some(TransformCharacteristic {
            transform_type,
            pre_transform_size: pre_size,
            metadata,
        });
    }
    Ok(outcome)
}
