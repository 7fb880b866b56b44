// In: src/capacity.rs

//! Worst-case output size estimation.
//!
//! Buffers are pre-sized before any transform runs, so the estimates here
//! must never undercount: an undercount becomes a downstream buffer
//! overflow, an overcount only wastes slack. Per-variable bounds come from
//! the registered method; unknown transform types get a deliberately
//! generous fixed-plus-proportional margin.

use crate::context::FileContext;
use crate::error::Result;
use crate::methods::MethodRegistry;
use crate::spec::TransformSpec;
use crate::types::TransformType;
use crate::variable::pre_transform_size;

/// Fixed slack granted to transform types with no registered method. The
/// proportional half covers encoders with per-block expansion on
/// incompressible input, this constant covers stream headers. Generous by
/// intent; an unknown encoder must still fit.
pub const UNKNOWN_TRANSFORM_MARGIN: u64 = 4096;

/// A conservative upper bound on the transformed size of `original_size`
/// bytes under `spec`. Never less than `original_size`.
pub fn worst_case_size(
    registry: &MethodRegistry,
    spec: &TransformSpec,
    original_size: u64,
) -> u64 {
    match spec.transform_type() {
        TransformType::None => original_size,
        transform_type => match registry.get(transform_type) {
            Some(method) => method.worst_case_size(original_size).max(original_size),
            None => original_size
                .saturating_add(original_size / 2)
                .saturating_add(UNKNOWN_TRANSFORM_MARGIN),
        },
    }
}

/// The worst-case total size of the active group: `base_group_size` plus
/// the extra slack each transformed variable may need beyond its original
/// size. Variables with no transform contribute exactly zero slack.
pub fn worst_case_group_size(
    base_group_size: u64,
    fd: &FileContext,
    registry: &MethodRegistry,
) -> Result<u64> {
    let mut slack: u64 = 0;
    for var in fd.group.iter() {
        let Some(state) = var.transform.as_ref() else {
            continue;
        };
        if state.transform_type == TransformType::None {
            continue;
        }
        let spec = fd.specs.get(state.spec)?;
        let original = pre_transform_size(var)?;
        slack = slack.saturating_add(worst_case_size(registry, spec, original) - original);
    }
    // Saturate rather than wrap; an overcounted bound is still sound.
    Ok(base_group_size.saturating_add(slack))
}
