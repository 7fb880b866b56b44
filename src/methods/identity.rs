//! The identity (pass-through) transform: output bytes equal input bytes.
//!
//! Useful for exercising the transform plumbing without changing the data,
//! and as the writer's escape hatch when a configured transform must be
//! disabled without changing the file's characteristic structure.

use crate::error::Result;
use crate::methods::{EncodeOutput, OutputTarget, TransformMethod};
use crate::spec::TransformSpec;
use crate::types::TransformType;

pub struct Identity;

impl TransformMethod for Identity {
    fn transform_type(&self) -> TransformType {
        TransformType::Identity
    }

    fn encode(
        &self,
        _spec: &TransformSpec,
        input: &[u8],
        _pre_transform_size: u64,
        target: OutputTarget<'_>,
    ) -> Result<EncodeOutput> {
        match target {
            OutputTarget::Shared(buffer) => {
                let start = buffer.append(input)?;
                Ok(EncodeOutput::Shared {
                    start,
                    len: input.len() as u64,
                })
            }
            OutputTarget::Private => Ok(EncodeOutput::Private(input.to_vec())),
        }
    }

    fn worst_case_size(&self, original_size: u64) -> u64 {
        original_size
    }
}
