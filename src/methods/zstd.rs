//! The Zstandard transform method, a safe, panic-free wrapper around the
//! `zstd` crate.
//!
//! Zstd streams, so when shared output is permitted the encoder writes
//! straight into the shared write buffer with no intermediate copy. The
//! private path uses `encode_all` into a fresh vector.

use std::io::Write;

use crate::error::{Result, TransformError};
use crate::methods::{requested_level, EncodeOutput, OutputTarget, TransformMethod};
use crate::spec::TransformSpec;
use crate::types::TransformType;

const DEFAULT_LEVEL: i32 = 3;

pub struct Zstd;

fn level(spec: &TransformSpec) -> i32 {
    requested_level(spec)
        .map(|n| n.clamp(1, 22) as i32)
        .unwrap_or(DEFAULT_LEVEL)
}

impl TransformMethod for Zstd {
    fn transform_type(&self) -> TransformType {
        TransformType::Zstd
    }

    fn encode(
        &self,
        spec: &TransformSpec,
        input: &[u8],
        _pre_transform_size: u64,
        target: OutputTarget<'_>,
    ) -> Result<EncodeOutput> {
        let map_err = |e: std::io::Error| TransformError::Encode(format!("zstd: {}", e));
        match target {
            OutputTarget::Shared(buffer) => {
                let start = buffer.offset();
                let mut encoder =
                    zstd::stream::Encoder::new(&mut *buffer, level(spec)).map_err(map_err)?;
                encoder.write_all(input).map_err(map_err)?;
                // `finish` is essential to finalize the zstd frame.
                encoder.finish().map_err(map_err)?;
                Ok(EncodeOutput::Shared {
                    start,
                    len: buffer.offset() - start,
                })
            }
            OutputTarget::Private => {
                let compressed = zstd::stream::encode_all(input, level(spec)).map_err(map_err)?;
                Ok(EncodeOutput::Private(compressed))
            }
        }
    }

    fn worst_case_size(&self, original_size: u64) -> u64 {
        zstd::zstd_safe::compress_bound(original_size as usize) as u64
    }

    fn characteristic_metadata(&self, spec: &TransformSpec) -> Vec<u8> {
        level(spec).to_le_bytes().to_vec()
    }
}
