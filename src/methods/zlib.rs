//! The zlib (deflate) transform method, a safe wrapper around `flate2`.
//!
//! Deflate wants its own output pass, so this method always encodes into a
//! private scratch buffer and reports `Private` even when shared output was
//! permitted. The executor's copy-afterward path covers it; this is the
//! built-in exercise of the "did not use the shared buffer" half of the
//! protocol.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::{Result, TransformError};
use crate::methods::{requested_level, EncodeOutput, OutputTarget, TransformMethod};
use crate::spec::TransformSpec;
use crate::types::TransformType;

const DEFAULT_LEVEL: u32 = 6;

/// Fixed margin in the deflateBound-style estimate, covering the zlib
/// header/trailer and block framing with room to spare.
const ZLIB_BOUND_MARGIN: u64 = 128;

pub struct Zlib;

fn level(spec: &TransformSpec) -> u32 {
    requested_level(spec)
        .map(|n| n.clamp(0, 9) as u32)
        .unwrap_or(DEFAULT_LEVEL)
}

impl TransformMethod for Zlib {
    fn transform_type(&self) -> TransformType {
        TransformType::Zlib
    }

    fn encode(
        &self,
        spec: &TransformSpec,
        input: &[u8],
        _pre_transform_size: u64,
        _target: OutputTarget<'_>,
    ) -> Result<EncodeOutput> {
        let mut encoder = ZlibEncoder::new(
            Vec::with_capacity(input.len() / 2 + 16),
            Compression::new(level(spec)),
        );
        encoder
            .write_all(input)
            .map_err(|e| TransformError::Encode(format!("zlib: {}", e)))?;
        let compressed = encoder
            .finish()
            .map_err(|e| TransformError::Encode(format!("zlib: {}", e)))?;
        Ok(EncodeOutput::Private(compressed))
    }

    fn worst_case_size(&self, original_size: u64) -> u64 {
        // zlib's generic deflateBound: n + n/4 + n/256 + margin. The
        // stored-block estimate (~0.1%) is not enough here: at low levels
        // the encoder emits fixed-Huffman blocks that expand incompressible
        // input by ~6%. This bound dominates every level 0-9 accepts.
        original_size
            .saturating_add(original_size / 4)
            .saturating_add(original_size / 256)
            .saturating_add(ZLIB_BOUND_MARGIN)
    }

    fn characteristic_metadata(&self, spec: &TransformSpec) -> Vec<u8> {
        vec![level(spec) as u8]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    #[test]
    fn test_zlib_always_reports_private_output() {
        let spec = TransformSpec::parse("zlib:level=5").unwrap();
        let input = vec![7u8; 4096];
        let mut buffer = crate::buffer::WriteBuffer::new();

        let out = Zlib
            .encode(&spec, &input, 4096, OutputTarget::Shared(&mut buffer))
            .unwrap();

        // Scratch-pass method: shared permission granted but unused.
        let EncodeOutput::Private(compressed) = out else {
            panic!("zlib must report private output");
        };
        assert!(buffer.is_empty());
        assert!(compressed.len() < input.len());

        let mut decoded = Vec::new();
        ZlibDecoder::new(compressed.as_slice())
            .read_to_end(&mut decoded)
            .unwrap();
        assert_eq!(decoded, input);
    }

    #[test]
    fn test_zlib_level_selection() {
        let positional = TransformSpec::parse("zlib:9").unwrap();
        assert_eq!(level(&positional), 9);
        let default = TransformSpec::parse("zlib").unwrap();
        assert_eq!(level(&default), DEFAULT_LEVEL);
        let clamped = TransformSpec::parse("zlib:level=42").unwrap();
        assert_eq!(level(&clamped), 9);
    }

    #[test]
    fn test_zlib_metadata_records_level() {
        let spec = TransformSpec::parse("zlib:level=5").unwrap();
        assert_eq!(Zlib.characteristic_metadata(&spec), vec![5u8]);
    }

    #[test]
    fn test_zlib_worst_case_covers_fixed_huffman_expansion() {
        use rand::{RngCore, SeedableRng};

        // Low levels expand incompressible input by ~6% via fixed-Huffman
        // blocks; the declared bound must dominate the actual output.
        let mut rng = rand::rngs::StdRng::seed_from_u64(0xD1CE);
        for level in [0, 1, 6, 9] {
            let spec = TransformSpec::parse(&format!("zlib:level={}", level)).unwrap();
            for size in [512usize, 4096, 65_536] {
                let mut input = vec![0u8; size];
                rng.fill_bytes(&mut input);
                let out = Zlib
                    .encode(&spec, &input, size as u64, OutputTarget::Private)
                    .unwrap();
                let EncodeOutput::Private(compressed) = out else {
                    panic!("expected private output");
                };
                let bound = Zlib.worst_case_size(size as u64);
                assert!(
                    compressed.len() as u64 <= bound,
                    "level {} on {} random bytes produced {} > bound {}",
                    level,
                    size,
                    compressed.len(),
                    bound
                );
            }
        }

        // The bound must also dominate the ~6% expansion outright.
        for n in [0u64, 1, 4096, 1 << 30] {
            assert!(Zlib.worst_case_size(n) >= n + n / 16 + 64);
        }
        // And saturate instead of wrapping at the extreme.
        assert_eq!(Zlib.worst_case_size(u64::MAX), u64::MAX);
    }
}
