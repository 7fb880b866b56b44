// In: src/methods/mod.rs

//! Transform algorithm dispatch.
//!
//! Every transform algorithm the writer can invoke implements
//! [`TransformMethod`], and a [`MethodRegistry`] maps the enumerated
//! transform type to its implementation. The registry is the execution-time
//! availability check: a spec may legally carry `TransformType::Unknown`
//! from parse time, but dispatching it here fails.
//!
//! The encode contract carries the shared-buffer protocol: a method handed
//! `OutputTarget::Shared` is permitted, not obligated, to append its output
//! directly to the shared write buffer. A method that needs a private
//! scratch pass (zlib does) returns `EncodeOutput::Private` and the caller
//! copies; the contract only guarantees the reported target is truthful.

mod identity;
mod zlib;
mod zstd;

pub use identity::Identity;
pub use zlib::Zlib;
pub use zstd::Zstd;

use std::collections::HashMap;

use crate::buffer::WriteBuffer;
use crate::error::Result;
use crate::spec::TransformSpec;
use crate::types::TransformType;

/// Where a method's output may land.
pub enum OutputTarget<'a> {
    /// The method may append directly to the shared write buffer.
    Shared(&'a mut WriteBuffer),
    /// The method must return a privately allocated output buffer.
    Private,
}

/// Where a method's output actually landed.
#[derive(Debug, PartialEq, Eq)]
pub enum EncodeOutput {
    /// Bytes were appended to the shared buffer at `start`.
    Shared { start: u64, len: u64 },
    /// The method allocated its own output; the caller takes ownership.
    Private(Vec<u8>),
}

/// One transform algorithm, as seen by the management layer.
pub trait TransformMethod: Send + Sync {
    fn transform_type(&self) -> TransformType;

    /// Encodes `input` (whose untransformed size is `pre_transform_size`)
    /// into the given target. On failure when writing shared, the buffer's
    /// offset is unspecified and the transaction must be aborted.
    fn encode(
        &self,
        spec: &TransformSpec,
        input: &[u8],
        pre_transform_size: u64,
        target: OutputTarget<'_>,
    ) -> Result<EncodeOutput>;

    /// A conservative upper bound on the encoded size of `original_size`
    /// input bytes. Must never undercount.
    fn worst_case_size(&self, original_size: u64) -> u64;

    /// The transform-defined characteristic metadata payload for this spec.
    /// The framing (length prefix) is the codec's business, not the method's.
    fn characteristic_metadata(&self, _spec: &TransformSpec) -> Vec<u8> {
        Vec::new()
    }
}

/// Maps transform types to their implementations for one writer instance.
pub struct MethodRegistry {
    methods: HashMap<TransformType, Box<dyn TransformMethod>>,
}

impl MethodRegistry {
    /// A registry with no methods at all. Mostly useful in tests.
    pub fn empty() -> Self {
        Self {
            methods: HashMap::new(),
        }
    }

    /// The registry with all built-in methods.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(Identity));
        registry.register(Box::new(Zlib));
        registry.register(Box::new(Zstd));
        registry
    }

    /// Registers a method, replacing any previous one for the same type.
    pub fn register(&mut self, method: Box<dyn TransformMethod>) {
        self.methods.insert(method.transform_type(), method);
    }

    pub fn get(&self, transform_type: TransformType) -> Option<&dyn TransformMethod> {
        self.methods.get(&transform_type).map(|m| m.as_ref())
    }
}

impl Default for MethodRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Last-wins level extraction shared by the compressor methods: either a
/// keyed `level=N` parameter or a bare positional number (`"zlib:5"`).
pub(crate) fn requested_level(spec: &TransformSpec) -> Option<i64> {
    let mut level = None;
    for (key, value) in spec.params() {
        match value {
            Some(v) if key == "level" => {
                if let Ok(n) = v.parse() {
                    level = Some(n);
                }
            }
            None => {
                if let Ok(n) = key.parse() {
                    level = Some(n);
                }
            }
            _ => {}
        }
    }
    level
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_contents() {
        let registry = MethodRegistry::with_builtins();
        for t in [
            TransformType::Identity,
            TransformType::Zlib,
            TransformType::Zstd,
        ] {
            assert!(registry.get(t).is_some(), "missing builtin for {}", t);
        }
        assert!(registry.get(TransformType::Unknown).is_none());
        assert!(registry.get(TransformType::None).is_none());
    }

    #[test]
    fn test_requested_level_keyed_and_positional() {
        let keyed = TransformSpec::parse("zstd:level=19").unwrap();
        assert_eq!(requested_level(&keyed), Some(19));

        let positional = TransformSpec::parse("zlib:5").unwrap();
        assert_eq!(requested_level(&positional), Some(5));

        let last_wins = TransformSpec::parse("zstd:level=1,level=9").unwrap();
        assert_eq!(requested_level(&last_wins), Some(9));

        let absent = TransformSpec::parse("identity").unwrap();
        assert_eq!(requested_level(&absent), None);
    }
}
