// In: src/spec.rs

//! Transform directive parsing and spec ownership.
//!
//! A directive is the textual configuration string `name[:param[,param]*]`
//! where each `param` is `key=value` or a bare positional token (the writer
//! accepts `"zlib:5"` as shorthand for a level). Parsing produces a
//! [`TransformSpec`] whose name and every key/value are *views* into one
//! owned backing string: a group may declare thousands of transformed
//! variables, and one allocation per directive beats one per parameter.
//!
//! [`SpecStore`] owns spec lifetimes behind `SpecId` handles so variables can
//! attach a spec by reference, copies are wholesale backing-string
//! duplications, and a double free is a loud error instead of silent
//! corruption.

use std::ops::Range;

use crate::error::{Result, TransformError};
use crate::types::TransformType;

//==================================================================================
// 1. TransformSpec
//==================================================================================

/// One key/value view into the backing string. A bare positional parameter
/// has no value.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ParamView {
    key: Range<usize>,
    value: Option<Range<usize>>,
}

/// The parsed, owned representation of a transform directive.
///
/// Cloning duplicates the backing string wholesale; the offset-based views
/// remain valid in the duplicate by construction, so a copy never allocates
/// per parameter and the two specs have fully independent lifetimes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformSpec {
    transform_type: TransformType,
    name: Range<usize>,
    params: Vec<ParamView>,
    backing: Box<str>,
}

impl TransformSpec {
    /// Parses a directive string. An empty directive is a valid no-transform
    /// spec; an unrecognized name yields `TransformType::Unknown` with the
    /// literal name retained (the availability decision is deferred to
    /// execution time). Malformed syntax fails whole: no partial spec.
    pub fn parse(directive: &str) -> Result<Self> {
        let backing: Box<str> = directive.into();
        let fail = |reason: &str| TransformError::Parse {
            directive: directive.to_string(),
            reason: reason.to_string(),
        };

        let (name, params_start) = match directive.find(':') {
            Some(colon) => (0..colon, Some(colon + 1)),
            None => (0..directive.len(), None),
        };
        if name.is_empty() && params_start.is_some() {
            return Err(fail("empty transform name before ':'"));
        }

        let mut params = Vec::new();
        if let Some(start) = params_start {
            if start == directive.len() {
                return Err(fail("dangling ':' with no parameters"));
            }
            let mut pos = start;
            loop {
                let end = directive[pos..]
                    .find(',')
                    .map(|rel| pos + rel)
                    .unwrap_or(directive.len());
                if pos == end {
                    return Err(fail("empty parameter token"));
                }
                let token = &directive[pos..end];
                match token.find('=') {
                    Some(0) => return Err(fail("parameter with empty key")),
                    Some(eq) => params.push(ParamView {
                        key: pos..pos + eq,
                        // An empty value ("k=") is legal; the key is what must exist.
                        value: Some(pos + eq + 1..end),
                    }),
                    None => params.push(ParamView {
                        key: pos..end,
                        value: None,
                    }),
                }
                if end == directive.len() {
                    break;
                }
                pos = end + 1;
            }
        }

        let transform_type = TransformType::from_name(&directive[name.clone()]);
        log::debug!(
            "parsed transform directive {:?}: type {}, {} param(s)",
            directive,
            transform_type,
            params.len()
        );

        Ok(Self {
            transform_type,
            name,
            params,
            backing,
        })
    }

    pub fn transform_type(&self) -> TransformType {
        self.transform_type
    }

    /// The literal transform name from the directive. Valid even when the
    /// enumerated type is `Unknown`.
    pub fn type_name(&self) -> &str {
        &self.backing[self.name.clone()]
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// The i-th parameter in encounter order. Duplicate keys are preserved
    /// as separate entries; last-wins is an execution-time decision.
    pub fn param(&self, index: usize) -> Option<(&str, Option<&str>)> {
        self.params.get(index).map(|p| self.resolve(p))
    }

    /// All parameters in encounter order.
    pub fn params(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.params.iter().map(|p| self.resolve(p))
    }

    /// Last-wins lookup of a keyed parameter's value.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .rev()
            .find(|p| &self.backing[p.key.clone()] == key)
            .and_then(|p| p.value.clone())
            .map(|r| &self.backing[r])
    }

    fn resolve(&self, p: &ParamView) -> (&str, Option<&str>) {
        (
            &self.backing[p.key.clone()],
            p.value.clone().map(|r| &self.backing[r]),
        )
    }
}

//==================================================================================
// 2. SpecStore
//==================================================================================

/// Handle to a spec owned by a [`SpecStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpecId(usize);

impl SpecId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Owns every spec attached to variables of one file context.
///
/// Slots are never reused within a store's lifetime, so a stale handle
/// always surfaces as `SpecFreed` rather than silently resolving to an
/// unrelated spec.
#[derive(Debug, Default)]
pub struct SpecStore {
    slots: Vec<Option<TransformSpec>>,
}

impl SpecStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, spec: TransformSpec) -> SpecId {
        self.slots.push(Some(spec));
        SpecId(self.slots.len() - 1)
    }

    /// Parses a directive and takes ownership of the result.
    pub fn parse_insert(&mut self, directive: &str) -> Result<SpecId> {
        Ok(self.insert(TransformSpec::parse(directive)?))
    }

    pub fn get(&self, id: SpecId) -> Result<&TransformSpec> {
        self.slots
            .get(id.0)
            .and_then(|slot| slot.as_ref())
            .ok_or(TransformError::SpecFreed(id.0))
    }

    /// Deep-duplicates a spec into a fresh slot. The two specs thereafter
    /// have fully independent lifetimes.
    pub fn copy(&mut self, id: SpecId) -> Result<SpecId> {
        let duplicate = self.get(id)?.clone();
        Ok(self.insert(duplicate))
    }

    /// Releases a spec. Freeing the same handle twice is a programmer error
    /// reported loudly as `SpecFreed`, never a silent no-op.
    pub fn free(&mut self, id: SpecId) -> Result<()> {
        match self.slots.get_mut(id.0) {
            Some(slot) if slot.is_some() => {
                *slot = None;
                Ok(())
            }
            _ => Err(TransformError::SpecFreed(id.0)),
        }
    }

    /// Number of live (not yet freed) specs.
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

//==================================================================================
// 3. Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keyed_param() {
        let spec = TransformSpec::parse("zlib:level=5").unwrap();
        assert_eq!(spec.transform_type(), TransformType::Zlib);
        assert_eq!(spec.type_name(), "zlib");
        assert_eq!(spec.param_count(), 1);
        assert_eq!(spec.param(0), Some(("level", Some("5"))));
    }

    #[test]
    fn test_parse_empty_directive_is_none_with_zero_params() {
        let spec = TransformSpec::parse("").unwrap();
        assert_eq!(spec.transform_type(), TransformType::None);
        assert_eq!(spec.type_name(), "");
        assert_eq!(spec.param_count(), 0);
    }

    #[test]
    fn test_parse_preserves_param_order() {
        let spec = TransformSpec::parse("foo:a=1,b=2,c=3").unwrap();
        assert_eq!(spec.transform_type(), TransformType::Unknown);
        assert_eq!(spec.type_name(), "foo");
        let keys: Vec<&str> = spec.params().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_bare_positional_param() {
        // The original writer accepts "zlib:5" as a positional level.
        let spec = TransformSpec::parse("zlib:5").unwrap();
        assert_eq!(spec.param(0), Some(("5", None)));
    }

    #[test]
    fn test_parse_preserves_duplicate_keys() {
        let spec = TransformSpec::parse("zstd:level=1,level=9").unwrap();
        assert_eq!(spec.param_count(), 2);
        // Last-wins only at lookup time; both entries survive parsing.
        assert_eq!(spec.lookup("level"), Some("9"));
    }

    #[test]
    fn test_parse_empty_value_is_legal() {
        let spec = TransformSpec::parse("foo:k=").unwrap();
        assert_eq!(spec.param(0), Some(("k", Some(""))));
    }

    #[test]
    fn test_parse_rejects_malformed_directives() {
        for bad in ["zlib:", ":level=5", "zlib:,a=1", "zlib:a=1,", "zlib:a=1,,b=2", "zlib:=5"] {
            let result = TransformSpec::parse(bad);
            assert!(
                matches!(result, Err(TransformError::Parse { .. })),
                "expected ParseError for {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_copy_is_independent_of_original() {
        let mut store = SpecStore::new();
        let a = store.parse_insert("zstd:level=7,fast").unwrap();
        let b = store.copy(a).unwrap();
        assert_ne!(a, b);

        // Freeing the copy must leave the original fully usable.
        store.free(b).unwrap();
        let original = store.get(a).unwrap();
        assert_eq!(original.type_name(), "zstd");
        assert_eq!(original.lookup("level"), Some("7"));
        assert_eq!(original.param(1), Some(("fast", None)));
    }

    #[test]
    fn test_double_free_fails_loudly() {
        let mut store = SpecStore::new();
        let id = store.parse_insert("identity").unwrap();
        store.free(id).unwrap();
        assert!(matches!(store.free(id), Err(TransformError::SpecFreed(_))));
        assert!(matches!(store.get(id), Err(TransformError::SpecFreed(_))));
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn test_cloned_spec_survives_store_drop() {
        let detached = {
            let mut store = SpecStore::new();
            let id = store.parse_insert("zlib:level=3").unwrap();
            store.get(id).unwrap().clone()
        };
        assert_eq!(detached.lookup("level"), Some("3"));
    }
}
