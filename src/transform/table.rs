use rustc_hash::FxHasher;
use smol_str::SmolStr;
use std::collections::HashMap;
use std::hash::BuildHasherDefault;

use crate::shield::{ShieldedView, is_reserved};
use crate::transform::chain::{Chain, OpCtx};
use crate::value::{FieldName, Value};

type FastMap<K, V> = HashMap<K, V, BuildHasherDefault<FxHasher>>;

/// An operation body. Receives the live receiver view (through [`OpCtx`])
/// plus the caller's arguments, and may produce a return value that the
/// chain threads forward as its last result.
pub type TransformFn = Box<dyn Fn(&mut OpCtx<'_, '_>, &[Value]) -> Option<Value>>;

// ─── TransformTable ─────────────────────────────────────────────────────────

/// Immutable mapping from operation name to operation body, supplied once at
/// setup time. Doubles as the functional binder: [`TransformTable::cow`] and
/// [`TransformTable::mutate`] start chains in the two modes.
pub struct TransformTable {
    ops: FastMap<FieldName, TransformFn>,
    /// Accessor label carried from setup configuration; diagnostics only.
    name: SmolStr,
}

impl TransformTable {
    pub fn new() -> Self {
        Self::named("veraverto")
    }

    pub fn named(name: impl Into<SmolStr>) -> Self {
        TransformTable {
            ops: FastMap::default(),
            name: name.into(),
        }
    }

    /// Register an operation. Reserved field identifiers are refused
    /// silently; they never resolve as operation names.
    pub fn op<F>(mut self, name: &str, body: F) -> Self
    where
        F: Fn(&mut OpCtx<'_, '_>, &[Value]) -> Option<Value> + 'static,
    {
        if is_reserved(name) {
            log::debug!("{}: refusing reserved transform name '{}'", self.name, name);
            return self;
        }
        self.ops.insert(FieldName::new(name), Box::new(body));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ops.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<&TransformFn> {
        self.ops.get(name)
    }

    /// Start a COW chain: the original is borrowed untouched and `finish`
    /// produces a new value patched at the touched paths.
    pub fn cow<'t, 'v>(&'t self, original: &'v Value) -> Chain<'t, 'v> {
        log::trace!("{}: begin cow chain", self.name);
        Chain::owned(self, ShieldedView::cow(original))
    }

    /// Start a mutate chain: every edit applies directly to `target`, and
    /// `finish` returns a handle identity-equal to it.
    pub fn mutate<'t, 'v>(&'t self, target: &'v mut Value) -> Chain<'t, 'v> {
        log::trace!("{}: begin mutate chain", self.name);
        Chain::owned(self, ShieldedView::passthrough(target))
    }
}

impl Default for TransformTable {
    fn default() -> Self {
        Self::new()
    }
}
