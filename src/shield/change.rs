use indexmap::IndexMap;
use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;

use crate::shield::view::ShieldedView;
use crate::value::FieldName;

// ─── Reserved fields ────────────────────────────────────────────────────────

/// Field identifiers that collide with host introspection machinery
/// (pretty-print representation and the construction hook). They are never
/// readable or writable through a shield and never resolve as transform
/// names; access yields "absent" instead of an error so generic inspection
/// utilities degrade gracefully.
pub const RESERVED_FIELDS: &[&str] = &["inspect", "constructor"];

pub fn is_reserved(name: &str) -> bool {
    RESERVED_FIELDS.contains(&name)
}

// ─── Change ─────────────────────────────────────────────────────────────────

/// One pending field-level edit. A shielded record holds at most one change
/// per field; a later operation on the same field replaces the earlier
/// change entirely (no history, no merge).
pub enum Change<'a> {
    /// Field was read. If its value was a container, the nested shield
    /// created for it is cached here so repeated access observes prior
    /// nested edits.
    Read(Box<ShieldedView<'a>>),
    /// Field was explicitly set. The assigned value is adopted into an owned
    /// view, not re-shielded against any original, so reading it back
    /// yields the literal value and nested access edits the literal itself.
    Write(Box<ShieldedView<'a>>),
    /// Field was explicitly removed.
    Delete,
}

/// Pending edits of one shielded record, keyed by field identifier.
///
/// Insertion-ordered: `keys()` reports appended writes in the order each
/// field was first set, and `IndexMap` keeps the first-insertion position
/// when a change is replaced.
pub type ChangeLog<'a> = IndexMap<FieldName, Change<'a>, BuildHasherDefault<FxHasher>>;
