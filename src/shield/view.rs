use std::rc::Rc;

use crate::shield::change::{Change, ChangeLog, is_reserved};
use crate::shield::direct;
use crate::value::{FieldName, RecordMap, Value};

// ─── ShieldedView ───────────────────────────────────────────────────────────

/// Read/write facade over a value that either records edits in a change log
/// (COW) or applies them straight to the target (pass-through). One protocol,
/// four effect profiles; dispatch code never matches on the kind.
///
/// A view lives for exactly one chain: created at chain start (or on first
/// access of a nested field), discarded after materialization. Nested views
/// are owned by the parent change entry that created them, so ownership is
/// strictly tree-shaped.
pub enum ShieldedView<'a> {
    /// Lazy COW view over a record. Untouched fields are shielded on first
    /// access and cached as `Read` changes.
    Record(RecordView<'a>),
    /// Eager COW view over a sequence: every element is shielded up front.
    /// There is no index-level write/delete tracking; sequences materialize
    /// by full reconstruction. Deliberate scope limit, not an oversight.
    Seq(SeqView<'a>),
    /// Identity view over an owned primitive. Record and sequence operations
    /// on it are absent/no-ops.
    Literal(Value),
    /// Pass-through over the caller's value: reads return sub-values
    /// directly, writes and deletes mutate the target in place. Mutate-mode
    /// chains are this view plus the unchanged dispatch path.
    Direct(&'a mut Value),
}

impl<'a> ShieldedView<'a> {
    /// Shield a borrowed original for a COW chain. The original is never
    /// written through this view.
    pub fn cow(original: &'a Value) -> Self {
        match original {
            Value::Record(map) => ShieldedView::Record(RecordView {
                source: MapSource::Borrowed(map),
                changes: ChangeLog::default(),
            }),
            Value::Seq(items) => ShieldedView::Seq(SeqView {
                slots: items.iter().map(Self::cow).collect(),
            }),
            primitive => ShieldedView::Literal(primitive.clone()),
        }
    }

    /// Wrap an owned value without re-shielding it against any original.
    /// Used for written literals: reading one back yields the value itself,
    /// and nested access edits the value, not a tracked copy.
    pub fn adopt(value: Value) -> Self {
        match value {
            Value::Record(map) => ShieldedView::Record(RecordView {
                source: MapSource::Shared(map),
                changes: ChangeLog::default(),
            }),
            Value::Seq(items) => {
                let items = Rc::try_unwrap(items).unwrap_or_else(|rc| (*rc).clone());
                ShieldedView::Seq(SeqView {
                    slots: items.into_iter().map(Self::adopt).collect(),
                })
            }
            primitive => ShieldedView::Literal(primitive),
        }
    }

    /// Pass-through view for a mutate-mode chain.
    pub fn passthrough(target: &'a mut Value) -> Self {
        ShieldedView::Direct(target)
    }

    // ─── Record protocol ────────────────────────────────────────────────────

    pub fn get(&mut self, name: &str) -> Option<Value> {
        match self {
            ShieldedView::Record(view) => view.get(name),
            ShieldedView::Seq(_) => None,
            ShieldedView::Literal(value) => direct::get(value, name),
            ShieldedView::Direct(target) => direct::get(target, name),
        }
    }

    pub fn set(&mut self, name: &str, value: Value) {
        match self {
            ShieldedView::Record(view) => view.set(name, value),
            ShieldedView::Seq(_) => {}
            ShieldedView::Literal(owned) => direct::set(owned, name, value),
            ShieldedView::Direct(target) => direct::set(target, name, value),
        }
    }

    pub fn delete(&mut self, name: &str) {
        match self {
            ShieldedView::Record(view) => view.delete(name),
            ShieldedView::Seq(_) => {}
            ShieldedView::Literal(owned) => direct::delete(owned, name),
            ShieldedView::Direct(target) => direct::delete(target, name),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        match self {
            ShieldedView::Record(view) => view.has(name),
            ShieldedView::Seq(_) => false,
            ShieldedView::Literal(value) => direct::has(value, name),
            ShieldedView::Direct(target) => direct::has(target, name),
        }
    }

    pub fn keys(&self) -> Vec<FieldName> {
        match self {
            ShieldedView::Record(view) => view.keys(),
            ShieldedView::Seq(_) => Vec::new(),
            ShieldedView::Literal(value) => direct::keys(value),
            ShieldedView::Direct(target) => direct::keys(target),
        }
    }

    /// Navigate into a field for nested reads and writes. Creates and caches
    /// the `Read` change for an untouched container field; returns `None`
    /// for absent, deleted, or reserved fields.
    pub fn field(&mut self, name: &str) -> Option<FieldSlot<'_, 'a>> {
        match self {
            ShieldedView::Record(view) => view.field(name),
            ShieldedView::Seq(_) => None,
            ShieldedView::Literal(owned) => direct::sub_mut(owned, name).map(FieldSlot::Raw),
            ShieldedView::Direct(target) => direct::sub_mut(target, name).map(FieldSlot::Raw),
        }
    }

    // ─── Sequence protocol ──────────────────────────────────────────────────

    pub fn len(&self) -> Option<usize> {
        match self {
            ShieldedView::Seq(view) => Some(view.len()),
            ShieldedView::Record(_) => None,
            ShieldedView::Literal(value) => direct::len(value),
            ShieldedView::Direct(target) => direct::len(target),
        }
    }

    pub fn get_at(&self, index: usize) -> Option<Value> {
        match self {
            ShieldedView::Seq(view) => view.get_at(index),
            ShieldedView::Record(_) => None,
            ShieldedView::Literal(value) => direct::get_at(value, index),
            ShieldedView::Direct(target) => direct::get_at(target, index),
        }
    }

    pub fn set_at(&mut self, index: usize, value: Value) {
        match self {
            ShieldedView::Seq(view) => view.set_at(index, value),
            ShieldedView::Record(_) => {}
            ShieldedView::Literal(owned) => direct::set_at(owned, index, value),
            ShieldedView::Direct(target) => direct::set_at(target, index, value),
        }
    }

    pub fn field_at(&mut self, index: usize) -> Option<FieldSlot<'_, 'a>> {
        match self {
            ShieldedView::Seq(view) => view.field_at(index),
            ShieldedView::Record(_) => None,
            ShieldedView::Literal(owned) => direct::sub_mut_at(owned, index).map(FieldSlot::Raw),
            ShieldedView::Direct(target) => direct::sub_mut_at(target, index).map(FieldSlot::Raw),
        }
    }

    // ─── Materialization ────────────────────────────────────────────────────

    /// Materialize without consuming the view. Mid-chain reads of container
    /// fields resolve through this.
    pub fn snapshot(&self) -> Value {
        match self {
            ShieldedView::Record(view) => view.snapshot(),
            ShieldedView::Seq(view) => view.snapshot(),
            ShieldedView::Literal(value) => value.clone(),
            ShieldedView::Direct(target) => (**target).clone(),
        }
    }

    /// Materialize the final chain output. COW views produce a shallow
    /// duplicate patched at the touched paths; pass-through views return
    /// their target as-is (it already holds every edit).
    pub fn into_value(self) -> Value {
        match self {
            ShieldedView::Record(view) => view.into_value(),
            ShieldedView::Seq(view) => view.into_value(),
            ShieldedView::Literal(value) => value,
            ShieldedView::Direct(target) => target.clone(),
        }
    }
}

// ─── RecordView (lazy COW) ──────────────────────────────────────────────────

enum MapSource<'a> {
    /// Chain root or nested field of a borrowed original.
    Borrowed(&'a RecordMap),
    /// Adopted from an owned value (a written literal).
    Shared(Rc<RecordMap>),
}

pub struct RecordView<'a> {
    source: MapSource<'a>,
    changes: ChangeLog<'a>,
}

impl<'a> RecordView<'a> {
    fn source_map(&self) -> &RecordMap {
        match &self.source {
            MapSource::Borrowed(map) => map,
            MapSource::Shared(rc) => rc,
        }
    }

    /// Shield the original's value for `name`, if present. Borrowed sources
    /// produce borrowed child shields; shared sources clone the sub-value out
    /// (an `Rc` bump for containers) and adopt it.
    fn shield_original(&self, name: &str) -> Option<ShieldedView<'a>> {
        match &self.source {
            MapSource::Borrowed(map) => map.get(name).map(ShieldedView::cow),
            MapSource::Shared(rc) => rc.get(name).cloned().map(ShieldedView::adopt),
        }
    }

    pub fn get(&mut self, name: &str) -> Option<Value> {
        if is_reserved(name) {
            return None;
        }
        if let Some(change) = self.changes.get(name) {
            return match change {
                Change::Read(view) | Change::Write(view) => Some(view.snapshot()),
                Change::Delete => None,
            };
        }
        let view = self.shield_original(name)?;
        let value = view.snapshot();
        self.changes
            .insert(FieldName::new(name), Change::Read(Box::new(view)));
        Some(value)
    }

    pub fn set(&mut self, name: &str, value: Value) {
        if is_reserved(name) {
            return;
        }
        self.changes.insert(
            FieldName::new(name),
            Change::Write(Box::new(ShieldedView::adopt(value))),
        );
    }

    pub fn delete(&mut self, name: &str) {
        if is_reserved(name) {
            return;
        }
        self.changes.insert(FieldName::new(name), Change::Delete);
    }

    pub fn has(&self, name: &str) -> bool {
        if is_reserved(name) {
            return false;
        }
        match self.changes.get(name) {
            Some(Change::Read(_)) | Some(Change::Write(_)) => true,
            Some(Change::Delete) => false,
            None => self.source_map().contains_key(name),
        }
    }

    /// Original key order first (minus deletes), then keys introduced by
    /// writes in the order each was first set.
    pub fn keys(&self) -> Vec<FieldName> {
        let source = self.source_map();
        let mut out: Vec<FieldName> = source
            .keys()
            .filter(|k| {
                !is_reserved(k) && !matches!(self.changes.get(k.as_str()), Some(Change::Delete))
            })
            .cloned()
            .collect();
        for (name, change) in &self.changes {
            if matches!(change, Change::Write(_)) && !source.contains_key(name) {
                out.push(name.clone());
            }
        }
        out
    }

    pub fn field(&mut self, name: &str) -> Option<FieldSlot<'_, 'a>> {
        if is_reserved(name) {
            return None;
        }
        if !self.changes.contains_key(name) {
            let view = self.shield_original(name)?;
            self.changes
                .insert(FieldName::new(name), Change::Read(Box::new(view)));
        }
        match self.changes.get_mut(name)? {
            Change::Read(view) | Change::Write(view) => Some(FieldSlot::View(view)),
            Change::Delete => None,
        }
    }

    pub fn snapshot(&self) -> Value {
        if self.changes.is_empty() {
            // An unedited adopted literal reads back as the same allocation.
            if let MapSource::Shared(rc) = &self.source {
                return Value::Record(Rc::clone(rc));
            }
        }
        let mut map = self.source_map().clone();
        for (name, change) in &self.changes {
            match change {
                Change::Read(view) | Change::Write(view) => {
                    map.insert(name.clone(), view.snapshot());
                }
                Change::Delete => {
                    map.shift_remove(name.as_str());
                }
            }
        }
        Value::Record(Rc::new(map))
    }

    /// Shallow duplicate + patch. Entry clones are `Rc` bumps, so every
    /// untouched subtree of the result shares its allocation with the
    /// original. This is the central performance property of the design.
    pub fn into_value(self) -> Value {
        if self.changes.is_empty() {
            return match self.source {
                MapSource::Borrowed(map) => Value::Record(Rc::new(map.clone())),
                MapSource::Shared(rc) => Value::Record(rc),
            };
        }
        let mut map = match self.source {
            MapSource::Borrowed(map) => map.clone(),
            MapSource::Shared(rc) => Rc::try_unwrap(rc).unwrap_or_else(|rc| (*rc).clone()),
        };
        for (name, change) in self.changes {
            match change {
                Change::Read(view) | Change::Write(view) => {
                    map.insert(name, view.into_value());
                }
                Change::Delete => {
                    map.shift_remove(name.as_str());
                }
            }
        }
        Value::Record(Rc::new(map))
    }
}

// ─── SeqView (eager COW) ────────────────────────────────────────────────────

pub struct SeqView<'a> {
    slots: Vec<ShieldedView<'a>>,
}

impl<'a> SeqView<'a> {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get_at(&self, index: usize) -> Option<Value> {
        self.slots.get(index).map(ShieldedView::snapshot)
    }

    /// Replaces the slot with the literal value; out-of-range writes extend,
    /// padding with `Null`.
    pub fn set_at(&mut self, index: usize, value: Value) {
        if index < self.slots.len() {
            self.slots[index] = ShieldedView::adopt(value);
        } else {
            while self.slots.len() < index {
                self.slots.push(ShieldedView::Literal(Value::Null));
            }
            self.slots.push(ShieldedView::adopt(value));
        }
    }

    pub fn field_at(&mut self, index: usize) -> Option<FieldSlot<'_, 'a>> {
        self.slots.get_mut(index).map(FieldSlot::View)
    }

    pub fn snapshot(&self) -> Value {
        Value::seq(self.slots.iter().map(ShieldedView::snapshot).collect())
    }

    /// Full reconstruction, all elements were eagerly shielded anyway.
    pub fn into_value(self) -> Value {
        Value::seq(self.slots.into_iter().map(ShieldedView::into_value).collect())
    }
}

// ─── FieldSlot ──────────────────────────────────────────────────────────────

/// Handle produced by navigation. Either a borrow of the nested view cached
/// in a change log or a raw borrow into a pass-through target; carries the
/// same protocol either way, so operation bodies never care which.
pub enum FieldSlot<'s, 'a> {
    View(&'s mut ShieldedView<'a>),
    Raw(&'s mut Value),
}

impl<'s, 'a> FieldSlot<'s, 'a> {
    pub fn get(&mut self, name: &str) -> Option<Value> {
        match self {
            FieldSlot::View(view) => view.get(name),
            FieldSlot::Raw(target) => direct::get(target, name),
        }
    }

    pub fn set(&mut self, name: &str, value: Value) {
        match self {
            FieldSlot::View(view) => view.set(name, value),
            FieldSlot::Raw(target) => direct::set(target, name, value),
        }
    }

    pub fn delete(&mut self, name: &str) {
        match self {
            FieldSlot::View(view) => view.delete(name),
            FieldSlot::Raw(target) => direct::delete(target, name),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        match self {
            FieldSlot::View(view) => view.has(name),
            FieldSlot::Raw(target) => direct::has(target, name),
        }
    }

    pub fn keys(&self) -> Vec<FieldName> {
        match self {
            FieldSlot::View(view) => view.keys(),
            FieldSlot::Raw(target) => direct::keys(target),
        }
    }

    pub fn len(&self) -> Option<usize> {
        match self {
            FieldSlot::View(view) => view.len(),
            FieldSlot::Raw(target) => direct::len(target),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len().is_none_or(|n| n == 0)
    }

    pub fn get_at(&self, index: usize) -> Option<Value> {
        match self {
            FieldSlot::View(view) => view.get_at(index),
            FieldSlot::Raw(target) => direct::get_at(target, index),
        }
    }

    pub fn set_at(&mut self, index: usize, value: Value) {
        match self {
            FieldSlot::View(view) => view.set_at(index, value),
            FieldSlot::Raw(target) => direct::set_at(target, index, value),
        }
    }

    pub fn field(&mut self, name: &str) -> Option<FieldSlot<'_, 'a>> {
        match self {
            FieldSlot::View(view) => view.field(name),
            FieldSlot::Raw(target) => direct::sub_mut(target, name).map(FieldSlot::Raw),
        }
    }

    pub fn field_at(&mut self, index: usize) -> Option<FieldSlot<'_, 'a>> {
        match self {
            FieldSlot::View(view) => view.field_at(index),
            FieldSlot::Raw(target) => direct::sub_mut_at(target, index).map(FieldSlot::Raw),
        }
    }

    pub fn snapshot(&self) -> Value {
        match self {
            FieldSlot::View(view) => view.snapshot(),
            FieldSlot::Raw(target) => (**target).clone(),
        }
    }
}
