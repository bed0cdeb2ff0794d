use std::mem;

use crate::error::TransformError;
use crate::shield::{FieldSlot, ShieldedView};
use crate::transform::table::TransformTable;
use crate::value::{FieldName, Value};

// ─── OpCtx ──────────────────────────────────────────────────────────────────

/// The implicit receiver handed to an operation body: the chain's live view
/// plus the table, so a body can read and write fields (including nested
/// ones) and recursively start chains of its own.
pub struct OpCtx<'c, 'a> {
    view: &'c mut ShieldedView<'a>,
    table: &'c TransformTable,
}

impl<'c, 'a> OpCtx<'c, 'a> {
    pub fn get(&mut self, name: &str) -> Option<Value> {
        self.view.get(name)
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.view.set(name, value.into());
    }

    pub fn delete(&mut self, name: &str) {
        self.view.delete(name);
    }

    pub fn has(&self, name: &str) -> bool {
        self.view.has(name)
    }

    pub fn keys(&self) -> Vec<FieldName> {
        self.view.keys()
    }

    pub fn field(&mut self, name: &str) -> Option<FieldSlot<'_, 'a>> {
        self.view.field(name)
    }

    pub fn field_at(&mut self, index: usize) -> Option<FieldSlot<'_, 'a>> {
        self.view.field_at(index)
    }

    pub fn get_at(&self, index: usize) -> Option<Value> {
        self.view.get_at(index)
    }

    pub fn set_at(&mut self, index: usize, value: impl Into<Value>) {
        self.view.set_at(index, value.into());
    }

    pub fn len(&self) -> Option<usize> {
        self.view.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len().is_none_or(|n| n == 0)
    }

    /// Start a nested pass-through chain against this same receiver: its
    /// edits land in this view, so a body can express "locally mutate, then
    /// return to an otherwise-immutable chain". Finalize it with `finish()`
    /// and discard the result before returning.
    pub fn mutate(&mut self) -> Chain<'_, 'a> {
        Chain::borrowed(self.table, &mut *self.view)
    }

    /// Start an independent COW chain over another value. The nested chain
    /// owns its own shield tree; nothing is shared with this receiver.
    pub fn cow_of<'v>(&self, original: &'v Value) -> Chain<'_, 'v> {
        Chain::owned(self.table, ShieldedView::cow(original))
    }
}

// ─── Chain ──────────────────────────────────────────────────────────────────

enum Recv<'c, 'a> {
    /// Root chain: the receiver view is owned by the chain.
    Owned(ShieldedView<'a>),
    /// Nested chain started by an operation against its own receiver.
    Borrowed(&'c mut ShieldedView<'a>),
    /// Terminated: a finisher already ran.
    Done,
}

/// A chain of operation calls against one receiver, terminated by exactly
/// one of the finishers. Every call threads the same view forward; chaining
/// never re-shields between calls, so all calls in one chain observe each
/// other's edits. Calling or finishing a terminated chain fails with
/// [`TransformError::ChainAlreadyFinished`].
pub struct Chain<'c, 'a> {
    table: &'c TransformTable,
    recv: Recv<'c, 'a>,
    last: Option<Value>,
}

impl std::fmt::Debug for Chain<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain").finish_non_exhaustive()
    }
}

impl<'c, 'a> Chain<'c, 'a> {
    pub(crate) fn owned(table: &'c TransformTable, view: ShieldedView<'a>) -> Self {
        Chain {
            table,
            recv: Recv::Owned(view),
            last: None,
        }
    }

    pub(crate) fn borrowed(table: &'c TransformTable, view: &'c mut ShieldedView<'a>) -> Self {
        Chain {
            table,
            recv: Recv::Borrowed(view),
            last: None,
        }
    }

    /// Invoke the named operation with this chain's receiver. The operation's
    /// return value, present or not, replaces the chain's last result.
    pub fn call(&mut self, name: &str, args: &[Value]) -> Result<&mut Self, TransformError> {
        let table = self.table;
        let view: &mut ShieldedView<'a> = match &mut self.recv {
            Recv::Owned(view) => view,
            Recv::Borrowed(view) => view,
            Recv::Done => return Err(TransformError::ChainAlreadyFinished),
        };
        let Some(op) = table.lookup(name) else {
            log::debug!("{}: unknown transform '{}'", table.name(), name);
            return Err(TransformError::UnknownOperation(name.into()));
        };
        log::trace!("{}: call '{}' ({} args)", table.name(), name, args.len());
        let mut ctx = OpCtx { view, table };
        self.last = op(&mut ctx, args);
        Ok(self)
    }

    /// Terminate with the empty selector: materialize and return the
    /// transformed value.
    pub fn finish(&mut self) -> Result<Value, TransformError> {
        match mem::replace(&mut self.recv, Recv::Done) {
            Recv::Owned(view) => Ok(view.into_value()),
            Recv::Borrowed(view) => Ok(view.snapshot()),
            Recv::Done => Err(TransformError::ChainAlreadyFinished),
        }
    }

    /// Terminate with the result selector: the last operation's return
    /// value, or `None` if no operation produced one.
    pub fn finish_result(&mut self) -> Result<Option<Value>, TransformError> {
        match mem::replace(&mut self.recv, Recv::Done) {
            Recv::Done => Err(TransformError::ChainAlreadyFinished),
            _ => Ok(self.last.take()),
        }
    }

    /// Terminate with the pair selector: both the transformed value and the
    /// last return value.
    pub fn finish_pair(&mut self) -> Result<(Value, Option<Value>), TransformError> {
        match mem::replace(&mut self.recv, Recv::Done) {
            Recv::Owned(view) => Ok((view.into_value(), self.last.take())),
            Recv::Borrowed(view) => Ok((view.snapshot(), self.last.take())),
            Recv::Done => Err(TransformError::ChainAlreadyFinished),
        }
    }
}
