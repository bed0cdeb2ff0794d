mod change;
mod direct;
mod view;

pub use change::{Change, ChangeLog, RESERVED_FIELDS, is_reserved};
pub use view::{FieldSlot, RecordView, SeqView, ShieldedView};
