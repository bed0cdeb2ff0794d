//! Copy-on-write transform chains over dynamic record values.
//!
//! Register named operations once in a [`TransformTable`]; apply them to a
//! [`Value`] either copy-on-write (`table.cow(&v)`: the original stays
//! untouched, the result shares every untouched subtree with it) or in place
//! (`table.mutate(&mut v)`). Operation bodies are written once, against a
//! single field protocol, and behave correctly under both modes.

pub mod error;
pub mod shield;
pub mod transform;
pub mod value;

pub use error::TransformError;
pub use shield::{Change, ChangeLog, FieldSlot, RESERVED_FIELDS, ShieldedView};
pub use transform::{Chain, OpCtx, TransformFn, TransformTable};
pub use value::{FieldName, Number, RecordMap, Value};
