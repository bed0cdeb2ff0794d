mod chain;
mod table;

pub use chain::{Chain, OpCtx};
pub use table::{TransformFn, TransformTable};
