// ─── Error ──────────────────────────────────────────────────────────────────
use smol_str::SmolStr;
use thiserror::Error;

/// All failures are programmer-error class and surface synchronously to the
/// chain's caller. Absent-field reads and deletes are not errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    #[error("transform '{0}' not found")]
    UnknownOperation(SmolStr),
    #[error("chain already finished")]
    ChainAlreadyFinished,
}
