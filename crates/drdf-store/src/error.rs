/// Misuse of the incremental mutation API.
///
/// These are programming-contract violations (an operation issued without
/// the run or event it needs), never a sign of corrupt data.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    /// The operation needs a current run; call `start_run` first.
    #[error("{operation}: no current run (call start_run first)")]
    NoCurrentRun { operation: &'static str },

    /// The operation needs a current event; call `start_event` first.
    #[error("{operation}: no current event (call start_event first)")]
    NoCurrentEvent { operation: &'static str },
}

/// Result alias for store mutations.
pub type StoreResult<T> = Result<T, StoreError>;
