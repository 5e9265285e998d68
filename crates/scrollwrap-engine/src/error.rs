use thiserror::Error;

/// Result type for engine operations.
pub type GateResult<T> = Result<T, GateError>;

/// Engine-layer errors.
///
/// Deliberately small: almost everything the gate encounters at runtime
/// (unsupported strategies, broken storage, double invocations) degrades
/// silently by design. The one fatal condition is a host that mounted the
/// engine without its required bindings, which is a configuration mistake to
/// fix, not a runtime state to recover from.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("required binding missing at mount: {0}")]
    MissingBinding(&'static str),
}
