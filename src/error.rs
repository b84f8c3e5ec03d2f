use thiserror::Error;

/// Errors surfaced to callers of the plan pipeline.
///
/// Provider and parse failures never appear here: they are absorbed by the
/// pipeline and end in a mock plan.
#[derive(Debug, Error, PartialEq)]
pub enum PlanError {
    #[error("invalid plan request: {0}")]
    InvalidRequest(String),
}
