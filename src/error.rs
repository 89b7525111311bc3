use thiserror::Error;

/// Engine error taxonomy.
///
/// Only caller contract violations surface as errors. Recoverable data
/// anomalies are handled locally with a logged fallback, and allocator
/// starvation is reported as a deficit on the result, not an error.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
