use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unsupported mesh dimensionality: {0}D")]
    UnsupportedDimension(usize),

    #[error("Solver diverged at iteration {iteration}: {message}")]
    SolverDiverged { iteration: usize, message: String },

    #[error("Physics constraint violated: {0}")]
    PhysicsViolation(String),

    #[error("Acceleration failed: {0}")]
    Acceleration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SnResult<T> = Result<T, SnError>;
