//! Error types for walkway routing

use thiserror::Error;

/// Search phase that ran out of budget.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Snap,
    Search,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Snap => write!(f, "snap"),
            Phase::Search => write!(f, "search"),
        }
    }
}

#[derive(Error, Debug)]
pub enum RouteError {
    #[error("Unknown location: {0}")]
    UnknownLocation(String),

    #[error("Route computation exceeded budget during {phase} ({limit} expansions)")]
    BudgetExceeded { phase: Phase, limit: usize },

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Registry format error: {0}")]
    RegistryFormat(String),
}

pub type Result<T> = std::result::Result<T, RouteError>;
