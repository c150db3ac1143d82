mod context;
#[cfg(test)]
mod tests;

pub use context::ErrorContext;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpgateError {
    #[error("No operation was supplied")]
    OperationAbsent,

    #[error("Operation '{label}' is not available: a run is already in progress")]
    Busy { label: String },

    #[error("Completion signal for '{label}' is not prepared")]
    SignalNotReady { label: String },

    #[error("Failed to start worker thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

impl OpgateError {
    pub fn is_busy(&self) -> bool {
        matches!(self, OpgateError::Busy { .. })
    }

    pub fn is_signal_not_ready(&self) -> bool {
        matches!(self, OpgateError::SignalNotReady { .. })
    }
}

pub type Result<T> = std::result::Result<T, OpgateError>;
