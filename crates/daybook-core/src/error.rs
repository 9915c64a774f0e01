use std::time::Duration;

use thiserror::Error;

use crate::task::{TaskKey, ValidationError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("backend command {command} failed")]
    Persistence {
        command: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("backend command {command} timed out after {timeout:?}")]
    Timeout {
        command: &'static str,
        timeout: Duration,
    },

    #[error("no task with key {0}")]
    NotFound(TaskKey),
}

impl StoreError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
