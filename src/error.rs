use thiserror::Error;

use crate::recorder::InvalidTransition;
use crate::session::Area;

/// Why a UI command was not carried out
#[derive(Debug, Error)]
pub enum ControlError {
    /// The record state machine does not allow this command right now
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    /// The command targets the area that is not mounted
    #[error("{0} area is not mounted")]
    NotMounted(Area),

    /// The Record Area is mounted but setup did not complete
    #[error("Record controls are disabled: {0}")]
    Unavailable(String),

    /// A platform or I/O operation failed
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl ControlError {
    /// Rejected by UI state rather than failed while running
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}
