//! Record state machine
//!
//! `Normal → InRecord` on start, `InRecord → Processing` on stop, and
//! `Processing → Normal` once the save returns.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Current state of the Record Area
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordState {
    /// Idle, ready to start
    #[default]
    Normal,
    /// Capturing
    InRecord,
    /// Finalizing and saving
    Processing,
}

/// Inputs to the record state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordCommand {
    Start,
    Stop,
    /// The save routine returned (whatever its outcome)
    Finish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {command} while {state}")]
pub struct InvalidTransition {
    pub state: RecordState,
    pub command: RecordCommand,
}

/// Enablement of the Record Area controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecordControls {
    pub start_enabled: bool,
    pub stop_enabled: bool,
}

impl RecordControls {
    pub fn disabled() -> Self {
        Self {
            start_enabled: false,
            stop_enabled: false,
        }
    }
}

/// Live view of a Record Controller, updated on every transition and stored chunk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordStatus {
    pub state: RecordState,
    /// Non-empty chunks stored by the current recording
    pub chunks_buffered: usize,
}

impl RecordState {
    pub fn apply(self, command: RecordCommand) -> Result<RecordState, InvalidTransition> {
        match (self, command) {
            (RecordState::Normal, RecordCommand::Start) => Ok(RecordState::InRecord),
            (RecordState::InRecord, RecordCommand::Stop) => Ok(RecordState::Processing),
            (RecordState::Processing, RecordCommand::Finish) => Ok(RecordState::Normal),
            (state, command) => Err(InvalidTransition { state, command }),
        }
    }

    pub fn controls(self) -> RecordControls {
        RecordControls {
            start_enabled: self == RecordState::Normal,
            stop_enabled: self == RecordState::InRecord,
        }
    }
}

impl fmt::Display for RecordState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecordState::Normal => "normal",
            RecordState::InRecord => "recording",
            RecordState::Processing => "processing",
        };
        f.write_str(s)
    }
}

impl fmt::Display for RecordCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecordCommand::Start => "start",
            RecordCommand::Stop => "stop",
            RecordCommand::Finish => "finish",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATES: [RecordState; 3] = [
        RecordState::Normal,
        RecordState::InRecord,
        RecordState::Processing,
    ];

    #[test]
    fn test_full_cycle() {
        let state = RecordState::default();
        let state = state.apply(RecordCommand::Start).unwrap();
        assert_eq!(state, RecordState::InRecord);
        let state = state.apply(RecordCommand::Stop).unwrap();
        assert_eq!(state, RecordState::Processing);
        let state = state.apply(RecordCommand::Finish).unwrap();
        assert_eq!(state, RecordState::Normal);
    }

    #[test]
    fn test_start_only_from_normal() {
        for state in STATES {
            let result = state.apply(RecordCommand::Start);
            assert_eq!(result.is_ok(), state == RecordState::Normal, "{state}");
        }
    }

    #[test]
    fn test_stop_only_from_in_record() {
        for state in STATES {
            let result = state.apply(RecordCommand::Stop);
            assert_eq!(result.is_ok(), state == RecordState::InRecord, "{state}");
        }
    }

    #[test]
    fn test_processing_rejects_start_and_stop() {
        let err = RecordState::Processing
            .apply(RecordCommand::Start)
            .unwrap_err();
        assert_eq!(err.to_string(), "cannot start while processing");
        assert!(RecordState::Processing.apply(RecordCommand::Stop).is_err());
    }

    #[test]
    fn test_controls_follow_state() {
        for state in STATES {
            let controls = state.controls();
            assert_eq!(controls.start_enabled, state == RecordState::Normal);
            assert_eq!(controls.stop_enabled, state == RecordState::InRecord);
        }
        assert_eq!(RecordState::Processing.controls(), RecordControls::disabled());
    }
}
