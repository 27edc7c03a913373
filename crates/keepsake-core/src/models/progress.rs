//! Ingest progress state machine.
//!
//! One-directional pipeline stages with a validated transition table:
//! Idle -> Extracting -> Analyzing -> Generating -> [GeneratingComic] ->
//! Saving -> Complete, with Error reachable from any non-terminal state and
//! Error -> Idle on explicit user retry.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProgressError {
    #[error("invalid progress transition: {0} -> {1}")]
    InvalidTransition(IngestStage, IngestStage),
}

/// Stage of one ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestStage {
    Idle,
    Extracting,
    Analyzing,
    Generating,
    GeneratingComic,
    Saving,
    Complete,
    Error,
}

impl IngestStage {
    /// Nominal completion percentage for the stage. The tracker keeps the
    /// reported value monotone within a run.
    pub fn percent(self) -> u8 {
        match self {
            IngestStage::Idle => 0,
            IngestStage::Extracting => 15,
            IngestStage::Analyzing => 40,
            IngestStage::Generating => 60,
            IngestStage::GeneratingComic => 75,
            IngestStage::Saving => 90,
            IngestStage::Complete => 100,
            IngestStage::Error => 0,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, IngestStage::Complete)
    }
}

impl Display for IngestStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let s = match self {
            IngestStage::Idle => "idle",
            IngestStage::Extracting => "extracting",
            IngestStage::Analyzing => "analyzing",
            IngestStage::Generating => "generating",
            IngestStage::GeneratingComic => "generating_comic",
            IngestStage::Saving => "saving",
            IngestStage::Complete => "complete",
            IngestStage::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// Validate that a stage transition is allowed.
pub fn validate_transition(from: IngestStage, to: IngestStage) -> Result<(), ProgressError> {
    use IngestStage::*;

    let valid = matches!(
        (from, to),
        (Idle, Extracting)
            | (Extracting, Analyzing)
            | (Analyzing, Generating)
            | (Generating, GeneratingComic)
            | (Generating, Saving)
            | (GeneratingComic, Saving)
            | (Saving, Complete)
            | (Error, Idle)
    ) || (to == Error && !from.is_terminal() && from != Error);

    if valid {
        Ok(())
    } else {
        Err(ProgressError::InvalidTransition(from, to))
    }
}

/// Snapshot published to observers of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestProgress {
    pub stage: IngestStage,
    pub percent: u8,
}

impl IngestProgress {
    pub fn idle() -> Self {
        Self {
            stage: IngestStage::Idle,
            percent: 0,
        }
    }
}

/// Tracks the current stage of a run, rejecting invalid transitions and
/// keeping the percentage monotone non-decreasing until reset.
#[derive(Debug)]
pub struct ProgressTracker {
    current: IngestStage,
    percent: u8,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            current: IngestStage::Idle,
            percent: 0,
        }
    }

    pub fn current(&self) -> IngestProgress {
        IngestProgress {
            stage: self.current,
            percent: self.percent,
        }
    }

    /// Advance to `to`, returning the new snapshot.
    pub fn advance(&mut self, to: IngestStage) -> Result<IngestProgress, ProgressError> {
        validate_transition(self.current, to)?;
        self.current = to;
        if to == IngestStage::Idle {
            // Explicit retry resets the run.
            self.percent = 0;
        } else {
            self.percent = self.percent.max(to.percent());
        }
        Ok(self.current())
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
