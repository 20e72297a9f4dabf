//! Pipeline run state machine
//!
//! VALIDATING → CORPUS_MODELS → INTERPOLATING → BINARIZING → COMPLETED
//!
//! Inside CORPUS_MODELS each corpus runs NORMALIZING → BUILDING_MODEL on its
//! own, concurrently with the others. Any state may move to FAILED.
//! COMPLETED and FAILED are terminal; a failed run is never resumed, a new
//! run redoes every stage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Pipeline state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineState {
    /// Corpus/weight pairing and parameter checks
    Validating,
    /// Per-corpus normalization and estimation
    CorpusModels,
    /// Weighted combination (barrier over all corpora)
    Interpolating,
    /// Quantized binary serialization
    Binarizing,
    /// Binary model written
    Completed,
    /// A stage failed
    Failed,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Completed | PipelineState::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PipelineState::Validating => "VALIDATING",
            PipelineState::CorpusModels => "CORPUS_MODELS",
            PipelineState::Interpolating => "INTERPOLATING",
            PipelineState::Binarizing => "BINARIZING",
            PipelineState::Completed => "COMPLETED",
            PipelineState::Failed => "FAILED",
        };
        f.write_str(label)
    }
}

/// Progress of a single corpus inside the CORPUS_MODELS phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CorpusStage {
    Normalizing,
    BuildingModel,
    Done,
}

impl fmt::Display for CorpusStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CorpusStage::Normalizing => "NORMALIZING",
            CorpusStage::BuildingModel => "BUILDING_MODEL",
            CorpusStage::Done => "DONE",
        };
        f.write_str(label)
    }
}

/// State transition event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub run_id: Uuid,
    pub old_state: PipelineState,
    pub new_state: PipelineState,
    pub transitioned_at: DateTime<Utc>,
}

/// One pipeline invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRun {
    pub run_id: Uuid,
    pub state: PipelineState,
    pub started_at: DateTime<Utc>,
    /// Set once a terminal state is reached
    pub ended_at: Option<DateTime<Utc>>,
}

impl PipelineRun {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            state: PipelineState::Validating,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Move to `new_state`
    ///
    /// Returns `None` (and leaves the run untouched) if the run already
    /// reached a terminal state.
    pub fn transition_to(&mut self, new_state: PipelineState) -> Option<StateTransition> {
        if self.state.is_terminal() {
            return None;
        }

        let transition = StateTransition {
            run_id: self.run_id,
            old_state: self.state,
            new_state,
            transitioned_at: Utc::now(),
        };
        self.state = new_state;

        if new_state.is_terminal() {
            self.ended_at = Some(transition.transitioned_at);
        }

        Some(transition)
    }

    pub fn elapsed_seconds(&self) -> f64 {
        let end = self.ended_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

impl Default for PipelineRun {
    fn default() -> Self {
        Self::new()
    }
}
