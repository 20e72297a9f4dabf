//! Pipeline orchestrator
//!
//! Coordinates one run through all states.
//!
//! # State Progression
//! VALIDATING → CORPUS_MODELS → INTERPOLATING → BINARIZING → COMPLETED
//!
//! Each state is handled by a dedicated `phase_*` method:
//!
//! - **VALIDATING** (here): pair corpora with weights, check names and the
//!   toolkit, create the output directory. Nothing is written before this
//!   phase succeeds.
//! - **CORPUS_MODELS**: per corpus, normalize then estimate; corpora run
//!   concurrently, bounded by `jobs`.
//! - **INTERPOLATING**: barrier over every corpus, then one weighted
//!   combination.
//! - **BINARIZING**: quantized binary model, the run's only success criterion.
//!
//! The first error from any phase moves the run to FAILED and is returned
//! as is. Artifacts written so far stay on disk; a failed run is never
//! resumed.

use crate::error::{PipelineError, PipelineResult};
use crate::models::{
    ArtifactLayout, BinarizeParams, Corpus, CorpusReport, EstimateParams, NormalizedText,
    PipelineRun, PipelineState, RunReport, WeightedModel,
};
use crate::services::{Binarizer, Interpolator, LmToolkit, ModelBuilder, TextNormalizer};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;

mod phase_binarizing;
mod phase_corpora;
mod phase_interpolating;

/// Raw run inputs as they come from the command line
///
/// `input_txts` and `weights` are only ever read by the validation phase,
/// which binds them into `Corpus` records.
#[derive(Debug, Clone)]
pub struct PipelineInputs {
    /// Base name of the combined and binary models
    pub name: String,
    pub output_dir: PathBuf,
    pub input_txts: Vec<PathBuf>,
    pub weights: Vec<f64>,
    pub estimate: EstimateParams,
    pub binarize: BinarizeParams,
    /// Maximum corpora processed at once
    pub jobs: usize,
}

/// Everything produced for one corpus
#[derive(Debug, Clone)]
pub struct CorpusOutput {
    pub corpus: Corpus,
    pub normalized: NormalizedText,
    pub model: WeightedModel,
}

/// Pipeline orchestrator service
pub struct PipelineOrchestrator {
    toolkit: Arc<dyn LmToolkit>,
    normalizer: TextNormalizer,
    model_builder: ModelBuilder,
    interpolator: Interpolator,
    binarizer: Binarizer,
    inputs: PipelineInputs,
}

impl PipelineOrchestrator {
    /// Create an orchestrator for a single run
    pub fn new(toolkit: Arc<dyn LmToolkit>, inputs: PipelineInputs) -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            model_builder: ModelBuilder::new(toolkit.clone(), inputs.estimate.clone()),
            interpolator: Interpolator::new(toolkit.clone()),
            binarizer: Binarizer::new(toolkit.clone(), inputs.binarize),
            toolkit,
            inputs,
        }
    }

    /// Execute the complete pipeline with a fresh run record
    pub async fn run(&self) -> PipelineResult<RunReport> {
        let mut run = PipelineRun::new();
        self.execute(&mut run).await
    }

    /// Execute the complete pipeline, recording progress in `run`
    pub async fn execute(&self, run: &mut PipelineRun) -> PipelineResult<RunReport> {
        tracing::info!(
            run_id = %run.run_id,
            name = %self.inputs.name,
            corpora = self.inputs.input_txts.len(),
            output_dir = %self.inputs.output_dir.display(),
            "Starting pipeline run"
        );

        let result = self.drive(run).await;

        match &result {
            Ok(report) => {
                self.transition(run, PipelineState::Completed);
                tracing::info!(
                    run_id = %run.run_id,
                    binary = %report.binary_model.path.display(),
                    total_lines = report.total_lines(),
                    elapsed_s = run.elapsed_seconds(),
                    "Pipeline completed"
                );
            }
            Err(e) => {
                let failed_in = run.state;
                self.transition(run, PipelineState::Failed);
                tracing::error!(
                    run_id = %run.run_id,
                    failed_in = %failed_in,
                    error = %e,
                    "Pipeline failed"
                );
            }
        }

        result
    }

    async fn drive(&self, run: &mut PipelineRun) -> PipelineResult<RunReport> {
        let (layout, corpora) = self.phase_validating(run)?;
        let outputs = self.phase_corpus_models(run, &layout, &corpora).await?;

        let models: Vec<WeightedModel> = outputs.iter().map(|o| o.model.clone()).collect();
        let interpolated = self.phase_interpolating(run, &layout, models).await?;
        let binary = self.phase_binarizing(run, &layout, interpolated.clone()).await?;

        Ok(RunReport {
            run_id: run.run_id,
            name: layout.name().to_string(),
            started_at: run.started_at,
            finished_at: Utc::now(),
            corpora: outputs
                .iter()
                .map(|o| CorpusReport::new(&o.corpus, &o.normalized, &o.model))
                .collect(),
            interpolated_model: interpolated,
            binary_model: binary,
        })
    }

    /// VALIDATING: bind inputs, check the toolkit, prepare the output directory
    fn phase_validating(&self, run: &PipelineRun) -> PipelineResult<(ArtifactLayout, Vec<Corpus>)> {
        tracing::info!(run_id = %run.run_id, "Phase 1: VALIDATING");

        let corpora = Corpus::pair_all(&self.inputs.input_txts, &self.inputs.weights)?;
        let layout = ArtifactLayout::new(&self.inputs.output_dir, self.inputs.name.as_str())?;
        if self.inputs.jobs == 0 {
            return Err(PipelineError::Validation(
                "jobs must be at least 1".to_string(),
            ));
        }

        for corpus in &corpora {
            tracing::debug!(
                run_id = %run.run_id,
                corpus = corpus.index,
                source = %corpus.source_path.display(),
                weight = corpus.weight,
                "Corpus registered"
            );
        }

        self.toolkit.preflight()?;

        std::fs::create_dir_all(layout.output_dir())
            .map_err(|e| PipelineError::io(layout.output_dir(), e))?;

        Ok((layout, corpora))
    }

    fn transition(&self, run: &mut PipelineRun, state: PipelineState) {
        if let Some(transition) = run.transition_to(state) {
            tracing::info!(
                run_id = %transition.run_id,
                from = %transition.old_state,
                to = %transition.new_state,
                "State transition"
            );
        }
    }
}

/// Map a panicked or cancelled blocking task to a pipeline error
fn join_error(e: tokio::task::JoinError) -> PipelineError {
    PipelineError::Task(e.to_string())
}
