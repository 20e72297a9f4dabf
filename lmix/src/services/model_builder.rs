//! Corpus model builder
//!
//! Runs the toolkit's estimation step on one normalized corpus. Order,
//! memory budget and pruning thresholds go to the tool unchanged.

use super::toolkit::{EstimateRequest, LmToolkit};
use crate::error::PipelineResult;
use crate::models::{ArtifactLayout, EstimateParams, IntermediateModel, NormalizedText};
use std::sync::Arc;
use std::time::Instant;

/// Per-corpus estimation driver
#[derive(Clone)]
pub struct ModelBuilder {
    toolkit: Arc<dyn LmToolkit>,
    params: EstimateParams,
}

impl ModelBuilder {
    pub fn new(toolkit: Arc<dyn LmToolkit>, params: EstimateParams) -> Self {
        Self { toolkit, params }
    }

    /// Estimate the intermediate model for `text`
    ///
    /// On failure whatever the tool already wrote stays on disk for
    /// inspection; nothing is retried.
    pub fn build(
        &self,
        text: &NormalizedText,
        layout: &ArtifactLayout,
    ) -> PipelineResult<IntermediateModel> {
        let arpa_path = layout.corpus_arpa(text.index);
        let intermediate_path = layout.intermediate_model(text.index);
        let start = Instant::now();

        let request = EstimateRequest {
            text: &text.path,
            arpa_output: &arpa_path,
            intermediate_output: &intermediate_path,
            temp_dir: layout.output_dir(),
            params: &self.params,
        };
        self.toolkit.estimate(&request)?;

        tracing::debug!(
            corpus = text.index,
            order = self.params.order,
            arpa = %arpa_path.display(),
            intermediate = %intermediate_path.display(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Intermediate model built"
        );

        Ok(IntermediateModel {
            index: text.index,
            arpa_path,
            intermediate_path,
        })
    }
}
