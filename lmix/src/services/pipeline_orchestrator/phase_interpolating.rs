//! Phase 3: INTERPOLATING
//!
//! Only reached once every corpus has its intermediate model.

use super::{join_error, PipelineOrchestrator};
use crate::error::PipelineResult;
use crate::models::{ArtifactLayout, InterpolatedModel, PipelineRun, PipelineState, WeightedModel};

impl PipelineOrchestrator {
    /// Phase 3: INTERPOLATING - weighted combination of all corpus models
    pub(super) async fn phase_interpolating(
        &self,
        run: &mut PipelineRun,
        layout: &ArtifactLayout,
        models: Vec<WeightedModel>,
    ) -> PipelineResult<InterpolatedModel> {
        self.transition(run, PipelineState::Interpolating);
        tracing::info!(run_id = %run.run_id, models = models.len(), "Phase 3: INTERPOLATING");

        let interpolator = self.interpolator.clone();
        let layout = layout.clone();
        let interpolated =
            tokio::task::spawn_blocking(move || interpolator.interpolate(&models, &layout))
                .await
                .map_err(join_error)??;

        tracing::info!(
            run_id = %run.run_id,
            output = %interpolated.path.display(),
            "Interpolated model written"
        );
        Ok(interpolated)
    }
}
