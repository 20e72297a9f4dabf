//! Phase 4: BINARIZING

use super::{join_error, PipelineOrchestrator};
use crate::error::PipelineResult;
use crate::models::{ArtifactLayout, BinaryModel, InterpolatedModel, PipelineRun, PipelineState};

impl PipelineOrchestrator {
    /// Phase 4: BINARIZING - quantized binary model from the combined text model
    pub(super) async fn phase_binarizing(
        &self,
        run: &mut PipelineRun,
        layout: &ArtifactLayout,
        interpolated: InterpolatedModel,
    ) -> PipelineResult<BinaryModel> {
        self.transition(run, PipelineState::Binarizing);

        let binarizer = self.binarizer.clone();
        let params = *binarizer.params();
        tracing::info!(
            run_id = %run.run_id,
            a_bits = params.a_bits,
            q_bits = params.q_bits,
            structure = %params.structure,
            "Phase 4: BINARIZING"
        );

        let layout = layout.clone();
        let binary = tokio::task::spawn_blocking(move || binarizer.binarize(&interpolated, &layout))
            .await
            .map_err(join_error)??;

        tracing::info!(
            run_id = %run.run_id,
            output = %binary.path.display(),
            "Binary model written"
        );
        Ok(binary)
    }
}
