//! Binarizer
//!
//! Final stage: quantizes and indexes the combined text model. There is no
//! fallback artifact; if this fails the run has no output.

use super::toolkit::LmToolkit;
use crate::error::{PipelineError, PipelineResult};
use crate::models::{ArtifactLayout, BinarizeParams, BinaryModel, InterpolatedModel};
use std::sync::Arc;

#[derive(Clone)]
pub struct Binarizer {
    toolkit: Arc<dyn LmToolkit>,
    params: BinarizeParams,
}

impl Binarizer {
    pub fn new(toolkit: Arc<dyn LmToolkit>, params: BinarizeParams) -> Self {
        Self { toolkit, params }
    }

    pub fn params(&self) -> &BinarizeParams {
        &self.params
    }

    pub fn binarize(
        &self,
        model: &InterpolatedModel,
        layout: &ArtifactLayout,
    ) -> PipelineResult<BinaryModel> {
        if !model.path.is_file() {
            return Err(PipelineError::io(
                &model.path,
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "interpolated model missing before binarization",
                ),
            ));
        }

        let output = layout.binary_model();
        // A previous run's binary must not pass for this run's output
        match std::fs::remove_file(&output) {
            Ok(()) => tracing::debug!(path = %output.display(), "Removed stale binary model"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(PipelineError::io(&output, e)),
        }

        self.toolkit.binarize(&model.path, &self.params, &output)?;

        // A zero exit without an output file is still a failed stage
        if !output.is_file() {
            return Err(PipelineError::io(
                &output,
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "binarization reported success but wrote no file",
                ),
            ));
        }

        Ok(BinaryModel { path: output })
    }
}
