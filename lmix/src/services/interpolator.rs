//! Weighted interpolator
//!
//! Joins every intermediate model into one combined model. Weights are
//! positional at the toolkit boundary, so the model and weight lists are
//! built together from the same bound records, in corpus order, after the
//! alignment check below passes.

use super::toolkit::LmToolkit;
use crate::error::{PipelineError, PipelineResult};
use crate::models::{ArtifactLayout, InterpolatedModel, WeightedModel};
use std::path::PathBuf;
use std::sync::Arc;

/// Interpolation driver
#[derive(Clone)]
pub struct Interpolator {
    toolkit: Arc<dyn LmToolkit>,
}

impl Interpolator {
    pub fn new(toolkit: Arc<dyn LmToolkit>) -> Self {
        Self { toolkit }
    }

    /// Combine `models` into `<dir>/<name>.arpa`
    ///
    /// Every check runs before the toolkit is invoked.
    pub fn interpolate(
        &self,
        models: &[WeightedModel],
        layout: &ArtifactLayout,
    ) -> PipelineResult<InterpolatedModel> {
        check_alignment(models)?;

        // Intermediate paths are prefixes; the header file marks a finished estimate
        for weighted in models {
            let header = weighted.model.header_path();
            if !header.is_file() {
                return Err(PipelineError::io(
                    header,
                    std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "intermediate model missing before interpolation",
                    ),
                ));
            }
        }

        let (paths, weights): (Vec<PathBuf>, Vec<f64>) = models
            .iter()
            .map(|m| (m.model.intermediate_path.clone(), m.weight))
            .unzip();
        let output = layout.interpolated_arpa();

        tracing::info!(
            models = paths.len(),
            weights = ?weights,
            output = %output.display(),
            "Interpolating intermediate models"
        );

        self.toolkit.interpolate(&paths, &weights, &output)?;

        Ok(InterpolatedModel { path: output })
    }
}

/// Verify the models are exactly corpora `0..n` in declared order
pub fn check_alignment(models: &[WeightedModel]) -> PipelineResult<()> {
    if models.is_empty() {
        return Err(PipelineError::Validation(
            "no intermediate models to interpolate".to_string(),
        ));
    }

    for (position, weighted) in models.iter().enumerate() {
        if weighted.index() != position {
            return Err(PipelineError::Alignment(format!(
                "position {} holds the model of corpus {}",
                position,
                weighted.index()
            )));
        }
        if !weighted.weight.is_finite() || weighted.weight <= 0.0 {
            return Err(PipelineError::Validation(format!(
                "weight {} for corpus {} must be a positive number",
                weighted.weight,
                weighted.index()
            )));
        }
    }

    Ok(())
}
