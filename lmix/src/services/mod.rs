//! Pipeline services
//!
//! Leaf-first: normalizer → model builder → interpolator → binarizer, all
//! driven by the pipeline orchestrator through the `LmToolkit` seam.

pub mod binarizer;
pub mod interpolator;
pub mod model_builder;
pub mod pipeline_orchestrator;
pub mod text_normalizer;
pub mod toolkit;

pub use binarizer::Binarizer;
pub use interpolator::Interpolator;
pub use model_builder::ModelBuilder;
pub use pipeline_orchestrator::{CorpusOutput, PipelineInputs, PipelineOrchestrator};
pub use text_normalizer::TextNormalizer;
pub use toolkit::{EstimateRequest, KenlmToolkit, LmToolkit};
