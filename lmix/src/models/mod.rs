//! Data models for lmix
//!
//! - Corpus records (source paired with its weight)
//! - Deterministic artifact naming and the artifacts each stage produces
//! - Pass-through parameters for the external toolkit
//! - Pipeline run state machine and the exported run report

pub mod artifacts;
pub mod corpus;
pub mod parameters;
pub mod pipeline_run;
pub mod run_report;

pub use artifacts::{
    ArtifactLayout, BinaryModel, IntermediateModel, InterpolatedModel, NormalizedText,
    WeightedModel, INTERMEDIATE_HEADER_SUFFIX,
};
pub use corpus::{Corpus, SourceFormat};
pub use parameters::{BinarizeParams, BinaryStructure, EstimateParams, PruneSpec};
pub use pipeline_run::{CorpusStage, PipelineRun, PipelineState, StateTransition};
pub use run_report::{CorpusReport, RunReport};
