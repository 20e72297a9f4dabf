//! lmix - interpolated language model builder
//!
//! Builds one n-gram model per weighted corpus with an external toolkit,
//! interpolates them into a single model and binarizes the result.
//!
//! Data flows strictly forward:
//! normalizer → model builder (per corpus) → interpolator (all corpora) → binarizer

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{PipelineError, PipelineResult};
pub use crate::services::{KenlmToolkit, LmToolkit, PipelineInputs, PipelineOrchestrator};
