//! Artifact naming and the artifacts each stage produces
//!
//! Every file name is a pure function of the output directory, the run name
//! and the corpus index. Rerunning with the same inputs overwrites the same
//! files.

use crate::error::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Suffix of the header file the estimation tool writes for an intermediate
/// prefix; the vocabulary and per-order count files sit next to it
pub const INTERMEDIATE_HEADER_SUFFIX: &str = ".kenlm_intermediate";

/// Deterministic artifact paths for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    output_dir: PathBuf,
    name: String,
}

impl ArtifactLayout {
    /// Create a layout, rejecting names that would escape the output directory
    pub fn new(output_dir: impl Into<PathBuf>, name: impl Into<String>) -> PipelineResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(PipelineError::Validation("run name must not be empty".to_string()));
        }
        if name == "." || name == ".." || name.contains('/') || name.contains('\\') {
            return Err(PipelineError::Validation(format!(
                "run name '{}' must be a plain file name",
                name
            )));
        }

        Ok(Self {
            output_dir: output_dir.into(),
            name,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `<dir>/<index>_lower.txt.gz`
    pub fn normalized_text(&self, index: usize) -> PathBuf {
        self.output_dir.join(format!("{}_lower.txt.gz", index))
    }

    /// `<dir>/<index>_lm.arpa`
    pub fn corpus_arpa(&self, index: usize) -> PathBuf {
        self.output_dir.join(format!("{}_lm.arpa", index))
    }

    /// `<dir>/<index>_lm`, a prefix rather than a file
    pub fn intermediate_model(&self, index: usize) -> PathBuf {
        self.output_dir.join(format!("{}_lm", index))
    }

    /// `<dir>/<name>.arpa`
    pub fn interpolated_arpa(&self) -> PathBuf {
        self.output_dir.join(format!("{}.arpa", self.name))
    }

    /// `<dir>/<name>.binary`
    pub fn binary_model(&self) -> PathBuf {
        self.output_dir.join(format!("{}.binary", self.name))
    }
}

/// Case-folded, gzip-compressed copy of one corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedText {
    pub index: usize,
    pub path: PathBuf,
    pub line_count: u64,
}

/// Per-corpus n-gram model produced by the estimation tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntermediateModel {
    pub index: usize,
    /// Text (ARPA) form of the model
    pub arpa_path: PathBuf,
    /// Prefix of the count-based files consumed by interpolation. The tool
    /// writes `<prefix>.kenlm_intermediate`, `<prefix>.vocab` and one
    /// `<prefix>.<n>` per order, never `<prefix>` itself.
    pub intermediate_path: PathBuf,
}

impl IntermediateModel {
    /// `<prefix>.kenlm_intermediate`
    pub fn header_path(&self) -> PathBuf {
        let mut path = self.intermediate_path.clone().into_os_string();
        path.push(INTERMEDIATE_HEADER_SUFFIX);
        PathBuf::from(path)
    }
}

/// Intermediate model bound to its corpus weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedModel {
    pub model: IntermediateModel,
    pub weight: f64,
}

impl WeightedModel {
    pub fn index(&self) -> usize {
        self.model.index
    }
}

/// Weighted combination of every intermediate model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpolatedModel {
    pub path: PathBuf,
}

/// Quantized, indexed runtime model; the pipeline's terminal output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryModel {
    pub path: PathBuf,
}
