//! Pass-through parameters for the external toolkit
//!
//! These values are parsed and range-checked here, then handed to the tools
//! unchanged. No estimation or quantization logic lives on this side.

use crate::error::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pruning thresholds, one per n-gram order
///
/// Written on the command line as a pipe-delimited list, e.g. `0|0|1`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PruneSpec(Vec<u64>);

impl PruneSpec {
    pub fn new(thresholds: Vec<u64>) -> Self {
        Self(thresholds)
    }

    pub fn thresholds(&self) -> &[u64] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for PruneSpec {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Self::default());
        }

        s.split('|')
            .map(|part| {
                part.trim().parse::<u64>().map_err(|_| {
                    PipelineError::Validation(format!(
                        "prune threshold '{}' in '{}' is not a non-negative integer",
                        part, s
                    ))
                })
            })
            .collect::<PipelineResult<Vec<_>>>()
            .map(Self)
    }
}

impl fmt::Display for PruneSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(u64::to_string).collect();
        write!(f, "{}", parts.join("|"))
    }
}

/// Parameters for the estimation tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateParams {
    /// N-gram order (>= 1)
    pub order: usize,
    /// Memory budget, passed verbatim (e.g. `80%`, `4G`)
    pub memory: String,
    pub prune: PruneSpec,
    /// Fall back to default discounts when estimation cannot compute them
    pub discount_fallback: bool,
}

impl EstimateParams {
    pub fn new(order: usize, memory: impl Into<String>, prune: PruneSpec) -> PipelineResult<Self> {
        if order < 1 {
            return Err(PipelineError::Validation(
                "n-gram order must be at least 1".to_string(),
            ));
        }
        let memory = memory.into();
        if memory.trim().is_empty() {
            return Err(PipelineError::Validation(
                "memory budget must not be empty".to_string(),
            ));
        }

        Ok(Self {
            order,
            memory,
            prune,
            discount_fallback: false,
        })
    }

    pub fn with_discount_fallback(mut self, enabled: bool) -> Self {
        self.discount_fallback = enabled;
        self
    }
}

/// Data structure of the binary model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryStructure {
    /// Smaller, supports quantization
    Trie,
    /// Faster lookups, larger file
    Probing,
}

impl FromStr for BinaryStructure {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trie" => Ok(BinaryStructure::Trie),
            "probing" => Ok(BinaryStructure::Probing),
            other => Err(PipelineError::Validation(format!(
                "unknown binary type '{}' (expected 'trie' or 'probing')",
                other
            ))),
        }
    }
}

impl fmt::Display for BinaryStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryStructure::Trie => write!(f, "trie"),
            BinaryStructure::Probing => write!(f, "probing"),
        }
    }
}

/// Parameters for the binarization tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinarizeParams {
    /// Pointer compression bits (`-a`)
    pub a_bits: u8,
    /// Probability quantization bits (`-q`)
    pub q_bits: u8,
    pub structure: BinaryStructure,
}
