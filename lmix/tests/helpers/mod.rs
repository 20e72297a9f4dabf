//! Test Helper Utilities
//!
//! Shared utilities for testing lmix: a recording stand-in for the external
//! toolkit plus corpus and artifact helpers.

#![allow(dead_code)]

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use lmix::models::{BinarizeParams, BinaryStructure, EstimateParams, PruneSpec};
use lmix::services::toolkit::{EstimateRequest, LmToolkit};
use lmix::{PipelineError, PipelineInputs, PipelineResult};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

/// One recorded toolkit invocation
#[derive(Debug, Clone, PartialEq)]
pub enum ToolkitCall {
    Estimate { text: PathBuf, order: usize },
    Interpolate { models: Vec<PathBuf>, weights: Vec<f64> },
    Binarize { arpa: PathBuf, output: PathBuf },
}

/// Toolkit stage a test can make fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Estimate,
    Interpolate,
    Binarize,
    Preflight,
}

/// Fake toolkit that writes small, inspectable artifacts
///
/// - estimate: copies the normalized text into the ARPA file and into the
///   files KenLM writes for an `--intermediate` prefix (header, vocab and
///   one count file per order); the prefix itself is never created
/// - interpolate: one `weight<TAB>model text` block per model, in the order given
/// - binarize: `BINARY` header followed by the combined text
#[derive(Default)]
pub struct RecordingToolkit {
    calls: Mutex<Vec<ToolkitCall>>,
    fail_at: Option<FailAt>,
    estimate_delays: HashMap<usize, Duration>,
    skip_binary_output: bool,
}

impl RecordingToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(stage: FailAt) -> Self {
        Self {
            fail_at: Some(stage),
            ..Self::default()
        }
    }

    /// Binarization reports success without writing anything
    pub fn without_binary_output() -> Self {
        Self {
            skip_binary_output: true,
            ..Self::default()
        }
    }

    /// Slow down estimation of one corpus so completion order changes
    pub fn with_estimate_delay(mut self, corpus: usize, delay: Duration) -> Self {
        self.estimate_delays.insert(corpus, delay);
        self
    }

    pub fn calls(&self) -> Vec<ToolkitCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn estimate_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ToolkitCall::Estimate { .. }))
            .count()
    }

    pub fn interpolate_calls(&self) -> Vec<(Vec<PathBuf>, Vec<f64>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ToolkitCall::Interpolate { models, weights } => Some((models, weights)),
                _ => None,
            })
            .collect()
    }

    pub fn binarize_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ToolkitCall::Binarize { .. }))
            .count()
    }

    fn record(&self, call: ToolkitCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn fail(&self, stage: FailAt, tool: &str) -> PipelineResult<()> {
        if self.fail_at == Some(stage) {
            return Err(PipelineError::ToolkitFailed {
                tool: tool.to_string(),
                code: Some(1),
                stderr: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

impl LmToolkit for RecordingToolkit {
    fn preflight(&self) -> PipelineResult<()> {
        if self.fail_at == Some(FailAt::Preflight) {
            return Err(PipelineError::Validation("toolkit unavailable".to_string()));
        }
        Ok(())
    }

    fn estimate(&self, request: &EstimateRequest<'_>) -> PipelineResult<()> {
        self.record(ToolkitCall::Estimate {
            text: request.text.to_path_buf(),
            order: request.params.order,
        });

        if let Some(delay) = corpus_index(request.text).and_then(|i| self.estimate_delays.get(&i)) {
            std::thread::sleep(*delay);
        }

        let text = read_gz(request.text);
        // Partial output is written before an injected failure
        std::fs::write(request.arpa_output, &text).unwrap();
        self.fail(FailAt::Estimate, "lmplz")?;
        let prefix = request.intermediate_output;
        std::fs::write(with_suffix(prefix, ".kenlm_intermediate"), &text).unwrap();
        std::fs::write(with_suffix(prefix, ".vocab"), "<s>\n</s>\n").unwrap();
        for n in 1..=request.params.order {
            std::fs::write(with_suffix(prefix, &format!(".{}", n)), "").unwrap();
        }
        Ok(())
    }

    fn interpolate(
        &self,
        models: &[PathBuf],
        weights: &[f64],
        output: &Path,
    ) -> PipelineResult<()> {
        self.record(ToolkitCall::Interpolate {
            models: models.to_vec(),
            weights: weights.to_vec(),
        });
        self.fail(FailAt::Interpolate, "interpolate")?;

        let mut combined = String::new();
        for (model, weight) in models.iter().zip(weights) {
            let text = std::fs::read_to_string(with_suffix(model, ".kenlm_intermediate")).unwrap();
            combined.push_str(&format!("{}\t{}", weight, text));
        }
        std::fs::write(output, combined).unwrap();
        Ok(())
    }

    fn binarize(&self, arpa: &Path, _params: &BinarizeParams, output: &Path) -> PipelineResult<()> {
        self.record(ToolkitCall::Binarize {
            arpa: arpa.to_path_buf(),
            output: output.to_path_buf(),
        });
        self.fail(FailAt::Binarize, "build_binary")?;
        if self.skip_binary_output {
            return Ok(());
        }

        let text = std::fs::read_to_string(arpa).unwrap();
        std::fs::write(output, format!("BINARY\n{}", text)).unwrap();
        Ok(())
    }
}

/// `<path><suffix>`, keeping any dots already in `path`
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut joined = path.as_os_str().to_owned();
    joined.push(suffix);
    PathBuf::from(joined)
}

/// Corpus index from a `<index>_lower.txt.gz` file name
fn corpus_index(path: &Path) -> Option<usize> {
    path.file_name()?
        .to_str()?
        .split('_')
        .next()?
        .parse()
        .ok()
}

/// Write a plain-text corpus
pub fn write_corpus(dir: &Path, file_name: &str, content: &str) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Write a gzip corpus
pub fn write_gz_corpus(dir: &Path, file_name: &str, content: &str) -> PathBuf {
    let path = dir.join(file_name);
    let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
    encoder.write_all(content.as_bytes()).unwrap();
    encoder.finish().unwrap();
    path
}

pub fn read_gz(path: &Path) -> String {
    let mut text = String::new();
    GzDecoder::new(File::open(path).unwrap())
        .read_to_string(&mut text)
        .unwrap();
    text
}

/// Order-2 inputs with typical toolkit parameters
pub fn test_inputs(output_dir: &Path, sources: Vec<PathBuf>, weights: Vec<f64>) -> PipelineInputs {
    PipelineInputs {
        name: "lm".to_string(),
        output_dir: output_dir.to_path_buf(),
        input_txts: sources,
        weights,
        estimate: EstimateParams::new(2, "10%", PruneSpec::new(vec![0, 0])).unwrap(),
        binarize: BinarizeParams {
            a_bits: 255,
            q_bits: 8,
            structure: BinaryStructure::Trie,
        },
        jobs: 1,
    }
}

/// Sorted file names in a directory (empty if it does not exist)
pub fn list_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}

/// Route tracing output through the test harness
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("lmix=debug")
        .with_test_writer()
        .try_init();
}
