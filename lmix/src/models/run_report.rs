//! Summary of a successful run, exportable as JSON

use super::{BinaryModel, Corpus, InterpolatedModel, NormalizedText, WeightedModel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Per-corpus section of the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusReport {
    pub index: usize,
    pub source_path: PathBuf,
    pub weight: f64,
    pub normalized_path: PathBuf,
    pub line_count: u64,
    pub arpa_path: PathBuf,
    pub intermediate_path: PathBuf,
}

impl CorpusReport {
    pub fn new(corpus: &Corpus, normalized: &NormalizedText, model: &WeightedModel) -> Self {
        Self {
            index: corpus.index,
            source_path: corpus.source_path.clone(),
            weight: corpus.weight,
            normalized_path: normalized.path.clone(),
            line_count: normalized.line_count,
            arpa_path: model.model.arpa_path.clone(),
            intermediate_path: model.model.intermediate_path.clone(),
        }
    }
}

/// Complete run report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Ordered by corpus index
    pub corpora: Vec<CorpusReport>,
    pub interpolated_model: InterpolatedModel,
    pub binary_model: BinaryModel,
}

impl RunReport {
    /// Export report to JSON file
    pub fn export_json<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Import report from JSON file
    pub fn import_json<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let file = File::open(path)?;
        let report: RunReport = serde_json::from_reader(file)?;
        Ok(report)
    }

    pub fn total_lines(&self) -> u64 {
        self.corpora.iter().map(|c| c.line_count).sum()
    }
}
