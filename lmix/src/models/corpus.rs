//! Corpus records
//!
//! A corpus and its weight travel together from the moment the command line
//! is parsed. Nothing downstream ever sees two parallel lists.

use crate::error::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Storage format of a corpus source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Plain,
    Gzip,
}

impl SourceFormat {
    /// `.gz` extension means gzip, anything else is plain text
    pub fn detect(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("gz") => SourceFormat::Gzip,
            _ => SourceFormat::Plain,
        }
    }
}

/// One weighted training corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    /// Position in the declared corpus list
    pub index: usize,
    pub source_path: PathBuf,
    /// Interpolation weight, finite and > 0
    pub weight: f64,
}

impl Corpus {
    /// Pair sources with weights by position
    ///
    /// This is the only place the two lists from the command line meet.
    /// Fails when the lengths differ, when no corpus is given, or when a
    /// weight is not a finite positive number.
    pub fn pair_all(sources: &[PathBuf], weights: &[f64]) -> PipelineResult<Vec<Corpus>> {
        if sources.len() != weights.len() {
            return Err(PipelineError::Validation(format!(
                "{} input texts but {} weights; each corpus needs exactly one weight",
                sources.len(),
                weights.len()
            )));
        }
        if sources.is_empty() {
            return Err(PipelineError::Validation(
                "at least one input text is required".to_string(),
            ));
        }

        sources
            .iter()
            .zip(weights)
            .enumerate()
            .map(|(index, (source_path, &weight))| {
                if !weight.is_finite() || weight <= 0.0 {
                    return Err(PipelineError::Validation(format!(
                        "weight {} for corpus {} ({}) must be a positive number",
                        weight,
                        index,
                        source_path.display()
                    )));
                }
                Ok(Corpus {
                    index,
                    source_path: source_path.clone(),
                    weight,
                })
            })
            .collect()
    }

    pub fn format(&self) -> SourceFormat {
        SourceFormat::detect(&self.source_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_pairs_by_position() {
        let corpora = Corpus::pair_all(&paths(&["a.txt", "b.txt.gz"]), &[0.7, 0.3]).unwrap();

        assert_eq!(corpora.len(), 2);
        assert_eq!(corpora[0].index, 0);
        assert_eq!(corpora[0].source_path, PathBuf::from("a.txt"));
        assert_eq!(corpora[0].weight, 0.7);
        assert_eq!(corpora[1].index, 1);
        assert_eq!(corpora[1].source_path, PathBuf::from("b.txt.gz"));
        assert_eq!(corpora[1].weight, 0.3);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = Corpus::pair_all(&paths(&["a.txt", "b.txt"]), &[1.0]).unwrap_err();
        assert!(err.is_validation());

        let err = Corpus::pair_all(&paths(&["a.txt"]), &[0.5, 0.5]).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_empty_rejected() {
        assert!(Corpus::pair_all(&[], &[]).unwrap_err().is_validation());
    }

    #[test]
    fn test_non_positive_weights_rejected() {
        for bad in [0.0, -0.2, f64::NAN, f64::INFINITY] {
            let err = Corpus::pair_all(&paths(&["a.txt"]), &[bad]).unwrap_err();
            assert!(err.is_validation(), "weight {} should be rejected", bad);
        }
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(SourceFormat::detect(Path::new("c.txt")), SourceFormat::Plain);
        assert_eq!(SourceFormat::detect(Path::new("c.txt.gz")), SourceFormat::Gzip);
        assert_eq!(SourceFormat::detect(Path::new("C.TXT.GZ")), SourceFormat::Gzip);
        assert_eq!(SourceFormat::detect(Path::new("corpus")), SourceFormat::Plain);
    }
}
