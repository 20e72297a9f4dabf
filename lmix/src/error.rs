//! Error types for lmix
//!
//! Every variant is fatal for the run. The first one raised by any stage is
//! surfaced to the operator and decides the process exit code.

use std::path::PathBuf;
use thiserror::Error;

/// Pipeline error type
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Invalid inputs detected before any external tool runs
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Models and weights no longer line up with declared corpus order
    #[error("Corpus/weight alignment broken: {0}")]
    Alignment(String),

    /// Reading a corpus or writing an artifact failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// External tool could not be started
    #[error("Failed to start {tool}: {source}")]
    ToolkitSpawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// External tool exited unsuccessfully
    #[error("{tool} failed with exit code {}: {stderr}", describe_exit(.code))]
    ToolkitFailed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Background task panicked or was aborted
    #[error("Task error: {0}")]
    Task(String),

    /// lmix-common error
    #[error("Common error: {0}")]
    Common(#[from] lmix_common::Error),
}

impl PipelineError {
    /// Build an I/O error tagged with the file it concerns
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this failure
    ///
    /// - 2: validation, alignment or configuration
    /// - 3: I/O
    /// - 4: external toolkit
    /// - 1: anything else
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Validation(_) | PipelineError::Alignment(_) => 2,
            PipelineError::Common(lmix_common::Error::Config(_)) => 2,
            PipelineError::Io { .. } => 3,
            PipelineError::ToolkitSpawn { .. } | PipelineError::ToolkitFailed { .. } => 4,
            PipelineError::Task(_) => 1,
        }
    }

    /// True for errors raised before any external tool is invoked
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PipelineError::Validation(_) | PipelineError::Alignment(_)
        )
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none (killed by signal)".to_string(),
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_category() {
        assert_eq!(PipelineError::Validation("x".into()).exit_code(), 2);
        assert_eq!(PipelineError::Alignment("x".into()).exit_code(), 2);
        assert_eq!(
            PipelineError::io("/tmp/x", std::io::Error::other("boom")).exit_code(),
            3
        );
        assert_eq!(
            PipelineError::ToolkitFailed {
                tool: "lmplz".into(),
                code: Some(1),
                stderr: String::new(),
            }
            .exit_code(),
            4
        );
        assert_eq!(PipelineError::Task("panic".into()).exit_code(), 1);
        assert_eq!(
            PipelineError::from(lmix_common::Error::Config("missing".into())).exit_code(),
            2
        );
    }

    #[test]
    fn test_signal_exit_is_described() {
        let err = PipelineError::ToolkitFailed {
            tool: "build_binary".into(),
            code: None,
            stderr: "".into(),
        };
        assert!(err.to_string().contains("killed by signal"));
    }
}
