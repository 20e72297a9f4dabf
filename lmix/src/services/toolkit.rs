//! External language-model toolkit
//!
//! The n-gram math (estimation, interpolation, quantized binarization) is
//! delegated to KenLM's command-line tools. This module is the seam: the
//! `LmToolkit` trait is what the pipeline drives, `KenlmToolkit` is the
//! production implementation that runs `lmplz`, `interpolate` and
//! `build_binary` as child processes.
//!
//! Calls block until the tool exits. Callers on the async runtime run them
//! through `tokio::task::spawn_blocking`.

use crate::error::{PipelineError, PipelineResult};
use crate::models::{BinarizeParams, EstimateParams};
use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Estimation tool name
pub const LMPLZ: &str = "lmplz";
/// Interpolation tool name
pub const INTERPOLATE: &str = "interpolate";
/// Binarization tool name
pub const BUILD_BINARY: &str = "build_binary";

/// Lines of stderr kept in a failure report
const STDERR_TAIL_LINES: usize = 20;

/// Inputs and outputs of one estimation call
#[derive(Debug, Clone)]
pub struct EstimateRequest<'a> {
    /// Normalized (gzip) corpus text
    pub text: &'a Path,
    pub arpa_output: &'a Path,
    pub intermediate_output: &'a Path,
    /// Scratch directory for the tool's temporary files
    pub temp_dir: &'a Path,
    pub params: &'a EstimateParams,
}

/// Operations the pipeline needs from the toolkit
pub trait LmToolkit: Send + Sync {
    /// Check the toolkit is usable; runs after input validation, before any stage
    fn preflight(&self) -> PipelineResult<()> {
        Ok(())
    }

    /// Estimate a text model plus its intermediate side file from one corpus
    fn estimate(&self, request: &EstimateRequest<'_>) -> PipelineResult<()>;

    /// Combine intermediate models; `weights[i]` applies to `models[i]`
    fn interpolate(&self, models: &[PathBuf], weights: &[f64], output: &Path) -> PipelineResult<()>;

    /// Serialize a text model into the quantized binary form
    fn binarize(&self, arpa: &Path, params: &BinarizeParams, output: &Path) -> PipelineResult<()>;
}

/// KenLM command-line tools found in one directory
#[derive(Debug, Clone)]
pub struct KenlmToolkit {
    bin_dir: PathBuf,
}

impl KenlmToolkit {
    pub fn new(bin_dir: impl Into<PathBuf>) -> Self {
        Self {
            bin_dir: bin_dir.into(),
        }
    }

    /// Verify that all three tools are present before any work starts
    pub fn check_binaries(&self) -> PipelineResult<()> {
        let missing: Vec<String> = [LMPLZ, INTERPOLATE, BUILD_BINARY]
            .iter()
            .map(|tool| self.tool_path(tool))
            .filter(|path| !path.is_file())
            .map(|path| path.display().to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::Validation(format!(
                "KenLM binaries not found: {}",
                missing.join(", ")
            )))
        }
    }

    fn tool_path(&self, tool: &str) -> PathBuf {
        self.bin_dir.join(tool)
    }

    /// `lmplz` argument list
    pub fn estimate_args(request: &EstimateRequest<'_>) -> Vec<OsString> {
        let params = request.params;
        let mut args: Vec<OsString> = vec![
            "--order".into(),
            params.order.to_string().into(),
            "--temp_prefix".into(),
            request.temp_dir.into(),
            "--memory".into(),
            params.memory.clone().into(),
            "--text".into(),
            request.text.into(),
            "--arpa".into(),
            request.arpa_output.into(),
        ];

        if !params.prune.is_empty() {
            args.push("--prune".into());
            args.extend(
                params
                    .prune
                    .thresholds()
                    .iter()
                    .map(|t| OsString::from(t.to_string())),
            );
        }

        args.push("--intermediate".into());
        args.push(request.intermediate_output.into());

        if params.discount_fallback {
            args.push("--discount_fallback".into());
        }

        args
    }

    /// `interpolate` argument list; models and weights keep their positions
    pub fn interpolate_args(models: &[PathBuf], weights: &[f64]) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::with_capacity(models.len() + weights.len() + 2);
        args.push("-m".into());
        args.extend(models.iter().map(|m| m.as_os_str().to_owned()));
        args.push("-w".into());
        args.extend(weights.iter().map(|w| OsString::from(w.to_string())));
        args
    }

    /// `build_binary` argument list
    pub fn binarize_args(arpa: &Path, params: &BinarizeParams, output: &Path) -> Vec<OsString> {
        vec![
            "-a".into(),
            params.a_bits.to_string().into(),
            "-q".into(),
            params.q_bits.to_string().into(),
            "-v".into(),
            params.structure.to_string().into(),
            arpa.into(),
            output.into(),
        ]
    }

    /// Run one tool to completion
    fn run(&self, tool: &str, args: &[OsString], stdout: Stdio) -> PipelineResult<()> {
        let program = self.tool_path(tool);

        tracing::info!(
            tool,
            command = %render_command(&program, args),
            "Running toolkit command"
        );

        let output = Command::new(&program)
            .args(args)
            .stdout(stdout)
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| PipelineError::ToolkitSpawn {
                tool: tool.to_string(),
                source,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines() {
            tracing::debug!(tool, "{}", line);
        }

        if !output.status.success() {
            return Err(PipelineError::ToolkitFailed {
                tool: tool.to_string(),
                code: output.status.code(),
                stderr: tail_lines(&stderr, STDERR_TAIL_LINES),
            });
        }

        Ok(())
    }
}

impl LmToolkit for KenlmToolkit {
    fn preflight(&self) -> PipelineResult<()> {
        self.check_binaries()
    }

    fn estimate(&self, request: &EstimateRequest<'_>) -> PipelineResult<()> {
        let args = Self::estimate_args(request);
        self.run(LMPLZ, &args, Stdio::inherit())
    }

    fn interpolate(
        &self,
        models: &[PathBuf],
        weights: &[f64],
        output: &Path,
    ) -> PipelineResult<()> {
        if models.len() != weights.len() {
            return Err(PipelineError::Alignment(format!(
                "{} models but {} weights passed to {}",
                models.len(),
                weights.len(),
                INTERPOLATE
            )));
        }

        let args = Self::interpolate_args(models, weights);
        // interpolate writes the combined text model to stdout
        let file = File::create(output).map_err(|e| PipelineError::io(output, e))?;
        self.run(INTERPOLATE, &args, Stdio::from(file))
    }

    fn binarize(&self, arpa: &Path, params: &BinarizeParams, output: &Path) -> PipelineResult<()> {
        let args = Self::binarize_args(arpa, params, output);
        self.run(BUILD_BINARY, &args, Stdio::inherit())
    }
}

/// Shell-like rendering of a command for logs
fn render_command(program: &Path, args: &[OsString]) -> String {
    std::iter::once(program.as_os_str())
        .chain(args.iter().map(OsString::as_os_str))
        .map(|part| part.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

fn tail_lines(text: &str, count: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(count);
    lines[start..].join("\n")
}
