//! Command-line arguments and settings resolution
//!
//! **Priority:** command line (or its environment variable) → TOML config → compiled default
//!
//! Corpus sources and weights are only accepted on the command line; they
//! stay as two raw lists here and are bound into `Corpus` records by the
//! orchestrator's validation phase.

use crate::error::PipelineResult;
use crate::models::{BinarizeParams, BinaryStructure, EstimateParams, PruneSpec};
use crate::services::PipelineInputs;
use clap::Parser;
use lmix_common::config::TomlConfig;
use lmix_common::Error;
use std::path::PathBuf;

/// Environment variable naming the KenLM binary directory
pub const KENLM_BINS_ENV_VAR: &str = "LMIX_KENLM_BINS";

/// Default number of corpora processed concurrently
pub const DEFAULT_JOBS: usize = 1;

/// Command-line arguments for lmix
#[derive(Parser, Debug, Clone)]
#[command(name = "lmix")]
#[command(about = "Generate an interpolated language model from multiple weighted corpora")]
#[command(version)]
pub struct Args {
    /// Name to use for the interpolated and binary model files
    #[arg(long)]
    pub name: String,

    /// Directory for all intermediate and final artifacts
    #[arg(long, alias = "output_dir")]
    pub output_dir: PathBuf,

    /// Corpus files (.txt or .txt.gz), one per weight
    #[arg(long, alias = "input_txts", num_args = 1.., required = true)]
    pub input_txts: Vec<PathBuf>,

    /// Interpolation weights, positionally aligned with --input-txts
    #[arg(long, num_args = 1.., required = true, allow_negative_numbers = true)]
    pub weights: Vec<f64>,

    /// Directory containing the KenLM binaries lmplz, interpolate and build_binary
    #[arg(long, alias = "kenlm_bins", env = KENLM_BINS_ENV_VAR)]
    pub kenlm_bins: Option<PathBuf>,

    /// Order of n-grams in ARPA generation
    #[arg(long, alias = "arpa_order")]
    pub arpa_order: Option<usize>,

    /// Maximum memory for ARPA generation (e.g. 80%, 4G)
    #[arg(long, alias = "max_arpa_memory")]
    pub max_arpa_memory: Option<String>,

    /// ARPA pruning thresholds, separated with '|'
    #[arg(long, alias = "arpa_prune")]
    pub arpa_prune: Option<String>,

    /// Use fallback discounts when estimation cannot compute them
    #[arg(long, alias = "discount_fallback")]
    pub discount_fallback: bool,

    /// Binary pointer compression (-a) in bits
    #[arg(long, alias = "binary_a_bits")]
    pub binary_a_bits: Option<u8>,

    /// Binary probability quantization (-q) in bits
    #[arg(long, alias = "binary_q_bits")]
    pub binary_q_bits: Option<u8>,

    /// Binary data structure type (trie or probing)
    #[arg(long, alias = "binary_type")]
    pub binary_type: Option<String>,

    /// Number of corpora processed concurrently
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// TOML config file with defaults
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Export a JSON run report after success
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Log level when RUST_LOG is not set
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub inputs: PipelineInputs,
    pub kenlm_bins: PathBuf,
    pub report: Option<PathBuf>,
}

impl RunSettings {
    /// Merge command-line arguments over the TOML config
    ///
    /// Required toolkit parameters missing from both sources are reported
    /// as configuration errors.
    pub fn resolve(args: &Args, toml: &TomlConfig) -> PipelineResult<Self> {
        let kenlm_bins = pick(args.kenlm_bins.clone(), toml.kenlm_bins.clone(), "kenlm_bins")?;

        let order = pick(args.arpa_order, toml.estimate.order, "arpa_order")?;
        let memory = pick(
            args.max_arpa_memory.clone(),
            toml.estimate.memory.clone(),
            "max_arpa_memory",
        )?;
        let prune: PruneSpec =
            pick(args.arpa_prune.clone(), toml.estimate.prune.clone(), "arpa_prune")?.parse()?;
        let discount_fallback =
            args.discount_fallback || toml.estimate.discount_fallback.unwrap_or(false);
        let estimate =
            EstimateParams::new(order, memory, prune)?.with_discount_fallback(discount_fallback);

        let binarize = BinarizeParams {
            a_bits: pick(args.binary_a_bits, toml.binarize.a_bits, "binary_a_bits")?,
            q_bits: pick(args.binary_q_bits, toml.binarize.q_bits, "binary_q_bits")?,
            structure: pick(
                args.binary_type.clone(),
                toml.binarize.structure.clone(),
                "binary_type",
            )?
            .parse::<BinaryStructure>()?,
        };

        let jobs = args.jobs.or(toml.jobs).unwrap_or(DEFAULT_JOBS);

        Ok(Self {
            inputs: PipelineInputs {
                name: args.name.clone(),
                output_dir: args.output_dir.clone(),
                input_txts: args.input_txts.clone(),
                weights: args.weights.clone(),
                estimate,
                binarize,
                jobs,
            },
            kenlm_bins,
            report: args.report.clone(),
        })
    }
}

/// Log level: command line → TOML → "info"
pub fn resolve_log_level(args: &Args, toml: &TomlConfig) -> String {
    args.log_level
        .clone()
        .unwrap_or_else(|| toml.logging.level.clone())
}

fn pick<T>(cli: Option<T>, toml: Option<T>, key: &str) -> Result<T, Error> {
    cli.or(toml).ok_or_else(|| {
        Error::Config(format!(
            "'{}' is required: pass --{} or set it in the config file",
            key,
            key.replace('_', "-")
        ))
    })
}
