//! lmix - interpolated language model builder
//!
//! **Usage:**
//! ```bash
//! lmix --name lm --output-dir out \
//!     --input-txts news.txt.gz chat.txt --weights 0.7 0.3 \
//!     --kenlm-bins /opt/kenlm/bin --arpa-order 3 --max-arpa-memory 80% \
//!     --arpa-prune "0|0|1" --binary-a-bits 255 --binary-q-bits 8 --binary-type trie
//! ```
//!
//! Exit codes: 0 success, 1 internal, 2 validation/config, 3 I/O, 4 toolkit.

use anyhow::{Context, Result};
use clap::Parser;
use lmix::config::{resolve_log_level, Args, RunSettings};
use lmix::{KenlmToolkit, PipelineError, PipelineOrchestrator};
use lmix_common::config::{load_config, resolve_config_path, ConfigSource, CONFIG_ENV_VAR};
use std::sync::Arc;
use tracing::{error, info};

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        let code = e
            .downcast_ref::<PipelineError>()
            .map(PipelineError::exit_code)
            .unwrap_or(1);
        eprintln!("lmix: {:#}", e);
        std::process::exit(code);
    }
}

fn run(args: Args) -> Result<()> {
    let config_source = resolve_config_path(args.config.as_deref(), CONFIG_ENV_VAR);
    let toml_config = load_config(&config_source).map_err(PipelineError::from)?;

    init_tracing(&resolve_log_level(&args, &toml_config));

    info!("Starting lmix {}", env!("CARGO_PKG_VERSION"));
    match &config_source {
        ConfigSource::Explicit(path) | ConfigSource::Default(path) => {
            info!("Config file: {}", path.display())
        }
        ConfigSource::None => info!("No config file, using command line only"),
    }

    let settings = RunSettings::resolve(&args, &toml_config)?;
    info!("KenLM binaries: {}", settings.kenlm_bins.display());

    let toolkit = Arc::new(KenlmToolkit::new(settings.kenlm_bins.clone()));
    let orchestrator = PipelineOrchestrator::new(toolkit, settings.inputs.clone());

    // Dropping the runtime waits for blocking tasks, so toolkit processes
    // started before a failure still run to completion.
    let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    let report = runtime.block_on(orchestrator.run())?;

    println!("Binary file written to {}", report.binary_model.path.display());

    if let Some(report_path) = &settings.report {
        match report.export_json(report_path) {
            Ok(()) => info!("Run report exported to: {}", report_path.display()),
            Err(e) => error!("Failed to export run report: {}", e),
        }
    }

    Ok(())
}

/// Initialize tracing; `RUST_LOG` overrides the configured level
fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}
