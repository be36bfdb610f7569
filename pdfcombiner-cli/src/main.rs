//! pdfcombiner - Combine PDF documents into a single file.
//!
//! Dual-mode binary: a long-running HTTP server that accepts combination
//! jobs against object storage, or a one-shot local merge.

mod cli;
mod paths;

use anyhow::{Context, bail};
use clap::Parser;
use std::process;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use pdfcombiner::config::{ServerConfig, StorageConfig};
use pdfcombiner::error::CombinerError;
use pdfcombiner::merge::{DocumentCombiner, PdfMerger, ResolvedDocument};
use pdfcombiner::server;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        let code = err
            .downcast_ref::<CombinerError>()
            .map(CombinerError::exit_code)
            .unwrap_or(1);
        process::exit(code);
    }
}

/// Main application logic.
async fn run(cli: Cli) -> anyhow::Result<()> {
    cli.validate()?;

    if cli.server {
        // Credentials are a startup requirement for server mode; a missing
        // pair must fail here, never inside a job.
        let storage = StorageConfig::from_env()?;
        server::serve(ServerConfig::with_port(cli.port), storage).await?;
        return Ok(());
    }

    combine_locally(&cli).await
}

/// One-shot mode: merge local files directly, no storage round trip.
async fn combine_locally(cli: &Cli) -> anyhow::Result<()> {
    let paths = paths::collect_paths_for_patterns(&cli.inputs)?;
    if paths.is_empty() {
        bail!("no files matched the given patterns");
    }

    let mut inputs = Vec::with_capacity(paths.len());
    for path in &paths {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        inputs.push(ResolvedDocument::new(path.display().to_string(), bytes));
    }

    tracing::info!(files = inputs.len(), "combining documents");

    let merger = PdfMerger::new();
    let merged = merger.combine(&inputs).await?;

    tokio::fs::write(&cli.output, &merged)
        .await
        .with_context(|| format!("failed to write {}", cli.output.display()))?;

    println!(
        "Combined {} file(s) into {}",
        inputs.len(),
        cli.output.display()
    );

    Ok(())
}
