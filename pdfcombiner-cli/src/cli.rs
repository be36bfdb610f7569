//! CLI argument parsing for pdfcombiner.
//!
//! This module defines the command-line interface structure using `clap`.
//! The binary runs in one of two modes: a long-running server that accepts
//! combination requests over HTTP, or a one-shot mode that combines local
//! files directly.

use clap::Parser;
use std::path::PathBuf;

use anyhow::bail;
use pdfcombiner::config::DEFAULT_PORT;

/// Combine PDF documents into a single file.
///
/// In server mode, pdfcombiner listens for combination requests that name
/// documents in object storage, merges them, uploads the result, and
/// notifies a callback URL. In one-shot mode it merges local files and
/// writes the result next to you, no storage round trip involved.
#[derive(Parser, Debug)]
#[command(name = "pdfcombiner")]
#[command(version)]
#[command(about = "Combine PDF documents into a single file", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Run in server mode
    ///
    /// Listens for combination requests over HTTP. Requires storage
    /// credentials in AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY;
    /// starting without them is a fatal error.
    #[arg(long)]
    pub server: bool,

    /// Port to listen on in server mode
    #[arg(short, long, value_name = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Input PDF files for one-shot mode (in merge order)
    ///
    /// Glob patterns are expanded, so both of these work:
    ///   pdfcombiner a.pdf b.pdf -o merged.pdf
    ///   pdfcombiner 'chapters/*.pdf' -o book.pdf
    #[arg(value_name = "FILE")]
    pub inputs: Vec<String>,

    /// Output file path for one-shot mode
    #[arg(short, long, value_name = "FILE", default_value = "combined.pdf")]
    pub output: PathBuf,
}

impl Cli {
    /// Validate the argument combination.
    ///
    /// # Errors
    ///
    /// Returns an error when server mode is mixed with input files, or
    /// when one-shot mode has nothing to combine.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server && !self.inputs.is_empty() {
            bail!("server mode does not take input files");
        }
        if !self.server && self.inputs.is_empty() {
            bail!("cannot start in standalone mode with no files to combine");
        }
        Ok(())
    }
}
