//! Metricspace CLI entry point.

#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use metricspace_cli::Cli;

fn main() -> Result<()> {
    let output = metricspace_cli::run(Cli::parse())?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
