//! Markmin - minify HTML, XHTML and XML files from the command line.

use anyhow::{Result, bail};
use clap::Parser;
use markmin::{batch, cli::Cli, config::MinifierConfig};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = MinifierConfig::load(&cli)?;

    let summary = batch::run(&config, &cli.inputs, cli.quiet)?;
    if !summary.is_success() {
        bail!("{} of {} files could not be minified", summary.failed, summary.processed);
    }
    Ok(())
}
