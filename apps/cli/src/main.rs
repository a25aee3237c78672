//! docconf CLI: resolve a documentation build's configuration.
//!
//! Reads the site config and build manifest, and prints the resolved
//! configuration (or one piece of it) for the rendering and publishing stages.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
