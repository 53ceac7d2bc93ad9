//! idl-weld: generate Rust bindings from a WebIDL schema tree
//!
//! ```text
//! idl-weld dom.json                  # writes dom.rs next to dom.json
//! idl-weld dom.json -o src/dom.rs -i 'crate::dom::*'
//! idl-weld --include-dir             # prints the runtime source directory
//! ```
//!
//! Logging goes to stderr and is controlled by `IDL_WELD_LOG`
//! (`warn` by default).

mod cli;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_env("IDL_WELD_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    cli::run(cli::Args::parse())?;
    Ok(())
}
