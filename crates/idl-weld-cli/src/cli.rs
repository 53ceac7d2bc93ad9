//! Argument parsing and the generate command

use anyhow::{Context, Result};
use clap::Parser;
use idl_weld::GeneratorOptions;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[command(
    name = "idl-weld",
    version,
    about = "Generate Rust bindings from a WebIDL schema tree"
)]
pub struct Args {
    /// Schema tree (JSON) to generate bindings for
    #[arg(required_unless_present = "include_dir")]
    pub schema: Option<PathBuf>,

    /// Output file [default: schema stem + .rs next to the schema]
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Extra `use` path injected into the generated module (repeatable)
    #[arg(short = 'i', long = "include", value_name = "PATH")]
    pub includes: Vec<String>,

    /// Do not attach [Exposed] interfaces to global prototypes
    #[arg(short = 'x', long)]
    pub no_expose: bool,

    /// Print the runtime library's source directory and exit
    #[arg(short = 'I', long)]
    pub include_dir: bool,

    /// TOML file with generator options; flags override it
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Options from the config file (if any) with flags layered on top
    pub fn options(&self) -> Result<GeneratorOptions> {
        let mut options = match &self.config {
            Some(path) => GeneratorOptions::from_file(path)
                .with_context(|| format!("reading config at {}", path.display()))?,
            None => GeneratorOptions::default(),
        };

        options.includes.extend(self.includes.iter().cloned());
        if self.no_expose {
            options.expose = false;
        }
        if options.source_name.is_none() {
            options.source_name = self
                .schema
                .as_deref()
                .and_then(Path::file_name)
                .map(|name| name.to_string_lossy().into_owned());
        }
        Ok(options)
    }

    pub fn output_path(&self, schema: &Path) -> PathBuf {
        match &self.output {
            Some(output) => output.clone(),
            None => schema.with_extension("rs"),
        }
    }
}

/// Run one invocation; returns the written file, if any
pub fn run(args: Args) -> Result<Option<PathBuf>> {
    if args.include_dir {
        println!("{}", idl_weld_runtime::INCLUDE_DIR);
        return Ok(None);
    }

    let schema = args.schema.as_deref().context("missing schema path")?;
    let options = args.options()?;
    debug!(?options, "generator options");

    let source = idl_weld::generate_file(schema, &options)
        .with_context(|| format!("generating bindings for {}", schema.display()))?;

    let output = args.output_path(schema);
    fs::write(&output, source).with_context(|| format!("writing {}", output.display()))?;
    info!(schema = %schema.display(), output = %output.display(), "wrote bindings");
    Ok(Some(output))
}
