use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use spdlog::{info, warn};

use revue_wxr::converter::{default_output_path, write_export, Converter};
use revue_wxr::logger::configure_logger;

use crate::config::open_config;

mod config;

const CFG_FILE_NAME: &str = "revue-wxr.toml";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
enum Args {
    /// Convert a Revue export archive into a WordPress import file
    Convert(ConvertArgs),
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct ConvertArgs {
    /// Zip archive exported from Revue
    archive: PathBuf,

    /// Output file. Defaults to the archive path with an .xml extension
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log debug messages
    #[arg(short, long)]
    verbose: bool,
}

fn convert_cmd(args: ConvertArgs) -> Result<()> {
    let config = open_config(args.config).map_err(|e| anyhow!(e))?;

    if let Err(err) = configure_logger(&config, args.verbose) {
        warn!("Error creating logger sinks. Using default logger instead. Desc={}", err);
    }

    let output = args.output.unwrap_or_else(|| default_output_path(&args.archive));

    let converter = Converter::from_config(&config);
    let xml = converter.convert_archive(&args.archive)
        .with_context(|| format!("Could not convert {}", args.archive.display()))?;
    write_export(&output, &xml)?;

    info!("Done");
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    match args {
        Args::Convert(args) => convert_cmd(args),
    }
}
