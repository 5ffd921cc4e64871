use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "scadrun", bin_name = "scadrun", version)]
#[command(
    about = "Open an OpenSCAD model with auto-render, or export it into a slicer",
    long_about = None,
    after_help = "Config: $SCADRUN_CONFIG or config.json in the user config dir.\nLogging: -v for debug output, or RUST_LOG=scadrun=trace."
)]
pub struct Cli {
    /// OpenSCAD file to open or build
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Export the model headlessly and open it in the slicer
    #[arg(long)]
    pub build: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
