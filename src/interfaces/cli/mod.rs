use std::path::PathBuf;

use clap::Parser;

use crate::io::format::qredux_output;

const VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

/// Logs a nicely formatted QRedux heading to the `qredux-output` logger.
pub fn log_heading() {
    let version = if let Some(ver) = VERSION {
        format!("v{ver}")
    } else {
        "v unknown".to_string()
    };
    qredux_output!("╭───────────────────────────────────────────────────────────────╮");
    qredux_output!("│                                                               │");
    qredux_output!("│  QRedux                                                       │");
    qredux_output!("│                                                               │");
    qredux_output!("│  Active-space reduction of molecular Hamiltonians             │");
    qredux_output!("│                                                               │");
    qredux_output!("│{version:>62} │");
    qredux_output!("╰───────────────────────────────────────────────────────────────╯");
    qredux_output!("");
}

/// Command-line arguments of the `qredux` binary.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the YAML input file.
    #[arg(short, long)]
    pub config: PathBuf,

    /// Name of the output file, without its `.out` extension. Output is only written to the
    /// terminal if this is not given.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Boolean indicating if diagnostic messages are to be shown.
    #[arg(short, long)]
    pub debug: bool,
}
