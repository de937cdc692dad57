//! CLI tool to convert a Velbus project export into a cleaned text report.
//!
//! Usage:
//!   vlp2txt <project.vlp>
//!   vlp2txt <project.vlp> -o <report.txt>
//!   vlp2txt <project.vlp> --dump-stages <dir>
//!
//! If no output file is specified, the report is written next to the input
//! as `<stem>_vlp.txt`.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use vlp_report::{Config, convert};

#[derive(Parser)]
#[command(name = "vlp2txt")]
#[command(about = "Convert a Velbus project (.vlp) module export into a cleaned text report", long_about = None)]
#[command(version)]
struct Cli {
    /// Input project file (XML)
    #[arg(value_name = "PROJECT.VLP")]
    input: PathBuf,

    /// Output report file (default: <stem>_vlp.txt next to the input)
    #[arg(short = 'o', long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Write the text after every pipeline stage into this directory
    #[arg(long, value_name = "DIR")]
    dump_stages: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::new(cli.input, cli.output).with_stage_dump(cli.dump_stages);

    match convert(&config) {
        Ok(summary) => {
            eprintln!(
                "Processed {} modules, output: {}",
                summary.module_count,
                summary.output.display()
            );
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
