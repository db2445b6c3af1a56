//! bindery - build an EPUB from a book manifest

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;

use bindery::config::DEFAULT_CONFIG_FILE;

#[derive(Parser)]
#[command(name = "bindery")]
#[command(version, about = "Build an EPUB from a markdown or HTML manuscript", long_about = None)]
#[command(after_help = "EXAMPLES:
    bindery                          Build from ./epub_info.json
    bindery book/epub_info.json      Build from another manifest
    bindery -o dist -v               Write into dist/ with progress logging")]
struct Cli {
    /// Book manifest (JSON)
    #[arg(value_name = "CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Directory the .epub is written to
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,

    /// Increase logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    match bindery::build(&cli.config, &cli.output_dir) {
        Ok(path) => {
            if !cli.quiet {
                println!("{}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(quiet: bool, verbose: u8) {
    let level = match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Warn,
        (false, 1) => LevelFilter::Info,
        (false, 2) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}
