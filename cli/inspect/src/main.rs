//! mp-inspect CLI
//!
//! Inspection of two-dimensional partition spaces.

use clap::Parser;
use mp_cli_common::init_logging;

mod args;
mod run;

use args::Cli;

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    // Initialize logging (to stderr, so stdout is clean for JSON)
    init_logging(args.log_level)?;

    let report = match run::execute(&args) {
        Ok(report) => report,
        Err(error) => {
            eprintln!("Error: {error:#}");
            std::process::exit(run::exit_code(&error));
        }
    };

    println!("{}", serde_json::to_string_pretty(&report.output)?);
    eprintln!("{}", report.summary);

    Ok(())
}
