//! Presscrape CLI: collect article references and/or scrape articles for a query.

use clap::Parser;
use presscrape::engine::arg_parser::Cli;
use presscrape::engine::handle_run;
use std::process::ExitCode;
use std::time::Instant;

fn main() -> ExitCode {
    let start_time = Instant::now();
    let cli = Cli::parse();
    let code = match handle_run(&cli) {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    };
    log::debug!("Total time: {:?}", start_time.elapsed());
    code
}
