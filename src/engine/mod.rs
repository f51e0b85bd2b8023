//! Command-line surface: argument parsing, the run handler and progress display.

pub mod arg_parser;
pub mod cli;
pub mod progress;

pub use arg_parser::Cli;
pub use cli::handle_run;
