pub mod config;
pub mod filenames;
pub mod logger;
pub mod settings_toml;

pub use config::*;
pub use filenames::{default_list_filename, default_result_filename, today};
pub use logger::setup_logging;
pub use settings_toml::opts_from_toml_str;
