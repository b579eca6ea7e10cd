pub mod args;
pub mod logging;
pub mod runner;

pub use args::{get_log_level_from_verbose, parse_cli, Cli, Commands, InitArgs};
pub use logging::init_logging;
pub use runner::{run_init, Application, Runner};
