use crate::cli::get_log_level_from_verbose;
use crate::error::Result;
use env_logger::{Builder, Target};
use std::fs::File;
use std::path::Path;

/// Builds the logger for the given `-v` count.
///
/// With a log file, records go there instead of stderr so they never land
/// in the middle of a session frame.
pub fn logger(verbose: u8, log_file: Option<&Path>) -> Result<Builder> {
    let mut builder = Builder::new();
    builder.filter_level(get_log_level_from_verbose(verbose));
    if let Some(path) = log_file {
        let file = File::create(path)?;
        builder.target(Target::Pipe(Box::new(file))).write_style(env_logger::WriteStyle::Never);
    }
    Ok(builder)
}

/// Installs the global logger, falling back to stderr when the log file
/// cannot be created.
pub fn init_logging(verbose: u8, log_file: Option<&Path>) {
    let mut builder = match logger(verbose, log_file) {
        Ok(builder) => builder,
        Err(err) => {
            eprintln!("Cannot open log file, logging to stderr: {err}");
            let mut builder = Builder::new();
            builder.filter_level(get_log_level_from_verbose(verbose));
            builder
        }
    };
    if let Err(err) = builder.try_init() {
        eprintln!("Logger already initialised: {err}");
    }
}
