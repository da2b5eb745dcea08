use super::error::ConfigError;
use crate::structs::toml::Logging;
use log::{error, LevelFilter};
use simplelog::{Config, SimpleLogger, WriteLogger};
use std::fs::{create_dir_all, File};
use uuid::Uuid;

/// Install the global logger. Logs go to a new file under `directory` when configured, otherwise to the console.
/// A logger that is already installed is left in place
pub fn setup_logging(logging: Option<&Logging>) -> Result<(), ConfigError> {
    let level = log_level(logging.and_then(|options| options.level.as_deref()));

    if let Some(directory) = logging.and_then(|options| options.directory.as_deref()) {
        let log_file = create_log_file(directory)?;
        let _ = WriteLogger::init(level, Config::default(), log_file);
        return Ok(());
    }

    let _ = SimpleLogger::init(level, Config::default());
    Ok(())
}

/// Create log output file in the provided directory
pub(crate) fn create_log_file(directory: &str) -> Result<File, ConfigError> {
    if let Err(err) = create_dir_all(directory) {
        error!("[config] Failed to create logging output directory for {directory}. Error: {err:?}");
        return Err(ConfigError::CreateDirectory);
    }

    let path = format!("{directory}/{}.log", Uuid::new_v4().hyphenated());
    let output_result = File::create(&path);
    match output_result {
        Ok(result) => Ok(result),
        Err(err) => {
            error!("[config] Failed to create log file at {path}. Error: {err:?}");
            Err(ConfigError::LogFile)
        }
    }
}

/// Map config text to a level. Unknown levels fall back to warn
pub(crate) fn log_level(level: Option<&str>) -> LevelFilter {
    match level.map(|value| value.to_lowercase()).as_deref() {
        Some("error") => LevelFilter::Error,
        Some("info") => LevelFilter::Info,
        Some("debug") => LevelFilter::Debug,
        _ => LevelFilter::Warn,
    }
}
