use std::fmt;

#[derive(Debug, PartialEq)]
pub enum TimeError {
    Instant,
}

impl std::error::Error for TimeError {}

impl fmt::Display for TimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeError::Instant => write!(f, "Failed to parse date and time text"),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    NoFile,
    BadToml,
    Regex,
    CreateDirectory,
    LogFile,
    Connect,
}

impl std::error::Error for ConfigError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoFile => write!(f, "Could not read config file"),
            ConfigError::BadToml => write!(f, "Failed to parse TOML data"),
            ConfigError::Regex => write!(f, "Invalid regex provided"),
            ConfigError::CreateDirectory => write!(f, "Could not create directory(ies)"),
            ConfigError::LogFile => write!(f, "Could not create log file"),
            ConfigError::Connect => write!(f, "Could not connect to the task service"),
        }
    }
}
