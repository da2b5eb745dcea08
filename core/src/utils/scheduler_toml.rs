use super::error::ConfigError;
use crate::structs::toml::SchedulerToml;
use log::error;
use std::{fs::read, str::from_utf8};

impl SchedulerToml {
    /// Parse the scheduler TOML config
    pub fn parse_scheduler_toml(toml_data: &[u8]) -> Result<SchedulerToml, ConfigError> {
        let text = match from_utf8(toml_data) {
            Ok(result) => result,
            Err(err) => {
                error!("[config] Config is not UTF8: {err:?}");
                return Err(ConfigError::BadToml);
            }
        };

        let toml_results = toml::from_str(text);
        let mut config: SchedulerToml = match toml_results {
            Ok(results) => results,
            Err(err) => {
                error!("[config] Failed to parse TOML data. Error: {err:?}");
                return Err(ConfigError::BadToml);
            }
        };

        // Level is always lowercase
        if let Some(logging) = config.logging.as_mut() {
            logging.level = logging.level.as_ref().map(|level| level.to_lowercase());
        }
        Ok(config)
    }

    /// Read and parse the scheduler TOML config at provided path
    pub fn read_scheduler_toml(path: &str) -> Result<SchedulerToml, ConfigError> {
        let buffer = match read(path) {
            Ok(result) => result,
            Err(err) => {
                error!("[config] Could not read config at {path}: {err:?}");
                return Err(ConfigError::NoFile);
            }
        };
        SchedulerToml::parse_scheduler_toml(&buffer)
    }
}

#[cfg(test)]
mod tests {
    use crate::structs::toml::SchedulerToml;
    use std::path::PathBuf;

    #[test]
    fn test_read_scheduler_toml() {
        let mut test_location = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        test_location.push("tests/test_data/scheduler.toml");

        let result = SchedulerToml::read_scheduler_toml(&test_location.display().to_string())
            .unwrap();
        let connection = result.connection.unwrap();
        assert_eq!(connection.server.unwrap(), "buildhost");
        assert_eq!(connection.user.unwrap(), "svc_tasks");
        assert_eq!(connection.domain.unwrap(), "CORP");
        assert_eq!(connection.password, None);

        let logging = result.logging.unwrap();
        assert_eq!(logging.level.unwrap(), "debug");
        assert_eq!(logging.directory, None);
    }

    #[test]
    fn test_parse_scheduler_toml_empty() {
        let result = SchedulerToml::parse_scheduler_toml(b"").unwrap();
        assert!(result.connection.is_none());
        assert!(result.logging.is_none());
    }

    #[test]
    #[should_panic(expected = "BadToml")]
    fn test_parse_bad_toml() {
        let mut test_location = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        test_location.push("tests/test_data/malformed_tests/bad.toml");

        let _ = SchedulerToml::read_scheduler_toml(&test_location.display().to_string())
            .unwrap();
    }

    #[test]
    #[should_panic(expected = "NoFile")]
    fn test_read_missing_toml() {
        let _ = SchedulerToml::read_scheduler_toml("tests/test_data/does_not_exist.toml").unwrap();
    }
}
