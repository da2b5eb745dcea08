use super::error::ConfigError;
use log::error;
use regex::Regex;

/// Create a compiled Regex
pub(crate) fn create_regex(input: &str) -> Result<Regex, ConfigError> {
    let regex_result = Regex::new(input);
    let regex = match regex_result {
        Ok(result) => result,
        Err(err) => {
            error!("[taskschd] Bad regex {input}, error: {err:?}");
            return Err(ConfigError::Regex);
        }
    };

    Ok(regex)
}
