use std::fs;
use std::path::Path;

use shared::stand_hal::StandConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Stand configuration from a JSON file, or the built-in bench defaults
/// when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<StandConfig, ConfigError> {
    match path {
        Some(path) => Ok(serde_json::from_str(&fs::read_to_string(path)?)?),
        None => Ok(StandConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_json() {
        let config = StandConfig::default();

        let serialized = serde_json::to_string_pretty(&config).unwrap();
        let parsed: StandConfig = serde_json::from_str(&serialized).unwrap();

        assert_eq!(parsed, config);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = load_config(Some(Path::new("/nonexistent/stand.json")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
