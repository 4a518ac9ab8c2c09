use crate::loader::LoadError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Scenario load configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Treat any diagnostic as a failed load.
    pub fail_on_diagnostics: bool,
    /// How many diagnostics a front end prints before summarizing the rest.
    pub max_reported_diagnostics: usize,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            fail_on_diagnostics: false,
            max_reported_diagnostics: 50,
        }
    }
}

impl LoadConfig {
    /// Reads a JSON config. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, LoadError> {
        let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| LoadError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LoadConfig::default();
        assert!(!config.fail_on_diagnostics);
        assert_eq!(config.max_reported_diagnostics, 50);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "fail_on_diagnostics": true }}"#).unwrap();
        let config = LoadConfig::from_json_file(file.path()).unwrap();
        assert!(config.fail_on_diagnostics);
        assert_eq!(config.max_reported_diagnostics, 50);
    }

    #[test]
    fn test_bad_json_is_config_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = LoadConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Config { .. }));
    }
}
