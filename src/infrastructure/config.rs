//! TOML configuration.
//!
//! ```toml
//! error_log = "error_log.txt"
//!
//! [extract]
//! parse_classes = true
//! parse_functions = true
//!
//! [layout]
//! canvas_width = 4000.0
//! canvas_height = 4000.0
//! max_iterations = 50
//! damping = 0.1
//! min_distance = 0.01
//! overlap_nudge = 10.0
//! ```
//!
//! Every key is optional; missing keys take the defaults above.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::diagnostics::DEFAULT_ERROR_LOG;
use crate::domain::{ExtractOptions, LayoutParams};
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub error_log: PathBuf,
    pub extract: ExtractOptions,
    pub layout: LayoutParams,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            error_log: PathBuf::from(DEFAULT_ERROR_LOG),
            extract: ExtractOptions::default(),
            layout: LayoutParams::default(),
        }
    }
}

impl AppConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(AppConfig::from_toml("").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let config = AppConfig::from_toml(
            r#"
error_log = "diag.log"

[extract]
parse_classes = false

[layout]
max_iterations = 5
canvas_width = 2000.0
"#,
        )
        .unwrap();
        assert_eq!(config.error_log, PathBuf::from("diag.log"));
        assert!(!config.extract.parse_classes);
        assert!(config.extract.parse_functions);
        assert_eq!(config.layout.max_iterations, 5);
        assert_eq!(config.layout.canvas_width, 2000.0);
        assert_eq!(config.layout.canvas_height, 4000.0);
    }

    #[test]
    fn test_malformed_config() {
        let err = AppConfig::from_toml("[layout]\nmax_iterations = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = AppConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
