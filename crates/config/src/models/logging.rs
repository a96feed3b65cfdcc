use serde::{Deserialize, Serialize};

use crate::validation::ConfigValidator;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: String,
    /// "pretty" 或 "json"
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl ConfigValidator for LogConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        match self.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(crate::ConfigError::Validation(format!(
                    "logging.level is invalid: {other}"
                )))
            }
        }
        match self.format.as_str() {
            "pretty" | "json" => Ok(()),
            other => Err(crate::ConfigError::Validation(format!(
                "logging.format is invalid: {other}"
            ))),
        }
    }
}
