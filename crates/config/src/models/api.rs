use serde::{Deserialize, Serialize};

use crate::validation::{ConfigValidator, ValidationUtils};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub bind_address: String,
    pub cors_enabled: bool,
    pub cors_origins: Vec<String>,
    pub request_timeout_seconds: u64,
    pub auth: AuthConfig,
}

/// API密钥认证配置。密钥以SHA-256摘要形式配置，不落盘明文。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    pub enabled: bool,
    /// 允许的API密钥的十六进制SHA-256摘要
    pub api_key_hashes: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            cors_enabled: true,
            cors_origins: vec!["*".to_string()],
            request_timeout_seconds: 30,
            auth: AuthConfig::default(),
        }
    }
}

impl ConfigValidator for ApiConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        ValidationUtils::validate_bind_address(&self.bind_address, "api.bind_address")?;
        ValidationUtils::validate_timeout_seconds(self.request_timeout_seconds)?;

        if self.auth.enabled && self.auth.api_key_hashes.is_empty() {
            return Err(crate::ConfigError::Validation(
                "api.auth.api_key_hashes must not be empty when auth is enabled".to_string(),
            ));
        }
        for hash in &self.auth.api_key_hashes {
            if hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(crate::ConfigError::Validation(format!(
                    "api.auth.api_key_hashes contains an invalid SHA-256 digest: {hash}"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_config_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert!(!config.auth.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_auth_enabled_requires_keys() {
        let mut config = ApiConfig::default();
        config.auth.enabled = true;
        assert!(config.validate().is_err());

        config.auth.api_key_hashes =
            vec!["a665a45920422f9d417e4867efdc4fb8a04a1f3fff1fa07e998e86f7f7a27ae3".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_key_digest_rejected() {
        let mut config = ApiConfig::default();
        config.auth.enabled = true;
        config.auth.api_key_hashes = vec!["not-a-digest".to_string()];
        assert!(config.validate().is_err());
    }
}
