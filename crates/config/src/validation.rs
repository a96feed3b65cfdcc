use crate::{ConfigError, ConfigResult};

/// 配置分节的统一校验入口
pub trait ConfigValidator {
    fn validate(&self) -> ConfigResult<()>;
}

pub struct ValidationUtils;

impl ValidationUtils {
    pub fn validate_not_empty(value: &str, field: &str) -> ConfigResult<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{field} must not be empty")));
        }
        Ok(())
    }

    pub fn validate_count(value: usize, field: &str) -> ConfigResult<()> {
        if value == 0 {
            return Err(ConfigError::Validation(format!(
                "{field} must be greater than zero"
            )));
        }
        Ok(())
    }

    pub fn validate_timeout_seconds(value: u64) -> ConfigResult<()> {
        if value == 0 {
            return Err(ConfigError::Validation(
                "timeout seconds must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn validate_bind_address(value: &str, field: &str) -> ConfigResult<()> {
        Self::validate_not_empty(value, field)?;
        if value.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "{field} is not a valid socket address: {value}"
            )));
        }
        Ok(())
    }
}
