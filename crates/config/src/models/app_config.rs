use std::path::Path;

use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use super::{api::ApiConfig, database::DatabaseConfig, logging::LogConfig};
use crate::validation::ConfigValidator;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub logging: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgresql://localhost/tracker".to_string(),
                max_connections: 10,
                min_connections: 1,
                connection_timeout_seconds: 30,
                idle_timeout_seconds: 600,
            },
            api: ApiConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

impl AppConfig {
    /// 加载配置: TOML文件 + TRACKER前缀的环境变量覆盖。
    /// 未指定路径时按默认位置查找，找不到则使用默认值。
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
        } else {
            let default_paths = [
                "config/tracker.toml",
                "tracker.toml",
                "/etc/tracker/config.toml",
            ];
            for path in &default_paths {
                if Path::new(path).exists() {
                    builder = builder.add_source(File::new(path, FileFormat::Toml));
                    break;
                }
            }
        }

        let defaults = AppConfig::default();
        builder = builder
            .set_default("database.url", defaults.database.url)?
            .set_default("database.max_connections", defaults.database.max_connections)?
            .set_default("database.min_connections", defaults.database.min_connections)?
            .set_default(
                "database.connection_timeout_seconds",
                defaults.database.connection_timeout_seconds,
            )?
            .set_default(
                "database.idle_timeout_seconds",
                defaults.database.idle_timeout_seconds,
            )?
            .set_default("api.bind_address", defaults.api.bind_address)?
            .set_default("api.cors_enabled", defaults.api.cors_enabled)?
            .set_default("api.cors_origins", defaults.api.cors_origins)?
            .set_default(
                "api.request_timeout_seconds",
                defaults.api.request_timeout_seconds,
            )?
            .set_default("api.auth.enabled", defaults.api.auth.enabled)?
            .set_default(
                "api.auth.api_key_hashes",
                defaults.api.auth.api_key_hashes,
            )?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.format", defaults.logging.format)?;

        builder = builder.add_source(
            Environment::with_prefix("TRACKER")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("解析配置失败")?;

        config.validate_all().map_err(|e| anyhow::anyhow!("{e}"))?;

        Ok(config)
    }

    /// 嵌入式默认配置: 本地SQLite，所有组件单进程运行
    pub fn embedded_default() -> Self {
        Self {
            database: DatabaseConfig::embedded_default(),
            api: ApiConfig::default(),
            logging: LogConfig::default(),
        }
    }

    pub fn validate_all(&self) -> crate::ConfigResult<()> {
        self.database.validate()?;
        self.api.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate_all().is_ok());
        assert_eq!(config.api.bind_address, "127.0.0.1:8080");
        assert!(!config.api.auth.enabled);
    }

    #[test]
    fn test_embedded_default_uses_sqlite() {
        let config = AppConfig::embedded_default();
        assert_eq!(config.database.url, "sqlite:tracker.db");
        assert_eq!(config.database.max_connections, 5);
        assert!(config.validate_all().is_ok());
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let result = AppConfig::load(Some("/nonexistent/tracker.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[database]
url = "sqlite::memory:"
max_connections = 2

[api]
bind_address = "127.0.0.1:9901"

[logging]
level = "debug"
"#
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path().to_str().unwrap())).unwrap();
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.database.max_connections, 2);
        // 未指定的字段回落到默认值
        assert_eq!(config.database.min_connections, 1);
        assert_eq!(config.api.bind_address, "127.0.0.1:9901");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "pretty");
    }
}
