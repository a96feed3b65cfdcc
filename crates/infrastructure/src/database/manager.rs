use std::sync::Arc;

use tracker_domain::repositories::{EmployeeRepository, TaskRepository};
use tracker_errors::{TrackerError, TrackerResult};

use super::postgres::{self, PostgresEmployeeRepository, PostgresTaskRepository};
use super::sqlite::{self, SqliteEmployeeRepository, SqliteTaskRepository};

/// 数据库类型，根据URL自动识别
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseType {
    PostgreSQL,
    SQLite,
}

impl DatabaseType {
    pub fn from_url(url: &str) -> Self {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            DatabaseType::PostgreSQL
        } else {
            DatabaseType::SQLite
        }
    }
}

/// 数据库连接池
pub enum DatabasePool {
    PostgreSQL(sqlx::PgPool),
    SQLite(sqlx::SqlitePool),
}

impl DatabasePool {
    /// 根据URL创建连接池并自动识别后端
    pub async fn new(url: &str, max_connections: u32) -> TrackerResult<Self> {
        match DatabaseType::from_url(url) {
            DatabaseType::PostgreSQL => {
                let pool = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(max_connections)
                    .connect(url)
                    .await
                    .map_err(TrackerError::Database)?;
                Ok(DatabasePool::PostgreSQL(pool))
            }
            DatabaseType::SQLite => {
                let pool = sqlite::connect_embedded(url, max_connections).await?;
                Ok(DatabasePool::SQLite(pool))
            }
        }
    }

    pub fn database_type(&self) -> DatabaseType {
        match self {
            DatabasePool::PostgreSQL(_) => DatabaseType::PostgreSQL,
            DatabasePool::SQLite(_) => DatabaseType::SQLite,
        }
    }

    /// 执行建表迁移
    pub async fn migrate(&self) -> TrackerResult<()> {
        match self {
            DatabasePool::PostgreSQL(pool) => postgres::run_migrations(pool).await,
            DatabasePool::SQLite(pool) => sqlite::run_migrations(pool).await,
        }
    }

    pub async fn health_check(&self) -> TrackerResult<()> {
        match self {
            DatabasePool::PostgreSQL(pool) => {
                sqlx::query("SELECT 1")
                    .execute(pool)
                    .await
                    .map_err(TrackerError::Database)?;
            }
            DatabasePool::SQLite(pool) => {
                sqlx::query("SELECT 1")
                    .execute(pool)
                    .await
                    .map_err(TrackerError::Database)?;
            }
        }
        Ok(())
    }

    pub async fn close(&self) {
        match self {
            DatabasePool::PostgreSQL(pool) => pool.close().await,
            DatabasePool::SQLite(pool) => pool.close().await,
        }
    }

    /// 构建当前后端对应的仓储实例
    pub fn build_repositories(&self) -> (Arc<dyn EmployeeRepository>, Arc<dyn TaskRepository>) {
        match self {
            DatabasePool::PostgreSQL(pool) => (
                Arc::new(PostgresEmployeeRepository::new(pool.clone())),
                Arc::new(PostgresTaskRepository::new(pool.clone())),
            ),
            DatabasePool::SQLite(pool) => (
                Arc::new(SqliteEmployeeRepository::new(pool.clone())),
                Arc::new(SqliteTaskRepository::new(pool.clone())),
            ),
        }
    }
}

/// 统一的数据库管理器
pub struct DatabaseManager {
    pool: DatabasePool,
}

impl DatabaseManager {
    /// 创建管理器并完成迁移
    pub async fn new(url: &str, max_connections: u32) -> TrackerResult<Self> {
        let pool = DatabasePool::new(url, max_connections).await?;
        pool.migrate().await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    pub fn repositories(&self) -> (Arc<dyn EmployeeRepository>, Arc<dyn TaskRepository>) {
        self.pool.build_repositories()
    }

    pub async fn health_check(&self) -> TrackerResult<()> {
        self.pool.health_check().await
    }

    pub async fn close(&self) {
        self.pool.close().await
    }
}
