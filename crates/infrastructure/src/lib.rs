//! # Tracker Infrastructure
//!
//! 数据访问层实现。通过数据库URL自动选择PostgreSQL或SQLite后端，
//! 两种后端实现同一组领域仓储接口。

pub mod database;

pub use database::manager::{DatabaseManager, DatabasePool, DatabaseType};
pub use database::postgres::{PostgresEmployeeRepository, PostgresTaskRepository};
pub use database::sqlite::{SqliteEmployeeRepository, SqliteTaskRepository};
