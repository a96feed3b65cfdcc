use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::debug;

use tracker_errors::TrackerResult;

mod sqlite_employee_repository;
mod sqlite_task_repository;

pub use sqlite_employee_repository::SqliteEmployeeRepository;
pub use sqlite_task_repository::SqliteTaskRepository;

/// 创建嵌入式SQLite连接池，启用外键约束。
/// 内存库固定使用单连接，多个连接会各自拿到独立的空库。
pub async fn connect_embedded(url: &str, max_connections: u32) -> TrackerResult<SqlitePool> {
    let in_memory = url.contains(":memory:");

    let mut options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);
    if !in_memory {
        options = options.journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(if in_memory { 1 } else { max_connections })
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// 执行SQLite建表迁移
pub async fn run_migrations(pool: &SqlitePool) -> TrackerResult<()> {
    debug!("Running SQLite database migrations");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS employees (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            last_name TEXT NOT NULL,
            first_name TEXT NOT NULL,
            middle_name TEXT,
            position TEXT NOT NULL,
            department TEXT,
            hired_date DATE,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT,
            parent_task_id INTEGER REFERENCES tasks(id) ON DELETE SET NULL,
            assigned_to INTEGER REFERENCES employees(id) ON DELETE SET NULL,
            due_date DATE NOT NULL,
            status TEXT NOT NULL DEFAULT 'new',
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status)",
        "CREATE INDEX IF NOT EXISTS idx_tasks_assigned_to ON tasks(assigned_to)",
        "CREATE INDEX IF NOT EXISTS idx_tasks_parent_task_id ON tasks(parent_task_id)",
        "CREATE INDEX IF NOT EXISTS idx_tasks_due_date ON tasks(due_date)",
        "CREATE INDEX IF NOT EXISTS idx_employees_position ON employees(position)",
        "CREATE INDEX IF NOT EXISTS idx_employees_department ON employees(department)",
    ];
    for index_sql in indexes {
        sqlx::query(index_sql).execute(pool).await?;
    }

    debug!("Successfully completed SQLite database migrations");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Row;

    #[tokio::test]
    async fn test_file_backed_database_persists_across_reconnect() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("tracker.db").display());

        {
            let pool = connect_embedded(&url, 4).await.unwrap();
            run_migrations(&pool).await.unwrap();
            sqlx::query("INSERT INTO employees (last_name, first_name, position) VALUES ('Orlov', 'Oleg', 'Developer')")
                .execute(&pool)
                .await
                .unwrap();
            pool.close().await;
        }

        let pool = connect_embedded(&url, 4).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let row = sqlx::query("SELECT COUNT(*) AS total FROM employees")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(row.try_get::<i64, _>("total").unwrap(), 1);

        let journal = sqlx::query("PRAGMA journal_mode")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(journal.try_get::<String, _>(0).unwrap(), "wal");
    }
}
