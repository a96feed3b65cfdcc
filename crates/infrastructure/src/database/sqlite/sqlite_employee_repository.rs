use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tracing::{debug, instrument};

use tracker_domain::entities::{Employee, EmployeeFilter};
use tracker_domain::repositories::EmployeeRepository;
use tracker_errors::{TrackerError, TrackerResult};

pub struct SqliteEmployeeRepository {
    pool: SqlitePool,
}

impl SqliteEmployeeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_employee(row: &sqlx::sqlite::SqliteRow) -> TrackerResult<Employee> {
        Ok(Employee {
            id: row.try_get("id")?,
            last_name: row.try_get("last_name")?,
            first_name: row.try_get("first_name")?,
            middle_name: row.try_get("middle_name")?,
            position: row.try_get("position")?,
            department: row.try_get("department")?,
            hired_date: row.try_get("hired_date")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

const EMPLOYEE_COLUMNS: &str =
    "id, last_name, first_name, middle_name, position, department, hired_date, created_at, updated_at";

#[async_trait]
impl EmployeeRepository for SqliteEmployeeRepository {
    #[instrument(skip(self, employee), fields(last_name = %employee.last_name))]
    async fn create(&self, employee: &Employee) -> TrackerResult<Employee> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO employees (last_name, first_name, middle_name, position, department, hired_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {EMPLOYEE_COLUMNS}
            "#,
        ))
        .bind(&employee.last_name)
        .bind(&employee.first_name)
        .bind(&employee.middle_name)
        .bind(&employee.position)
        .bind(&employee.department)
        .bind(employee.hired_date)
        .fetch_one(&self.pool)
        .await?;

        let created = Self::row_to_employee(&row)?;
        debug!("创建员工成功: {}", created.entity_description());
        Ok(created)
    }

    #[instrument(skip(self), fields(employee_id = %id))]
    async fn find_by_id(&self, id: i64) -> TrackerResult<Option<Employee>> {
        let row = sqlx::query(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_employee).transpose()
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> TrackerResult<Vec<Employee>> {
        let rows = sqlx::query(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_employee).collect()
    }

    #[instrument(skip(self, filter))]
    async fn list(&self, filter: &EmployeeFilter) -> TrackerResult<Vec<Employee>> {
        let mut sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE 1=1");
        let mut idx = 0;

        if filter.position.is_some() {
            idx += 1;
            sql.push_str(&format!(" AND position = ${idx}"));
        }
        if filter.department.is_some() {
            idx += 1;
            sql.push_str(&format!(" AND department = ${idx}"));
        }
        if filter.hired_date.is_some() {
            idx += 1;
            sql.push_str(&format!(" AND hired_date = ${idx}"));
        }
        sql.push_str(" ORDER BY id");
        if filter.limit.is_some() {
            idx += 1;
            sql.push_str(&format!(" LIMIT ${idx}"));
        } else if filter.offset.is_some() {
            // SQLite要求OFFSET前必须有LIMIT
            sql.push_str(" LIMIT -1");
        }
        if filter.offset.is_some() {
            idx += 1;
            sql.push_str(&format!(" OFFSET ${idx}"));
        }

        let mut query = sqlx::query(&sql);
        if let Some(position) = &filter.position {
            query = query.bind(position);
        }
        if let Some(department) = &filter.department {
            query = query.bind(department);
        }
        if let Some(hired_date) = filter.hired_date {
            query = query.bind(hired_date);
        }
        if let Some(limit) = filter.limit {
            query = query.bind(limit);
        }
        if let Some(offset) = filter.offset {
            query = query.bind(offset);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(Self::row_to_employee).collect()
    }

    #[instrument(skip(self, filter))]
    async fn count(&self, filter: &EmployeeFilter) -> TrackerResult<i64> {
        let mut sql = String::from("SELECT COUNT(*) AS total FROM employees WHERE 1=1");
        let mut idx = 0;

        if filter.position.is_some() {
            idx += 1;
            sql.push_str(&format!(" AND position = ${idx}"));
        }
        if filter.department.is_some() {
            idx += 1;
            sql.push_str(&format!(" AND department = ${idx}"));
        }
        if filter.hired_date.is_some() {
            idx += 1;
            sql.push_str(&format!(" AND hired_date = ${idx}"));
        }

        let mut query = sqlx::query(&sql);
        if let Some(position) = &filter.position {
            query = query.bind(position);
        }
        if let Some(department) = &filter.department {
            query = query.bind(department);
        }
        if let Some(hired_date) = filter.hired_date {
            query = query.bind(hired_date);
        }

        let row = query.fetch_one(&self.pool).await?;
        Ok(row.try_get("total")?)
    }

    #[instrument(skip(self, employee), fields(employee_id = %employee.id))]
    async fn update(&self, employee: &Employee) -> TrackerResult<Employee> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE employees
            SET last_name = $1, first_name = $2, middle_name = $3, position = $4,
                department = $5, hired_date = $6, updated_at = CURRENT_TIMESTAMP
            WHERE id = $7
            RETURNING {EMPLOYEE_COLUMNS}
            "#,
        ))
        .bind(&employee.last_name)
        .bind(&employee.first_name)
        .bind(&employee.middle_name)
        .bind(&employee.position)
        .bind(&employee.department)
        .bind(employee.hired_date)
        .bind(employee.id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let updated = Self::row_to_employee(&row)?;
                debug!("更新员工成功: {}", updated.entity_description());
                Ok(updated)
            }
            None => Err(TrackerError::employee_not_found(employee.id)),
        }
    }

    #[instrument(skip(self), fields(employee_id = %id))]
    async fn delete(&self, id: i64) -> TrackerResult<bool> {
        // 外键约束 ON DELETE SET NULL 负责清空任务上的 assigned_to
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            debug!("删除员工成功: ID {}", id);
        } else {
            debug!("删除员工不存在: ID {}", id);
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::sqlite::{connect_embedded, run_migrations};
    use chrono::NaiveDate;

    async fn setup() -> SqlitePool {
        let pool = connect_embedded("sqlite::memory:", 1).await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    fn sample_employee() -> Employee {
        let mut employee = Employee::new(
            "Sidorov".to_string(),
            "Alexey".to_string(),
            "Manager".to_string(),
        );
        employee.middle_name = Some("Igorevich".to_string());
        employee.department = Some("Marketing".to_string());
        employee.hired_date = Some(NaiveDate::from_ymd_opt(2022, 2, 1).unwrap());
        employee
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let pool = setup().await;
        let repo = SqliteEmployeeRepository::new(pool);

        let created = repo.create(&sample_employee()).await.unwrap();
        assert!(created.id > 0);

        let found = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.last_name, "Sidorov");
        assert_eq!(found.middle_name.as_deref(), Some("Igorevich"));
        assert_eq!(
            found.hired_date,
            Some(NaiveDate::from_ymd_opt(2022, 2, 1).unwrap())
        );

        assert!(repo.find_by_id(9999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_with_filter() {
        let pool = setup().await;
        let repo = SqliteEmployeeRepository::new(pool);

        repo.create(&sample_employee()).await.unwrap();
        let mut other = sample_employee();
        other.position = "Engineer".to_string();
        other.department = None;
        repo.create(&other).await.unwrap();

        let filter = EmployeeFilter {
            position: Some("Engineer".to_string()),
            ..Default::default()
        };
        let engineers = repo.list(&filter).await.unwrap();
        assert_eq!(engineers.len(), 1);
        assert_eq!(engineers[0].position, "Engineer");

        let all = repo.list(&EmployeeFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let paged = repo
            .list(&EmployeeFilter {
                limit: Some(1),
                offset: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(paged.len(), 1);
        assert_eq!(paged[0].position, "Engineer");
    }

    #[tokio::test]
    async fn test_count_ignores_pagination() {
        let pool = setup().await;
        let repo = SqliteEmployeeRepository::new(pool);

        repo.create(&sample_employee()).await.unwrap();
        let mut other = sample_employee();
        other.position = "Engineer".to_string();
        repo.create(&other).await.unwrap();

        let paged = EmployeeFilter {
            limit: Some(1),
            offset: Some(1),
            ..Default::default()
        };
        assert_eq!(repo.count(&paged).await.unwrap(), 2);

        let filtered = EmployeeFilter {
            position: Some("Engineer".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.count(&filtered).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update() {
        let pool = setup().await;
        let repo = SqliteEmployeeRepository::new(pool);

        let mut employee = repo.create(&sample_employee()).await.unwrap();
        employee.position = "Director".to_string();
        employee.department = None;

        let updated = repo.update(&employee).await.unwrap();
        assert_eq!(updated.position, "Director");
        assert!(updated.department.is_none());
    }

    #[tokio::test]
    async fn test_update_missing_returns_not_found() {
        let pool = setup().await;
        let repo = SqliteEmployeeRepository::new(pool);

        let mut ghost = sample_employee();
        ghost.id = 777;
        let error = repo.update(&ghost).await.unwrap_err();
        assert!(matches!(error, TrackerError::EmployeeNotFound { id: 777 }));
    }

    #[tokio::test]
    async fn test_delete() {
        let pool = setup().await;
        let repo = SqliteEmployeeRepository::new(pool);

        let created = repo.create(&sample_employee()).await.unwrap();
        assert!(repo.delete(created.id).await.unwrap());
        assert!(!repo.delete(created.id).await.unwrap());
        assert!(repo.find_by_id(created.id).await.unwrap().is_none());
    }
}
