use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub position: String,
    pub department: Option<String>,
    pub hired_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    pub fn new(last_name: String, first_name: String, position: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // 将由数据库生成
            last_name,
            first_name,
            middle_name: None,
            position,
            department: None,
            hired_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// 格式: "姓 名 中间名"，空的部分省略
    pub fn full_name(&self) -> String {
        let mut parts = vec![self.last_name.as_str(), self.first_name.as_str()];
        if let Some(middle) = self.middle_name.as_deref() {
            if !middle.is_empty() {
                parts.push(middle);
            }
        }
        parts.join(" ")
    }

    /// 显示标签，重要任务接口中用来标识候选员工
    pub fn display_label(&self) -> String {
        format!("{}. ID:{}", self.full_name(), self.id)
    }

    pub fn entity_description(&self) -> String {
        format!("员工 '{}' (ID: {}, 职位: {})", self.full_name(), self.id, self.position)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub parent_task_id: Option<i64>,
    pub assigned_to: Option<i64>,
    pub due_date: NaiveDate,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(name: String, due_date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // 将由数据库生成
            name,
            description: None,
            parent_task_id: None,
            assigned_to: None,
            due_date,
            status: TaskStatus::New,
            created_at: now,
            updated_at: now,
        }
    }
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
    pub fn has_parent(&self) -> bool {
        self.parent_task_id.is_some()
    }
    pub fn entity_description(&self) -> String {
        format!("任务 '{}' (ID: {}, 状态: {})", self.name, self.id, self.status.as_str())
    }
}

/// 任务状态，封闭集合，与数据库中的字符串值一一对应
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    #[serde(rename = "new")]
    New,
    #[serde(rename = "in_progress")]
    InProgress,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "on_hold")]
    OnHold,
    #[serde(rename = "canceled")]
    Canceled,
    #[serde(rename = "overdue")]
    Overdue,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::New => "new",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::OnHold => "on_hold",
            TaskStatus::Canceled => "canceled",
            TaskStatus::Overdue => "overdue",
        }
    }

    /// 活跃状态: 尚未完成、未搁置的任务
    pub fn is_active(&self) -> bool {
        matches!(self, TaskStatus::New | TaskStatus::InProgress)
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(TaskStatus::New),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "on_hold" => Ok(TaskStatus::OnHold),
            "canceled" => Ok(TaskStatus::Canceled),
            "overdue" => Ok(TaskStatus::Overdue),
            _ => Err(format!("Invalid task status: {s}")),
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl sqlx::Type<sqlx::Postgres> for TaskStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        sqlx::postgres::PgTypeInfo::with_name("VARCHAR")
    }
}

impl sqlx::Type<sqlx::Sqlite> for TaskStatus {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <str as sqlx::Type<sqlx::Sqlite>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for TaskStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        s.parse().map_err(Into::into)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for TaskStatus {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        s.parse().map_err(Into::into)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for TaskStatus {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode(self.as_str(), buf)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for TaskStatus {
    fn encode_by_ref(
        &self,
        args: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <&str as sqlx::Encode<sqlx::Sqlite>>::encode(self.as_str(), args)
    }
}

/// 员工列表查询的等值过滤条件
#[derive(Debug, Clone, Default)]
pub struct EmployeeFilter {
    pub position: Option<String>,
    pub department: Option<String>,
    pub hired_date: Option<NaiveDate>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// 任务列表查询的过滤条件
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub assigned_to: Option<i64>,
    pub status: Option<TaskStatus>,
    pub parent_task_id: Option<i64>,
    pub due_date: Option<NaiveDate>,
    /// 是否拥有子任务
    pub has_subtasks: Option<bool>,
    /// 是否拥有父任务
    pub has_parent: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
