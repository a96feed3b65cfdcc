//! # Task Tracker
//!
//! 任务跟踪系统的组装层：加载配置、建立数据库连接、
//! 启动HTTP服务并处理优雅关闭。

pub mod app;
pub mod shutdown;
