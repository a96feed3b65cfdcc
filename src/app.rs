use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::{net::TcpListener, sync::broadcast};
use tracing::info;

use tracker_api::create_app;
use tracker_config::AppConfig;
use tracker_domain::repositories::{EmployeeRepository, TaskRepository};
use tracker_infrastructure::DatabaseManager;

/// 主应用程序：组装数据库、仓储与HTTP服务
pub struct Application {
    config: AppConfig,
    database: DatabaseManager,
    employee_repo: Arc<dyn EmployeeRepository>,
    task_repo: Arc<dyn TaskRepository>,
}

impl Application {
    pub async fn new(config: AppConfig) -> Result<Self> {
        info!("初始化应用程序，数据库: {}", config.database.url);

        let database = DatabaseManager::new(
            &config.database.url,
            config.database.max_connections,
        )
        .await
        .context("初始化数据库失败")?;

        let (employee_repo, task_repo) = database.repositories();

        Ok(Self {
            config,
            database,
            employee_repo,
            task_repo,
        })
    }

    /// 运行HTTP服务，直到收到关闭信号
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        let app = create_app(
            self.employee_repo.clone(),
            self.task_repo.clone(),
            &self.config.api,
        );

        let bind_address = &self.config.api.bind_address;
        let listener = TcpListener::bind(bind_address)
            .await
            .with_context(|| format!("绑定地址失败: {bind_address}"))?;

        info!("HTTP服务已启动: http://{bind_address}");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("HTTP服务收到关闭信号");
            })
            .await
            .context("HTTP服务异常退出")?;

        self.database.close().await;
        info!("数据库连接已关闭");
        Ok(())
    }
}
