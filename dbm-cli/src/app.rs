use dbm_core::{
    DbmError, Result, config::AppConfig, runtime::DockerCliBackend, runtime::RuntimeBackend,
    service::ContainerService, sync::AvailabilityMonitor,
};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::cli::Commands;
use crate::commands;

pub struct CliApp {
    pub config: AppConfig,
    pub service: ContainerService,
    pub monitor: Arc<AvailabilityMonitor>,
}

impl CliApp {
    /// 使用智能配置查找初始化CLI应用
    pub fn new_with_auto_config() -> Result<Self> {
        Self::from_config(AppConfig::find_and_load_config()?)
    }

    /// 使用指定的配置文件初始化，文件不存在时返回 `ConfigNotFound`
    pub fn new_with_config(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DbmError::ConfigNotFound);
        }
        Self::from_config(AppConfig::load_from_file(path)?)
    }

    fn from_config(config: AppConfig) -> Result<Self> {
        // 确保元数据目录存在
        config.ensure_state_dir()?;

        let backend: Arc<dyn RuntimeBackend> = Arc::new(DockerCliBackend::from_config(&config));
        let service = ContainerService::with_backend(backend.clone());
        let monitor = Arc::new(AvailabilityMonitor::new(backend, config.timings()));
        debug!("元数据文件: {}", config.state_file_path().display());

        Ok(Self {
            config,
            service,
            monitor,
        })
    }

    /// 运行应用命令
    pub async fn run(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Init { .. } => Ok(()), // 已经在 main.rs 中处理
            Commands::Providers => commands::run_providers(self),
            Commands::Fields {
                db_type,
                edit,
                json,
            } => commands::run_fields(self, &db_type, edit, json),
            Commands::Validate { db_type, config } => {
                commands::run_validate(self, &db_type, &config)
            }
            Commands::Compile { db_type, config } => {
                commands::run_compile(self, &db_type, &config)
            }
            Commands::Create { db_type, config } => {
                commands::run_create(self, &db_type, &config).await
            }
            Commands::Update { id, config } => commands::run_update(self, &id, &config).await,
            Commands::List { json } => commands::run_list(self, json).await,
            Commands::Start { id } => commands::run_start(self, &id).await,
            Commands::Stop { id } => commands::run_stop(self, &id).await,
            Commands::Rm { id } => commands::run_remove(self, &id).await,
            Commands::Connection { id } => commands::run_connection(self, &id).await,
            Commands::Status => commands::run_status(self).await,
            Commands::Watch => commands::run_watch(self).await,
        }
    }
}
