// Docker 命令行运行时
//
// 通过 docker CLI 创建和管理容器，元数据（凭据、持久化选项等 docker 本身不保存的信息）
// 写入本地状态文件。

mod command;
mod status;
mod volume;

pub use command::build_run_args;

use super::store::StateStore;
use super::{AvailabilityStatus, RuntimeBackend};
use crate::config::AppConfig;
use crate::constants::docker::volume_name;
use crate::container::{Container, ContainerStatus, RunRequest};
use crate::{DbmError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug)]
pub struct DockerCliBackend {
    binary: String,
    timeout: Duration,
    store: StateStore,
}

impl DockerCliBackend {
    pub fn new(binary: impl Into<String>, timeout: Duration, state_file: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout,
            store: StateStore::new(state_file),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.docker.binary.clone(),
            config.command_timeout(),
            config.state_file_path(),
        )
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    async fn find_record(&self, id: &str) -> Result<Container> {
        self.store
            .load()
            .await?
            .into_iter()
            .find(|c| c.id == id)
            .ok_or_else(|| DbmError::ContainerNotFound(id.to_string()))
    }

    /// 已创建的容器才有运行时 ID
    async fn runtime_id(&self, id: &str) -> Result<(Container, String)> {
        let record = self.find_record(id).await?;
        let runtime_id = record.container_id.clone().ok_or_else(|| {
            DbmError::operation("start/stop", &record.name, "容器尚未在 Docker 中创建")
        })?;
        Ok((record, runtime_id))
    }

    async fn set_status(&self, id: &str, status: ContainerStatus) -> Result<()> {
        self.store
            .update(|records| {
                if let Some(record) = records.iter_mut().find(|c| c.id == id) {
                    record.status = status;
                }
            })
            .await
    }

    /// 失败时清理半成品容器及本次新建的数据卷
    async fn cleanup_failed_run(&self, name: &str, volumes: &[String]) {
        if let Err(e) = self.force_remove(name).await {
            warn!("清理失败的容器 {} 时出错: {}", name, e);
        }
        for volume in volumes {
            if let Err(e) = self.remove_volume_if_exists(volume).await {
                warn!("清理数据卷 {} 时出错: {}", volume, e);
            }
        }
    }

    /// 重建容器：名称、端口或持久化选项发生变化时调用
    async fn recreate(&self, existing: &Container, request: &RunRequest) -> Result<String> {
        let metadata = &request.metadata;
        let name_changed = request.name != existing.name;
        let old_volume = volume_name(&existing.name);
        let new_volumes: Vec<String> = request
            .docker_args
            .volumes
            .iter()
            .map(|v| v.name.clone())
            .collect();

        if let Some(runtime_id) = &existing.container_id {
            self.force_remove(runtime_id).await?;
        }

        // 只有本次新建的空数据卷可以在失败时删除
        let mut fresh_volumes = Vec::new();
        let mut retire_old_volume = false;
        match (existing.persist_data, metadata.persist_data) {
            (true, true) if name_changed => {
                for volume in &new_volumes {
                    self.migrate_volume(&old_volume, volume).await?;
                }
                retire_old_volume = true;
            }
            (false, true) => {
                for volume in &new_volumes {
                    self.create_volume_if_needed(volume).await?;
                    fresh_volumes.push(volume.clone());
                }
            }
            (true, false) => {
                self.remove_volume_if_exists(&old_volume).await?;
            }
            _ => {}
        }

        let runtime_id = match self
            .run_container(&request.name, metadata.port, &request.docker_args)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                self.cleanup_failed_run(&request.name, &fresh_volumes).await;
                return Err(e);
            }
        };

        if retire_old_volume {
            if let Err(e) = self.remove_volume_if_exists(&old_volume).await {
                warn!("删除旧数据卷 {} 失败: {}", old_volume, e);
            }
        }

        Ok(runtime_id)
    }
}

#[async_trait]
impl RuntimeBackend for DockerCliBackend {
    /// 读取元数据并尽量与 docker 对账；docker 不可达时返回已保存的记录
    async fn get_all(&self) -> Result<Vec<Container>> {
        match self.sync().await {
            Ok(records) => Ok(records),
            Err(e) if e.is_unavailable() => {
                warn!("无法连接 Docker，返回已保存的容器记录: {}", e);
                self.store.load().await
            }
            Err(e) => Err(e),
        }
    }

    async fn create(&self, request: &RunRequest) -> Result<Container> {
        let volumes: Vec<String> = request
            .docker_args
            .volumes
            .iter()
            .map(|v| v.name.clone())
            .collect();
        for volume in &volumes {
            self.create_volume_if_needed(volume).await?;
        }

        let runtime_id = match self
            .run_container(&request.name, request.metadata.port, &request.docker_args)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                self.cleanup_failed_run(&request.name, &volumes).await;
                return Err(e);
            }
        };

        let container = Container::from_request(request, Some(runtime_id.clone()));
        let saved = self
            .store
            .update(|records| {
                records.retain(|c| c.id != container.id);
                records.push(container.clone());
            })
            .await;

        if let Err(e) = saved {
            // 元数据无法保存时撤销创建，避免出现无人管理的容器
            self.cleanup_failed_run(&runtime_id, &volumes).await;
            return Err(e);
        }

        info!("已创建容器 {} ({})", container.name, container.db_type);
        Ok(container)
    }

    async fn update(&self, id: &str, request: &RunRequest) -> Result<Container> {
        let existing = self.find_record(id).await?;
        let metadata = &request.metadata;
        let needs_recreation = request.name != existing.name
            || metadata.port != existing.port
            || metadata.persist_data != existing.persist_data;

        let mut updated = existing.clone();
        if needs_recreation {
            let runtime_id = self.recreate(&existing, request).await?;
            updated.name = request.name.clone();
            updated.port = metadata.port;
            updated.version = metadata.version.clone();
            updated.container_id = Some(runtime_id);
            updated.status = ContainerStatus::Running;
            updated.persist_data = metadata.persist_data;
            updated.enable_auth = metadata.enable_auth;
            updated.password = Some(metadata.password.clone());
            updated.username = metadata.username.clone();
            updated.database_name = metadata.database_name.clone();
        }
        if let Some(max) = metadata.max_connections {
            updated.max_connections = max;
        }
        updated.auth_source = metadata.auth_source.clone();

        self.store
            .update(|records| match records.iter_mut().find(|c| c.id == id) {
                Some(record) => *record = updated.clone(),
                None => records.push(updated.clone()),
            })
            .await?;

        info!(
            "已更新容器 {}{}",
            updated.name,
            if needs_recreation { "（已重建）" } else { "" }
        );
        Ok(updated)
    }

    async fn start(&self, id: &str) -> Result<()> {
        let (record, runtime_id) = self.runtime_id(id).await?;
        self.run_docker_checked("start", &record.name, &["start", &runtime_id])
            .await?;
        self.set_status(id, ContainerStatus::Running).await
    }

    async fn stop(&self, id: &str) -> Result<()> {
        let (record, runtime_id) = self.runtime_id(id).await?;
        self.run_docker_checked("stop", &record.name, &["stop", &runtime_id])
            .await?;
        self.set_status(id, ContainerStatus::Stopped).await
    }

    async fn remove(&self, id: &str) -> Result<()> {
        let record = self.find_record(id).await?;
        if let Some(runtime_id) = &record.container_id {
            self.force_remove(runtime_id).await?;
        }
        if record.persist_data {
            self.remove_volume_if_exists(&volume_name(&record.name))
                .await?;
        }
        self.store.update(|records| records.retain(|c| c.id != id)).await?;
        info!("已删除容器 {}", record.name);
        Ok(())
    }

    async fn sync(&self) -> Result<Vec<Container>> {
        let actual = self.list_runtime_containers().await?;
        self.store
            .update(|records| {
                status::reconcile(records, &actual);
                records.clone()
            })
            .await
    }

    async fn availability_status(&self) -> Result<AvailabilityStatus> {
        self.probe_availability().await
    }
}
