use super::DockerCliBackend;
use crate::constants::docker::{MIGRATION_CONTAINER_PREFIX, MIGRATION_IMAGE};
use crate::{DbmError, Result};
use tracing::{debug, info};

impl DockerCliBackend {
    pub(crate) async fn volume_exists(&self, volume: &str) -> Result<bool> {
        let output = self.run_docker(&["volume", "inspect", volume]).await?;
        Ok(output.status.success())
    }

    pub(crate) async fn create_volume_if_needed(&self, volume: &str) -> Result<()> {
        if self.volume_exists(volume).await? {
            debug!("数据卷已存在: {}", volume);
            return Ok(());
        }
        self.run_docker_checked("volume create", volume, &["volume", "create", volume])
            .await?;
        debug!("已创建数据卷: {}", volume);
        Ok(())
    }

    pub(crate) async fn remove_volume_if_exists(&self, volume: &str) -> Result<()> {
        if !self.volume_exists(volume).await? {
            return Ok(());
        }
        let output = self.run_docker(&["volume", "rm", volume]).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !stderr.contains("No such volume") {
                return Err(DbmError::operation("volume rm", volume, stderr.trim()));
            }
        }
        debug!("已删除数据卷: {}", volume);
        Ok(())
    }

    /// 用临时容器把旧数据卷的内容复制到新数据卷
    ///
    /// 旧数据卷不存在时什么也不做；旧数据卷由调用方在新容器启动后删除。
    pub(crate) async fn migrate_volume(&self, old_volume: &str, new_volume: &str) -> Result<()> {
        if !self.volume_exists(old_volume).await? {
            debug!("旧数据卷不存在，跳过迁移: {}", old_volume);
            return Ok(());
        }
        self.create_volume_if_needed(new_volume).await?;

        info!("迁移数据卷: {} -> {}", old_volume, new_volume);
        let helper = format!("{MIGRATION_CONTAINER_PREFIX}{}", uuid::Uuid::new_v4());
        let old_mount = format!("{old_volume}:/old_data");
        let new_mount = format!("{new_volume}:/new_data");

        self.run_docker_checked(
            "volume migrate",
            old_volume,
            &[
                "create",
                "--name",
                &helper,
                "-v",
                &old_mount,
                "-v",
                &new_mount,
                MIGRATION_IMAGE,
                "sh",
                "-c",
                "cp -a /old_data/. /new_data/",
            ],
        )
        .await?;

        let copied = self
            .run_docker_checked("volume migrate", old_volume, &["start", "-a", &helper])
            .await;

        // 临时容器无论成功与否都要清理
        let _ = self.run_docker(&["rm", "-f", &helper]).await;

        copied.map(|_| ())
    }
}
