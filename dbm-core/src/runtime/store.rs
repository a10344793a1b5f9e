use super::wire::WireContainer;
use crate::Result;
use crate::container::Container;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    databases: Vec<WireContainer>,
}

/// 容器元数据文件
///
/// 读改写在同一把锁内完成，文件先写临时文件再重命名。
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取全部记录，文件不存在时返回空列表
    pub async fn load(&self) -> Result<Vec<Container>> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    /// 在锁内读取、修改并写回；记录没有变化时不写文件
    pub async fn update<R>(&self, apply: impl FnOnce(&mut Vec<Container>) -> R) -> Result<R> {
        let _guard = self.lock.lock().await;
        let mut records = self.read().await?;
        let before = records.clone();
        let result = apply(&mut records);
        if records != before {
            self.write(&records).await?;
        }
        Ok(result)
    }

    async fn read(&self) -> Result<Vec<Container>> {
        if !tokio::fs::try_exists(&self.path).await? {
            debug!("元数据文件不存在: {}", self.path.display());
            return Ok(Vec::new());
        }
        let content = tokio::fs::read_to_string(&self.path).await?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let file: StateFile = serde_json::from_str(&content)?;
        Ok(file.databases.into_iter().map(Container::from).collect())
    }

    async fn write(&self, records: &[Container]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = StateFile {
            databases: records.iter().cloned().map(WireContainer::from).collect(),
        };
        let content = serde_json::to_string_pretty(&file)?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!("已保存 {} 条容器元数据", records.len());
        Ok(())
    }
}
