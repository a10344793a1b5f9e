// 容器运行时边界
//
// 同步引擎只通过 `RuntimeBackend` 与运行时交互；默认实现通过 docker 命令行
// 管理容器，并把容器元数据保存在本地 JSON 文件中。

mod docker;
mod store;
mod wire;

#[cfg(test)]
pub(crate) mod mock;

pub use docker::{DockerCliBackend, build_run_args};
pub use store::StateStore;
pub use wire::WireContainer;

use crate::Result;
use crate::container::{Container, RunRequest};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// 运行时守护进程状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeState {
    Running,
    Stopped,
    Error,
    Connecting,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerCounts {
    pub total: u64,
    pub running: u64,
    pub stopped: u64,
}

/// 运行时可用性
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityStatus {
    pub status: RuntimeState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub containers: Option<ContainerCounts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<u64>,
}

impl AvailabilityStatus {
    pub fn running(version: Option<String>) -> Self {
        Self {
            status: RuntimeState::Running,
            error: None,
            version,
            containers: None,
            images: None,
        }
    }

    pub fn stopped(error: impl Into<String>) -> Self {
        Self {
            status: RuntimeState::Stopped,
            error: Some(error.into()),
            version: None,
            containers: None,
            images: None,
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self {
            status: RuntimeState::Error,
            ..Self::stopped(error)
        }
    }

    /// 首次探测完成前的状态
    pub fn connecting() -> Self {
        Self {
            status: RuntimeState::Connecting,
            error: None,
            version: None,
            containers: None,
            images: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == RuntimeState::Running
    }
}

/// 运行时与元数据存储的请求/响应边界
///
/// 所有方法的 `id` 都是本系统分配的容器 ID，而不是运行时的容器 ID。
#[async_trait]
pub trait RuntimeBackend: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Container>>;

    async fn create(&self, request: &RunRequest) -> Result<Container>;

    async fn update(&self, id: &str, request: &RunRequest) -> Result<Container>;

    async fn start(&self, id: &str) -> Result<()>;

    async fn stop(&self, id: &str) -> Result<()>;

    async fn remove(&self, id: &str) -> Result<()>;

    /// 与运行时实际状态对账后返回完整列表
    async fn sync(&self) -> Result<Vec<Container>>;

    async fn availability_status(&self) -> Result<AvailabilityStatus>;
}
