use crate::constants::container::DEFAULT_MAX_CONNECTIONS;
use crate::provider::LaunchDescriptor;
use serde::{Deserialize, Serialize};

/// 容器状态
///
/// `creating` 与 `removing` 只在对应的运行时调用未完成时存在。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerStatus {
    Creating,
    Running,
    Stopped,
    Error,
    Removing,
}

impl ContainerStatus {
    /// 从运行时上报的状态字符串解析
    pub fn from_runtime(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "running" | "up" => ContainerStatus::Running,
            "stopped" | "exited" | "created" | "paused" => ContainerStatus::Stopped,
            "creating" => ContainerStatus::Creating,
            "removing" => ContainerStatus::Removing,
            _ => ContainerStatus::Error,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerStatus::Creating => "creating",
            ContainerStatus::Running => "running",
            ContainerStatus::Stopped => "stopped",
            ContainerStatus::Error => "error",
            ContainerStatus::Removing => "removing",
        }
    }

    /// 获取状态的中文显示名称
    pub fn display_name(&self) -> &'static str {
        match self {
            ContainerStatus::Creating => "创建中",
            ContainerStatus::Running => "运行中",
            ContainerStatus::Stopped => "已停止",
            ContainerStatus::Error => "错误",
            ContainerStatus::Removing => "删除中",
        }
    }

    /// 判断是否为过渡状态
    pub fn is_transient(&self) -> bool {
        matches!(self, ContainerStatus::Creating | ContainerStatus::Removing)
    }

    /// 状态机允许的迁移
    pub fn can_transition_to(&self, next: ContainerStatus) -> bool {
        use ContainerStatus::*;

        matches!(
            (self, next),
            (Creating, Running)
                | (Creating, Error)
                | (Running, Stopped)
                | (Stopped, Running)
                | (Error, Running)
                | (Running, Removing)
                | (Stopped, Removing)
                | (Error, Removing)
        )
    }
}

impl std::fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 已创建的数据库容器
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    /// 本系统分配的稳定标识，与运行时的容器 ID 不同
    pub id: String,
    pub name: String,
    /// 提供者 ID
    pub db_type: String,
    pub version: String,
    pub status: ContainerStatus,
    pub port: u16,
    pub created_at: String,
    pub max_connections: u32,
    /// 运行时分配的容器 ID，容器实际创建后才存在
    pub container_id: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database_name: Option<String>,
    pub persist_data: bool,
    pub enable_auth: bool,
    /// 认证数据库，仅 MongoDB 使用
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_source: Option<String>,
}

impl Container {
    /// 根据创建请求和运行时返回的容器 ID 生成记录
    pub fn from_request(request: &RunRequest, container_id: Option<String>) -> Self {
        let metadata = &request.metadata;
        Self {
            id: metadata.id.clone(),
            name: request.name.clone(),
            db_type: metadata.db_type.clone(),
            version: metadata.version.clone(),
            status: ContainerStatus::Running,
            port: metadata.port,
            created_at: chrono::Utc::now().format("%Y-%m-%d").to_string(),
            max_connections: metadata.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS),
            container_id,
            username: metadata.username.clone(),
            password: Some(metadata.password.clone()),
            database_name: metadata.database_name.clone(),
            persist_data: metadata.persist_data,
            enable_auth: metadata.enable_auth,
            auth_source: metadata.auth_source.clone(),
        }
    }
}

/// 创建/更新容器时随启动参数一起提交的元数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerMetadata {
    pub id: String,
    pub db_type: String,
    pub version: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: String,
    pub database_name: Option<String>,
    pub persist_data: bool,
    pub enable_auth: bool,
    pub max_connections: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_source: Option<String>,
}

/// 提交给运行时的完整请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    pub name: String,
    pub docker_args: LaunchDescriptor,
    pub metadata: ContainerMetadata,
}
