use thiserror::Error;

use crate::conflict::ConflictError;
use crate::container::ContainerStatus;

pub type Result<T> = std::result::Result<T, DbmError>;

#[derive(Error, Debug)]
pub enum DbmError {
    #[error("配置错误: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("配置校验未通过: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error("容器运行时不可用: {0}")]
    RuntimeUnavailable(String),

    #[error("{operation} 操作失败 ({target}): {message}")]
    Operation {
        operation: String,
        target: String,
        message: String,
    },

    #[error("未知的数据库类型: {0}")]
    UnknownProvider(String),

    #[error("容器不存在: {0}")]
    ContainerNotFound(String),

    #[error("容器 {0} 已有操作正在进行")]
    OperationInProgress(String),

    #[error("容器 {id} 无法从 {from} 切换到 {to}")]
    InvalidTransition {
        id: String,
        from: ContainerStatus,
        to: ContainerStatus,
    },

    #[error("配置文件未找到")]
    ConfigNotFound,

    #[error("自定义错误: {0}")]
    Custom(String),
}

impl DbmError {
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::RuntimeUnavailable(msg.into())
    }

    pub fn operation(
        operation: impl Into<String>,
        target: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Operation {
            operation: operation.into(),
            target: target.into(),
            message: message.into(),
        }
    }

    /// 运行时无法连通时，轮询器据此进入错误状态
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::RuntimeUnavailable(_))
    }
}
