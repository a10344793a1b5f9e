use crate::container::{Container, ContainerStatus};
use serde::{Deserialize, Serialize};

/// 运行时边界上的容器记录（snake_case）
///
/// 与内部模型一一对应，凭据类字段带 `stored_` 前缀；未知字段在反序列化时忽略。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireContainer {
    pub id: String,
    pub name: String,
    pub db_type: String,
    pub version: String,
    pub status: String,
    pub port: u16,
    pub created_at: String,
    pub max_connections: u32,
    #[serde(default)]
    pub container_id: Option<String>,
    #[serde(default)]
    pub stored_password: Option<String>,
    #[serde(default)]
    pub stored_username: Option<String>,
    #[serde(default)]
    pub stored_database_name: Option<String>,
    #[serde(default)]
    pub stored_persist_data: bool,
    #[serde(default)]
    pub stored_enable_auth: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored_auth_source: Option<String>,
}

impl From<Container> for WireContainer {
    fn from(c: Container) -> Self {
        Self {
            id: c.id,
            name: c.name,
            db_type: c.db_type,
            version: c.version,
            status: c.status.as_str().to_string(),
            port: c.port,
            created_at: c.created_at,
            max_connections: c.max_connections,
            container_id: c.container_id,
            stored_password: c.password,
            stored_username: c.username,
            stored_database_name: c.database_name,
            stored_persist_data: c.persist_data,
            stored_enable_auth: c.enable_auth,
            stored_auth_source: c.auth_source,
        }
    }
}

impl From<WireContainer> for Container {
    fn from(w: WireContainer) -> Self {
        Self {
            id: w.id,
            name: w.name,
            db_type: w.db_type,
            version: w.version,
            status: ContainerStatus::from_runtime(&w.status),
            port: w.port,
            created_at: w.created_at,
            max_connections: w.max_connections,
            container_id: w.container_id,
            username: w.stored_username,
            password: w.stored_password,
            database_name: w.stored_database_name,
            persist_data: w.stored_persist_data,
            enable_auth: w.stored_enable_auth,
            auth_source: w.stored_auth_source,
        }
    }
}
