// 数据库提供者模块
//
// 每种数据库引擎对应一个提供者：负责字段描述、配置校验、启动参数编译
// 以及连接串生成。编译和校验都是纯函数，不做任何 IO。

mod common;
mod config;
mod descriptor;
mod influxdb;
mod mongodb;
mod mysql;
mod postgres;
mod redis;
pub mod version;


pub use config::ProviderConfig;
pub use descriptor::{LaunchDescriptor, PortMapping, VolumeMount};
pub use influxdb::InfluxDbProvider;
pub use mongodb::MongoDbProvider;
pub use mysql::MySqlProvider;
pub use postgres::PostgresProvider;
pub use redis::RedisProvider;

use crate::container::Container;
use crate::schema::{FieldGroup, FieldOptions, FormField};
use crate::{DbmError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// 配置校验结果，错误按固定顺序排列
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// 转换为错误，供拒绝提交的调用方使用
    pub fn into_result(self) -> Result<()> {
        if self.valid {
            Ok(())
        } else {
            Err(DbmError::Validation(self.errors))
        }
    }
}

/// 提供者的可序列化概要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub default_port: u16,
    pub container_port: u16,
    pub data_path: String,
    pub versions: Vec<String>,
    pub requires_auth: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_username: Option<String>,
}

/// 数据库提供者
///
/// 实现必须是不可变的；注册表以 `Arc<dyn DatabaseProvider>` 共享同一实例。
pub trait DatabaseProvider: Send + Sync + Debug {
    /// 唯一标识，同时作为容器记录中的 `dbType`
    fn id(&self) -> &'static str;

    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn default_port(&self) -> u16;

    /// 容器内监听端口
    fn container_port(&self) -> u16 {
        self.default_port()
    }

    /// 数据卷在容器内的挂载路径（部分引擎按版本线变化）
    fn data_path(&self) -> &'static str;

    /// 可选版本标签，第一个为推荐版本
    fn versions(&self) -> &'static [&'static str];

    /// 基础分区：容器名、端口、版本、持久化
    fn basic_fields(&self, options: FieldOptions) -> Vec<FormField> {
        common::basic_fields(self.default_port(), self.versions(), options)
    }

    fn authentication_fields(&self) -> Vec<FormField>;

    fn advanced_fields(&self) -> Vec<FieldGroup> {
        Vec::new()
    }

    /// 把配置编译为启动描述
    ///
    /// 可选设置只有在填写且不同于镜像默认值时才会出现在结果中。
    fn build_docker_args(&self, config: &ProviderConfig) -> LaunchDescriptor;

    /// 最终业务校验，一次列出所有问题
    fn validate_config(&self, config: &ProviderConfig) -> ValidationResult;

    /// 客户端连接串，缺省的凭据和数据库名使用引擎默认值
    fn connection_string(&self, container: &Container) -> String;

    fn requires_auth(&self) -> bool;

    fn default_username(&self) -> Option<&'static str> {
        None
    }

    /// 连接串中使用的认证数据库，随容器记录保存；未填写时连接串使用引擎默认值
    fn auth_source(&self, _config: &ProviderConfig) -> Option<String> {
        None
    }

    fn default_version(&self) -> &'static str {
        self.versions().first().copied().unwrap_or("latest")
    }

    /// 三个分区的全部字段
    fn all_fields(&self, options: FieldOptions) -> Vec<FormField> {
        let mut fields = self.basic_fields(options);
        fields.extend(self.authentication_fields());
        fields.extend(
            self.advanced_fields()
                .into_iter()
                .flat_map(|group| group.fields),
        );
        fields
    }

    /// 由字段默认值组成的初始配置
    fn default_config(&self) -> ProviderConfig {
        let mut config = ProviderConfig::new();
        for field in self.all_fields(FieldOptions::create()) {
            if let Some(value) = &field.meta().default_value {
                config.set(field.name(), value.clone());
            }
        }
        config
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            id: self.id().to_string(),
            name: self.name().to_string(),
            description: self.description().to_string(),
            default_port: self.default_port(),
            container_port: self.container_port(),
            data_path: self.data_path().to_string(),
            versions: self.versions().iter().map(|v| v.to_string()).collect(),
            requires_auth: self.requires_auth(),
            default_username: self.default_username().map(str::to_string),
        }
    }
}
