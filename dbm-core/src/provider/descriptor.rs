use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 端口映射：主机端口由用户指定，容器端口由提供者固定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    pub host: u16,
    pub container: u16,
}

/// 命名数据卷挂载
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeMount {
    pub name: String,
    pub path: String,
}

/// 与具体运行时无关的容器启动描述
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchDescriptor {
    /// `<仓库>:<版本标签>`
    pub image: String,
    /// 按键排序，保证生成的命令行稳定
    pub env_vars: BTreeMap<String, String>,
    pub ports: Vec<PortMapping>,
    pub volumes: Vec<VolumeMount>,
    /// 追加在镜像入口之后的参数，镜像默认命令足够时为空
    pub command: Vec<String>,
}

impl LaunchDescriptor {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            ..Default::default()
        }
    }

    pub fn env(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        self.env_vars.insert(key.to_string(), value.into());
        self
    }

    pub fn port(&mut self, host: u16, container: u16) -> &mut Self {
        self.ports.push(PortMapping { host, container });
        self
    }

    pub fn volume(&mut self, mount: Option<VolumeMount>) -> &mut Self {
        self.volumes.extend(mount);
        self
    }

    pub fn arg(&mut self, token: impl Into<String>) -> &mut Self {
        self.command.push(token.into());
        self
    }
}
