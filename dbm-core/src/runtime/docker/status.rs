use super::DockerCliBackend;
use crate::Result;
use crate::container::{Container, ContainerStatus};
use crate::runtime::{AvailabilityStatus, ContainerCounts};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// `docker ps -a` 中的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PsEntry {
    pub id: String,
    pub running: bool,
}

pub(crate) const PS_FORMAT: &str = "{{.ID}},{{.Names}},{{.Status}}";

/// 解析 `docker ps -a --format {{.ID}},{{.Names}},{{.Status}}` 的输出，按容器名索引
pub(crate) fn parse_ps_output(stdout: &str) -> HashMap<String, PsEntry> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut parts = line.trim().splitn(3, ',');
            let id = parts.next()?.trim();
            let name = parts.next()?.trim();
            let status = parts.next()?.trim();
            if id.is_empty() || name.is_empty() {
                return None;
            }
            Some((
                name.to_string(),
                PsEntry {
                    id: id.to_string(),
                    running: status.starts_with("Up"),
                },
            ))
        })
        .collect()
}

/// 用运行时的实际状态覆盖记录中的状态和容器 ID
///
/// 运行时中已不存在的容器标记为停止并清空容器 ID。
pub(crate) fn reconcile(records: &mut [Container], actual: &HashMap<String, PsEntry>) {
    for record in records.iter_mut() {
        match actual.get(&record.name) {
            Some(entry) => {
                record.container_id = Some(entry.id.clone());
                record.status = if entry.running {
                    ContainerStatus::Running
                } else {
                    ContainerStatus::Stopped
                };
            }
            None => {
                record.container_id = None;
                record.status = ContainerStatus::Stopped;
            }
        }
    }
}

/// 由 `docker version` 与 `docker info` 的 JSON 输出组装可用性
pub(crate) fn parse_availability(version: &Value, info: Option<&Value>) -> AvailabilityStatus {
    let client_version = version
        .pointer("/Client/Version")
        .and_then(Value::as_str)
        .map(str::to_string);
    let mut status = AvailabilityStatus::running(client_version);

    if let Some(info) = info {
        let count = |key: &str| info.get(key).and_then(Value::as_u64).unwrap_or(0);
        status.containers = Some(ContainerCounts {
            total: count("Containers"),
            running: count("ContainersRunning"),
            stopped: count("ContainersStopped"),
        });
        status.images = Some(count("Images"));
    }

    status
}

impl DockerCliBackend {
    pub(crate) async fn list_runtime_containers(&self) -> Result<HashMap<String, PsEntry>> {
        let stdout = self
            .run_docker_checked("ps", "docker", &["ps", "-a", "--format", PS_FORMAT])
            .await?;
        Ok(parse_ps_output(&stdout))
    }

    pub(crate) async fn probe_availability(&self) -> Result<AvailabilityStatus> {
        if which::which(&self.binary).is_err() {
            return Ok(AvailabilityStatus::stopped(format!(
                "未找到 {}，请确认 Docker 已安装并在 PATH 中",
                self.binary
            )));
        }

        let output = match self.run_docker(&["version", "--format", "json"]).await {
            Ok(output) => output,
            Err(e) if e.is_unavailable() => return Ok(AvailabilityStatus::stopped(e.to_string())),
            Err(e) => return Err(e),
        };
        let version: Option<Value> = output
            .status
            .success()
            .then(|| serde_json::from_slice(&output.stdout).ok())
            .flatten();
        let Some(version) = version else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("docker version 失败: {}", stderr.trim());
            return Ok(AvailabilityStatus::stopped(
                "Docker 守护进程未运行或 Docker 未安装",
            ));
        };

        // info 失败时仍视为可用，只是缺少统计信息
        let info: Option<Value> = match self.run_docker(&["info", "--format", "json"]).await {
            Ok(output) if output.status.success() => serde_json::from_slice(&output.stdout).ok(),
            _ => None,
        };

        Ok(parse_availability(&version, info.as_ref()))
    }
}
