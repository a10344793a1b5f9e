use super::DockerCliBackend;
use crate::conflict::ConflictError;
use crate::provider::LaunchDescriptor;
use crate::{DbmError, Result};
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::debug;

/// 由启动描述生成 `docker run` 参数
///
/// 顺序固定为：端口、数据卷、环境变量（按键排序）、镜像、附加命令。
pub fn build_run_args(name: &str, descriptor: &LaunchDescriptor) -> Vec<String> {
    let mut args = vec![
        "run".to_string(),
        "-d".to_string(),
        "--name".to_string(),
        name.to_string(),
    ];

    for port in &descriptor.ports {
        args.push("-p".to_string());
        args.push(format!("{}:{}", port.host, port.container));
    }

    for volume in &descriptor.volumes {
        args.push("-v".to_string());
        args.push(format!("{}:{}", volume.name, volume.path));
    }

    for (key, value) in &descriptor.env_vars {
        args.push("-e".to_string());
        args.push(format!("{key}={value}"));
    }

    args.push(descriptor.image.clone());
    args.extend(descriptor.command.iter().cloned());

    args
}

/// 把 `docker run` 的错误输出归类为冲突或一般操作错误
pub(crate) fn classify_run_error(operation: &str, name: &str, port: u16, stderr: &str) -> DbmError {
    if stderr.contains("port is already allocated") || stderr.contains("Bind for") {
        return ConflictError::PortInUse { port, holder: None }.into();
    }
    if stderr.contains("is already in use") || stderr.contains("already exists") {
        return ConflictError::NameInUse {
            name: name.to_string(),
        }
        .into();
    }
    DbmError::operation(operation, name, stderr.trim())
}

impl DockerCliBackend {
    /// 执行 docker 命令，超时或无法启动进程视为运行时不可用
    pub(crate) async fn run_docker(&self, args: &[&str]) -> Result<Output> {
        debug!("执行: {} {}", self.binary, args.join(" "));

        let child = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(self.timeout, child).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => Err(DbmError::unavailable(
                format!("找不到 {} 命令，请确认 Docker 已安装", self.binary),
            )),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(DbmError::unavailable(format!(
                "docker {} 超时 ({} 秒)",
                args.first().copied().unwrap_or_default(),
                self.timeout.as_secs()
            ))),
        }
    }

    /// 执行并要求成功，返回去除首尾空白的标准输出
    pub(crate) async fn run_docker_checked(
        &self,
        operation: &str,
        target: &str,
        args: &[&str],
    ) -> Result<String> {
        let output = self.run_docker(args).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DbmError::operation(operation, target, stderr.trim()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// 执行 `docker run`，返回新容器的 ID
    pub(crate) async fn run_container(
        &self,
        name: &str,
        port: u16,
        descriptor: &LaunchDescriptor,
    ) -> Result<String> {
        let args = build_run_args(name, descriptor);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self.run_docker(&args).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_run_error("run", name, port, &stderr));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// 停止并删除容器，容器不存在时不报错
    pub(crate) async fn force_remove(&self, target: &str) -> Result<()> {
        // 停止失败（例如已经停止）不影响删除
        let _ = self.run_docker(&["stop", target]).await;

        let output = self.run_docker(&["rm", target]).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !stderr.contains("No such container") {
                return Err(DbmError::operation("rm", target, stderr.trim()));
            }
        }
        Ok(())
    }
}
