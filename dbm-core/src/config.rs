use crate::constants::{config, docker, timing};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 应用配置结构
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    pub docker: DockerConfig,
    pub storage: StorageConfig,
    pub monitor: MonitorConfig,
}

/// Docker相关配置
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DockerConfig {
    pub binary: String,
    pub command_timeout_secs: u64,
}

/// 元数据存储配置
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StorageConfig {
    pub state_file: String,
}

/// 轮询相关配置
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MonitorConfig {
    pub sync_interval_secs: u64,
    pub availability_interval_secs: u64,
    pub availability_retry_secs: u64,
}

/// 周期任务使用的时间参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorTimings {
    pub sync_interval: Duration,
    pub availability_interval: Duration,
    pub availability_retry: Duration,
}

impl Default for MonitorTimings {
    fn default() -> Self {
        Self {
            sync_interval: Duration::from_secs(timing::SYNC_INTERVAL_SECS),
            availability_interval: Duration::from_secs(timing::AVAILABILITY_INTERVAL_SECS),
            availability_retry: Duration::from_secs(timing::AVAILABILITY_RETRY_SECS),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            docker: DockerConfig {
                binary: docker::DEFAULT_BINARY.to_string(),
                command_timeout_secs: docker::DEFAULT_COMMAND_TIMEOUT_SECS,
            },
            storage: StorageConfig {
                state_file: config::get_default_state_file()
                    .to_string_lossy()
                    .to_string(),
            },
            monitor: MonitorConfig {
                sync_interval_secs: timing::SYNC_INTERVAL_SECS,
                availability_interval_secs: timing::AVAILABILITY_INTERVAL_SECS,
                availability_retry_secs: timing::AVAILABILITY_RETRY_SECS,
            },
        }
    }
}

impl AppConfig {
    /// 智能查找并加载配置文件
    /// 按优先级查找：dbm.toml -> .dbm.toml -> config.toml
    pub fn find_and_load_config() -> Result<Self> {
        for config_file in config::CONFIG_FILE_CANDIDATES {
            if Path::new(config_file).exists() {
                tracing::info!("找到配置文件: {}", config_file);
                return Self::load_from_file(config_file);
            }
        }

        // 如果没找到配置文件，创建默认配置
        tracing::warn!("未找到配置文件，创建默认配置: {}", config::DEFAULT_CONFIG_FILE);
        let default_config = Self::default();
        default_config.save_to_file(config::DEFAULT_CONFIG_FILE)?;
        Ok(default_config)
    }

    /// 从指定文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&content)?;

        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_toml_with_comments();
        fs::write(&path, content)?;
        Ok(())
    }

    /// 生成带注释的TOML配置
    fn to_toml_with_comments(&self) -> String {
        const TEMPLATE: &str = include_str!("../templates/config.toml.template");

        TEMPLATE
            .replace("{docker_binary}", &self.docker.binary)
            .replace(
                "{command_timeout_secs}",
                &self.docker.command_timeout_secs.to_string(),
            )
            .replace("{state_file}", &self.storage.state_file)
            .replace(
                "{sync_interval_secs}",
                &self.monitor.sync_interval_secs.to_string(),
            )
            .replace(
                "{availability_interval_secs}",
                &self.monitor.availability_interval_secs.to_string(),
            )
            .replace(
                "{availability_retry_secs}",
                &self.monitor.availability_retry_secs.to_string(),
            )
    }

    /// 确保元数据文件所在目录存在
    pub fn ensure_state_dir(&self) -> Result<()> {
        if let Some(parent) = self.state_file_path().parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// 获取元数据文件路径
    pub fn state_file_path(&self) -> PathBuf {
        PathBuf::from(&self.storage.state_file)
    }

    /// 获取轮询时间参数，0 值回退到默认值
    pub fn timings(&self) -> MonitorTimings {
        let defaults = MonitorTimings::default();
        let secs_or = |secs: u64, fallback: Duration| {
            if secs == 0 {
                fallback
            } else {
                Duration::from_secs(secs)
            }
        };

        MonitorTimings {
            sync_interval: secs_or(self.monitor.sync_interval_secs, defaults.sync_interval),
            availability_interval: secs_or(
                self.monitor.availability_interval_secs,
                defaults.availability_interval,
            ),
            availability_retry: secs_or(
                self.monitor.availability_retry_secs,
                defaults.availability_retry,
            ),
        }
    }

    /// 单次 docker 命令超时
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.docker.command_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_template_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dbm.toml");

        let mut config = AppConfig::default();
        config.monitor.sync_interval_secs = 7;
        config.storage.state_file = "/tmp/dbm/containers.json".to_string();
        config.save_to_file(&path).unwrap();

        let loaded = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_zero_interval_falls_back_to_default() {
        let mut config = AppConfig::default();
        config.monitor.availability_retry_secs = 0;

        let timings = config.timings();
        assert_eq!(timings.availability_retry, Duration::from_secs(10));
        assert_eq!(timings.sync_interval, Duration::from_secs(5));
        assert_eq!(timings.availability_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[docker\nbinary = ").unwrap();

        let err = AppConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, crate::DbmError::Config(_)));
    }
}
