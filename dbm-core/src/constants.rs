/// 同步与可用性轮询的时间常量
pub mod timing {
    /// 容器列表周期同步间隔（秒）
    pub const SYNC_INTERVAL_SECS: u64 = 5;

    /// 运行时可用性轮询间隔（秒）
    pub const AVAILABILITY_INTERVAL_SECS: u64 = 30;

    /// 可用性探测失败后的一次性重试间隔（秒）
    pub const AVAILABILITY_RETRY_SECS: u64 = 10;
}

/// Docker 相关常量
pub mod docker {
    /// 默认 docker 可执行文件
    pub const DEFAULT_BINARY: &str = "docker";

    /// 单次 docker 命令的默认超时（秒）
    pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 120;

    /// 数据卷名后缀，卷名为 `<容器名>-data`
    pub const VOLUME_SUFFIX: &str = "-data";

    /// 卷迁移使用的临时镜像
    pub const MIGRATION_IMAGE: &str = "alpine:latest";

    /// 临时迁移容器名前缀
    pub const MIGRATION_CONTAINER_PREFIX: &str = "temp-migrate-";

    /// 由容器名推导数据卷名
    pub fn volume_name(container_name: &str) -> String {
        format!("{container_name}{VOLUME_SUFFIX}")
    }
}

/// 容器元数据默认值
pub mod container {
    /// 未指定时记录的最大连接数
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 100;

    /// 容器名允许的最大长度
    pub const MAX_NAME_LENGTH: usize = 63;

    /// 容器名规则（与 docker 的命名规则一致）
    pub const NAME_PATTERN: &str = r"^[a-zA-Z0-9][a-zA-Z0-9_.-]*$";
}

/// 配置文件相关常量
pub mod config {
    use std::path::{Path, PathBuf};

    /// 配置文件查找顺序
    pub const CONFIG_FILE_CANDIDATES: &[&str] = &["dbm.toml", ".dbm.toml", "config.toml"];

    /// 默认配置文件名
    pub const DEFAULT_CONFIG_FILE: &str = "dbm.toml";

    /// 数据目录名
    pub const DATA_DIR_NAME: &str = "data";

    /// 容器元数据文件名
    pub const STATE_FILE_NAME: &str = "containers.json";

    /// 获取默认配置文件路径
    pub fn get_config_file_path() -> PathBuf {
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }

    /// 获取默认元数据文件路径（跨平台）
    pub fn get_default_state_file() -> PathBuf {
        Path::new(".").join(DATA_DIR_NAME).join(STATE_FILE_NAME)
    }
}
