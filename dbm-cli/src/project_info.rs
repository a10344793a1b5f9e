/// DBM CLI 项目信息模块
///
/// dbm-cli 是面向用户的主程序，项目元数据统一在这里定义

/// 项目元数据（自动从 dbm-cli 的 Cargo.toml 同步）
pub mod metadata {
    /// 项目名称（自动从 Cargo.toml 同步）
    pub const PROJECT_NAME: &str = env!("CARGO_PKG_NAME");

    /// 项目描述（自动从 Cargo.toml 同步）
    pub const PROJECT_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

    /// 项目作者（自动从 Cargo.toml 同步）
    pub const PROJECT_AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

    /// 用户友好的显示名称（手动维护）
    pub mod display {
        /// CLI 工具的完整名称
        pub const CLI_FULL_NAME: &str = "DBM CLI";

        /// 项目详细描述
        pub const DESCRIPTION_LONG: &str = "在本机 Docker 上创建和管理开发用数据库容器：PostgreSQL、MySQL、Redis、MongoDB、InfluxDB。\n支持配置校验、启动参数预览、端口/名称冲突检测，以及容器状态与 Docker 可用性的持续监控。";
    }
}

/// 版本信息
pub mod version_info {
    /// CLI 版本（自动从 Cargo.toml 同步）
    pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");
}

/// 获取版本信息字符串
pub fn get_version_string() -> String {
    format!(
        "{} v{}",
        metadata::display::CLI_FULL_NAME,
        version_info::CLI_VERSION
    )
}
