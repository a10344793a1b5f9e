use crate::cli::ConfigArgs;
use dbm_core::provider::ProviderConfig;
use dbm_core::{DbmError, Result};
use serde_json::Value;

/// # DBM CLI 日志系统使用说明
///
/// ## 基本原则
/// 1. **库代码只使用 `tracing` 宏**：`info!()`, `warn!()`, `error!()`, `debug!()`
/// 2. **应用入口控制日志配置**：在 `main.rs` 中调用 `setup_logging()`
/// 3. **用户界面输出与日志分离**：容器列表、连接串等结果直接输出到标准输出
///
/// ## 日志配置选项
///
/// ### 命令行参数
/// - `-v, --verbose`：启用详细日志模式（DEBUG 级别）
///
/// ### 环境变量
/// - `RUST_LOG`：标准的 Rust 日志级别控制（如 `debug`, `info`, `warn`, `error`）
/// - `DBM_LOG_FILE`：日志文件路径，设置后日志输出到文件而非终端
///
/// ## 使用示例
///
/// ```bash
/// # 标准日志输出到终端
/// dbm list
///
/// # 详细日志输出到终端
/// dbm -v watch
///
/// # 日志输出到文件
/// DBM_LOG_FILE=dbm.log dbm watch
///
/// # 使用 RUST_LOG 控制特定模块的日志级别
/// RUST_LOG=dbm_core::sync=debug dbm watch
/// ```
///
/// ## 日志格式
/// - **终端输出**：人类可读格式，不显示模块路径
/// - **文件输出**：包含完整模块路径和更多调试信息
pub fn setup_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    // 根据verbose参数和环境变量确定日志级别
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // 检查环境变量，决定是否输出到文件
    let log_file = std::env::var("DBM_LOG_FILE").ok().and_then(|path| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| eprintln!("无法打开日志文件 {path}: {e}，改为输出到终端"))
            .ok()
    });

    if let Some(file) = log_file {
        // 输出到文件 - 使用详细格式便于调试
        fmt()
            .with_env_filter(env_filter)
            .with_writer(file)
            .with_target(true)
            .with_thread_names(true)
            .with_line_number(true)
            .init();
    } else {
        // 输出到终端 - 使用简洁格式，用户友好
        fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false) // 不显示模块路径
            .with_thread_names(false) // 不显示线程名
            .with_line_number(false) // 不显示行号
            .without_time() // 不显示时间戳
            .compact() // 使用紧凑格式
            .init();
    }
}

/// 由 `--file` 和 `--set` 组装配置对象
pub fn build_config(args: &ConfigArgs) -> Result<ProviderConfig> {
    let mut config = match &args.file {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            ProviderConfig::from_value(serde_json::from_str(&content)?)?
        }
        None => ProviderConfig::new(),
    };

    for pair in &args.set {
        let (key, value) = parse_assignment(pair)?;
        config.set(key, value);
    }
    Ok(config)
}

/// 解析 `key=value`
///
/// 布尔值和能原样还原的整数按 JSON 字面量保存，其余（包括 `8.0` 这类版本号）保持字符串。
pub fn parse_assignment(pair: &str) -> Result<(&str, Value)> {
    let (key, raw) = pair
        .split_once('=')
        .ok_or_else(|| DbmError::custom(format!("配置项格式应为 KEY=VALUE: {pair}")))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(DbmError::custom(format!("配置项缺少键名: {pair}")));
    }

    let value = match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Bool(_)) => value,
        Ok(Value::Number(n)) if n.is_u64() && n.to_string() == raw => Value::Number(n),
        _ => Value::String(raw.to_string()),
    };
    Ok((key, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment_types() {
        assert_eq!(parse_assignment("port=5433").unwrap(), ("port", Value::from(5433)));
        assert_eq!(parse_assignment("persistData=true").unwrap(), ("persistData", Value::Bool(true)));
        assert_eq!(parse_assignment("version=8.0").unwrap().1, Value::from("8.0"));
        assert_eq!(parse_assignment("version=016").unwrap().1, Value::from("016"));
        assert_eq!(
            parse_assignment("redisSettings.maxMemory=256mb").unwrap(),
            ("redisSettings.maxMemory", Value::from("256mb"))
        );
        // 值中可以包含等号
        assert_eq!(parse_assignment("password=a=b").unwrap().1, Value::from("a=b"));
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=x").is_err());
    }

    #[test]
    fn test_build_config_from_file_and_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pg.json");
        std::fs::write(&path, r#"{"name": "pg", "port": 5432, "postgresSettings": {"hostAuthMethod": "md5"}}"#).unwrap();

        let args = ConfigArgs {
            set: vec!["port=6543".to_string(), "postgresSettings.initdbArgs=--data-checksums".to_string()],
            file: Some(path),
        };
        let config = build_config(&args).unwrap();

        assert_eq!(config.name().as_deref(), Some("pg"));
        assert_eq!(config.port(), Some(6543));
        assert_eq!(config.string("postgresSettings.hostAuthMethod").as_deref(), Some("md5"));
        assert_eq!(
            config.string("postgresSettings.initdbArgs").as_deref(),
            Some("--data-checksums")
        );
    }
}
