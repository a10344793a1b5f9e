use crate::app::CliApp;
use crate::cli::ConfigArgs;
use crate::utils::build_config;
use dbm_core::Result;
use dbm_core::runtime::build_run_args;
use tracing::{info, warn};

/// 校验配置并列出所有问题
pub fn run_validate(app: &CliApp, db_type: &str, args: &ConfigArgs) -> Result<()> {
    let config = build_config(args)?;
    let result = app.service.validate(db_type, &config)?;

    if result.valid {
        info!("✅ 配置有效");
        return Ok(());
    }

    warn!("❌ 配置有 {} 个问题:", result.errors.len());
    for error in &result.errors {
        warn!("   - {}", error);
    }
    result.into_result()
}

/// 输出启动描述以及等价的 docker run 命令
pub fn run_compile(app: &CliApp, db_type: &str, args: &ConfigArgs) -> Result<()> {
    let config = build_config(args)?;
    let descriptor = app.service.compile(db_type, &config)?;

    println!("{}", serde_json::to_string_pretty(&descriptor)?);

    let name = config.name().unwrap_or_default();
    let run_args = build_run_args(&name, &descriptor);
    println!();
    println!("{} {}", app.config.docker.binary, shell_join(&run_args));
    Ok(())
}

/// 含空白或引号的参数加上单引号，便于直接复制执行
fn shell_join(args: &[String]) -> String {
    args.iter()
        .map(|arg| {
            if arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || c == '\'' || c == '"') {
                format!("'{}'", arg.replace('\'', r"'\''"))
            } else {
                arg.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
