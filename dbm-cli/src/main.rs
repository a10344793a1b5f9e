use clap::Parser;
use dbm_cli::{Cli, CliApp, Commands, run_init, setup_logging};
use dbm_core::DbmError;
use tracing::error;

#[tokio::main]
async fn main() {
    // 解析命令行参数
    let cli = Cli::parse();

    // 设置日志记录
    setup_logging(cli.verbose);

    // `init` 命令是特例，它不需要预先加载配置
    if let Commands::Init { force } = cli.command {
        if let Err(e) = run_init(force).await {
            error!("❌ 初始化失败: {}", e);
            std::process::exit(1);
        }
        return;
    }

    // 对于其他所有命令，我们需要加载配置并初始化App
    let app = match &cli.config {
        Some(path) => CliApp::new_with_config(path),
        None => CliApp::new_with_auto_config(),
    };
    let mut app = match app {
        Ok(app) => app,
        Err(DbmError::ConfigNotFound) => {
            let path = cli
                .config
                .unwrap_or_else(dbm_core::constants::config::get_config_file_path);
            error!("❌ 配置文件 '{}' 未找到。", path.display());
            error!("👉 请先运行 'dbm init' 命令来创建配置文件。");
            std::process::exit(1);
        }
        Err(e) => {
            error!("❌ 应用初始化失败: {}", e);
            std::process::exit(1);
        }
    };

    // 运行命令
    if let Err(e) = app.run(cli.command).await {
        match e {
            DbmError::Validation(errors) => {
                error!("❌ 配置校验未通过:");
                for message in errors {
                    error!("   - {}", message);
                }
            }
            e => error!("❌ 操作失败: {}", e),
        }
        std::process::exit(1);
    }
}
