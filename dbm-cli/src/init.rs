use dbm_core::{Result, config::AppConfig, constants::config};
use tracing::{info, warn};

/// 运行独立的初始化流程
pub async fn run_init(force: bool) -> Result<()> {
    info!("🗄️  DBM 初始化");
    info!("==============");

    let config_path = config::get_config_file_path();
    if !force && config_path.exists() {
        warn!("⚠️  检测到已存在的配置文件: {}", config_path.display());
        info!("如果您要重新初始化，请使用 --force 参数");
        info!("示例: dbm init --force");
        return Ok(());
    }

    info!("📋 步骤 1: 创建配置文件");
    let app_config = AppConfig::default();
    app_config.save_to_file(&config_path)?;
    info!("   ✅ 创建配置文件: {}", config_path.display());

    info!("📋 步骤 2: 创建数据目录");
    app_config.ensure_state_dir()?;
    info!(
        "   ✅ 容器元数据文件: {}",
        app_config.state_file_path().display()
    );

    info!("🎉 初始化完成！");
    info!("💡 下一步:");
    info!("   dbm status              检查 Docker 是否可用");
    info!("   dbm providers           查看支持的数据库");
    info!("   dbm create postgresql --set name=pg --set port=5432 --set version=16 --set password=secret");
    Ok(())
}
