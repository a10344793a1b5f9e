use crate::app::CliApp;
use crate::cli::ConfigArgs;
use crate::utils::build_config;
use dbm_core::Result;
use dbm_core::container::Container;
use tracing::{info, warn};

/// 加载当前容器列表；Docker 不可用时后端会退回到本地记录
async fn load(app: &CliApp) -> Result<()> {
    if let Err(e) = app.service.engine().load().await {
        warn!("⚠️  无法读取容器列表: {}", e);
        return Err(e);
    }
    Ok(())
}

pub async fn run_create(app: &CliApp, db_type: &str, args: &ConfigArgs) -> Result<()> {
    let config = build_config(args)?;
    load(app).await?;

    info!("🚀 创建 {} 容器...", db_type);
    let container = app.service.provision(db_type, &config).await?;
    info!("✅ 容器已创建: {} ({})", container.name, container.id);
    println!("{}", app.service.connection_string(&container.id)?);
    Ok(())
}

pub async fn run_update(app: &CliApp, id: &str, args: &ConfigArgs) -> Result<()> {
    let config = build_config(args)?;
    load(app).await?;

    info!("🔄 更新容器 {}...", id);
    let container = app.service.update(id, &config).await?;
    info!("✅ 容器已更新: {} ({})", container.name, container.status.display_name());
    Ok(())
}

pub async fn run_list(app: &CliApp, json: bool) -> Result<()> {
    load(app).await?;
    let containers = app.service.engine().containers();

    if json {
        println!("{}", serde_json::to_string_pretty(&containers)?);
    } else if containers.is_empty() {
        info!("📭 还没有任何容器，使用 'dbm create <类型> --set ...' 创建");
    } else {
        print_table(&containers);
    }
    Ok(())
}

pub async fn run_start(app: &CliApp, id: &str) -> Result<()> {
    load(app).await?;
    info!("▶️  启动容器 {}...", id);
    app.service.engine().start(id).await?;
    report_status(app, id);
    Ok(())
}

pub async fn run_stop(app: &CliApp, id: &str) -> Result<()> {
    load(app).await?;
    info!("⏹️  停止容器 {}...", id);
    app.service.engine().stop(id).await?;
    report_status(app, id);
    Ok(())
}

pub async fn run_remove(app: &CliApp, id: &str) -> Result<()> {
    load(app).await?;
    info!("🗑️  删除容器 {}...", id);
    app.service.engine().remove(id).await?;
    info!("✅ 容器已删除");
    Ok(())
}

pub async fn run_connection(app: &CliApp, id: &str) -> Result<()> {
    load(app).await?;
    println!("{}", app.service.connection_string(id)?);
    Ok(())
}

fn report_status(app: &CliApp, id: &str) {
    if let Some(container) = app.service.engine().get(id) {
        info!(
            "✅ {}: {}",
            container.name,
            container.status.display_name()
        );
    }
}

/// 以表格形式输出容器列表
pub fn print_table(containers: &[Container]) {
    println!(
        "{:<38} {:<20} {:<12} {:<8} {:<7} {}",
        "ID", "名称", "类型", "版本", "端口", "状态"
    );
    for c in containers {
        println!(
            "{:<38} {:<20} {:<12} {:<8} {:<7} {}",
            c.id,
            c.name,
            c.db_type,
            c.version,
            c.port,
            c.status.display_name()
        );
    }
}
