use crate::app::CliApp;
use crate::project_info::get_version_string;
use dbm_core::Result;
use tracing::{info, warn};

/// 手动刷新 Docker 可用性并显示结果
pub async fn run_status(app: &CliApp) -> Result<()> {
    info!("🗄️  {}", get_version_string());
    info!("📋 基本信息:");
    info!("   Docker 命令: {}", app.config.docker.binary);
    info!("   元数据文件: {}", app.config.state_file_path().display());

    let mut notifications = app.monitor.notifications();
    let status = app.monitor.refresh().await;

    info!("🐳 Docker 状态:");
    if let Ok(notification) = notifications.try_recv() {
        if notification.available {
            info!("   ✅ {}", notification.message);
        } else {
            warn!("   ❌ {}", notification.message);
        }
    }

    if let Some(counts) = &status.containers {
        info!(
            "   容器: 共 {} 个，运行中 {} 个，已停止 {} 个",
            counts.total, counts.running, counts.stopped
        );
    }
    if let Some(images) = status.images {
        info!("   镜像: {} 个", images);
    }

    if !status.is_available() {
        info!("   💡 建议检查:");
        info!("      - Docker 是否已安装并运行");
        info!("      - 当前用户是否有权限访问 Docker");
    }
    Ok(())
}
