use super::print_table;
use crate::app::CliApp;
use dbm_core::Result;
use dbm_core::runtime::RuntimeState;
use dbm_core::sync::{Visibility, spawn_periodic_sync};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// 持续同步容器状态并监控 Docker，直到 Ctrl-C
pub async fn run_watch(app: &CliApp) -> Result<()> {
    let engine = app.service.engine().clone();
    if let Err(e) = engine.load().await {
        warn!("⚠️  首次加载失败，稍后重试: {}", e);
    }

    // 终端会话始终处于前台
    let visibility = Visibility::default();
    let cancel = CancellationToken::new();
    let timings = app.config.timings();

    let sync_task = spawn_periodic_sync(
        engine.clone(),
        timings.sync_interval,
        visibility.subscribe(),
        cancel.child_token(),
    );
    let monitor_task = app.monitor.spawn(visibility.subscribe(), cancel.child_token());

    info!(
        "👀 开始监控（同步间隔 {}s，可用性检查间隔 {}s），按 Ctrl-C 退出",
        timings.sync_interval.as_secs(),
        timings.availability_interval.as_secs()
    );

    let mut containers = engine.subscribe();
    let mut availability = app.monitor.subscribe();
    let mut last = containers.borrow_and_update().clone();
    let mut was_available = None;
    print_table(&last);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            changed = containers.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = containers.borrow_and_update().clone();
                // 周期同步每次都会发布，只在内容变化时输出
                if current != last {
                    println!();
                    print_table(&current);
                    last = current;
                }
            }
            changed = availability.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = availability.borrow_and_update().clone();
                if status.status == RuntimeState::Connecting
                    || was_available == Some(status.is_available())
                {
                    continue;
                }
                was_available = Some(status.is_available());
                if status.is_available() {
                    info!("🐳 Docker 可用（版本 {}）", status.version.as_deref().unwrap_or("未知"));
                } else {
                    warn!("🐳 Docker 不可用: {}", status.error.as_deref().unwrap_or("未知错误"));
                }
            }
        }
    }

    info!("正在停止监控...");
    cancel.cancel();
    sync_task.shutdown().await;
    monitor_task.shutdown().await;
    Ok(())
}
