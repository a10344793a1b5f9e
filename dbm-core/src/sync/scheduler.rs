use super::PollerHandle;
use super::engine::SyncEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// 启动周期同步
///
/// 每隔 `period` 调用一次 `sync()`，不可见时跳过；同步失败只记录日志，
/// 列表保持不变，等待下一轮。
pub fn spawn_periodic_sync(
    engine: Arc<SyncEngine>,
    period: Duration,
    visible: watch::Receiver<bool>,
    cancel: CancellationToken,
) -> PollerHandle {
    let token = cancel.clone();
    let task = tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            if !*visible.borrow() {
                continue;
            }

            // 已发出的同步不中途取消，拉取凭据需要正常归还
            if let Err(e) = engine.sync().await {
                debug!("周期同步失败，下一轮重试: {}", e);
            }
        }
        debug!("周期同步已停止");
    });

    PollerHandle::new(cancel, task)
}
