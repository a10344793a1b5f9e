use super::PollerHandle;
use crate::config::MonitorTimings;
use crate::runtime::{AvailabilityStatus, RuntimeBackend};
use std::pin::pin;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// 手动刷新后发给用户的结果通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub available: bool,
    pub message: String,
}

/// 运行时可用性监控
///
/// 后台轮询静默更新状态；探测失败后在较短的退避时间后额外重试一次，
/// 同一时间最多只有一个待执行的重试。
pub struct AvailabilityMonitor {
    backend: Arc<dyn RuntimeBackend>,
    timings: MonitorTimings,
    state: watch::Sender<AvailabilityStatus>,
    notifications: broadcast::Sender<Notification>,
}

impl AvailabilityMonitor {
    pub fn new(backend: Arc<dyn RuntimeBackend>, timings: MonitorTimings) -> Self {
        let (state, _) = watch::channel(AvailabilityStatus::connecting());
        let (notifications, _) = broadcast::channel(16);
        Self {
            backend,
            timings,
            state,
            notifications,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AvailabilityStatus> {
        self.state.subscribe()
    }

    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    pub fn status(&self) -> AvailabilityStatus {
        self.state.borrow().clone()
    }

    pub fn is_available(&self) -> bool {
        self.state.borrow().is_available()
    }

    /// 探测一次并更新状态，不发通知
    pub async fn probe(&self) -> AvailabilityStatus {
        let status = match self.backend.availability_status().await {
            Ok(status) => status,
            Err(e) => AvailabilityStatus::error(e.to_string()),
        };

        let previous = self.state.send_replace(status.clone());
        if previous.is_available() != status.is_available() {
            match &status.error {
                Some(error) if !status.is_available() => warn!("容器运行时不可用: {}", error),
                _ => info!("容器运行时可用"),
            }
        } else {
            debug!("运行时状态: {:?}", status.status);
        }
        status
    }

    /// 手动刷新：立即探测并通知结果
    pub async fn refresh(&self) -> AvailabilityStatus {
        let status = self.probe().await;
        let message = if status.is_available() {
            match &status.version {
                Some(version) => format!("Docker 运行正常（版本 {version}）"),
                None => "Docker 运行正常".to_string(),
            }
        } else {
            format!(
                "Docker 不可用: {}",
                status.error.as_deref().unwrap_or("未知错误")
            )
        };
        // 没有订阅者时发送失败，可以忽略
        let _ = self.notifications.send(Notification {
            available: status.is_available(),
            message,
        });
        status
    }

    /// 启动后台轮询
    ///
    /// 可见时立即探测一次，然后按主间隔轮询；不可见时暂停并放弃待执行的重试。
    pub fn spawn(
        self: &Arc<Self>,
        mut visible: watch::Receiver<bool>,
        cancel: CancellationToken,
    ) -> PollerHandle {
        let monitor = Arc::clone(self);
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            'session: loop {
                // 等待进入前台
                while !*visible.borrow_and_update() {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => break 'session,
                        changed = visible.changed() => if changed.is_err() { break 'session },
                    }
                }

                let interval = monitor.timings.availability_interval;
                let mut ticker = interval_at(Instant::now() + interval, interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                let mut retry_at = monitor.check(None).await;

                loop {
                    let retry = pin!(sleep_until(retry_at.unwrap_or_else(Instant::now)));
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => break 'session,
                        changed = visible.changed() => {
                            if changed.is_err() {
                                break 'session;
                            }
                            if !*visible.borrow_and_update() {
                                debug!("进入后台，暂停可用性轮询");
                                continue 'session;
                            }
                        }
                        _ = retry, if retry_at.is_some() => {
                            debug!("可用性重试");
                            retry_at = monitor.check(None).await;
                        }
                        _ = ticker.tick() => {
                            retry_at = monitor.check(retry_at).await;
                        }
                    }
                }
            }
            debug!("可用性轮询已停止");
        });

        PollerHandle::new(cancel, task)
    }

    /// 探测一次，失败时返回重试时间；已有待执行的重试时沿用它
    async fn check(&self, pending_retry: Option<Instant>) -> Option<Instant> {
        if self.probe().await.is_available() {
            None
        } else {
            Some(pending_retry.unwrap_or_else(|| Instant::now() + self.timings.availability_retry))
        }
    }
}
