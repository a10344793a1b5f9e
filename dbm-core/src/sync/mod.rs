// 容器状态同步模块
//
// - `state`：本地容器列表（插入替换 / 删除 / 整体替换三个原语）
// - `engine`：乐观修改、运行时调用与全量对账
// - `scheduler`：周期同步
// - `monitor`：运行时可用性轮询与失败重试
// - `visibility`：前后台状态，驱动两个轮询的暂停与恢复

mod engine;
mod monitor;
mod scheduler;
mod state;
mod visibility;

#[cfg(test)]
mod tests;

pub use engine::SyncEngine;
pub use monitor::{AvailabilityMonitor, Notification};
pub use scheduler::spawn_periodic_sync;
pub use state::ContainerList;
pub use visibility::Visibility;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// 后台轮询任务的句柄，drop 时取消任务
#[derive(Debug)]
pub struct PollerHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    pub(crate) fn new(cancel: CancellationToken, task: JoinHandle<()>) -> Self {
        Self {
            cancel,
            task: Some(task),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// 取消并等待任务退出
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
