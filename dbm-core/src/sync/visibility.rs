use tokio::sync::watch;

/// 宿主窗口（或终端会话）是否处于前台
///
/// 轮询任务在不可见时暂停，重新可见时恢复。
#[derive(Debug, Clone)]
pub struct Visibility {
    tx: watch::Sender<bool>,
}

impl Visibility {
    pub fn new(visible: bool) -> Self {
        let (tx, _) = watch::channel(visible);
        Self { tx }
    }

    /// 只有状态真正变化时才通知订阅者
    pub fn set_visible(&self, visible: bool) {
        self.tx.send_if_modified(|current| {
            if *current == visible {
                false
            } else {
                *current = visible;
                true
            }
        });
    }

    pub fn is_visible(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Self::new(true)
    }
}
