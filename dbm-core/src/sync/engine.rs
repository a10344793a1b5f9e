use super::state::{ContainerList, FetchTicket, Pending};
use crate::container::{Container, ContainerStatus, RunRequest};
use crate::runtime::RuntimeBackend;
use crate::{DbmError, Result};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// 容器状态同步引擎
///
/// 持有本地容器列表并通过 `watch` 通道发布每次变化。列表锁只在同步代码中持有，
/// 不跨越任何运行时调用。
pub struct SyncEngine {
    backend: Arc<dyn RuntimeBackend>,
    list: Mutex<ContainerList>,
    tx: watch::Sender<Vec<Container>>,
}

impl SyncEngine {
    pub fn new(backend: Arc<dyn RuntimeBackend>) -> Self {
        let (tx, _) = watch::channel(Vec::new());
        Self {
            backend,
            list: Mutex::new(ContainerList::new()),
            tx,
        }
    }

    pub fn backend(&self) -> &Arc<dyn RuntimeBackend> {
        &self.backend
    }

    /// 订阅列表变化
    pub fn subscribe(&self) -> watch::Receiver<Vec<Container>> {
        self.tx.subscribe()
    }

    pub fn containers(&self) -> Vec<Container> {
        self.lock().snapshot()
    }

    pub fn get(&self, id: &str) -> Option<Container> {
        self.lock().get(id)
    }

    /// 整体加载；失败时保留原列表并把错误返回给调用方
    pub async fn load(&self) -> Result<Vec<Container>> {
        let ticket = self.lock().begin_fetch();
        let fetched = self.backend.get_all().await;
        self.finish(ticket, fetched)
    }

    /// 与运行时对账；完成得越晚的结果越权威
    pub async fn sync(&self) -> Result<Vec<Container>> {
        let ticket = self.lock().begin_fetch();
        let fetched = self.backend.sync().await;
        self.finish(ticket, fetched)
    }

    pub fn add_local(&self, container: Container) {
        self.mutate(|list| list.upsert(container));
    }

    pub fn update_local(&self, container: Container) {
        self.mutate(|list| list.upsert(container));
    }

    pub fn remove_local(&self, id: &str) {
        self.mutate(|list| {
            list.remove(id);
        });
    }

    /// 创建容器；请求未返回前列表中显示一条 `creating` 占位记录
    ///
    /// 失败时直接撤掉占位记录并返回错误，不会留下 `error` 状态的条目。
    pub async fn create(&self, request: RunRequest) -> Result<Container> {
        let id = request.metadata.id.clone();
        let mut placeholder = Container::from_request(&request, None);
        placeholder.status = ContainerStatus::Creating;
        self.begin(&id, Pending::Creating(placeholder))?;

        let result = self.backend.create(&request).await;
        self.mutate(|list| {
            list.end(&id);
            if let Ok(container) = &result {
                list.upsert(container.clone());
            }
        });

        match &result {
            Ok(container) => info!("容器 {} 已创建", container.name),
            Err(e) => warn!("创建容器 {} 失败: {}", request.name, e),
        }
        result
    }

    pub async fn update(&self, id: &str, request: RunRequest) -> Result<Container> {
        self.begin(id, Pending::Busy)?;

        let result = self.backend.update(id, &request).await;
        self.mutate(|list| {
            list.end(id);
            if let Ok(container) = &result {
                list.upsert(container.clone());
            }
        });
        result
    }

    /// 启动成功后通过对账获取运行时决定的状态，而不是直接改本地状态
    pub async fn start(&self, id: &str) -> Result<()> {
        self.ensure_transition(id, ContainerStatus::Running)?;
        self.run_then_sync(id, self.backend.start(id)).await
    }

    pub async fn stop(&self, id: &str) -> Result<()> {
        self.ensure_transition(id, ContainerStatus::Stopped)?;
        self.run_then_sync(id, self.backend.stop(id)).await
    }

    /// 删除容器；进行中显示 `removing`，失败时恢复原状态
    pub async fn remove(&self, id: &str) -> Result<()> {
        self.ensure_transition(id, ContainerStatus::Removing)?;
        self.begin(id, Pending::Status(ContainerStatus::Removing))?;

        let result = self.backend.remove(id).await;
        self.mutate(|list| {
            list.end(id);
            if result.is_ok() {
                list.remove(id);
            }
        });
        result?;

        self.sync_quietly().await;
        Ok(())
    }

    async fn run_then_sync(
        &self,
        id: &str,
        call: impl Future<Output = Result<()>> + Send,
    ) -> Result<()> {
        self.begin(id, Pending::Busy)?;

        let result = call.await;
        self.mutate(|list| list.end(id));
        result?;

        self.sync_quietly().await;
        Ok(())
    }

    /// 操作后的对账失败只记录日志，下一轮周期同步会再试
    async fn sync_quietly(&self) {
        if let Err(e) = self.sync().await {
            debug!("操作后的同步失败: {}", e);
        }
    }

    /// 按本地列表中的当前状态检查迁移是否合法
    fn ensure_transition(&self, id: &str, next: ContainerStatus) -> Result<()> {
        let current = self
            .get(id)
            .ok_or_else(|| DbmError::ContainerNotFound(id.to_string()))?;
        if current.status.is_transient() {
            return Err(DbmError::OperationInProgress(id.to_string()));
        }
        if !current.status.can_transition_to(next) {
            return Err(DbmError::InvalidTransition {
                id: id.to_string(),
                from: current.status,
                to: next,
            });
        }
        Ok(())
    }

    fn begin(&self, id: &str, pending: Pending) -> Result<()> {
        let mut started = false;
        self.mutate(|list| started = list.try_begin(id, pending));
        if started {
            Ok(())
        } else {
            Err(DbmError::OperationInProgress(id.to_string()))
        }
    }

    fn finish(
        &self,
        ticket: FetchTicket,
        fetched: Result<Vec<Container>>,
    ) -> Result<Vec<Container>> {
        match fetched {
            Ok(containers) => {
                self.mutate(|list| list.finish_fetch(ticket, Some(containers)));
                Ok(self.containers())
            }
            Err(e) => {
                self.lock().finish_fetch(ticket, None);
                Err(e)
            }
        }
    }

    /// 修改列表并发布新视图
    fn mutate(&self, apply: impl FnOnce(&mut ContainerList)) {
        let snapshot = {
            let mut list = self.lock();
            apply(&mut list);
            list.snapshot()
        };
        self.tx.send_replace(snapshot);
    }

    fn lock(&self) -> MutexGuard<'_, ContainerList> {
        // 列表的每个修改原语都不会中途 panic，中毒后的数据仍然一致
        self.list.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
