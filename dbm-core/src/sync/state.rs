use crate::container::{Container, ContainerStatus};
use std::collections::{BTreeMap, HashMap};

/// 进行中的操作在视图上的覆盖
#[derive(Debug, Clone)]
pub(crate) enum Pending {
    /// 创建请求未返回前的占位记录
    Creating(Container),
    /// 临时状态覆盖（删除中）
    Status(ContainerStatus),
    /// 只占用操作锁，不改变显示
    Busy,
}

#[derive(Debug, Clone)]
enum LocalChange {
    Upsert(Container),
    Removed,
}

/// 一次全量拉取的凭据，记录拉取发起时的本地修订号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FetchTicket(u64);

/// 本地容器列表
///
/// 所有修改都经过这里的三个原语：按 ID 插入或替换、按 ID 删除、整体替换。
/// 整体替换以拉取完成的先后为准；拉取发起之后才发生的本地修改会在替换后重新应用，
/// 保证乐观修改不会被更早发起的快照覆盖。
#[derive(Debug, Default)]
pub struct ContainerList {
    items: Vec<Container>,
    revision: u64,
    changes: HashMap<String, (u64, LocalChange)>,
    outstanding: BTreeMap<u64, usize>,
    pending: HashMap<String, Pending>,
}

impl ContainerList {
    pub fn new() -> Self {
        Self::default()
    }

    /// 带覆盖的当前视图
    pub fn snapshot(&self) -> Vec<Container> {
        let mut view: Vec<Container> = self
            .items
            .iter()
            .map(|item| match self.pending.get(&item.id) {
                Some(Pending::Status(status)) => Container {
                    status: *status,
                    ..item.clone()
                },
                _ => item.clone(),
            })
            .collect();

        let mut placeholders: Vec<&Container> = self
            .pending
            .values()
            .filter_map(|p| match p {
                Pending::Creating(c) if !self.items.iter().any(|i| i.id == c.id) => Some(c),
                _ => None,
            })
            .collect();
        placeholders.sort_by(|a, b| a.id.cmp(&b.id));
        view.extend(placeholders.into_iter().cloned());

        view
    }

    pub fn get(&self, id: &str) -> Option<Container> {
        self.snapshot().into_iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 按 ID 替换，不存在时追加
    pub fn upsert(&mut self, container: Container) {
        self.record(&container.id, LocalChange::Upsert(container.clone()));
        apply_upsert(&mut self.items, container);
    }

    /// 按 ID 删除，返回是否存在
    pub fn remove(&mut self, id: &str) -> bool {
        self.record(id, LocalChange::Removed);
        let before = self.items.len();
        self.items.retain(|c| c.id != id);
        before != self.items.len()
    }

    /// 无条件整体替换，并丢弃所有本地修改记录
    pub fn replace_all(&mut self, containers: Vec<Container>) {
        self.items = containers;
        self.changes.clear();
    }

    pub(crate) fn begin_fetch(&mut self) -> FetchTicket {
        *self.outstanding.entry(self.revision).or_default() += 1;
        FetchTicket(self.revision)
    }

    /// 结束一次拉取；`snapshot` 为 `None` 表示拉取失败，列表保持不变
    pub(crate) fn finish_fetch(&mut self, ticket: FetchTicket, snapshot: Option<Vec<Container>>) {
        if let Some(mut items) = snapshot {
            let mut later: Vec<&(u64, LocalChange)> = self
                .changes
                .values()
                .filter(|(revision, _)| *revision > ticket.0)
                .collect();
            later.sort_by_key(|(revision, _)| *revision);

            for (_, change) in later {
                match change {
                    LocalChange::Upsert(container) => apply_upsert(&mut items, container.clone()),
                    LocalChange::Removed => {}
                }
            }
            let removed: Vec<&String> = self
                .changes
                .iter()
                .filter(|(_, (revision, change))| {
                    *revision > ticket.0 && matches!(change, LocalChange::Removed)
                })
                .map(|(id, _)| id)
                .collect();
            items.retain(|c| !removed.contains(&&c.id));

            self.items = items;
        }

        if let Some(count) = self.outstanding.get_mut(&ticket.0) {
            *count -= 1;
            if *count == 0 {
                self.outstanding.remove(&ticket.0);
            }
        }
        self.prune();
    }

    /// 为某个 ID 占用操作锁，已有操作进行中时返回 false
    pub(crate) fn try_begin(&mut self, id: &str, pending: Pending) -> bool {
        if self.pending.contains_key(id) {
            return false;
        }
        self.pending.insert(id.to_string(), pending);
        true
    }

    pub(crate) fn end(&mut self, id: &str) {
        self.pending.remove(id);
    }

    pub fn is_busy(&self, id: &str) -> bool {
        self.pending.contains_key(id)
    }

    fn record(&mut self, id: &str, change: LocalChange) {
        self.revision += 1;
        self.changes.insert(id.to_string(), (self.revision, change));
        self.prune();
    }

    /// 早于所有进行中拉取的修改已经包含在这些拉取的结果里，可以丢弃
    fn prune(&mut self) {
        match self.outstanding.keys().next().copied() {
            Some(oldest) => self.changes.retain(|_, (revision, _)| *revision > oldest),
            None => self.changes.clear(),
        }
    }
}

fn apply_upsert(items: &mut Vec<Container>, container: Container) {
    match items.iter_mut().find(|c| c.id == container.id) {
        Some(existing) => *existing = container,
        None => items.push(container),
    }
}
