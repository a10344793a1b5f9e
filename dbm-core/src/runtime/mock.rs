//! 测试用的内存运行时

use super::{AvailabilityStatus, RuntimeBackend};
use crate::container::{Container, ContainerStatus, RunRequest};
use crate::{DbmError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::oneshot;

#[derive(Default)]
struct MockState {
    containers: Vec<Container>,
    availability: VecDeque<Result<AvailabilityStatus>>,
    fail_next: Option<String>,
    sync_gates: VecDeque<oneshot::Receiver<()>>,
}

/// 可编排响应的运行时替身
#[derive(Default)]
pub(crate) struct MockBackend {
    state: Mutex<MockState>,
    pub sync_calls: AtomicUsize,
    pub availability_calls: AtomicUsize,
    pub start_calls: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_containers(containers: Vec<Container>) -> Self {
        let mock = Self::new();
        mock.set_containers(containers);
        mock
    }

    /// 替换运行时中的“真实”容器列表
    pub fn set_containers(&self, containers: Vec<Container>) {
        self.lock().containers = containers;
    }

    pub fn set_status(&self, id: &str, status: ContainerStatus) {
        if let Some(c) = self.lock().containers.iter_mut().find(|c| c.id == id) {
            c.status = status;
        }
    }

    /// 下一次调用（任意方法）返回操作错误
    pub fn fail_next(&self, message: &str) {
        self.lock().fail_next = Some(message.to_string());
    }

    /// 依次返回的可用性探测结果，用完后返回可用
    pub fn script_availability(&self, results: Vec<Result<AvailabilityStatus>>) {
        self.lock().availability.extend(results);
    }

    /// 让下一次 sync 在读取快照后等待，直到返回的发送端被触发
    pub fn gate_next_sync(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.lock().sync_gates.push_back(rx);
        tx
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    fn take_failure(&self, operation: &str, target: &str) -> Result<()> {
        match self.lock().fail_next.take() {
            Some(message) => Err(DbmError::operation(operation, target, message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RuntimeBackend for MockBackend {
    async fn get_all(&self) -> Result<Vec<Container>> {
        self.take_failure("get_all", "mock")?;
        Ok(self.lock().containers.clone())
    }

    async fn create(&self, request: &RunRequest) -> Result<Container> {
        self.take_failure("create", &request.name)?;
        let container = Container::from_request(request, Some(format!("rt-{}", request.metadata.id)));
        self.lock().containers.push(container.clone());
        Ok(container)
    }

    async fn update(&self, id: &str, request: &RunRequest) -> Result<Container> {
        self.take_failure("update", id)?;
        let container = Container::from_request(request, Some(format!("rt-{id}")));
        let mut state = self.lock();
        state.containers.retain(|c| c.id != id);
        state.containers.push(container.clone());
        Ok(container)
    }

    async fn start(&self, id: &str) -> Result<()> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure("start", id)?;
        self.set_status(id, ContainerStatus::Running);
        Ok(())
    }

    async fn stop(&self, id: &str) -> Result<()> {
        self.take_failure("stop", id)?;
        self.set_status(id, ContainerStatus::Stopped);
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<()> {
        self.take_failure("remove", id)?;
        self.lock().containers.retain(|c| c.id != id);
        Ok(())
    }

    async fn sync(&self) -> Result<Vec<Container>> {
        self.sync_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure("sync", "mock")?;
        let (snapshot, gate) = {
            let mut state = self.lock();
            (state.containers.clone(), state.sync_gates.pop_front())
        };
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        Ok(snapshot)
    }

    async fn availability_status(&self) -> Result<AvailabilityStatus> {
        self.availability_calls.fetch_add(1, Ordering::SeqCst);
        self.lock()
            .availability
            .pop_front()
            .unwrap_or_else(|| Ok(AvailabilityStatus::running(Some("mock".to_string()))))
    }
}
