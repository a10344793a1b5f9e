use super::state::Pending;
use super::*;
use crate::DbmError;
use crate::config::MonitorTimings;
use crate::container::{Container, ContainerMetadata, ContainerStatus, RunRequest};
use crate::provider::LaunchDescriptor;
use crate::runtime::mock::MockBackend;
use crate::runtime::{AvailabilityStatus, RuntimeBackend, RuntimeState};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn container(id: &str, status: ContainerStatus) -> Container {
    Container {
        id: id.to_string(),
        name: format!("db-{id}"),
        db_type: "postgresql".to_string(),
        version: "16".to_string(),
        status,
        port: 5432,
        created_at: "2026-01-01".to_string(),
        max_connections: 100,
        container_id: Some(format!("rt-{id}")),
        username: None,
        password: Some("pw".to_string()),
        database_name: None,
        persist_data: false,
        enable_auth: true,
        auth_source: None,
    }
}

fn request(id: &str, name: &str) -> RunRequest {
    RunRequest {
        name: name.to_string(),
        docker_args: LaunchDescriptor::new("postgres:16"),
        metadata: ContainerMetadata {
            id: id.to_string(),
            db_type: "postgresql".to_string(),
            version: "16".to_string(),
            port: 5432,
            username: None,
            password: "pw".to_string(),
            database_name: None,
            persist_data: false,
            enable_auth: true,
            max_connections: None,
            auth_source: None,
        },
    }
}

fn engine_with(mock: &Arc<MockBackend>) -> Arc<SyncEngine> {
    let backend: Arc<dyn RuntimeBackend> = mock.clone();
    Arc::new(SyncEngine::new(backend))
}

fn statuses(list: &[Container]) -> Vec<(String, ContainerStatus)> {
    list.iter().map(|c| (c.id.clone(), c.status)).collect()
}

// ---- ContainerList ----

#[test]
fn test_list_primitives() {
    let mut list = ContainerList::new();
    list.upsert(container("a", ContainerStatus::Running));
    list.upsert(container("b", ContainerStatus::Stopped));
    list.upsert(container("a", ContainerStatus::Stopped));

    assert_eq!(list.len(), 2);
    assert_eq!(list.get("a").unwrap().status, ContainerStatus::Stopped);

    assert!(list.remove("a"));
    assert!(!list.remove("a"));
    assert_eq!(list.len(), 1);

    list.replace_all(vec![container("c", ContainerStatus::Running)]);
    assert_eq!(statuses(&list.snapshot()), vec![("c".to_string(), ContainerStatus::Running)]);
}

#[test]
fn test_sync_after_local_add_takes_backend_status() {
    let mut list = ContainerList::new();
    list.upsert(container("a", ContainerStatus::Running));

    let ticket = list.begin_fetch();
    list.finish_fetch(ticket, Some(vec![container("a", ContainerStatus::Error)]));

    assert_eq!(list.get("a").unwrap().status, ContainerStatus::Error);
}

#[test]
fn test_mutation_after_fetch_issue_survives() {
    let mut list = ContainerList::new();
    list.replace_all(vec![container("a", ContainerStatus::Running)]);

    let ticket = list.begin_fetch();
    // 拉取进行中发生的本地修改
    list.upsert(container("b", ContainerStatus::Running));
    list.remove("a");
    list.finish_fetch(ticket, Some(vec![container("a", ContainerStatus::Running)]));

    assert_eq!(
        statuses(&list.snapshot()),
        vec![("b".to_string(), ContainerStatus::Running)]
    );

    // 之后发起的拉取以运行时为准
    let ticket = list.begin_fetch();
    list.finish_fetch(ticket, Some(vec![container("a", ContainerStatus::Stopped)]));
    assert_eq!(
        statuses(&list.snapshot()),
        vec![("a".to_string(), ContainerStatus::Stopped)]
    );
}

#[test]
fn test_completion_order_wins() {
    let mut list = ContainerList::new();
    let first = list.begin_fetch();
    let second = list.begin_fetch();

    list.finish_fetch(second, Some(vec![container("a", ContainerStatus::Running)]));
    list.finish_fetch(first, Some(vec![container("a", ContainerStatus::Stopped)]));

    assert_eq!(list.get("a").unwrap().status, ContainerStatus::Stopped);
}

#[test]
fn test_failed_fetch_keeps_list() {
    let mut list = ContainerList::new();
    list.replace_all(vec![container("a", ContainerStatus::Running)]);
    let ticket = list.begin_fetch();
    list.finish_fetch(ticket, None);
    assert_eq!(list.len(), 1);
}

#[test]
fn test_removing_overlay_survives_sync_and_reverts() {
    let mut list = ContainerList::new();
    list.replace_all(vec![container("a", ContainerStatus::Running)]);

    assert!(list.try_begin("a", Pending::Status(ContainerStatus::Removing)));
    assert!(!list.try_begin("a", Pending::Busy));
    assert_eq!(list.get("a").unwrap().status, ContainerStatus::Removing);

    let ticket = list.begin_fetch();
    list.finish_fetch(ticket, Some(vec![container("a", ContainerStatus::Running)]));
    assert_eq!(list.get("a").unwrap().status, ContainerStatus::Removing);

    list.end("a");
    assert_eq!(list.get("a").unwrap().status, ContainerStatus::Running);
    assert!(!list.is_busy("a"));
}

#[test]
fn test_creating_placeholder() {
    let mut list = ContainerList::new();
    let placeholder = container("new", ContainerStatus::Creating);
    assert!(list.try_begin("new", Pending::Creating(placeholder)));

    assert_eq!(list.get("new").unwrap().status, ContainerStatus::Creating);
    assert!(list.is_empty());

    list.end("new");
    assert!(list.get("new").is_none());
}

// ---- SyncEngine ----

#[tokio::test]
async fn test_load_failure_keeps_previous_list() {
    let mock = Arc::new(MockBackend::with_containers(vec![container("a", ContainerStatus::Running)]));
    let engine = engine_with(&mock);
    engine.load().await.unwrap();

    mock.fail_next("network down");
    assert!(engine.load().await.is_err());
    assert_eq!(engine.containers().len(), 1);

    mock.fail_next("network down");
    assert!(engine.sync().await.is_err());
    assert_eq!(engine.containers().len(), 1);
}

#[tokio::test]
async fn test_add_local_then_sync_reflects_backend() {
    let mock = Arc::new(MockBackend::with_containers(vec![container("a", ContainerStatus::Stopped)]));
    let engine = engine_with(&mock);
    let mut rx = engine.subscribe();

    engine.add_local(container("a", ContainerStatus::Running));
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update()[0].status, ContainerStatus::Running);

    engine.sync().await.unwrap();
    assert_eq!(engine.get("a").unwrap().status, ContainerStatus::Stopped);
    assert_eq!(rx.borrow_and_update()[0].status, ContainerStatus::Stopped);
}

#[tokio::test]
async fn test_start_triggers_sync() {
    let mock = Arc::new(MockBackend::with_containers(vec![container("a", ContainerStatus::Stopped)]));
    let engine = engine_with(&mock);
    engine.load().await.unwrap();

    engine.start("a").await.unwrap();
    assert_eq!(MockBackend::calls(&mock.start_calls), 1);
    assert_eq!(MockBackend::calls(&mock.sync_calls), 1);
    assert_eq!(engine.get("a").unwrap().status, ContainerStatus::Running);

    engine.stop("a").await.unwrap();
    assert_eq!(engine.get("a").unwrap().status, ContainerStatus::Stopped);
}

#[tokio::test]
async fn test_failed_start_leaves_state() {
    let mock = Arc::new(MockBackend::with_containers(vec![container("a", ContainerStatus::Error)]));
    let engine = engine_with(&mock);
    engine.load().await.unwrap();

    mock.fail_next("port is already allocated");
    let err = engine.start("a").await.unwrap_err();
    assert!(matches!(err, DbmError::Operation { .. }));
    assert_eq!(engine.get("a").unwrap().status, ContainerStatus::Error);
    assert_eq!(MockBackend::calls(&mock.sync_calls), 0);
}

#[tokio::test]
async fn test_lifecycle_calls_follow_state_machine() {
    let mock = Arc::new(MockBackend::with_containers(vec![
        container("up", ContainerStatus::Running),
        container("down", ContainerStatus::Stopped),
        container("bad", ContainerStatus::Error),
    ]));
    let engine = engine_with(&mock);
    engine.load().await.unwrap();

    assert!(matches!(
        engine.start("up").await,
        Err(DbmError::InvalidTransition {
            from: ContainerStatus::Running,
            to: ContainerStatus::Running,
            ..
        })
    ));
    assert!(matches!(
        engine.stop("down").await,
        Err(DbmError::InvalidTransition { .. })
    ));
    assert!(matches!(
        engine.stop("bad").await,
        Err(DbmError::InvalidTransition { .. })
    ));
    assert!(matches!(
        engine.start("missing").await,
        Err(DbmError::ContainerNotFound(_))
    ));
    assert_eq!(MockBackend::calls(&mock.start_calls), 0);
    assert_eq!(MockBackend::calls(&mock.sync_calls), 0);

    // 错误状态可以直接删除
    engine.remove("bad").await.unwrap();
    assert!(engine.get("bad").is_none());
}

#[tokio::test]
async fn test_create_and_update() {
    let mock = Arc::new(MockBackend::new());
    let engine = engine_with(&mock);

    let created = engine.create(request("a", "pg")).await.unwrap();
    assert_eq!(created.status, ContainerStatus::Running);
    assert_eq!(engine.get("a").unwrap().container_id.as_deref(), Some("rt-a"));

    let updated = engine.update("a", request("a", "pg2")).await.unwrap();
    assert_eq!(updated.name, "pg2");
    assert_eq!(engine.containers().len(), 1);
    assert_eq!(engine.get("a").unwrap().name, "pg2");

    mock.fail_next("boom");
    assert!(engine.create(request("b", "other")).await.is_err());
    assert!(engine.get("b").is_none());
}

#[tokio::test]
async fn test_remove_success_and_failure() {
    let mock = Arc::new(MockBackend::with_containers(vec![
        container("a", ContainerStatus::Running),
        container("b", ContainerStatus::Stopped),
    ]));
    let engine = engine_with(&mock);
    engine.load().await.unwrap();

    mock.fail_next("device busy");
    assert!(engine.remove("a").await.is_err());
    assert_eq!(engine.get("a").unwrap().status, ContainerStatus::Running);

    engine.remove("a").await.unwrap();
    assert!(engine.get("a").is_none());
    assert_eq!(engine.containers().len(), 1);

    assert!(matches!(
        engine.remove("missing").await,
        Err(DbmError::ContainerNotFound(_))
    ));
}

#[tokio::test]
async fn test_slow_sync_completing_last_wins_but_keeps_later_mutation() {
    let mock = Arc::new(MockBackend::with_containers(vec![container("a", ContainerStatus::Running)]));
    let engine = engine_with(&mock);

    // 第一次 sync 取到快照后被挂起
    let release = mock.gate_next_sync();
    let slow = tokio::spawn({
        let engine = engine.clone();
        async move { engine.sync().await }
    });
    tokio::task::yield_now().await;

    engine.add_local(container("local", ContainerStatus::Running));
    mock.set_containers(vec![container("a", ContainerStatus::Stopped)]);
    engine.sync().await.unwrap();
    assert_eq!(engine.get("a").unwrap().status, ContainerStatus::Stopped);

    release.send(()).unwrap();
    slow.await.unwrap().unwrap();

    // 较晚完成的快照生效，但发起之后的本地新增仍然保留
    assert_eq!(engine.get("a").unwrap().status, ContainerStatus::Running);
    assert!(engine.get("local").is_some());
}

// ---- 周期同步 ----

#[tokio::test(start_paused = true)]
async fn test_periodic_sync_respects_visibility_and_cancel() {
    let mock = Arc::new(MockBackend::with_containers(vec![container("a", ContainerStatus::Running)]));
    let engine = engine_with(&mock);
    engine.load().await.unwrap();
    let visibility = Visibility::new(true);

    let handle = spawn_periodic_sync(
        engine.clone(),
        Duration::from_secs(5),
        visibility.subscribe(),
        CancellationToken::new(),
    );

    tokio::time::sleep(Duration::from_millis(5_100)).await;
    assert_eq!(MockBackend::calls(&mock.sync_calls), 1);

    // 失败不清空列表，也不终止循环
    mock.fail_next("network down");
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(MockBackend::calls(&mock.sync_calls), 2);
    assert_eq!(engine.containers().len(), 1);
    assert!(!handle.is_finished());

    visibility.set_visible(false);
    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(MockBackend::calls(&mock.sync_calls), 2);

    visibility.set_visible(true);
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(MockBackend::calls(&mock.sync_calls), 3);

    handle.shutdown().await;
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(MockBackend::calls(&mock.sync_calls), 3);
}

// ---- 可用性监控 ----

#[tokio::test(start_paused = true)]
async fn test_monitor_retries_once_after_failure() {
    let mock = Arc::new(MockBackend::new());
    mock.script_availability(vec![Err(DbmError::unavailable("daemon down"))]);
    let backend: Arc<dyn RuntimeBackend> = mock.clone();
    let monitor = Arc::new(AvailabilityMonitor::new(backend, MonitorTimings::default()));
    assert_eq!(monitor.status().status, RuntimeState::Connecting);

    let visibility = Visibility::new(true);
    let handle = monitor.spawn(visibility.subscribe(), CancellationToken::new());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(MockBackend::calls(&mock.availability_calls), 1);
    assert_eq!(monitor.status().status, RuntimeState::Error);
    assert!(!monitor.is_available());

    // 重试在 10 秒后，而不是 30 秒
    tokio::time::sleep(Duration::from_millis(9_800)).await;
    assert_eq!(MockBackend::calls(&mock.availability_calls), 1);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(MockBackend::calls(&mock.availability_calls), 2);
    assert!(monitor.is_available());

    // 重试成功后不再有额外探测，直到主间隔
    tokio::time::sleep(Duration::from_millis(19_800)).await;
    assert_eq!(MockBackend::calls(&mock.availability_calls), 2);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(MockBackend::calls(&mock.availability_calls), 3);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_monitor_pauses_when_hidden() {
    let mock = Arc::new(MockBackend::new());
    mock.script_availability(vec![Ok(AvailabilityStatus::stopped("not running"))]);
    let backend: Arc<dyn RuntimeBackend> = mock.clone();
    let monitor = Arc::new(AvailabilityMonitor::new(backend, MonitorTimings::default()));
    let visibility = Visibility::new(true);
    let _handle = monitor.spawn(visibility.subscribe(), CancellationToken::new());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(MockBackend::calls(&mock.availability_calls), 1);

    // 隐藏后待执行的重试也被放弃
    visibility.set_visible(false);
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(MockBackend::calls(&mock.availability_calls), 1);

    visibility.set_visible(true);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(MockBackend::calls(&mock.availability_calls), 2);
    assert!(monitor.is_available());
}

#[tokio::test(start_paused = true)]
async fn test_monitor_stops_on_drop() {
    let mock = Arc::new(MockBackend::new());
    let backend: Arc<dyn RuntimeBackend> = mock.clone();
    let monitor = Arc::new(AvailabilityMonitor::new(backend, MonitorTimings::default()));
    let visibility = Visibility::new(true);

    let handle = monitor.spawn(visibility.subscribe(), CancellationToken::new());
    tokio::time::sleep(Duration::from_millis(100)).await;
    drop(handle);

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(MockBackend::calls(&mock.availability_calls), 1);
}

#[tokio::test]
async fn test_manual_refresh_notifies() {
    let mock = Arc::new(MockBackend::new());
    mock.script_availability(vec![Ok(AvailabilityStatus::stopped("not running"))]);
    let backend: Arc<dyn RuntimeBackend> = mock.clone();
    let monitor = AvailabilityMonitor::new(backend, MonitorTimings::default());
    let mut notifications = monitor.notifications();

    let status = monitor.refresh().await;
    assert!(!status.is_available());
    let notification = notifications.recv().await.unwrap();
    assert!(!notification.available);
    assert!(notification.message.contains("not running"));

    // 后台探测不发通知
    monitor.probe().await;
    assert!(notifications.try_recv().is_err());

    monitor.refresh().await;
    assert!(notifications.recv().await.unwrap().available);
}
