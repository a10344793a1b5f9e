// 模块声明
mod types;

// 重新导出公共API
pub use types::{Container, ContainerMetadata, ContainerStatus, RunRequest};

#[cfg(test)]
mod tests {
    use super::*;
    use ContainerStatus::*;

    #[test]
    fn test_status_from_runtime() {
        assert_eq!(ContainerStatus::from_runtime("running"), Running);
        assert_eq!(ContainerStatus::from_runtime("UP"), Running);
        assert_eq!(ContainerStatus::from_runtime("exited"), Stopped);
        assert_eq!(ContainerStatus::from_runtime("removing"), Removing);
        assert_eq!(ContainerStatus::from_runtime("dead"), Error);
    }

    #[test]
    fn test_state_machine() {
        assert!(Creating.can_transition_to(Running));
        assert!(Creating.can_transition_to(Error));
        assert!(!Creating.can_transition_to(Stopped));
        assert!(Running.can_transition_to(Stopped));
        assert!(Stopped.can_transition_to(Running));
        // error 只能通过显式启动重试离开
        assert!(Error.can_transition_to(Running));
        assert!(!Error.can_transition_to(Stopped));
        for status in [Running, Stopped, Error] {
            assert!(status.can_transition_to(Removing));
        }
        assert!(!Removing.can_transition_to(Running));
        assert!(!Creating.can_transition_to(Removing));
    }

    #[test]
    fn test_transient_states() {
        assert!(Creating.is_transient());
        assert!(Removing.is_transient());
        assert!(!Running.is_transient());
        assert!(!Error.is_transient());
    }

    #[test]
    fn test_container_uses_camel_case() {
        let container = Container {
            id: "c1".to_string(),
            name: "pg".to_string(),
            db_type: "postgresql".to_string(),
            version: "16".to_string(),
            status: Running,
            port: 5432,
            created_at: "2026-01-01".to_string(),
            max_connections: 100,
            container_id: None,
            username: None,
            password: None,
            database_name: None,
            persist_data: false,
            enable_auth: true,
            auth_source: None,
        };

        let value = serde_json::to_value(&container).unwrap();
        assert_eq!(value["dbType"], "postgresql");
        assert_eq!(value["status"], "running");
        assert_eq!(value["maxConnections"], 100);
        assert!(value.get("db_type").is_none());
    }
}
