//! 提交前基于本地容器列表的端口与名称冲突检测

use crate::container::Container;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConflictError {
    #[error("端口 {port} 已被占用{}", .holder.as_deref().map(|h| format!("（{h}）")).unwrap_or_default())]
    PortInUse { port: u16, holder: Option<String> },

    #[error("容器名 {name} 已存在")]
    NameInUse { name: String },
}

/// 端口是否空闲，`exclude_id` 用于编辑时排除自身
pub fn is_port_available(containers: &[Container], port: u16, exclude_id: Option<&str>) -> bool {
    port_holder(containers, port, exclude_id).is_none()
}

/// 名称是否空闲，比较时忽略大小写
pub fn is_name_available(containers: &[Container], name: &str, exclude_id: Option<&str>) -> bool {
    name_holder(containers, name, exclude_id).is_none()
}

/// 先检查名称再检查端口，返回第一个冲突
pub fn check_conflicts(
    containers: &[Container],
    name: &str,
    port: u16,
    exclude_id: Option<&str>,
) -> Result<(), ConflictError> {
    if name_holder(containers, name, exclude_id).is_some() {
        return Err(ConflictError::NameInUse {
            name: name.to_string(),
        });
    }
    if let Some(holder) = port_holder(containers, port, exclude_id) {
        return Err(ConflictError::PortInUse {
            port,
            holder: Some(holder.name.clone()),
        });
    }
    Ok(())
}

fn others<'a>(
    containers: &'a [Container],
    exclude_id: Option<&'a str>,
) -> impl Iterator<Item = &'a Container> {
    containers
        .iter()
        .filter(move |c| exclude_id != Some(c.id.as_str()))
}

fn port_holder<'a>(
    containers: &'a [Container],
    port: u16,
    exclude_id: Option<&'a str>,
) -> Option<&'a Container> {
    others(containers, exclude_id).find(|c| c.port == port)
}

fn name_holder<'a>(
    containers: &'a [Container],
    name: &str,
    exclude_id: Option<&'a str>,
) -> Option<&'a Container> {
    others(containers, exclude_id).find(|c| c.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ContainerStatus;

    fn container(id: &str, name: &str, port: u16) -> Container {
        Container {
            id: id.to_string(),
            name: name.to_string(),
            db_type: "postgresql".to_string(),
            version: "16".to_string(),
            status: ContainerStatus::Stopped,
            port,
            created_at: "2026-01-01".to_string(),
            max_connections: 100,
            container_id: None,
            username: None,
            password: None,
            database_name: None,
            persist_data: false,
            enable_auth: true,
            auth_source: None,
        }
    }

    #[test]
    fn test_port_self_exclusion() {
        let list = vec![container("a", "pg", 5432)];
        assert!(!is_port_available(&list, 5432, None));
        assert!(is_port_available(&list, 5432, Some("a")));
        assert!(!is_port_available(&list, 5432, Some("b")));
        assert!(is_port_available(&list, 5433, None));
    }

    #[test]
    fn test_name_is_case_insensitive() {
        let list = vec![container("a", "Main-PG", 5432)];
        assert!(!is_name_available(&list, "main-pg", None));
        assert!(is_name_available(&list, "main-pg", Some("a")));
    }

    #[test]
    fn test_check_conflicts_reports_holder() {
        let list = vec![container("a", "pg", 5432), container("b", "my", 3306)];
        assert_eq!(
            check_conflicts(&list, "new", 3306, None),
            Err(ConflictError::PortInUse {
                port: 3306,
                holder: Some("my".to_string())
            })
        );
        assert_eq!(
            check_conflicts(&list, "pg", 1, None),
            Err(ConflictError::NameInUse {
                name: "pg".to_string()
            })
        );
        assert_eq!(check_conflicts(&list, "pg", 5432, Some("a")), Ok(()));
    }

    #[test]
    fn test_display() {
        let err = ConflictError::PortInUse {
            port: 5432,
            holder: None,
        };
        assert_eq!(err.to_string(), "端口 5432 已被占用");
    }
}
