use crate::{DbmError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 用户填写的配置对象
///
/// 字段按点分路径寻址（例如 `postgresSettings.initdbArgs`），与字段描述中的
/// `name` 一一对应。读取方法把空字符串视为未填写。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderConfig(Map<String, Value>);

impl ProviderConfig {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// 从 JSON 对象构造
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(DbmError::custom(format!("配置必须是 JSON 对象: {other}"))),
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// 读取原始值，优先匹配平铺的键，其次按路径逐级查找
    pub fn get(&self, path: &str) -> Option<&Value> {
        if let Some(value) = self.0.get(path) {
            return Some(value);
        }

        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.0.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// 按路径写入，缺失或非对象的中间节点会被替换为对象
    pub fn set(&mut self, path: &str, value: impl Into<Value>) {
        let value = value.into();
        let segments: Vec<&str> = path.split('.').collect();
        let Some((last, parents)) = segments.split_last() else {
            return;
        };

        // 平铺写法的旧键会遮蔽嵌套值，先移除
        if !parents.is_empty() {
            self.0.remove(path);
        }

        let mut current = &mut self.0;
        for segment in parents {
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            current = match entry {
                Value::Object(map) => map,
                _ => return,
            };
        }
        current.insert(last.to_string(), value);
    }

    pub fn with(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.set(path, value);
        self
    }

    /// 非空文本（数字会转为文本），首尾空白会被去除
    pub fn string(&self, path: &str) -> Option<String> {
        match self.get(path)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn f64(&self, path: &str) -> Option<f64> {
        match self.get(path)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn u32(&self, path: &str) -> Option<u32> {
        match self.get(path)? {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn u16(&self, path: &str) -> Option<u16> {
        self.u32(path).and_then(|n| u16::try_from(n).ok())
    }

    /// 布尔开关，区分“未填写”与“false”
    pub fn flag(&self, path: &str) -> Option<bool> {
        match self.get(path)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "yes" | "1" | "on" => Some(true),
                "false" | "no" | "0" | "off" => Some(false),
                _ => None,
            },
            Value::Number(n) => n.as_u64().map(|n| n != 0),
            _ => None,
        }
    }

    pub fn bool(&self, path: &str) -> bool {
        self.flag(path).unwrap_or(false)
    }

    /// 路径上是否存在任何值（包括空字符串）
    pub fn is_present(&self, path: &str) -> bool {
        !matches!(self.get(path), None | Some(Value::Null))
    }

    // 公共字段

    pub fn name(&self) -> Option<String> {
        self.string("name")
    }

    pub fn version(&self) -> Option<String> {
        self.string("version")
    }

    pub fn port(&self) -> Option<u16> {
        self.u16("port")
    }

    pub fn username(&self) -> Option<String> {
        self.string("username")
    }

    pub fn password(&self) -> Option<String> {
        self.string("password")
    }

    pub fn database_name(&self) -> Option<String> {
        self.string("databaseName")
    }

    pub fn persist_data(&self) -> bool {
        self.bool("persistData")
    }

    pub fn enable_auth(&self) -> Option<bool> {
        self.flag("enableAuth")
    }

    pub fn max_connections(&self) -> Option<u32> {
        self.u32("maxConnections")
    }
}

impl From<Map<String, Value>> for ProviderConfig {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_set_and_get() {
        let mut config = ProviderConfig::new();
        config.set("postgresSettings.initdbArgs", "--encoding=UTF8");
        config.set("name", "pg");

        assert_eq!(
            config.into_value(),
            json!({"name": "pg", "postgresSettings": {"initdbArgs": "--encoding=UTF8"}})
        );
    }

    #[test]
    fn test_flat_key_is_accepted() {
        let config =
            ProviderConfig::from_value(json!({"redisSettings.maxMemory": "256mb"})).unwrap();
        assert_eq!(
            config.string("redisSettings.maxMemory").as_deref(),
            Some("256mb")
        );
    }

    #[test]
    fn test_set_replaces_scalar_parent() {
        let mut config = ProviderConfig::new().with("mysqlSettings", "oops");
        config.set("mysqlSettings.collation", "utf8mb4_bin");
        assert_eq!(
            config.string("mysqlSettings.collation").as_deref(),
            Some("utf8mb4_bin")
        );
    }

    #[test]
    fn test_typed_readers() {
        let config = ProviderConfig::from_value(json!({
            "port": "5433",
            "maxConnections": 200,
            "persistData": "true",
            "enableAuth": false,
            "username": "   ",
            "big": 70000
        }))
        .unwrap();

        assert_eq!(config.port(), Some(5433));
        assert_eq!(config.max_connections(), Some(200));
        assert!(config.persist_data());
        assert_eq!(config.enable_auth(), Some(false));
        assert_eq!(config.username(), None);
        assert!(config.is_present("username"));
        assert_eq!(config.u16("big"), None);
        assert_eq!(config.u32("big"), Some(70000));
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(ProviderConfig::from_value(json!([1, 2])).is_err());
    }
}
