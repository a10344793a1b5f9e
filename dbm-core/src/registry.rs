use crate::provider::{
    DatabaseProvider, InfluxDbProvider, MongoDbProvider, MySqlProvider, PostgresProvider,
    RedisProvider,
};
use crate::{DbmError, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// 进程级注册表，首次访问时用内置提供者初始化，之后只读
static GLOBAL_REGISTRY: Lazy<ProviderRegistry> = Lazy::new(ProviderRegistry::builtin);

/// 获取进程级注册表
pub fn global() -> &'static ProviderRegistry {
    &GLOBAL_REGISTRY
}

/// 提供者注册表
///
/// 保持注册顺序；重复注册同一 ID 会原位替换，不改变数量和顺序。
#[derive(Debug, Default, Clone)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn DatabaseProvider>>,
    index: HashMap<String, usize>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 内置的全部提供者
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PostgresProvider));
        registry.register(Arc::new(MySqlProvider));
        registry.register(Arc::new(RedisProvider));
        registry.register(Arc::new(MongoDbProvider));
        registry.register(Arc::new(InfluxDbProvider));
        registry
    }

    /// 注册或覆盖提供者
    pub fn register(&mut self, provider: Arc<dyn DatabaseProvider>) {
        let id = provider.id().to_string();
        match self.index.get(&id) {
            Some(&position) => {
                debug!("覆盖已注册的提供者: {}", id);
                self.providers[position] = provider;
            }
            None => {
                self.index.insert(id, self.providers.len());
                self.providers.push(provider);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn DatabaseProvider>> {
        self.index
            .get(id)
            .and_then(|&position| self.providers.get(position))
            .cloned()
    }

    /// 与 `get` 相同，但未知 ID 返回错误
    pub fn require(&self, id: &str) -> Result<Arc<dyn DatabaseProvider>> {
        self.get(id)
            .ok_or_else(|| DbmError::UnknownProvider(id.to_string()))
    }

    /// 按注册顺序返回全部提供者
    pub fn get_all(&self) -> &[Arc<dyn DatabaseProvider>] {
        &self.providers
    }

    pub fn has(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn count(&self) -> usize {
        self.providers.len()
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.id()).collect()
    }
}
