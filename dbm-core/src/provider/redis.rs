use super::common;
use super::{DatabaseProvider, LaunchDescriptor, ProviderConfig, ValidationResult};
use crate::container::Container;
use crate::schema::{FieldGroup, FormField};

const REPOSITORY: &str = "redis";
const DEFAULT_POLICY: &str = "noeviction";
const POLICIES: &[&str] = &[
    "noeviction",
    "allkeys-lru",
    "allkeys-lfu",
    "allkeys-random",
    "volatile-lru",
    "volatile-lfu",
    "volatile-random",
    "volatile-ttl",
];
const MAX_MEMORY_PATTERN: &str = r"(?i)^\d+(b|k|kb|m|mb|g|gb)?$";
const MIN_PASSWORD: usize = 4;

#[derive(Debug, Default, Clone, Copy)]
pub struct RedisProvider;

impl DatabaseProvider for RedisProvider {
    fn id(&self) -> &'static str {
        "redis"
    }

    fn name(&self) -> &'static str {
        "Redis"
    }

    fn description(&self) -> &'static str {
        "内存键值存储，常用作缓存和消息队列"
    }

    fn default_port(&self) -> u16 {
        6379
    }

    fn data_path(&self) -> &'static str {
        "/data"
    }

    fn versions(&self) -> &'static [&'static str] {
        &["7.4", "7.2", "8.0", "6.2", "alpine"]
    }

    fn authentication_fields(&self) -> Vec<FormField> {
        vec![
            FormField::checkbox("enableAuth", "启用密码").default_value(false),
            FormField::password("password", "密码")
                .min(MIN_PASSWORD as f64)
                .help_text("启用密码时必填"),
        ]
    }

    fn advanced_fields(&self) -> Vec<FieldGroup> {
        vec![
            FieldGroup::new(
                "内存",
                vec![
                    FormField::text("redisSettings.maxMemory", "最大内存")
                        .pattern(MAX_MEMORY_PATTERN)
                        .message("格式示例: 256mb、1gb")
                        .placeholder("256mb"),
                    FormField::select("redisSettings.maxMemoryPolicy", "淘汰策略", POLICIES.iter().copied())
                        .default_value(DEFAULT_POLICY),
                ],
            ),
            FieldGroup::new(
                "持久化",
                vec![FormField::checkbox("redisSettings.appendOnly", "开启 AOF").default_value(false)],
            ),
        ]
    }

    fn build_docker_args(&self, config: &ProviderConfig) -> LaunchDescriptor {
        let version = common::resolved_version(config, self.versions());
        let mut args = LaunchDescriptor::new(common::image(REPOSITORY, &version));

        args.port(common::host_port(config, self.default_port()), self.container_port());
        args.volume(common::data_volume(config, self.data_path()));

        // 官方镜像没有密码环境变量，只能通过启动参数设置
        let mut flags = Vec::new();
        if auth_enabled(config) {
            if let Some(password) = config.password() {
                flags.push("--requirepass".to_string());
                flags.push(password);
            }
        }
        if let Some(max_memory) = config.string("redisSettings.maxMemory") {
            flags.push("--maxmemory".to_string());
            flags.push(max_memory.to_lowercase());
        }
        if let Some(policy) = config
            .string("redisSettings.maxMemoryPolicy")
            .filter(|p| p != DEFAULT_POLICY)
        {
            flags.push("--maxmemory-policy".to_string());
            flags.push(policy);
        }
        if config.bool("redisSettings.appendOnly") {
            flags.push("--appendonly".to_string());
            flags.push("yes".to_string());
        }

        if !flags.is_empty() {
            args.arg("redis-server");
            for flag in flags {
                args.arg(flag);
            }
        }

        args
    }

    fn validate_config(&self, config: &ProviderConfig) -> ValidationResult {
        let mut errors = Vec::new();
        common::validate_basics(config, &mut errors);

        if auth_enabled(config) {
            common::validate_password(config, MIN_PASSWORD, &mut errors);
        }
        if let Some(max_memory) = config.string("redisSettings.maxMemory") {
            if !common::matches_pattern(MAX_MEMORY_PATTERN, &max_memory) {
                errors.push(format!("最大内存格式不正确: {max_memory}"));
            }
        }
        common::validate_choice(
            config,
            "redisSettings.maxMemoryPolicy",
            "淘汰策略",
            POLICIES,
            &mut errors,
        );

        ValidationResult::from_errors(errors)
    }

    fn connection_string(&self, container: &Container) -> String {
        let password = container
            .password
            .as_deref()
            .filter(|_| container.enable_auth);
        common::local_url("redis", None, password, container.port, "0", &[])
    }

    fn requires_auth(&self) -> bool {
        false
    }
}

/// 勾选了启用密码；未勾选但填写了密码也视为启用
fn auth_enabled(config: &ProviderConfig) -> bool {
    config
        .enable_auth()
        .unwrap_or_else(|| config.password().is_some())
}
