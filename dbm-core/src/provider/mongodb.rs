use super::common;
use super::{DatabaseProvider, LaunchDescriptor, ProviderConfig, ValidationResult};
use crate::container::Container;
use crate::schema::{FieldGroup, FormField};

const REPOSITORY: &str = "mongo";
const DEFAULT_USER: &str = "admin";
const DEFAULT_DATABASE: &str = "admin";
const DEFAULT_AUTH_SOURCE: &str = "admin";
const MIN_PASSWORD: usize = 4;
const AUTH_SOURCE_PATTERN: &str = r"^[a-zA-Z0-9_-]+$";

#[derive(Debug, Default, Clone, Copy)]
pub struct MongoDbProvider;

impl DatabaseProvider for MongoDbProvider {
    fn id(&self) -> &'static str {
        "mongodb"
    }

    fn name(&self) -> &'static str {
        "MongoDB"
    }

    fn description(&self) -> &'static str {
        "面向文档的 NoSQL 数据库"
    }

    fn default_port(&self) -> u16 {
        27017
    }

    fn data_path(&self) -> &'static str {
        "/data/db"
    }

    fn versions(&self) -> &'static [&'static str] {
        &["8.0", "7.0", "6.0", "5.0"]
    }

    fn authentication_fields(&self) -> Vec<FormField> {
        common::credential_fields(DEFAULT_USER, MIN_PASSWORD, "app")
    }

    fn advanced_fields(&self) -> Vec<FieldGroup> {
        vec![FieldGroup::new(
            "存储引擎",
            vec![
                FormField::text("mongoSettings.authSource", "认证数据库")
                    .default_value(DEFAULT_AUTH_SOURCE),
                FormField::number("mongoSettings.oplogSize", "Oplog 大小 (MB)").min(1.0),
                FormField::number("mongoSettings.wiredTigerCacheSizeGb", "WiredTiger 缓存 (GB)")
                    .min(0.25)
                    .help_text("不填写时由 mongod 按可用内存自动计算"),
            ],
        )]
    }

    fn build_docker_args(&self, config: &ProviderConfig) -> LaunchDescriptor {
        let version = common::resolved_version(config, self.versions());
        let mut args = LaunchDescriptor::new(common::image(REPOSITORY, &version));

        args.env(
            "MONGO_INITDB_ROOT_USERNAME",
            config.username().unwrap_or_else(|| DEFAULT_USER.to_string()),
        );
        args.env("MONGO_INITDB_ROOT_PASSWORD", config.password().unwrap_or_default());
        if let Some(db) = config.database_name() {
            args.env("MONGO_INITDB_DATABASE", db);
        }

        args.port(common::host_port(config, self.default_port()), self.container_port());
        args.volume(common::data_volume(config, self.data_path()));

        if let Some(size) = config.u32("mongoSettings.oplogSize") {
            args.arg("--oplogSize").arg(size.to_string());
        }
        if let Some(cache) = config.f64("mongoSettings.wiredTigerCacheSizeGb") {
            args.arg("--wiredTigerCacheSizeGB").arg(cache.to_string());
        }

        args
    }

    fn validate_config(&self, config: &ProviderConfig) -> ValidationResult {
        let mut errors = Vec::new();
        common::validate_basics(config, &mut errors);
        common::validate_password(config, MIN_PASSWORD, &mut errors);
        common::validate_identifier(
            config,
            "mongoSettings.authSource",
            "认证数据库",
            AUTH_SOURCE_PATTERN,
            &mut errors,
        );

        if config.is_present("mongoSettings.oplogSize")
            && config.u32("mongoSettings.oplogSize").is_none_or(|n| n == 0)
        {
            errors.push("Oplog 大小必须是正整数".to_string());
        }
        if config.is_present("mongoSettings.wiredTigerCacheSizeGb")
            && config
                .f64("mongoSettings.wiredTigerCacheSizeGb")
                .is_none_or(|gb| gb < 0.25)
        {
            errors.push("WiredTiger 缓存不能小于 0.25 GB".to_string());
        }

        ValidationResult::from_errors(errors)
    }

    fn connection_string(&self, container: &Container) -> String {
        let username = container.username.as_deref().unwrap_or(DEFAULT_USER);
        let database = container
            .database_name
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_DATABASE);
        common::local_url(
            "mongodb",
            Some(username),
            container.password.as_deref(),
            container.port,
            database,
            &[(
                "authSource",
                container.auth_source.as_deref().unwrap_or(DEFAULT_AUTH_SOURCE),
            )],
        )
    }

    fn auth_source(&self, config: &ProviderConfig) -> Option<String> {
        config.string("mongoSettings.authSource")
    }

    fn requires_auth(&self) -> bool {
        true
    }

    fn default_username(&self) -> Option<&'static str> {
        Some(DEFAULT_USER)
    }
}
