use super::common;
use super::version::VersionLine;
use super::{DatabaseProvider, LaunchDescriptor, ProviderConfig, ValidationResult};
use crate::container::Container;
use crate::schema::{FieldGroup, FormField};

const REPOSITORY: &str = "postgres";
const DEFAULT_USER: &str = "postgres";
const DEFAULT_DATABASE: &str = "postgres";
const DEFAULT_AUTH_METHOD: &str = "scram-sha-256";
const AUTH_METHODS: &[&str] = &["scram-sha-256", "md5", "trust"];
const DEFAULT_MAX_CONNECTIONS: u32 = 100;
const MIN_PASSWORD: usize = 4;
const IDENTIFIER_PATTERN: &str = r"^[a-zA-Z_][a-zA-Z0-9_]*$";

const DATA_PATH: &str = "/var/lib/postgresql/data";
/// 18 起官方镜像把 PGDATA 放到按主版本划分的子目录，挂载点上移一级
const DATA_PATH_V18: &str = "/var/lib/postgresql";
const VERSIONED_LAYOUT: VersionLine = VersionLine::newest_from(18);

#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresProvider;

impl PostgresProvider {
    fn data_path_for(version: &str) -> &'static str {
        if VERSIONED_LAYOUT.contains(version) {
            DATA_PATH_V18
        } else {
            DATA_PATH
        }
    }
}

impl DatabaseProvider for PostgresProvider {
    fn id(&self) -> &'static str {
        "postgresql"
    }

    fn name(&self) -> &'static str {
        "PostgreSQL"
    }

    fn description(&self) -> &'static str {
        "功能强大的开源关系型数据库"
    }

    fn default_port(&self) -> u16 {
        5432
    }

    fn data_path(&self) -> &'static str {
        DATA_PATH
    }

    fn versions(&self) -> &'static [&'static str] {
        &["18", "17", "16", "15", "14", "13"]
    }

    fn authentication_fields(&self) -> Vec<FormField> {
        common::credential_fields(DEFAULT_USER, MIN_PASSWORD, DEFAULT_DATABASE)
    }

    fn advanced_fields(&self) -> Vec<FieldGroup> {
        vec![
            FieldGroup::new(
                "认证",
                vec![
                    FormField::select("postgresSettings.hostAuthMethod", "主机认证方式", AUTH_METHODS.iter().copied())
                        .default_value(DEFAULT_AUTH_METHOD)
                        .help_text("trust 允许无密码连接，仅用于本地开发"),
                ],
            ),
            FieldGroup::new(
                "初始化与性能",
                vec![
                    FormField::text("postgresSettings.initdbArgs", "initdb 参数")
                        .placeholder("--encoding=UTF8 --locale=C"),
                    FormField::text("postgresSettings.sharedPreloadLibraries", "预加载扩展")
                        .placeholder("pg_stat_statements"),
                    common::max_connections_field(DEFAULT_MAX_CONNECTIONS),
                ],
            )
            .with_description("仅在首次初始化数据目录时生效"),
        ]
    }

    fn build_docker_args(&self, config: &ProviderConfig) -> LaunchDescriptor {
        let version = common::resolved_version(config, self.versions());
        let mut args = LaunchDescriptor::new(common::image(REPOSITORY, &version));

        args.env("POSTGRES_PASSWORD", config.password().unwrap_or_default());
        if let Some(user) = config.username().filter(|u| u != DEFAULT_USER) {
            args.env("POSTGRES_USER", user);
        }
        if let Some(db) = config.database_name().filter(|d| d != DEFAULT_DATABASE) {
            args.env("POSTGRES_DB", db);
        }
        if let Some(method) = config
            .string("postgresSettings.hostAuthMethod")
            .filter(|m| m != DEFAULT_AUTH_METHOD)
        {
            args.env("POSTGRES_HOST_AUTH_METHOD", method);
        }
        if let Some(initdb) = config.string("postgresSettings.initdbArgs") {
            args.env("POSTGRES_INITDB_ARGS", initdb);
        }

        args.port(common::host_port(config, self.default_port()), self.container_port());
        args.volume(common::data_volume(config, Self::data_path_for(&version)));

        if let Some(libraries) = config.string("postgresSettings.sharedPreloadLibraries") {
            args.arg("-c")
                .arg(format!("shared_preload_libraries={libraries}"));
        }
        if let Some(max) = config
            .max_connections()
            .filter(|&n| n != DEFAULT_MAX_CONNECTIONS)
        {
            args.arg("-c").arg(format!("max_connections={max}"));
        }

        args
    }

    fn validate_config(&self, config: &ProviderConfig) -> ValidationResult {
        let mut errors = Vec::new();
        common::validate_basics(config, &mut errors);
        common::validate_password(config, MIN_PASSWORD, &mut errors);
        common::validate_identifier(config, "username", "用户名", IDENTIFIER_PATTERN, &mut errors);
        common::validate_identifier(config, "databaseName", "数据库名", IDENTIFIER_PATTERN, &mut errors);
        common::validate_choice(
            config,
            "postgresSettings.hostAuthMethod",
            "主机认证方式",
            AUTH_METHODS,
            &mut errors,
        );
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
            "postgresql",
            Some(username),
            container.password.as_deref(),
            container.port,
            database,
            &[],
        )
    }

    fn requires_auth(&self) -> bool {
        true
    }

    fn default_username(&self) -> Option<&'static str> {
        Some(DEFAULT_USER)
    }
}
