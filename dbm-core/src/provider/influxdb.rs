use super::common;
use super::version::VersionLine;
use super::{DatabaseProvider, LaunchDescriptor, ProviderConfig, ValidationResult};
use crate::container::Container;
use crate::schema::{FieldGroup, FormField};

const REPOSITORY: &str = "influxdb";
const DEFAULT_USER: &str = "admin";
const DEFAULT_ORG: &str = "primary";
const RPC_CONTAINER_PORT: u16 = 8088;
const MIN_PASSWORD_V1: usize = 4;
/// 2.x 初始化要求密码至少 8 位
const MIN_PASSWORD_V2: usize = 8;
const RETENTION_PATTERN: &str = r"^(0|\d+(ns|us|ms|s|m|h|d|w))$";

const DATA_PATH_V1: &str = "/var/lib/influxdb";
const DATA_PATH_V2: &str = "/var/lib/influxdb2";

/// 2.x 起改用 `DOCKER_INFLUXDB_INIT_*` 初始化，`latest`/`alpine` 也属于这一线
const V2_LINE: VersionLine = VersionLine::newest_from(2);

#[derive(Debug, Default, Clone, Copy)]
pub struct InfluxDbProvider;

impl InfluxDbProvider {
    fn is_v2(version: &str) -> bool {
        V2_LINE.contains(version)
    }

    fn build_v2(config: &ProviderConfig, args: &mut LaunchDescriptor) {
        args.env("DOCKER_INFLUXDB_INIT_MODE", "setup");
        args.env(
            "DOCKER_INFLUXDB_INIT_USERNAME",
            config.username().unwrap_or_else(|| DEFAULT_USER.to_string()),
        );
        args.env("DOCKER_INFLUXDB_INIT_PASSWORD", config.password().unwrap_or_default());
        args.env(
            "DOCKER_INFLUXDB_INIT_ORG",
            config
                .string("influxSettings.org")
                .unwrap_or_else(|| DEFAULT_ORG.to_string()),
        );
        if let Some(bucket) = config.database_name() {
            args.env("DOCKER_INFLUXDB_INIT_BUCKET", bucket);
        }
        if let Some(retention) = config.string("influxSettings.retention") {
            args.env("DOCKER_INFLUXDB_INIT_RETENTION", retention);
        }
        if let Some(token) = config.string("influxSettings.adminToken") {
            args.env("DOCKER_INFLUXDB_INIT_ADMIN_TOKEN", token);
        }
    }

    fn build_v1(config: &ProviderConfig, args: &mut LaunchDescriptor) {
        if let Some(db) = config.database_name() {
            args.env("INFLUXDB_DB", db);
        }
        let auth = config.enable_auth().unwrap_or(true);
        args.env("INFLUXDB_HTTP_AUTH_ENABLED", auth.to_string());
        if auth {
            args.env(
                "INFLUXDB_ADMIN_USER",
                config.username().unwrap_or_else(|| DEFAULT_USER.to_string()),
            );
            args.env("INFLUXDB_ADMIN_PASSWORD", config.password().unwrap_or_default());
        }
    }
}

impl DatabaseProvider for InfluxDbProvider {
    fn id(&self) -> &'static str {
        "influxdb"
    }

    fn name(&self) -> &'static str {
        "InfluxDB"
    }

    fn description(&self) -> &'static str {
        "时序数据库，适合监控指标与物联网数据"
    }

    fn default_port(&self) -> u16 {
        8086
    }

    fn data_path(&self) -> &'static str {
        DATA_PATH_V2
    }

    fn versions(&self) -> &'static [&'static str] {
        &["2.7", "2.6", "1.11", "1.8"]
    }

    fn authentication_fields(&self) -> Vec<FormField> {
        vec![
            FormField::text("username", "用户名").default_value(DEFAULT_USER),
            FormField::password("password", "密码")
                .required()
                .min(MIN_PASSWORD_V2 as f64)
                .help_text("2.x 至少 8 个字符"),
            FormField::text("databaseName", "Bucket / 数据库")
                .placeholder("metrics")
                .help_text("2.x 作为初始 bucket，1.x 作为初始数据库"),
        ]
    }

    fn advanced_fields(&self) -> Vec<FieldGroup> {
        vec![
            FieldGroup::new(
                "2.x 初始化",
                vec![
                    FormField::text("influxSettings.org", "组织").default_value(DEFAULT_ORG),
                    FormField::text("influxSettings.retention", "保留时长")
                        .pattern(RETENTION_PATTERN)
                        .message("格式示例: 0（永久）、30d、72h")
                        .placeholder("30d"),
                    FormField::password("influxSettings.adminToken", "管理员 Token")
                        .help_text("不填写时由 InfluxDB 自动生成"),
                ],
            )
            .with_description("仅适用于 2.x 版本"),
            FieldGroup::new(
                "1.x",
                vec![
                    FormField::number("influxSettings.rpcPort", "RPC 端口")
                        .min(common::PORT_MIN)
                        .max(common::PORT_MAX)
                        .help_text("备份与恢复使用的端口，映射到容器内 8088"),
                ],
            )
            .with_description("仅适用于 1.x 版本"),
        ]
    }

    fn build_docker_args(&self, config: &ProviderConfig) -> LaunchDescriptor {
        let version = common::resolved_version(config, self.versions());
        let v2 = Self::is_v2(&version);
        let mut args = LaunchDescriptor::new(common::image(REPOSITORY, &version));

        if v2 {
            Self::build_v2(config, &mut args);
        } else {
            Self::build_v1(config, &mut args);
        }

        args.port(common::host_port(config, self.default_port()), self.container_port());
        if !v2 {
            if let Some(rpc_port) = config.u16("influxSettings.rpcPort").filter(|&p| p != 0) {
                args.port(rpc_port, RPC_CONTAINER_PORT);
            }
        }

        let path = if v2 { DATA_PATH_V2 } else { DATA_PATH_V1 };
        args.volume(common::data_volume(config, path));

        args
    }

    fn validate_config(&self, config: &ProviderConfig) -> ValidationResult {
        let mut errors = Vec::new();
        common::validate_basics(config, &mut errors);

        let version = common::resolved_version(config, self.versions());
        if Self::is_v2(&version) {
            common::validate_password(config, MIN_PASSWORD_V2, &mut errors);
            if config.string("influxSettings.org").is_none() || config.database_name().is_none() {
                errors.push("2.x 版本必须填写组织和 Bucket".to_string());
            }
            if let Some(retention) = config.string("influxSettings.retention") {
                if !common::matches_pattern(RETENTION_PATTERN, &retention) {
                    errors.push(format!("保留时长格式不正确: {retention}"));
                }
            }
        } else if config.enable_auth().unwrap_or(true) {
            if config.username().is_none() {
                errors.push("启用认证时用户名不能为空".to_string());
            }
            common::validate_password(config, MIN_PASSWORD_V1, &mut errors);
        }

        if config.is_present("influxSettings.rpcPort")
            && config
                .u16("influxSettings.rpcPort")
                .is_none_or(|p| p == 0)
        {
            errors.push("RPC 端口必须在 1 到 65535 之间".to_string());
        }

        ValidationResult::from_errors(errors)
    }

    fn connection_string(&self, container: &Container) -> String {
        let query_key = if Self::is_v2(&container.version) {
            "bucket"
        } else {
            "db"
        };
        let query: Vec<(&str, &str)> = container
            .database_name
            .as_deref()
            .filter(|d| !d.is_empty())
            .map(|db| vec![(query_key, db)])
            .unwrap_or_default();
        let (username, password) = if container.enable_auth {
            (container.username.as_deref(), container.password.as_deref())
        } else {
            (None, None)
        };
        common::local_url("http", username, password, container.port, "", &query)
    }

    fn requires_auth(&self) -> bool {
        true
    }

    fn default_username(&self) -> Option<&'static str> {
        Some(DEFAULT_USER)
    }
}
