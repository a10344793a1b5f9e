use super::common;
use super::version::VersionLine;
use super::{DatabaseProvider, LaunchDescriptor, ProviderConfig, ValidationResult};
use crate::container::Container;
use crate::schema::{FieldGroup, FormField};

const REPOSITORY: &str = "mysql";
const ROOT_USER: &str = "root";
const DEFAULT_DATABASE: &str = "mysql";
const DEFAULT_CHARSET: &str = "utf8mb4";
const DEFAULT_COLLATION: &str = "utf8mb4_0900_ai_ci";
const DEFAULT_ROOT_HOST: &str = "%";
const DEFAULT_MAX_CONNECTIONS: u32 = 151;
const MIN_PASSWORD: usize = 4;
const CHARSETS: &[&str] = &["utf8mb4", "utf8mb3", "latin1", "gbk", "ascii"];
const IDENTIFIER_PATTERN: &str = r"^[a-zA-Z0-9_$]+$";

/// 5.x 没有 0900 系列排序规则
const LEGACY_LINE: VersionLine = VersionLine::exactly(5);

#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlProvider;

impl DatabaseProvider for MySqlProvider {
    fn id(&self) -> &'static str {
        "mysql"
    }

    fn name(&self) -> &'static str {
        "MySQL"
    }

    fn description(&self) -> &'static str {
        "广泛使用的开源关系型数据库"
    }

    fn default_port(&self) -> u16 {
        3306
    }

    fn data_path(&self) -> &'static str {
        "/var/lib/mysql"
    }

    fn versions(&self) -> &'static [&'static str] {
        &["8.4", "8.0", "9.1", "5.7"]
    }

    fn authentication_fields(&self) -> Vec<FormField> {
        let mut fields = common::credential_fields(ROOT_USER, MIN_PASSWORD, "app");
        if let Some(FormField::Text(username)) = fields.first_mut() {
            username.meta.help_text =
                Some("非 root 用户会额外创建，并使用同一个密码".to_string());
        }
        fields
    }

    fn advanced_fields(&self) -> Vec<FieldGroup> {
        vec![
            FieldGroup::new(
                "字符集",
                vec![
                    FormField::select("mysqlSettings.characterSet", "字符集", CHARSETS.iter().copied())
                        .default_value(DEFAULT_CHARSET),
                    FormField::text("mysqlSettings.collation", "排序规则")
                        .default_value(DEFAULT_COLLATION)
                        .help_text("5.7 请使用 utf8mb4_general_ci 等旧规则"),
                ],
            ),
            FieldGroup::new(
                "服务器",
                vec![
                    FormField::text("mysqlSettings.rootHost", "root 允许的主机")
                        .default_value(DEFAULT_ROOT_HOST),
                    FormField::text("mysqlSettings.sqlMode", "SQL 模式")
                        .placeholder("STRICT_TRANS_TABLES,NO_ZERO_DATE"),
                    common::max_connections_field(DEFAULT_MAX_CONNECTIONS),
                ],
            ),
        ]
    }

    fn build_docker_args(&self, config: &ProviderConfig) -> LaunchDescriptor {
        let version = common::resolved_version(config, self.versions());
        let mut args = LaunchDescriptor::new(common::image(REPOSITORY, &version));
        let password = config.password().unwrap_or_default();

        args.env("MYSQL_ROOT_PASSWORD", password.clone());
        if let Some(db) = config.database_name() {
            args.env("MYSQL_DATABASE", db);
        }
        if let Some(user) = config.username().filter(|u| u != ROOT_USER) {
            args.env("MYSQL_USER", user);
            args.env("MYSQL_PASSWORD", password);
        }
        if let Some(host) = config
            .string("mysqlSettings.rootHost")
            .filter(|h| h != DEFAULT_ROOT_HOST)
        {
            args.env("MYSQL_ROOT_HOST", host);
        }

        args.port(common::host_port(config, self.default_port()), self.container_port());
        args.volume(common::data_volume(config, self.data_path()));

        if let Some(charset) = config
            .string("mysqlSettings.characterSet")
            .filter(|c| c != DEFAULT_CHARSET)
        {
            args.arg(format!("--character-set-server={charset}"));
        }
        if let Some(collation) = explicit_collation(config) {
            args.arg(format!("--collation-server={collation}"));
        }
        if let Some(mode) = config.string("mysqlSettings.sqlMode") {
            args.arg(format!("--sql-mode={mode}"));
        }
        if let Some(max) = config
            .max_connections()
            .filter(|&n| n != DEFAULT_MAX_CONNECTIONS)
        {
            args.arg(format!("--max-connections={max}"));
        }

        args
    }

    fn validate_config(&self, config: &ProviderConfig) -> ValidationResult {
        let mut errors = Vec::new();
        common::validate_basics(config, &mut errors);
        common::validate_password(config, MIN_PASSWORD, &mut errors);
        common::validate_identifier(config, "username", "用户名", IDENTIFIER_PATTERN, &mut errors);
        common::validate_identifier(config, "databaseName", "数据库名", IDENTIFIER_PATTERN, &mut errors);
        common::validate_choice(config, "mysqlSettings.characterSet", "字符集", CHARSETS, &mut errors);

        let charset = config
            .string("mysqlSettings.characterSet")
            .unwrap_or_else(|| DEFAULT_CHARSET.to_string());
        if let Some(collation) = explicit_collation(config) {
            if !collation.starts_with(&format!("{charset}_")) {
                errors.push(format!("排序规则 {collation} 与字符集 {charset} 不匹配"));
            }
            let legacy = config
                .version()
                .is_some_and(|version| LEGACY_LINE.contains(&version));
            if legacy && collation.contains("_0900_") {
                errors.push(format!("MySQL 5.x 不支持排序规则 {collation}"));
            }
        }

        ValidationResult::from_errors(errors)
    }

    fn connection_string(&self, container: &Container) -> String {
        let username = container.username.as_deref().unwrap_or(ROOT_USER);
        let database = container
            .database_name
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_DATABASE);
        common::local_url(
            "mysql",
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
        Some(ROOT_USER)
    }
}

/// 显式指定的排序规则
///
/// 等于默认值时不下发，由服务器按字符集和版本自行选择（5.x 上为 utf8mb4_general_ci）。
fn explicit_collation(config: &ProviderConfig) -> Option<String> {
    config
        .string("mysqlSettings.collation")
        .filter(|c| c != DEFAULT_COLLATION)
}
