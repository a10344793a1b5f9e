// 字段描述模块
//
// 以声明式方式描述每个数据库提供者需要的配置项（基础、认证、高级三个分区），
// 不包含任何渲染逻辑。声明式规则由表单层通过 `FormField::check` 执行，
// 提供者自身的 `validate_config` 才是最终校验。

mod field;

pub use field::{CheckboxField, FieldMeta, FieldValidation, FormField, InputField, SelectField};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 高级分区中的字段分组
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldGroup {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<FormField>,
}

impl FieldGroup {
    pub fn new(label: &str, fields: Vec<FormField>) -> Self {
        Self {
            label: label.to_string(),
            description: None,
            fields,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

/// 生成基础字段时的选项
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOptions {
    /// 编辑已有容器时为 true，创建后不可变的字段会被标记为只读
    pub is_edit_mode: bool,
}

impl FieldOptions {
    pub fn create() -> Self {
        Self {
            is_edit_mode: false,
        }
    }

    pub fn edit() -> Self {
        Self { is_edit_mode: true }
    }
}

/// 检查字段声明本身是否自洽
///
/// 字段名在所有分区和分组间必须唯一，必填的选择框至少要有一个选项。
pub fn schema_problems<'a>(fields: impl IntoIterator<Item = &'a FormField>) -> Vec<String> {
    let mut problems = Vec::new();
    let mut seen = HashSet::new();

    for field in fields {
        if !seen.insert(field.name().to_string()) {
            problems.push(format!("字段名重复: {}", field.name()));
        }
        if field.name().is_empty() || field.name().split('.').any(str::is_empty) {
            problems.push(format!("字段名不是合法路径: '{}'", field.name()));
        }
        if let FormField::Select(select) = field {
            if select.meta.required && select.options.is_empty() {
                problems.push(format!("必填选择框没有选项: {}", field.name()));
            }
        }
    }

    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_serializes_with_type_tag() {
        let field = FormField::number("port", "端口")
            .required()
            .default_value(5432)
            .min(1.0)
            .max(65535.0);

        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(value["type"], "number");
        assert_eq!(value["name"], "port");
        assert_eq!(value["defaultValue"], 5432);
        assert_eq!(value["validation"]["max"], 65535.0);

        let back: FormField = serde_json::from_value(value).unwrap();
        assert_eq!(back, field);
    }

    #[test]
    fn test_check_required_and_bounds() {
        let field = FormField::password("password", "密码").required().min(8.0);

        assert_eq!(field.check(None), Some("密码不能为空".to_string()));
        assert_eq!(field.check(Some(&json!("  "))), Some("密码不能为空".to_string()));
        assert_eq!(
            field.check(Some(&json!("short"))),
            Some("密码至少需要 8 个字符".to_string())
        );
        assert_eq!(field.check(Some(&json!("long-enough"))), None);
    }

    #[test]
    fn test_check_optional_field_accepts_absence() {
        let field = FormField::text("databaseName", "数据库名").pattern("^[a-z]+$");
        assert_eq!(field.check(None), None);
        assert!(field.check(Some(&json!("Bad-Name"))).is_some());
        assert_eq!(field.check(Some(&json!("good"))), None);
    }

    #[test]
    fn test_check_number_and_select() {
        let port = FormField::number("port", "端口").min(1.0).max(65535.0);
        assert_eq!(port.check(Some(&json!("5432"))), None);
        assert!(port.check(Some(&json!(70000))).is_some());
        assert_eq!(
            port.check(Some(&json!("abc"))),
            Some("端口必须是数字".to_string())
        );

        let version = FormField::select("version", "版本", ["16", "15"]);
        assert_eq!(version.check(Some(&json!("15"))), None);
        assert!(version.check(Some(&json!("9"))).is_some());
    }

    #[test]
    fn test_validation_message_override() {
        let field = FormField::text("name", "容器名")
            .pattern("^[a-z]+$")
            .message("只能包含小写字母");
        assert_eq!(
            field.check(Some(&json!("ABC"))),
            Some("只能包含小写字母".to_string())
        );
    }

    #[test]
    fn test_schema_problems() {
        let fields = vec![
            FormField::text("name", "容器名"),
            FormField::select("version", "版本", Vec::<String>::new()).required(),
            FormField::text("name", "重复"),
            FormField::text("settings..x", "坏路径"),
        ];

        let problems = schema_problems(&fields);
        assert_eq!(problems.len(), 3);
        assert!(problems[0].contains("version"));
        assert!(problems[1].contains("name"));
        assert!(problems[2].contains("settings..x"));
    }
}
