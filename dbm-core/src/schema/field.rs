use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 字段的公共属性
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMeta {
    /// 点分路径，配置对象内唯一
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
}

/// 声明式校验规则
///
/// 文本与密码字段的 `min`/`max` 表示长度，数字字段表示数值范围。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// 文本、密码、数字输入框
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputField {
    #[serde(flatten)]
    pub meta: FieldMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
}

/// 下拉选择框
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectField {
    #[serde(flatten)]
    pub meta: FieldMeta,
    pub options: Vec<String>,
}

/// 复选框
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckboxField {
    #[serde(flatten)]
    pub meta: FieldMeta,
}

/// 表单字段，按 `type` 区分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FormField {
    Text(InputField),
    Password(InputField),
    Number(InputField),
    Select(SelectField),
    Checkbox(CheckboxField),
}

fn meta(name: &str, label: &str) -> FieldMeta {
    FieldMeta {
        name: name.to_string(),
        label: label.to_string(),
        required: false,
        readonly: false,
        default_value: None,
        placeholder: None,
        help_text: None,
    }
}

impl FormField {
    pub fn text(name: &str, label: &str) -> Self {
        FormField::Text(InputField {
            meta: meta(name, label),
            validation: None,
        })
    }

    pub fn password(name: &str, label: &str) -> Self {
        FormField::Password(InputField {
            meta: meta(name, label),
            validation: None,
        })
    }

    pub fn number(name: &str, label: &str) -> Self {
        FormField::Number(InputField {
            meta: meta(name, label),
            validation: None,
        })
    }

    pub fn select<I, S>(name: &str, label: &str, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FormField::Select(SelectField {
            meta: meta(name, label),
            options: options.into_iter().map(Into::into).collect(),
        })
    }

    pub fn checkbox(name: &str, label: &str) -> Self {
        FormField::Checkbox(CheckboxField {
            meta: meta(name, label),
        })
    }

    pub fn meta(&self) -> &FieldMeta {
        match self {
            FormField::Text(f) | FormField::Password(f) | FormField::Number(f) => &f.meta,
            FormField::Select(f) => &f.meta,
            FormField::Checkbox(f) => &f.meta,
        }
    }

    fn meta_mut(&mut self) -> &mut FieldMeta {
        match self {
            FormField::Text(f) | FormField::Password(f) | FormField::Number(f) => &mut f.meta,
            FormField::Select(f) => &mut f.meta,
            FormField::Checkbox(f) => &mut f.meta,
        }
    }

    pub fn name(&self) -> &str {
        &self.meta().name
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            FormField::Text(_) => "text",
            FormField::Password(_) => "password",
            FormField::Number(_) => "number",
            FormField::Select(_) => "select",
            FormField::Checkbox(_) => "checkbox",
        }
    }

    pub fn validation(&self) -> Option<&FieldValidation> {
        match self {
            FormField::Text(f) | FormField::Password(f) | FormField::Number(f) => {
                f.validation.as_ref()
            }
            _ => None,
        }
    }

    pub fn options(&self) -> &[String] {
        match self {
            FormField::Select(f) => &f.options,
            _ => &[],
        }
    }

    pub fn required(mut self) -> Self {
        self.meta_mut().required = true;
        self
    }

    pub fn readonly(mut self, readonly: bool) -> Self {
        self.meta_mut().readonly = readonly;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.meta_mut().default_value = Some(value.into());
        self
    }

    pub fn placeholder(mut self, placeholder: &str) -> Self {
        self.meta_mut().placeholder = Some(placeholder.to_string());
        self
    }

    pub fn help_text(mut self, help_text: &str) -> Self {
        self.meta_mut().help_text = Some(help_text.to_string());
        self
    }

    pub fn min(self, min: f64) -> Self {
        self.with_validation(|v| v.min = Some(min))
    }

    pub fn max(self, max: f64) -> Self {
        self.with_validation(|v| v.max = Some(max))
    }

    pub fn pattern(self, pattern: &str) -> Self {
        self.with_validation(|v| v.pattern = Some(pattern.to_string()))
    }

    pub fn message(self, message: &str) -> Self {
        self.with_validation(|v| v.message = Some(message.to_string()))
    }

    /// 选择框与复选框没有校验规则，调用时原样返回
    fn with_validation(mut self, apply: impl FnOnce(&mut FieldValidation)) -> Self {
        if let FormField::Text(f) | FormField::Password(f) | FormField::Number(f) = &mut self {
            apply(f.validation.get_or_insert_with(FieldValidation::default));
        }
        self
    }

    /// 按声明式规则检查取值，供表单层使用
    ///
    /// 返回第一条违反的规则对应的提示，通过时返回 `None`。
    pub fn check(&self, value: Option<&Value>) -> Option<String> {
        let meta = self.meta();
        let value = match value {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.trim().is_empty() => None,
            Some(v) => Some(v),
        };

        let Some(value) = value else {
            return meta.required.then(|| format!("{}不能为空", meta.label));
        };

        match self {
            FormField::Text(f) | FormField::Password(f) => {
                let text = match value {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    _ => return Some(format!("{}必须是文本", meta.label)),
                };
                f.validation
                    .as_ref()
                    .and_then(|rules| check_text(&meta.label, &text, rules))
            }
            FormField::Number(f) => {
                let number = match value {
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) => s.trim().parse::<f64>().ok(),
                    _ => None,
                };
                let Some(number) = number else {
                    return Some(format!("{}必须是数字", meta.label));
                };
                f.validation
                    .as_ref()
                    .and_then(|rules| check_number(&meta.label, number, rules))
            }
            FormField::Select(f) => match value.as_str() {
                Some(choice) if f.options.iter().any(|o| o == choice) => None,
                _ => Some(format!("{}的取值不在可选范围内", meta.label)),
            },
            FormField::Checkbox(_) => {
                if value.is_boolean() {
                    None
                } else {
                    Some(format!("{}必须是布尔值", meta.label))
                }
            }
        }
    }
}

fn check_text(label: &str, text: &str, rules: &FieldValidation) -> Option<String> {
    let length = text.chars().count() as f64;
    let violated = rules.min.is_some_and(|min| length < min)
        || rules.max.is_some_and(|max| length > max)
        || rules.pattern.as_deref().is_some_and(|pattern| {
            // 规则本身无法编译时视为不限制
            Regex::new(pattern).is_ok_and(|re| !re.is_match(text))
        });

    violated.then(|| {
        rules.message.clone().unwrap_or_else(|| match (rules.min, rules.max) {
            (Some(min), Some(max)) => format!("{label}长度需在 {min} 到 {max} 个字符之间"),
            (Some(min), None) => format!("{label}至少需要 {min} 个字符"),
            (None, Some(max)) => format!("{label}不能超过 {max} 个字符"),
            (None, None) => format!("{label}格式不正确"),
        })
    })
}

fn check_number(label: &str, number: f64, rules: &FieldValidation) -> Option<String> {
    let violated =
        rules.min.is_some_and(|min| number < min) || rules.max.is_some_and(|max| number > max);

    violated.then(|| {
        rules.message.clone().unwrap_or_else(|| match (rules.min, rules.max) {
            (Some(min), Some(max)) => format!("{label}必须在 {min} 到 {max} 之间"),
            (Some(min), None) => format!("{label}不能小于 {min}"),
            (None, Some(max)) => format!("{label}不能大于 {max}"),
            (None, None) => format!("{label}超出范围"),
        })
    })
}
