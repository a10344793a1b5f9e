use crate::app::CliApp;
use dbm_core::Result;
use dbm_core::schema::{FieldOptions, FormField};
use tracing::info;

/// 列出注册的数据库类型
pub fn run_providers(app: &CliApp) -> Result<()> {
    info!("📦 支持的数据库 ({}):", app.service.registry().count());
    for provider in app.service.registry().get_all() {
        let info = provider.info();
        println!(
            "{:<12} {:<12} 端口 {:<6} 版本 {}",
            info.id,
            info.name,
            info.default_port,
            info.versions.join(", ")
        );
        println!("             {}", info.description);
    }
    Ok(())
}

/// 显示某个数据库的字段描述
pub fn run_fields(app: &CliApp, db_type: &str, edit: bool, json: bool) -> Result<()> {
    let provider = app.service.registry().require(db_type)?;
    let options = if edit {
        FieldOptions::edit()
    } else {
        FieldOptions::create()
    };

    let basic = provider.basic_fields(options);
    let auth = provider.authentication_fields();
    let advanced = provider.advanced_fields();

    if json {
        let value = serde_json::json!({
            "provider": provider.info(),
            "basic": basic,
            "authentication": auth,
            "advanced": advanced,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("[基础]");
    basic.iter().for_each(print_field);
    println!("[认证]");
    auth.iter().for_each(print_field);
    for group in &advanced {
        match &group.description {
            Some(description) => println!("[{}] {}", group.label, description),
            None => println!("[{}]", group.label),
        }
        group.fields.iter().for_each(print_field);
    }
    Ok(())
}

fn print_field(field: &FormField) {
    let meta = field.meta();
    let mut flags = Vec::new();
    if meta.required {
        flags.push("必填".to_string());
    }
    if meta.readonly {
        flags.push("只读".to_string());
    }
    if let Some(default) = &meta.default_value {
        flags.push(format!("默认 {default}"));
    }
    if !field.options().is_empty() {
        flags.push(format!("可选 {}", field.options().join("/")));
    }

    println!(
        "  {:<36} {:<9} {} {}",
        meta.name,
        field.type_name(),
        meta.label,
        if flags.is_empty() {
            String::new()
        } else {
            format!("（{}）", flags.join("，"))
        }
    );
}
