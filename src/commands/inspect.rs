//! Read-only commands: query and schema.

use anyhow::{Result, bail};
use colored::Colorize;
use declarative::{Attribute, AttributeType, Mode, Schema};
use serde_json::{Value, json};

use crate::Context;
use crate::cli::QueryArgs;
use crate::config::ProviderFile;
use crate::data_sources;
use crate::provider;
use crate::ui;

// ============================================================================
// Query
// ============================================================================

pub fn query(ctx: &Context, args: &QueryArgs) -> Result<()> {
    let source = data_sources::find(&args.source)?;
    let file = ProviderFile::load(&ctx.config)?;
    let client = provider::connect(&file.provider)?;

    let arguments = query_arguments(args);
    let results = source.read(&client, &arguments)?;
    log::info!("{} returned {} objects", args.source, results.len());
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

fn query_arguments(args: &QueryArgs) -> Value {
    match args.list_type {
        Some(list_type) => json!({ "type": list_type }),
        None => Value::Null,
    }
}

// ============================================================================
// Schema
// ============================================================================

pub fn schema(ctx: &Context, type_name: Option<&str>) -> Result<()> {
    let registry = provider::registry();
    let sources = data_sources::all();

    let mut found = false;
    for resource in registry.iter() {
        if type_name.is_some_and(|t| t != resource.type_name()) {
            continue;
        }
        found = true;
        ui::header(&format!("resource {}", resource.type_name()));
        print_schema(&resource.schema(), 1, ctx.verbose > 0);
    }
    for source in &sources {
        if type_name.is_some_and(|t| t != source.type_name()) {
            continue;
        }
        found = true;
        ui::header(&format!("data source {}", source.type_name()));
        let arguments = source.arguments();
        if arguments.attributes.is_empty() {
            ui::dim("(no arguments)");
        } else {
            print_schema(&arguments, 1, ctx.verbose > 0);
        }
    }

    if let Some(name) = type_name
        && !found
    {
        bail!("Unknown resource or data source type {name:?}");
    }
    Ok(())
}

/// Short type label, e.g. `list(string)` or `map(list(string))`
pub fn type_label(ty: &AttributeType) -> String {
    match ty {
        AttributeType::String => "string".to_string(),
        AttributeType::Int => "int".to_string(),
        AttributeType::Bool => "bool".to_string(),
        AttributeType::List(inner) => format!("list({})", type_label(inner)),
        AttributeType::Map(inner) => format!("map({})", type_label(inner)),
        AttributeType::Object(_) => "object".to_string(),
        AttributeType::ObjectList(_) => "list(object)".to_string(),
    }
}

fn mode_label(mode: Mode) -> &'static str {
    match mode {
        Mode::Required => "required",
        Mode::Optional => "optional",
        Mode::Computed => "computed",
        Mode::OptionalComputed => "optional, computed",
    }
}

/// One line describing an attribute, without colors.
pub fn describe_attribute(attr: &Attribute) -> String {
    let mut flags = vec![mode_label(attr.mode)];
    if attr.sensitive {
        flags.push("sensitive");
    }
    if attr.force_new {
        flags.push("forces replacement");
    }
    format!("{} {} ({})", attr.name, type_label(&attr.ty), flags.join(", "))
}

fn print_schema(schema: &Schema, depth: usize, with_descriptions: bool) {
    let indent = "  ".repeat(depth);
    for attr in &schema.attributes {
        let line = describe_attribute(attr);
        if attr.mode == Mode::Required {
            println!("{indent}{}", line.bold());
        } else {
            println!("{indent}{line}");
        }
        if with_descriptions && !attr.description.is_empty() {
            println!("{indent}  {}", attr.description.dimmed());
        }
        match &attr.ty {
            AttributeType::Object(nested) | AttributeType::ObjectList(nested) => {
                print_schema(nested, depth + 1, with_descriptions);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn ctx() -> Context {
        Context {
            verbose: 1,
            quiet: true,
            config: PathBuf::from("unused.toml"),
            state: PathBuf::from("unused.json"),
        }
    }

    #[test]
    fn test_type_labels() {
        assert_eq!(type_label(&AttributeType::string_list()), "list(string)");
        assert_eq!(
            type_label(&AttributeType::Map(Box::new(AttributeType::string_list()))),
            "map(list(string))"
        );
        assert_eq!(type_label(&AttributeType::ObjectList(Schema::v0())), "list(object)");
    }

    #[test]
    fn test_describe_attribute() {
        let attr = Attribute::required("password", AttributeType::String)
            .sensitive()
            .force_new();
        assert_eq!(
            describe_attribute(&attr),
            "password string (required, sensitive, forces replacement)"
        );
        let computed = Attribute::computed("id", AttributeType::Int);
        assert_eq!(describe_attribute(&computed), "id int (computed)");
    }

    #[test]
    fn test_schema_lookup() {
        schema(&ctx(), Some("sftpgo_user")).unwrap();
        schema(&ctx(), Some("sftpgo_ip_list_entries")).unwrap();
        let err = schema(&ctx(), Some("sftpgo_share")).unwrap_err();
        assert!(err.to_string().contains("sftpgo_share"));
    }

    #[test]
    fn test_query_arguments() {
        let with_type = QueryArgs {
            source: "sftpgo_ip_list_entries".into(),
            list_type: Some(3),
        };
        assert_eq!(query_arguments(&with_type), json!({"type": 3}));
        let plain = QueryArgs {
            source: "sftpgo_users".into(),
            list_type: None,
        };
        assert_eq!(query_arguments(&plain), Value::Null);
    }
}
