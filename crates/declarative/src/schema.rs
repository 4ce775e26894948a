//! Attribute schemas for resource records
//!
//! A [`Schema`] lists the attributes a record may carry, their types and
//! who owns their value (author, server, or both). The host uses it to
//! reject malformed configuration before any remote call, to skip
//! server-assigned attributes when diffing, and to spot attributes whose
//! change forces a replacement.

use crate::error::Diagnostic;
use serde::Serialize;
use serde_json::Value;

/// Who supplies an attribute's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Must be set in configuration.
    Required,
    /// May be set in configuration; unset means empty.
    Optional,
    /// Assigned by the server, read-only for authors.
    Computed,
    /// May be set; when unset the server's value is kept.
    OptionalComputed,
}

impl Mode {
    /// Whether configuration authors may set the attribute.
    #[must_use]
    pub fn is_settable(&self) -> bool {
        !matches!(self, Self::Computed)
    }
}

/// Value type of an attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "of")]
pub enum AttributeType {
    String,
    Int,
    Bool,
    /// Ordered list of values.
    List(Box<AttributeType>),
    /// String-keyed map of values.
    Map(Box<AttributeType>),
    /// Nested object with its own schema.
    Object(Schema),
    /// Ordered list of nested objects.
    ObjectList(Schema),
}

impl AttributeType {
    /// List of strings, the most common collection.
    #[must_use]
    pub fn string_list() -> Self {
        Self::List(Box::new(Self::String))
    }

    /// List of integers.
    #[must_use]
    pub fn int_list() -> Self {
        Self::List(Box::new(Self::Int))
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Int => "an integer",
            Self::Bool => "a boolean",
            Self::List(_) | Self::ObjectList(_) => "a list",
            Self::Map(_) | Self::Object(_) => "an object",
        }
    }
}

/// A single attribute declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: AttributeType,
    pub mode: Mode,
    /// Holds a secret: never displayed, preserved from configuration.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sensitive: bool,
    /// Changing it requires destroying and recreating the object.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub force_new: bool,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub description: &'static str,
}

impl Attribute {
    fn new(name: &'static str, ty: AttributeType, mode: Mode) -> Self {
        Self {
            name,
            ty,
            mode,
            sensitive: false,
            force_new: false,
            description: "",
        }
    }

    pub fn required(name: &'static str, ty: AttributeType) -> Self {
        Self::new(name, ty, Mode::Required)
    }

    pub fn optional(name: &'static str, ty: AttributeType) -> Self {
        Self::new(name, ty, Mode::Optional)
    }

    pub fn computed(name: &'static str, ty: AttributeType) -> Self {
        Self::new(name, ty, Mode::Computed)
    }

    pub fn optional_computed(name: &'static str, ty: AttributeType) -> Self {
        Self::new(name, ty, Mode::OptionalComputed)
    }

    /// Mark the attribute as a secret.
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Mark the attribute as requiring replacement on change.
    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    /// Attach a human readable description.
    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }
}

/// Ordered set of attribute declarations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    pub version: u32,
    pub attributes: Vec<Attribute>,
}

impl Schema {
    /// Create an empty version 0 schema.
    #[must_use]
    pub fn v0() -> Self {
        Self::default()
    }

    /// Builder-style attribute registration.
    pub fn with(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Look up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// JSON pointers of every sensitive attribute, nested ones included.
    pub fn sensitive_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_sensitive("", &mut paths);
        paths
    }

    fn collect_sensitive(&self, prefix: &str, out: &mut Vec<String>) {
        for attr in &self.attributes {
            let path = format!("{prefix}/{}", attr.name);
            if attr.sensitive {
                out.push(path.clone());
            }
            if let AttributeType::Object(nested) = &attr.ty {
                nested.collect_sensitive(&path, out);
            }
        }
    }

    /// Check a configuration record against the declarations.
    ///
    /// Reports unknown attributes, missing required ones, computed
    /// attributes set by the author and type mismatches. Value constraints
    /// (ranges, enums) are the adapter's job.
    pub fn check_config(&self, config: &Value) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        self.check_object("", config, &mut diagnostics);
        diagnostics
    }

    fn check_object(&self, prefix: &str, value: &Value, out: &mut Vec<Diagnostic>) {
        let Some(object) = value.as_object() else {
            out.push(Diagnostic::new(prefix, "expected an object"));
            return;
        };

        for key in object.keys() {
            if self.attribute(key).is_none() {
                out.push(Diagnostic::new(
                    format!("{prefix}/{key}"),
                    "unsupported attribute",
                ));
            }
        }

        for attr in &self.attributes {
            let path = format!("{prefix}/{}", attr.name);
            let field = object.get(attr.name).unwrap_or(&Value::Null);
            match (attr.mode, field.is_null()) {
                (Mode::Required, true) => {
                    out.push(Diagnostic::new(path, "attribute is required"));
                }
                (Mode::Computed, false) => {
                    out.push(Diagnostic::new(
                        path,
                        "attribute is computed by the server and cannot be set",
                    ));
                }
                (_, false) => check_type(&path, &attr.ty, field, out),
                (_, true) => {}
            }
        }
    }
}

fn check_type(path: &str, ty: &AttributeType, value: &Value, out: &mut Vec<Diagnostic>) {
    if value.is_null() {
        return;
    }
    let matches = match ty {
        AttributeType::String => value.is_string(),
        AttributeType::Int => value.is_i64() || value.is_u64(),
        AttributeType::Bool => value.is_boolean(),
        AttributeType::List(_) | AttributeType::ObjectList(_) => value.is_array(),
        AttributeType::Map(_) | AttributeType::Object(_) => value.is_object(),
    };
    if !matches {
        out.push(Diagnostic::new(
            path,
            format!("expected {}", ty.describe()),
        ));
        return;
    }

    match (ty, value) {
        (AttributeType::List(inner), Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                check_type(&format!("{path}/{i}"), inner, item, out);
            }
        }
        (AttributeType::Map(inner), Value::Object(entries)) => {
            for (key, item) in entries {
                check_type(&format!("{path}/{key}"), inner, item, out);
            }
        }
        (AttributeType::Object(schema), _) => schema.check_object(path, value, out),
        (AttributeType::ObjectList(schema), Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                schema.check_object(&format!("{path}/{i}"), item, out);
            }
        }
        _ => {}
    }
}
