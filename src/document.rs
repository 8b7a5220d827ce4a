//! Raw serde model of an OpenAPI document.
//!
//! Only the keywords the translator reads are modeled; everything else in the
//! document is skipped. The raw model is classified into [`crate::ir::SchemaNode`]
//! by [`crate::lower`].
use std::fmt;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::path_de::{from_json_str_with_path, from_yaml_str_with_path};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SourceFormat {
    Json,
    Yaml,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawDocument {
    pub components: RawComponents,
    /// Swagger 2 keeps its schemas here instead of under `components`.
    pub definitions: IndexMap<String, RawSchema>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawComponents {
    pub schemas: IndexMap<String, RawSchema>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawSchema {
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    #[serde(rename = "type")]
    pub ty: Option<TypeDecl>,
    pub format: Option<String>,
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<Value>>,
    pub properties: Option<IndexMap<String, RawSchema>>,
    pub items: Option<Box<RawSchema>>,
    #[serde(rename = "allOf")]
    pub all_of: Option<Vec<RawSchema>>,
    #[serde(rename = "oneOf")]
    pub one_of: Option<Vec<RawSchema>>,
    #[serde(rename = "anyOf")]
    pub any_of: Option<Vec<RawSchema>>,
    pub required: Vec<String>,
    pub nullable: bool,
    #[serde(rename = "additionalProperties")]
    pub additional_properties: Option<AdditionalProperties>,
    pub description: Option<String>,
}

/// `type: string` (3.0) or `type: [string, "null"]` (3.1).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TypeDecl {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<RawSchema>),
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Json => f.write_str("JSON"),
            SourceFormat::Yaml => f.write_str("YAML"),
        }
    }
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(SourceFormat::Json),
            "yaml" | "yml" => Some(SourceFormat::Yaml),
            _ => None,
        }
    }
}

impl RawDocument {
    /// Schemas under `components.schemas`, falling back to Swagger 2 `definitions`.
    pub fn into_schemas(self) -> IndexMap<String, RawSchema> {
        if self.components.schemas.is_empty() {
            self.definitions
        } else {
            self.components.schemas
        }
    }
}

impl TypeDecl {
    /// First non-null declared type, plus whether `"null"` appeared.
    pub fn split_null(&self) -> (Option<&str>, bool) {
        match self {
            TypeDecl::One(t) if t == "null" => (None, true),
            TypeDecl::One(t) => (Some(t.as_str()), false),
            TypeDecl::Many(ts) => {
                let nullable = ts.iter().any(|t| t == "null");
                let primary = ts.iter().find(|t| *t != "null").map(String::as_str);
                (primary, nullable)
            }
        }
    }
}

/// Parse a document in the given format, or detect it when `format` is `None`
/// (JSON first, then YAML).
pub fn parse_document(src: &str, format: Option<SourceFormat>) -> Result<RawDocument> {
    match format {
        Some(SourceFormat::Json) => from_json_str_with_path(src),
        Some(SourceFormat::Yaml) => from_yaml_str_with_path(src),
        None => match from_json_str_with_path(src) {
            Ok(doc) => Ok(doc),
            Err(json_err) => match from_yaml_str_with_path(src) {
                Ok(doc) => Ok(doc),
                Err(yaml_err) => Err(Error::Undetected {
                    json: json_err.to_string(),
                    yaml: yaml_err.to_string(),
                }),
            },
        },
    }
}

/// Read and parse one document from disk, using the extension as a format hint.
pub fn read_document(path: &Path, format: Option<SourceFormat>) -> Result<RawDocument> {
    let src = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&src, format.or_else(|| SourceFormat::from_path(path)))
}
