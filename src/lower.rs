use serde_json::Value;

use crate::document::{AdditionalProperties, RawDocument, RawSchema};
use crate::ir::{Composition, Enumeration, ObjectShape, Registry, Scalar, ScalarKind, SchemaKind, SchemaNode};

pub fn lower_document(doc: RawDocument) -> Registry {
    let schemas = doc
        .into_schemas()
        .into_iter()
        .map(|(name, raw)| (name, lower_schema(raw)))
        .collect();
    Registry::new(schemas)
}

/// Classify one raw schema into exactly one [`SchemaKind`].
///
/// Priority: `$ref` > `enum` > scalar `type` > array > object shape > composition.
/// Keywords that lose to a higher-priority one are dropped here, once, instead
/// of being silently ignored at every later use.
pub fn lower_schema(raw: RawSchema) -> SchemaNode {
    let (declared, null_in_type) = match &raw.ty {
        Some(ty) => {
            let (primary, nullable) = ty.split_null();
            (primary.map(str::to_owned), nullable)
        }
        None => (None, false),
    };
    let mut nullable = raw.nullable || null_in_type;
    let description = raw.description.clone().filter(|d| !d.trim().is_empty());

    let kind = if let Some(reference) = &raw.reference {
        SchemaKind::Reference(reference_name(reference).to_string())
    } else if let Some(values) = raw.enum_values.as_ref().filter(|v| !v.is_empty()) {
        if values.iter().any(Value::is_null) {
            nullable = true;
        }
        let values: Vec<String> = values.iter().filter_map(enum_literal).collect();
        if declared.as_deref() == Some("array") || declared.as_deref() == Some("object") {
            tracing::debug!(ty = ?declared, "enum takes priority over declared container type");
        }
        SchemaKind::Enumeration(Enumeration { values })
    } else if let Some(kind) = declared.as_deref().and_then(scalar_kind) {
        SchemaKind::Scalar(Scalar { kind, format: raw.format.clone() })
    } else if declared.as_deref() == Some("array") {
        SchemaKind::Array(raw.items.map(|items| Box::new(lower_schema(*items))))
    } else if raw.properties.is_some()
        || declared.as_deref() == Some("object")
        || raw.additional_properties.is_some()
    {
        let properties = raw
            .properties
            .unwrap_or_default()
            .into_iter()
            .map(|(name, prop)| (name, lower_schema(prop)))
            .collect();
        let additional = match raw.additional_properties {
            Some(AdditionalProperties::Schema(schema)) => Some(Box::new(lower_schema(*schema))),
            Some(AdditionalProperties::Allowed(true)) => Some(Box::new(SchemaNode::untyped())),
            Some(AdditionalProperties::Allowed(false)) | None => None,
        };
        SchemaKind::Object(ObjectShape {
            properties,
            required: raw.required,
            additional,
            composition: lower_composition(raw.all_of, raw.one_of, raw.any_of),
        })
    } else if raw.all_of.is_some() || raw.one_of.is_some() || raw.any_of.is_some() {
        SchemaKind::Composition(lower_composition(raw.all_of, raw.one_of, raw.any_of))
    } else {
        if let Some(ty) = &declared {
            tracing::debug!(ty = %ty, "unknown schema type");
        }
        SchemaKind::Untyped
    };

    SchemaNode { kind, nullable, description }
}

fn lower_composition(
    all_of: Option<Vec<RawSchema>>,
    one_of: Option<Vec<RawSchema>>,
    any_of: Option<Vec<RawSchema>>,
) -> Composition {
    let lower_all = |xs: Option<Vec<RawSchema>>| -> Vec<SchemaNode> {
        xs.unwrap_or_default().into_iter().map(lower_schema).collect()
    };
    Composition {
        all_of: lower_all(all_of),
        one_of: lower_all(one_of),
        any_of: lower_all(any_of),
    }
}

fn scalar_kind(ty: &str) -> Option<ScalarKind> {
    match ty {
        "string" => Some(ScalarKind::String),
        "integer" => Some(ScalarKind::Integer),
        "number" => Some(ScalarKind::Number),
        "boolean" => Some(ScalarKind::Boolean),
        _ => None,
    }
}

/// `#/components/schemas/Pet` → `Pet`
fn reference_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

fn enum_literal(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
