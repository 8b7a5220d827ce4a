// Strongly-typed schema IR for translation. No serde types here.

use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub kind: SchemaKind,
    pub nullable: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    /// Registry entry name, already stripped of its `#/components/schemas/` prefix.
    Reference(String),
    Scalar(Scalar),
    Enumeration(Enumeration),
    Array(Option<Box<SchemaNode>>),
    Object(ObjectShape),
    /// Only composition keywords, no object shape of its own.
    Composition(Composition),
    /// No usable type information; maps to the fallback scalar.
    Untyped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    String,
    Integer,
    Number,
    Boolean,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scalar {
    pub kind: ScalarKind,
    pub format: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enumeration {
    pub values: Vec<String>,   // input order
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectShape {
    pub properties: IndexMap<String, SchemaNode>,
    pub required: Vec<String>,
    pub additional: Option<Box<SchemaNode>>,
    pub composition: Composition,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Composition {
    pub all_of: Vec<SchemaNode>,
    pub one_of: Vec<SchemaNode>,
    pub any_of: Vec<SchemaNode>,
}

/// Borrowed view over anything that is emitted as a message body.
#[derive(Debug, Clone, Copy)]
pub struct MessageShape<'a> {
    pub properties: Option<&'a IndexMap<String, SchemaNode>>,
    pub additional: Option<&'a SchemaNode>,
    pub composition: &'a Composition,
}

impl SchemaNode {
    pub fn new(kind: SchemaKind) -> Self {
        Self { kind, nullable: false, description: None }
    }

    pub fn untyped() -> Self {
        Self::new(SchemaKind::Untyped)
    }

    pub fn message_shape(&self) -> Option<MessageShape<'_>> {
        match &self.kind {
            SchemaKind::Object(obj) => Some(MessageShape {
                properties: Some(&obj.properties),
                additional: obj.additional.as_deref(),
                composition: &obj.composition,
            }),
            SchemaKind::Composition(composition) => Some(MessageShape {
                properties: None,
                additional: None,
                composition,
            }),
            _ => None,
        }
    }

    /// Kinds that become their own named type when emitted at top level.
    pub fn is_named_type(&self) -> bool {
        matches!(
            self.kind,
            SchemaKind::Enumeration(_) | SchemaKind::Object(_) | SchemaKind::Composition(_)
        )
    }

    pub fn kind_label(&self) -> &'static str {
        match self.kind {
            SchemaKind::Reference(_) => "reference",
            SchemaKind::Scalar(_) => "scalar",
            SchemaKind::Enumeration(_) => "enum",
            SchemaKind::Array(_) => "array",
            SchemaKind::Object(_) => "object",
            SchemaKind::Composition(_) => "composition",
            SchemaKind::Untyped => "untyped",
        }
    }
}

impl ObjectShape {
    /// No explicit properties but an additional-properties node.
    pub fn is_map(&self) -> bool {
        self.properties.is_empty() && self.additional.is_some()
    }
}

/// Named top-level schemas of one document, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    schemas: IndexMap<String, SchemaNode>,
}

impl Registry {
    pub fn new(schemas: IndexMap<String, SchemaNode>) -> Self {
        Self { schemas }
    }

    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.schemas.get(name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.schemas.iter().map(|(name, node)| (name.as_str(), node))
    }
}
