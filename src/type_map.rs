//! Maps one schema node to a proto field type.
//!
//! Nested shapes that need their own type come back as a [`Synthesis`] request;
//! the emitter decides what to do with it.
use std::fmt;

use crate::context::ActiveTypes;
use crate::ir::{Scalar, ScalarKind, SchemaKind, SchemaNode};
use crate::naming::normalize_type_name;
use crate::resolve::Resolver;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Double,
    Float,
    Int32,
    Int64,
    Bool,
    String,
    Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Scalar(ScalarType),
    /// A message or enum, by its final proto name.
    Named(String),
    Repeated(Box<TypeRef>),
    /// `map<string, V>`
    Map(Box<TypeRef>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timing {
    /// Emit after the enclosing message closes.
    Deferred,
    /// Emit right away, ahead of the enclosing message (map values).
    Eager,
}

#[derive(Debug, Clone)]
pub struct Synthesis<'a> {
    pub name: String,
    pub node: &'a SchemaNode,
    pub timing: Timing,
}

#[derive(Debug, Clone)]
pub struct Mapped<'a> {
    pub ty: TypeRef,
    pub synthesis: Option<Synthesis<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub struct TypeMapper<'a> {
    resolver: Resolver<'a>,
    named_refs: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl ScalarType {
    pub fn as_str(self) -> &'static str {
        match self {
            ScalarType::Double => "double",
            ScalarType::Float => "float",
            ScalarType::Int32 => "int32",
            ScalarType::Int64 => "int64",
            ScalarType::Bool => "bool",
            ScalarType::String => "string",
            ScalarType::Bytes => "bytes",
        }
    }
}

impl From<&Scalar> for ScalarType {
    fn from(scalar: &Scalar) -> Self {
        let format = scalar.format.as_deref();
        match scalar.kind {
            ScalarKind::String if matches!(format, Some("byte" | "binary")) => ScalarType::Bytes,
            ScalarKind::String => ScalarType::String,
            ScalarKind::Integer if format == Some("int32") => ScalarType::Int32,
            ScalarKind::Integer => ScalarType::Int64,
            ScalarKind::Number if format == Some("float") => ScalarType::Float,
            ScalarKind::Number => ScalarType::Double,
            ScalarKind::Boolean => ScalarType::Bool,
        }
    }
}

impl TypeRef {
    pub fn is_scalar(&self) -> bool {
        matches!(self, TypeRef::Scalar(_))
    }

    pub fn repeated(self) -> Self {
        TypeRef::Repeated(Box::new(self))
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Scalar(s) => f.write_str(s.as_str()),
            TypeRef::Named(name) => f.write_str(name),
            TypeRef::Repeated(inner) => write!(f, "repeated {inner}"),
            TypeRef::Map(value) => write!(f, "map<string, {value}>"),
        }
    }
}

impl<'a> Mapped<'a> {
    fn plain(ty: TypeRef) -> Self {
        Self { ty, synthesis: None }
    }

    fn wrap(self, f: impl FnOnce(TypeRef) -> TypeRef) -> Self {
        Self { ty: f(self.ty), synthesis: self.synthesis }
    }

    /// Force any pending synthesis to happen immediately.
    pub fn eager(mut self) -> Self {
        if let Some(synthesis) = &mut self.synthesis {
            synthesis.timing = Timing::Eager;
        }
        self
    }
}

impl<'a> TypeMapper<'a> {
    pub fn new(resolver: Resolver<'a>, named_refs: bool) -> Self {
        Self { resolver, named_refs }
    }

    /// Map `node`, found under the local name `local` inside the type `scope`.
    ///
    /// Synthesized types are named `normalize(scope + "_" + local)`; array
    /// elements extend `local` with `_item`, map values with `_value`. A
    /// reference back to a type in `active` maps to that type's name instead
    /// of a new copy.
    pub fn map_type(
        &self,
        scope: &str,
        local: &str,
        node: &'a SchemaNode,
        active: &ActiveTypes,
    ) -> Mapped<'a> {
        self.map_node(scope, local, node, active, &mut Vec::new())
    }

    /// `path` holds the containers (arrays, maps) expanded inline so far.
    fn map_node(
        &self,
        scope: &str,
        local: &str,
        node: &'a SchemaNode,
        active: &ActiveTypes,
        path: &mut Vec<*const SchemaNode>,
    ) -> Mapped<'a> {
        let resolved = self.resolver.resolve(node);

        if let SchemaKind::Reference(target) = &node.kind {
            if !std::ptr::eq(resolved, node) {
                if self.named_refs && resolved.is_named_type() {
                    return Mapped::plain(TypeRef::Named(normalize_type_name(target)));
                }
                if let Some(name) = active.get(resolved) {
                    return Mapped::plain(TypeRef::Named(name.to_string()));
                }
                if path.contains(&(resolved as *const SchemaNode)) {
                    tracing::debug!(scope, field = local, reference = %target, "recursive container, falling back to string");
                    return Mapped::plain(TypeRef::Scalar(ScalarType::String));
                }
            }
        }

        match &resolved.kind {
            SchemaKind::Enumeration(_) => self.synthesize(scope, local, resolved),
            SchemaKind::Scalar(scalar) => Mapped::plain(TypeRef::Scalar(scalar.into())),
            SchemaKind::Array(None) => Mapped::plain(TypeRef::Scalar(ScalarType::String).repeated()),
            SchemaKind::Array(Some(items)) => {
                path.push(resolved as *const SchemaNode);
                let mapped = self.map_node(scope, &format!("{local}_item"), items, active, path);
                path.pop();
                mapped.wrap(TypeRef::repeated)
            }
            SchemaKind::Object(obj) if obj.is_map() => match obj.additional.as_deref() {
                Some(value) => {
                    path.push(resolved as *const SchemaNode);
                    let mapped = self.map_node(scope, &format!("{local}_value"), value, active, path);
                    path.pop();
                    mapped.wrap(|ty| TypeRef::Map(Box::new(ty))).eager()
                }
                None => Mapped::plain(TypeRef::Scalar(ScalarType::String)),
            },
            SchemaKind::Object(_) | SchemaKind::Composition(_) => self.synthesize(scope, local, resolved),
            SchemaKind::Reference(_) | SchemaKind::Untyped => {
                tracing::debug!(scope, field = local, kind = resolved.kind_label(), "falling back to string");
                Mapped::plain(TypeRef::Scalar(ScalarType::String))
            }
        }
    }

    fn synthesize(&self, scope: &str, local: &str, node: &'a SchemaNode) -> Mapped<'a> {
        let name = normalize_type_name(&format!("{scope}_{local}"));
        Mapped {
            ty: TypeRef::Named(name.clone()),
            synthesis: Some(Synthesis { name, node, timing: Timing::Deferred }),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
