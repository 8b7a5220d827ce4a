//! Message/enum emission and the `generate` entry point.
//!
//! Each top-level schema is emitted once. Nested shapes found while writing a
//! message are queued on the context and emitted right after that message
//! closes, depth first; map values are the exception and are emitted ahead of
//! the message that uses them.
use crate::config::{AnyOfMode, GeneratorConfig};
use crate::context::GenContext;
use crate::error::{Error, Result};
use crate::ir::{Enumeration, MessageShape, Registry, SchemaKind, SchemaNode};
use crate::naming::{NameSet, enum_value_name, normalize_field_name, normalize_type_name};
use crate::resolve::Resolver;
use crate::type_map::{Mapped, Timing, TypeMapper, TypeRef};

/// Translate a whole registry into proto3 text.
pub fn generate(registry: &Registry, config: &GeneratorConfig) -> Result<String> {
    if registry.is_empty() {
        return Err(Error::EmptyRegistry);
    }
    let _span = tracing::debug_span!("generate", schemas = registry.len()).entered();

    let mut emitter = Emitter::new(registry, config);
    emitter.write_header();

    let mut entries: Vec<(&str, &SchemaNode)> = registry.iter().collect();
    if config.sort {
        entries.sort_by(|a, b| a.0.cmp(b.0));
    }
    for (name, node) in entries {
        emitter.emit(name, node);
    }
    Ok(emitter.finish())
}

pub struct Emitter<'a> {
    ctx: GenContext<'a>,
    resolver: Resolver<'a>,
    mapper: TypeMapper<'a>,
    out: String,
}

/// One continuous field-number sequence per message.
struct FieldNumbers(u32);

impl FieldNumbers {
    fn take(&mut self) -> u32 {
        let n = self.0;
        self.0 += 1;
        n
    }
}

impl<'a> Emitter<'a> {
    pub fn new(registry: &'a Registry, config: &'a GeneratorConfig) -> Self {
        let resolver = Resolver::new(registry);
        Self {
            ctx: GenContext::new(config),
            resolver,
            mapper: TypeMapper::new(resolver, config.named_refs),
            out: String::new(),
        }
    }

    pub fn write_header(&mut self) {
        let config = self.ctx.config;
        self.out.push_str("syntax = \"proto3\";\n");
        self.out.push_str(&format!("package {};\n", config.package));
        self.out.push_str(&format!("option go_package = \"{}\";\n\n", config.go_package));
    }

    pub fn finish(self) -> String {
        let mut out = self.out;
        while out.ends_with("\n\n") {
            out.pop();
        }
        out
    }

    /// Emit `node` as the type `name`; a no-op if that type was already emitted.
    pub fn emit(&mut self, name: &str, node: &'a SchemaNode) {
        let type_name = normalize_type_name(name);
        if !self.ctx.mark_visited(&type_name) {
            tracing::debug!(name = %type_name, "already emitted");
            return;
        }
        let resolved = self.resolver.resolve(node);
        if let SchemaKind::Enumeration(enumeration) = &resolved.kind {
            self.emit_enum(&type_name, enumeration);
            return;
        }
        self.ctx.enter(resolved, &type_name);
        match resolved.message_shape() {
            Some(shape) => self.emit_message(&type_name, shape),
            None => self.emit_wrapper(&type_name, name, resolved),
        }
        self.ctx.leave(resolved);
    }

    fn emit_enum(&mut self, type_name: &str, enumeration: &Enumeration) {
        let prefix = type_name.to_uppercase();
        let mut members = NameSet::default();
        let mut block = format!("enum {type_name} {{\n");
        block.push_str(&format!("  {} = 0;\n", members.claim(format!("{prefix}_UNSPECIFIED"))));
        for (i, literal) in enumeration.values.iter().enumerate() {
            let member = members.claim(format!("{prefix}_{}", enum_value_name(literal)));
            block.push_str(&format!("  {member} = {};\n", i + 1));
        }
        block.push_str("}\n\n");
        self.out.push_str(&block);
    }

    fn emit_message(&mut self, type_name: &str, shape: MessageShape<'a>) {
        let config = self.ctx.config;
        let mark = self.ctx.mark();
        let merged = self.resolver.merge_all_of(shape.properties, &shape.composition.all_of);

        let mut props: Vec<(&str, &'a SchemaNode)> = merged.properties.iter().map(|(k, v)| (*k, *v)).collect();
        if config.sort {
            props.sort_by(|a, b| a.0.cmp(b.0));
        }

        // Buffered so eagerly emitted map values land ahead of this message.
        let mut body = String::new();
        let mut numbers = FieldNumbers(1);
        let mut names = NameSet::default();

        for (prop, node) in props {
            let mapped = self.mapper.map_type(type_name, prop, node, self.ctx.active());
            let ty = self.place(mapped);
            let optional = if node.nullable && config.use_optional && ty.is_scalar() { "optional " } else { "" };
            let field = names.claim(field_name(prop));
            body.push_str(&format!("  {optional}{ty} {field} = {};", numbers.take()));
            if let Some(description) = &node.description {
                body.push_str(&format!(" // {}", one_line(description)));
            }
            body.push('\n');
        }

        if merged.properties.is_empty() {
            if let Some(value) = shape.additional {
                let mapped = self.mapper.map_type(type_name, "value", value, self.ctx.active()).eager();
                let ty = self.place(mapped);
                let field = names.claim("entries".to_string());
                body.push_str(&format!("  map<string, {ty}> {field} = {};\n", numbers.take()));
            }
        }

        let composition = shape.composition;
        if !composition.one_of.is_empty() {
            self.write_group(&mut body, &mut names, &mut numbers, type_name, "one_of", "choice", &composition.one_of);
        }
        if let Some(first) = composition.any_of.first() {
            match config.any_of_mode {
                AnyOfMode::Oneof => {
                    self.write_group(&mut body, &mut names, &mut numbers, type_name, "any_of", "alt", &composition.any_of);
                }
                AnyOfMode::Repeat => {
                    // alternatives after the first are dropped in this mode
                    let mapped = self.mapper.map_type(type_name, "anyof_value", first, self.ctx.active());
                    let ty = match self.place(mapped) {
                        ty @ TypeRef::Repeated(_) => ty,
                        ty => ty.repeated(),
                    };
                    let field = names.claim("anyof_value".to_string());
                    body.push_str(&format!("  {ty} {field} = {}; // anyOf first schema repeated\n", numbers.take()));
                }
            }
        }

        self.out.push_str(&format!("message {type_name} {{\n{body}}}\n\n"));
        self.drain(mark);
    }

    /// A bare top-level schema becomes a one-field wrapper message. `resolved`
    /// is mapped as a field would be, so a reference gets one more hop here.
    fn emit_wrapper(&mut self, type_name: &str, name: &str, resolved: &'a SchemaNode) {
        let mark = self.ctx.mark();
        let mapped = self.mapper.map_type(type_name, "value", resolved, self.ctx.active());
        let ty = self.place(mapped);
        self.out.push_str(&format!("// Primitive schema {name} promoted to wrapper message\n"));
        self.out.push_str(&format!("message {type_name} {{ {ty} value = 1; }}\n\n"));
        self.drain(mark);
    }

    #[allow(clippy::too_many_arguments)]
    fn write_group(
        &mut self,
        body: &mut String,
        names: &mut NameSet,
        numbers: &mut FieldNumbers,
        type_name: &str,
        group: &str,
        prefix: &str,
        branches: &'a [SchemaNode],
    ) {
        body.push_str(&format!("  oneof {group} {{\n"));
        for (i, branch) in branches.iter().enumerate() {
            let local = format!("{prefix}_{}", i + 1);
            let mapped = self.mapper.map_type(type_name, &local, branch, self.ctx.active());
            let ty = self.place(mapped);
            let field = names.claim(local);
            body.push_str(&format!("    {ty} {field} = {};\n", numbers.take()));
        }
        body.push_str("  }\n");
    }

    /// Act on a synthesis request and hand back the field type.
    fn place(&mut self, mapped: Mapped<'a>) -> TypeRef {
        if let Some(synthesis) = mapped.synthesis {
            match synthesis.timing {
                Timing::Eager => self.emit(&synthesis.name, synthesis.node),
                Timing::Deferred => {
                    if !self.ctx.enqueue(synthesis.name.clone(), synthesis.node) {
                        tracing::debug!(name = %synthesis.name, "already emitted or queued");
                    }
                }
            }
        }
        mapped.ty
    }

    fn drain(&mut self, mark: usize) {
        for pending in self.ctx.drain_from(mark) {
            self.emit(&pending.name, pending.node);
        }
    }
}

fn field_name(prop: &str) -> String {
    let name = normalize_field_name(prop);
    if name.is_empty() { "field".to_string() } else { name }
}

fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_document;
    use crate::lower::lower_document;
    use once_cell::sync::Lazy;
    use regex::Regex;
    use serde_json::{Value, json};

    const HEADER: &str = "syntax = \"proto3\";\npackage api.v1;\noption go_package = \"example.com/project/api/v1;v1\";\n\n";

    fn registry(schemas: Value) -> Registry {
        lower_document(serde_json::from_value(json!({"components": {"schemas": schemas}})).unwrap())
    }

    fn run(schemas: Value, config: &GeneratorConfig) -> String {
        generate(&registry(schemas), config).unwrap()
    }

    fn body(out: &str) -> &str {
        out.strip_prefix(HEADER).expect("standard header")
    }

    /// The block opened by `opening` (e.g. `message Pet {`), up to its closing brace line.
    fn block<'o>(out: &'o str, opening: &str) -> &'o str {
        let start = out.find(&format!("{opening}\n")).unwrap_or_else(|| panic!("missing {opening:?} in\n{out}"));
        let rest = &out[start..];
        let end = rest.find("\n}\n").map(|i| i + 3).unwrap_or(rest.len());
        &rest[..end]
    }

    fn field_numbers(block: &str) -> Vec<u32> {
        static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"= (\d+);").unwrap());
        NUMBER.captures_iter(block).map(|c| c[1].parse().unwrap()).collect()
    }

    fn position(out: &str, needle: &str) -> usize {
        out.find(needle).unwrap_or_else(|| panic!("missing {needle:?} in\n{out}"))
    }

    fn pet() -> Value {
        json!({"Pet": {
            "type": "object",
            "required": ["id"],
            "properties": {
                "id": {"type": "integer", "format": "int64"},
                "name": {"type": "string", "nullable": true, "description": "Display name\n  shown in lists"},
                "tags": {"type": "array", "items": {"type": "string"}},
                "kind": {"type": "string", "enum": ["cat", "dog"]},
                "owner": {"type": "object", "properties": {"email": {"type": "string"}}},
                "photo": {"type": "string", "format": "binary", "nullable": true},
                "labels": {"type": "object", "additionalProperties": {"type": "string"}}
            }
        }})
    }

    #[test]
    fn empty_registry_is_fatal() {
        let err = generate(&Registry::default(), &GeneratorConfig::default()).unwrap_err();
        assert!(matches!(err, Error::EmptyRegistry));
    }

    #[test]
    fn header_uses_configured_package() {
        let config = GeneratorConfig {
            package: "shop.v2".into(),
            go_package: "example.org/shop/v2;shopv2".into(),
            ..GeneratorConfig::default()
        };
        let out = run(json!({"A": {"type": "object"}}), &config);
        assert!(out.starts_with(
            "syntax = \"proto3\";\npackage shop.v2;\noption go_package = \"example.org/shop/v2;shopv2\";\n\nmessage A {\n"
        ));
    }

    #[test]
    fn full_message_golden() {
        let out = run(pet(), &GeneratorConfig::default());
        let expected = "\
message Pet {
  int64 id = 1;
  PetKind kind = 2;
  map<string, string> labels = 3;
  optional string name = 4; // Display name shown in lists
  PetOwner owner = 5;
  optional bytes photo = 6;
  repeated string tags = 7;
}

enum PetKind {
  PETKIND_UNSPECIFIED = 0;
  PETKIND_CAT = 1;
  PETKIND_DOG = 2;
}

message PetOwner {
  string email = 1;
}
";
        assert_eq!(body(&out), expected);
    }

    #[test]
    fn declaration_order_when_unsorted() {
        let config = GeneratorConfig { sort: false, ..GeneratorConfig::default() };
        let out = run(pet(), &config);
        let pet = block(&out, "message Pet {");
        let fields: Vec<&str> = pet
            .lines()
            .filter_map(|l| l.trim().split(" = ").next())
            .filter_map(|decl| decl.rsplit(' ').next())
            .filter(|f| !f.is_empty() && *f != "{" && *f != "}")
            .collect();
        assert_eq!(fields, vec!["id", "name", "tags", "kind", "owner", "photo", "labels"]);
        assert!(position(&out, "enum PetKind {") < position(&out, "message PetOwner {"));
    }

    #[test]
    fn optional_marker_can_be_disabled_and_never_applies_to_messages() {
        let config = GeneratorConfig { use_optional: false, ..GeneratorConfig::default() };
        let out = run(pet(), &config);
        assert!(!out.contains("optional"));

        let out = run(
            json!({"Box": {"type": "object", "properties": {
                "inner": {"type": "object", "nullable": true, "properties": {"a": {}}},
                "list": {"type": "array", "nullable": true, "items": {"type": "string"}},
                "state": {"type": "string", "nullable": true, "enum": ["on"]}
            }}}),
            &GeneratorConfig::default(),
        );
        assert!(!out.contains("optional"), "{out}");
    }

    #[test]
    fn enum_members_are_numbered_after_the_sentinel() {
        let out = run(
            json!({"OrderStatus": {"type": "string", "enum": ["placed", "in-transit", "on hold", "UNSPECIFIED"]}}),
            &GeneratorConfig::default(),
        );
        let expected = "\
enum OrderStatus {
  ORDERSTATUS_UNSPECIFIED = 0;
  ORDERSTATUS_PLACED = 1;
  ORDERSTATUS_IN_TRANSIT = 2;
  ORDERSTATUS_ON_HOLD = 3;
  ORDERSTATUS_UNSPECIFIED_2 = 4;
}
";
        assert_eq!(body(&out), expected);
    }

    #[test]
    fn bare_scalar_becomes_wrapper() {
        let out = run(json!({"Count": {"type": "integer", "format": "int32"}}), &GeneratorConfig::default());
        assert_eq!(
            body(&out),
            "// Primitive schema Count promoted to wrapper message\nmessage Count { int32 value = 1; }\n"
        );
    }

    #[test]
    fn wrappers_for_arrays_and_dangling_refs() {
        let out = run(
            json!({
                "Tags": {"type": "array", "items": {"type": "string"}},
                "Ghost": {"$ref": "#/components/schemas/Nope"}
            }),
            &GeneratorConfig::default(),
        );
        assert!(out.contains("message Tags { repeated string value = 1; }"));
        assert!(out.contains("message Ghost { string value = 1; }"));
    }

    #[test]
    fn wrapper_maps_its_resolved_target_one_more_hop() {
        let out = run(
            json!({
                "A": {"$ref": "#/components/schemas/B"},
                "B": {"$ref": "#/components/schemas/C"},
                "C": {"type": "integer", "format": "int32"}
            }),
            &GeneratorConfig::default(),
        );
        assert!(out.contains("message A { int32 value = 1; }"), "{out}");
        assert!(out.contains("message B { int32 value = 1; }"), "{out}");
        assert!(out.contains("message C { int32 value = 1; }"), "{out}");
    }

    #[test]
    fn own_property_beats_all_of() {
        let out = run(
            json!({
                "Base": {"type": "object", "properties": {"status": {"type": "integer"}, "id": {"type": "string"}}},
                "Order": {
                    "allOf": [{"$ref": "#/components/schemas/Base"}],
                    "properties": {"status": {"type": "string"}}
                }
            }),
            &GeneratorConfig::default(),
        );
        let order = block(&out, "message Order {");
        assert!(order.contains("  string id = 1;\n"), "{order}");
        assert!(order.contains("  string status = 2;\n"), "{order}");
        assert!(!order.contains("int64"), "{order}");
    }

    fn shape() -> Value {
        json!({
            "Circle": {"type": "object", "properties": {"radius": {"type": "number"}}},
            "Shape": {
                "type": "object",
                "properties": {"label": {"type": "string"}},
                "oneOf": [{"$ref": "#/components/schemas/Circle"}, {"type": "string"}],
                "anyOf": [
                    {"type": "integer", "format": "int32"},
                    {"type": "boolean"},
                    {"type": "object", "properties": {"x": {}}}
                ]
            }
        })
    }

    #[test]
    fn one_of_and_any_of_groups_continue_numbering() {
        let out = run(shape(), &GeneratorConfig::default());
        let expected = "\
message Circle {
  double radius = 1;
}

message Shape {
  string label = 1;
  oneof one_of {
    ShapeChoice1 choice_1 = 2;
    string choice_2 = 3;
  }
  oneof any_of {
    int32 alt_1 = 4;
    bool alt_2 = 5;
    ShapeAlt3 alt_3 = 6;
  }
}

message ShapeChoice1 {
  double radius = 1;
}

message ShapeAlt3 {
  string x = 1;
}
";
        assert_eq!(body(&out), expected);
    }

    #[test]
    fn repeat_mode_keeps_only_the_first_any_of_branch() {
        let config = GeneratorConfig { any_of_mode: AnyOfMode::Repeat, ..GeneratorConfig::default() };
        let out = run(shape(), &config);
        let shape = block(&out, "message Shape {");
        assert!(shape.contains("  repeated int32 anyof_value = 4; // anyOf first schema repeated\n"), "{shape}");
        assert_eq!(shape.matches("anyof_value").count(), 1);
        assert!(!out.contains("alt_"));
        assert!(!out.contains("bool"));
        assert!(!out.contains("ShapeAlt3"));
        assert!(!out.contains("any_of"));
    }

    #[test]
    fn field_numbers_are_gapless_in_every_message() {
        let config = GeneratorConfig { sort: false, ..GeneratorConfig::default() };
        for out in [run(shape(), &config), run(pet(), &config), run(shape(), &GeneratorConfig::default())] {
            for chunk in body(&out).split("\n\n").filter(|c| c.contains("message ") && c.contains(" {\n")) {
                let numbers = field_numbers(chunk);
                let expected: Vec<u32> = (1..=numbers.len() as u32).collect();
                assert_eq!(numbers, expected, "in\n{chunk}");
            }
        }
    }

    #[test]
    fn map_values_precede_and_nested_messages_follow_depth_first() {
        let out = run(
            json!({"Catalog": {"type": "object", "properties": {
                "sections": {"type": "array", "items": {"type": "object", "properties": {
                    "entry": {"type": "object", "properties": {"sku": {"type": "string"}}}
                }}},
                "index": {"type": "object", "additionalProperties": {
                    "type": "object", "properties": {"count": {"type": "integer", "format": "int32"}}
                }},
                "zone": {"type": "object", "properties": {"code": {"type": "string"}}}
            }}}),
            &GeneratorConfig::default(),
        );
        let order = [
            "message CatalogIndexValue {",
            "message Catalog {",
            "message CatalogSectionsItem {",
            "message CatalogSectionsItemEntry {",
            "message CatalogZone {",
        ];
        let positions: Vec<usize> = order.iter().map(|m| position(&out, m)).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "unexpected order:\n{out}");

        let catalog = block(&out, "message Catalog {");
        assert!(catalog.contains("  map<string, CatalogIndexValue> index = 1;\n"));
        assert!(catalog.contains("  repeated CatalogSectionsItem sections = 2;\n"));
        assert!(catalog.contains("  CatalogZone zone = 3;\n"));
    }

    #[test]
    fn pure_map_message() {
        let out = run(
            json!({"Labels": {
                "type": "object",
                "additionalProperties": {"type": "object", "properties": {"v": {"type": "boolean"}}},
                "oneOf": [{"type": "string"}]
            }}),
            &GeneratorConfig::default(),
        );
        let expected = "\
message LabelsValue {
  bool v = 1;
}

message Labels {
  map<string, LabelsValue> entries = 1;
  oneof one_of {
    string choice_1 = 2;
  }
}
";
        assert_eq!(body(&out), expected);
    }

    #[test]
    fn each_type_name_is_emitted_once() {
        let out = run(
            json!({
                "User": {"type": "object", "properties": {
                    "address": {"type": "object", "properties": {"street": {"type": "string"}}},
                    "billing": {"type": "object", "properties": {"street": {"type": "string"}}}
                }},
                "UserAddress": {"type": "object", "properties": {"zip": {"type": "string"}}},
                "user_billing": {"type": "string"}
            }),
            &GeneratorConfig::default(),
        );
        assert_eq!(out.matches("message UserAddress {").count(), 1);
        assert_eq!(out.matches("message UserBilling").count(), 1);
        assert!(block(&out, "message UserAddress {").contains("street"), "nested shape was emitted first");
        assert!(!out.contains("zip"));
    }

    #[test]
    fn named_refs_skip_flattened_copies() {
        let config = GeneratorConfig { named_refs: true, ..GeneratorConfig::default() };
        let out = run(
            json!({
                "Pet": {"type": "object", "properties": {"name": {"type": "string"}}},
                "Owner": {"type": "object", "properties": {
                    "pet": {"$ref": "#/components/schemas/Pet"},
                    "pets": {"type": "array", "items": {"$ref": "#/components/schemas/Pet"}}
                }}
            }),
            &config,
        );
        let owner = block(&out, "message Owner {");
        assert!(owner.contains("  Pet pet = 1;\n"), "{owner}");
        assert!(owner.contains("  repeated Pet pets = 2;\n"), "{owner}");
        assert!(!out.contains("OwnerPet"));
    }

    #[test]
    fn colliding_field_names_are_suffixed() {
        let config = GeneratorConfig { sort: false, ..GeneratorConfig::default() };
        let out = run(
            json!({"Account": {"type": "object", "properties": {
                "userId": {"type": "string"},
                "user_id": {"type": "integer"},
                "$$": {"type": "boolean"}
            }}}),
            &config,
        );
        let account = block(&out, "message Account {");
        assert!(account.contains("  string user_id = 1;\n"), "{account}");
        assert!(account.contains("  int64 user_id_2 = 2;\n"), "{account}");
        assert!(account.contains("  bool field = 3;\n"), "{account}");
    }

    #[test]
    fn top_level_declaration_order_when_unsorted() {
        let config = GeneratorConfig { sort: false, ..GeneratorConfig::default() };
        let schemas = json!({
            "Zeta": {"type": "object", "properties": {"z": {"type": "string"}}},
            "Alpha": {"type": "string", "enum": ["a"]}
        });
        let out = run(schemas.clone(), &config);
        assert!(position(&out, "message Zeta {") < position(&out, "enum Alpha {"), "{out}");

        let out = run(schemas, &GeneratorConfig::default());
        assert!(position(&out, "enum Alpha {") < position(&out, "message Zeta {"), "{out}");
    }

    #[test]
    fn self_referencing_array_reuses_the_enclosing_type() {
        let out = run(
            json!({"Node": {"type": "object", "properties": {
                "children": {"type": "array", "items": {"$ref": "#/components/schemas/Node"}},
                "label": {"type": "string"}
            }}}),
            &GeneratorConfig::default(),
        );
        let expected = "\
message Node {
  repeated Node children = 1;
  string label = 2;
}
";
        assert_eq!(body(&out), expected);
    }

    #[test]
    fn self_referencing_maps_reuse_the_enclosing_type() {
        let out = run(
            json!({
                "Tree": {"type": "object", "additionalProperties": {"$ref": "#/components/schemas/Tree"}},
                "Forest": {"type": "object", "properties": {
                    "groves": {"type": "object", "additionalProperties": {"$ref": "#/components/schemas/Forest"}},
                    "meta": {"type": "object", "additionalProperties": {
                        "type": "object", "properties": {"parent": {"$ref": "#/components/schemas/Forest"}}
                    }}
                }}
            }),
            &GeneratorConfig::default(),
        );
        assert!(out.contains("message Tree {\n  map<string, Tree> entries = 1;\n}\n"), "{out}");

        let forest = block(&out, "message Forest {");
        assert!(forest.contains("  map<string, Forest> groves = 1;\n"), "{forest}");
        assert!(forest.contains("  map<string, ForestMetaValue> meta = 2;\n"), "{forest}");
        assert!(block(&out, "message ForestMetaValue {").contains("  Forest parent = 1;\n"));
        assert!(position(&out, "message ForestMetaValue {") < position(&out, "message Forest {"));
    }

    #[test]
    fn mutually_recursive_messages_terminate() {
        let out = run(
            json!({
                "Parent": {"type": "object", "properties": {"child": {"$ref": "#/components/schemas/Child"}}},
                "Child": {"type": "object", "properties": {"parent": {"$ref": "#/components/schemas/Parent"}}}
            }),
            &GeneratorConfig::default(),
        );
        let expected = "\
message Child {
  ChildParent parent = 1;
}

message ChildParent {
  Child child = 1;
}

message Parent {
  ParentChild child = 1;
}

message ParentChild {
  Parent parent = 1;
}
";
        assert_eq!(body(&out), expected);
    }

    #[test]
    fn recursive_arrays_outside_any_message() {
        let out = run(
            json!({
                "Holder": {"type": "object", "properties": {"ring": {"$ref": "#/components/schemas/Ring"}}},
                "Ring": {"type": "array", "items": {"$ref": "#/components/schemas/Link"}},
                "Link": {"type": "array", "items": {"$ref": "#/components/schemas/Ring"}}
            }),
            &GeneratorConfig::default(),
        );
        assert!(block(&out, "message Holder {").contains("  repeated repeated string ring = 1;\n"), "{out}");
        assert!(out.contains("message Ring { repeated repeated Ring value = 1; }"), "{out}");
        assert!(out.contains("message Link { repeated repeated Link value = 1; }"), "{out}");
    }

    #[test]
    fn independent_runs_share_a_registry() {
        let reg = registry(shape());
        let config = GeneratorConfig::default();
        let expected = generate(&reg, &config).unwrap();
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4).map(|_| s.spawn(|| generate(&reg, &config).unwrap())).collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    #[test]
    fn yaml_demo_document() {
        let doc = parse_document(include_str!("../demos/petstore.yaml"), None).unwrap();
        let out = generate(&lower_document(doc), &GeneratorConfig::default()).unwrap();

        let pet = block(&out, "message Pet {");
        assert!(pet.contains("  int64 id = 1;\n"), "{pet}");
        assert!(pet.contains("  optional string nickname = 3; // Name the pet answers to\n"), "{pet}");
        assert!(pet.contains("  PetStatus status = 4;\n"), "{pet}");
        assert!(pet.contains("  repeated PetTagsItem tags = 5;\n"), "{pet}");

        assert!(out.contains("  PETSTATUS_AVAILABLE = 1;\n"));
        assert!(out.contains("message Cat {\n"));
        assert!(block(&out, "message Cat {").contains("  bool indoor = "));
        assert!(out.contains("// Primitive schema PetId promoted to wrapper message\nmessage PetId { int64 value = 1; }"));
        assert!(position(&out, "message Pet {") < position(&out, "enum PetStatus {"));
        assert!(position(&out, "enum PetStatus {") < position(&out, "message PetTagsItem {"));
    }
}
