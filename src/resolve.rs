//! Reference resolution and `allOf` merging.
use indexmap::IndexMap;

use crate::ir::{Registry, SchemaKind, SchemaNode};

/// Effective property set of a message after folding in its `allOf` branches.
#[derive(Debug, Clone, Default)]
pub struct MergedProperties<'a> {
    pub properties: IndexMap<&'a str, &'a SchemaNode>,
}

#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    registry: &'a Registry,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Follow a reference exactly one hop.
    ///
    /// Non-references come back unchanged. A reference whose target is itself a
    /// reference yields that inner reference node, not its final target; callers
    /// wanting another hop call `resolve` again. Dangling references come back as
    /// the original node.
    pub fn resolve(&self, node: &'a SchemaNode) -> &'a SchemaNode {
        let SchemaKind::Reference(name) = &node.kind else {
            return node;
        };
        match self.registry.get(name) {
            Some(target) => target,
            None => {
                tracing::debug!(reference = %name, "dangling reference");
                node
            }
        }
    }

    /// Fold `allOf` branches (in order, later wins) and then the node's own
    /// properties (always win) into one property map. No type compatibility
    /// checks between overwritten definitions.
    pub fn merge_all_of(
        &self,
        own: Option<&'a IndexMap<String, SchemaNode>>,
        branches: &'a [SchemaNode],
    ) -> MergedProperties<'a> {
        let mut properties = IndexMap::new();
        for branch in branches {
            if let SchemaKind::Object(obj) = &self.resolve(branch).kind {
                for (name, prop) in &obj.properties {
                    properties.insert(name.as_str(), prop);
                }
            }
        }
        for (name, prop) in own.into_iter().flatten() {
            properties.insert(name.as_str(), prop);
        }
        MergedProperties { properties }
    }
}
