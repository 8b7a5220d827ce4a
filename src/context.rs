use std::collections::{HashMap, HashSet};

use crate::config::GeneratorConfig;
use crate::ir::SchemaNode;

/// A synthesized type waiting for its parent to close.
#[derive(Debug, Clone)]
pub struct Pending<'a> {
    pub name: String,
    pub node: &'a SchemaNode,
}

/// Nodes whose type is being written right now, with the name they were given.
///
/// Keyed by node address: every cycle in a schema graph passes through a
/// `$ref` back to one of these nodes.
#[derive(Debug, Default)]
pub struct ActiveTypes {
    names: HashMap<*const SchemaNode, String>,
}

impl ActiveTypes {
    pub fn get(&self, node: &SchemaNode) -> Option<&str> {
        self.names.get(&(node as *const SchemaNode)).map(String::as_str)
    }

    fn enter(&mut self, node: &SchemaNode, name: &str) {
        self.names.insert(node as *const SchemaNode, name.to_string());
    }

    fn leave(&mut self, node: &SchemaNode) {
        self.names.remove(&(node as *const SchemaNode));
    }
}

/// Mutable state of one generation run. Never shared between runs.
#[derive(Debug)]
pub struct GenContext<'a> {
    pub config: &'a GeneratorConfig,
    visited: HashSet<String>,
    /// Names ever queued; kept after draining so a sibling's nested type can't
    /// re-queue a name that is still waiting further up the worklist.
    queued: HashSet<String>,
    pending: Vec<Pending<'a>>,
    active: ActiveTypes,
}

impl<'a> GenContext<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self {
            config,
            visited: HashSet::new(),
            queued: HashSet::new(),
            pending: Vec::new(),
            active: ActiveTypes::default(),
        }
    }

    /// Returns `false` if `name` was already emitted in this run.
    pub fn mark_visited(&mut self, name: &str) -> bool {
        self.visited.insert(name.to_string())
    }

    pub fn active(&self) -> &ActiveTypes {
        &self.active
    }

    /// `node` is being written as `name` until the matching [`leave`](Self::leave).
    pub fn enter(&mut self, node: &SchemaNode, name: &str) {
        self.active.enter(node, name);
    }

    pub fn leave(&mut self, node: &SchemaNode) {
        self.active.leave(node);
    }

    /// Queue a synthesized type unless it is already emitted or queued.
    pub fn enqueue(&mut self, name: String, node: &'a SchemaNode) -> bool {
        if self.visited.contains(&name) || !self.queued.insert(name.clone()) {
            return false;
        }
        self.pending.push(Pending { name, node });
        true
    }

    /// Position to later [`drain_from`](Self::drain_from); taken when a message opens.
    pub fn mark(&self) -> usize {
        self.pending.len()
    }

    /// Everything queued since `mark`, in queue order.
    pub fn drain_from(&mut self, mark: usize) -> Vec<Pending<'a>> {
        self.pending.drain(mark..).collect()
    }
}
