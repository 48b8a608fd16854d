//! Command tree used for completion lookup.
//!
//! Nodes live in a flat arena and refer to their children by index. Node 0
//! is the root: it has an empty name and holds every top-level command.

use std::collections::VecDeque;

use indexmap::IndexMap;
use quill_types::config::{CommandDef, CommandFile};

/// Index of a node in a [`CommandTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Node {
    name: String,
    children: Vec<NodeId>,
}

/// Rooted tree of command names.
#[derive(Debug, Clone)]
pub struct CommandTree {
    nodes: Vec<Node>,
}

impl CommandTree {
    /// A tree holding only the root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                name: String::new(),
                children: Vec::new(),
            }],
        }
    }

    /// Build the tree mirroring a definition file, preserving order.
    pub fn from_definitions(file: &CommandFile) -> Self {
        let mut tree = Self::new();
        let root = tree.root();
        tree.extend_from(root, &file.commands);
        tree
    }

    fn extend_from(&mut self, parent: NodeId, level: &IndexMap<String, CommandDef>) {
        for (name, def) in level {
            let id = self.add_child(parent, name);
            self.extend_from(id, &def.subcommands);
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append a child under `parent` and return its id.
    pub fn add_child(&mut self, parent: NodeId, name: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.to_string(),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.nodes[id.0].name
    }

    /// Children of `id`, in insertion order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// First child of `id` named exactly `name`.
    pub fn child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&c| self.name(c) == name)
    }

    /// Breadth-first search below and including `from`.
    ///
    /// Levels are visited top-down, siblings in insertion order; the first
    /// node whose name equals `name` wins.
    pub fn find(&self, from: NodeId, name: &str) -> Option<NodeId> {
        let mut queue = VecDeque::from([from]);
        while let Some(id) = queue.pop_front() {
            if self.name(id) == name {
                return Some(id);
            }
            queue.extend(self.children(id).iter().copied());
        }
        None
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the root has no children.
    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty()
    }
}

impl Default for CommandTree {
    fn default() -> Self {
        Self::new()
    }
}
