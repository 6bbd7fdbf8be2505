//! Story definitions - the graph and bag node sets a game is built from.
//!
//! Definitions are produced by an external authoring tool and loaded once.
//! Node maps keep their declaration order: it decides which choice or storylet
//! wins when several are eligible.

mod node;

pub use node::*;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;

use crate::error::{StoryError, StoryResult};

/// Ordered set of nodes, keyed by node id.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeSet {
    nodes: Vec<Node>,
}

impl NodeSet {
    /// Create an empty node set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, replacing any node with the same id in place.
    pub fn insert(&mut self, node: Node) {
        match self.nodes.iter_mut().find(|n| n.node_id == node.node_id) {
            Some(existing) => *existing = node,
            None => self.nodes.push(node),
        }
    }

    /// Builder form of [`NodeSet::insert`].
    pub fn with_node(mut self, node: Node) -> Self {
        self.insert(node);
        self
    }

    /// Get a node by id.
    pub fn get(&self, node_id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.node_id == node_id)
    }

    /// Check if a node exists.
    pub fn contains(&self, node_id: &str) -> bool {
        self.get(node_id).is_some()
    }

    /// The first declared node.
    pub fn first(&self) -> Option<&Node> {
        self.nodes.first()
    }

    /// Iterate nodes in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl FromIterator<Node> for NodeSet {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        let mut set = NodeSet::new();
        for node in iter {
            set.insert(node);
        }
        set
    }
}

impl<'a> IntoIterator for &'a NodeSet {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl Serialize for NodeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.nodes.len()))?;
        for node in &self.nodes {
            map.serialize_entry(&node.node_id, node)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for NodeSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(NodeSetVisitor)
    }
}

struct NodeSetVisitor;

impl<'de> Visitor<'de> for NodeSetVisitor {
    type Value = NodeSet;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of node id to node")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<NodeSet, A::Error> {
        let mut set = NodeSet::new();
        while let Some((key, mut node)) = access.next_entry::<String, Node>()? {
            if node.node_id.is_empty() {
                node.node_id = key;
            }
            set.insert(node);
        }
        Ok(set)
    }
}

/// The linear/branching part of a story.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphDefinition {
    /// Start node; the first declared node when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NodeId>,

    #[serde(default)]
    pub nodes: NodeSet,
}

impl GraphDefinition {
    /// Create a graph from its nodes.
    pub fn new(nodes: NodeSet) -> Self {
        Self { start: None, nodes }
    }

    /// Set the start node.
    pub fn with_start(mut self, start: impl Into<NodeId>) -> Self {
        self.start = Some(start.into());
        self
    }

    /// The node the graph starts from.
    pub fn start_node_id(&self) -> Option<&str> {
        self.start
            .as_deref()
            .or_else(|| self.nodes.first().map(|n| n.node_id.as_str()))
    }
}

/// The storylet pool of a story.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BagDefinition {
    #[serde(default)]
    pub nodes: NodeSet,
}

impl BagDefinition {
    /// Create a bag from its nodes.
    pub fn new(nodes: NodeSet) -> Self {
        Self { nodes }
    }
}

/// A complete story: an optional graph and an optional bag.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StoryDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<GraphDefinition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bag: Option<BagDefinition>,
}

impl StoryDefinition {
    /// Create an empty story.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the graph.
    pub fn with_graph(mut self, graph: GraphDefinition) -> Self {
        self.graph = Some(graph);
        self
    }

    /// Set the bag.
    pub fn with_bag(mut self, bag: BagDefinition) -> Self {
        self.bag = Some(bag);
        self
    }

    /// Parse a story from JSON.
    pub fn from_json_str(source: &str) -> StoryResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Parse a story from TOML.
    pub fn from_toml_str(source: &str) -> StoryResult<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Load a story file, choosing the format from its extension
    /// (`.json` or `.toml`).
    pub fn from_path(path: impl AsRef<Path>) -> StoryResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| StoryError::io(path, e))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&source),
            Some("toml") => Self::from_toml_str(&source),
            _ => Err(StoryError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}
