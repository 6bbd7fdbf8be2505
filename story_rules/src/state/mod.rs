//! State management - the keypath-addressed value tree shared by every part of
//! the engine.
//!
//! User and story variables live at the root next to two reserved sub-trees:
//!
//! - `graph`: bookkeeping for the single-active-node story graph
//! - `bag`: bookkeeping for the storylet bag (running nodes and trigger counts)
//!
//! Both are ordinary mappings, so predicates and templates can address them with
//! keypaths such as `graph.currentNodeId`.

mod keypath;

pub use keypath::*;

use keypath::{set_nested, with_child_table};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Root key of the graph bookkeeping sub-tree.
pub const GRAPH_KEY: &str = "graph";

/// Root key of the bag bookkeeping sub-tree.
pub const BAG_KEY: &str = "bag";

/// The complete narrative state at any point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State {
    root: Map<String, Value>,
}

impl Default for State {
    fn default() -> Self {
        let mut root = Map::new();
        root.insert(
            GRAPH_KEY.to_string(),
            json!({
                "nodeHistory": [],
                "choiceHistory": [],
                "nodeComplete": false,
            }),
        );
        root.insert(
            BAG_KEY.to_string(),
            json!({
                "activePassageIndexes": {},
                "nodeHistory": {},
            }),
        );
        Self { root }
    }
}

impl State {
    /// Create a new state with empty bookkeeping sub-trees.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the value at a keypath.
    ///
    /// A literal root key equal to the whole keypath wins over the nested walk,
    /// so values written through the flat-key branch of [`State::set`] stay
    /// readable. Missing segments resolve to `None`.
    pub fn get(&self, keypath: &str) -> Option<&Value> {
        if let Some(value) = self.root.get(keypath) {
            return Some(value);
        }
        let mut segments = split(keypath);
        let mut current = self.root.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Write a value at a keypath.
    ///
    /// If the first segment already holds a mapping, the write descends into it,
    /// creating mappings for missing inner segments. Otherwise the full keypath
    /// is stored as a single literal key: `set("foo.bar", v)` on a state without
    /// `foo` produces `{"foo.bar": v}`, not `{"foo": {"bar": v}}`.
    pub fn set(&mut self, keypath: &str, value: Value) {
        let Some((head, rest)) = keypath.split_once(KEYPATH_SEPARATOR) else {
            self.root.insert(keypath.to_string(), value);
            return;
        };

        match self.root.get_mut(head) {
            Some(Value::Object(map)) => set_nested(map, rest, value),
            _ => {
                self.root.insert(keypath.to_string(), value);
            }
        }
    }

    /// Remove the value at a keypath, returning it.
    ///
    /// Removes the literal flat key when present, otherwise the nested leaf.
    pub fn remove(&mut self, keypath: &str) -> Option<Value> {
        if let Some(value) = self.root.remove(keypath) {
            return Some(value);
        }
        let (parents, leaf) = keypath.rsplit_once(KEYPATH_SEPARATOR)?;
        let mut segments = split(parents);
        let mut current = self.root.get_mut(segments.next()?)?;
        for segment in segments {
            current = current.as_object_mut()?.get_mut(segment)?;
        }
        current.as_object_mut()?.remove(leaf)
    }

    /// Check whether a keypath resolves to a value.
    pub fn contains(&self, keypath: &str) -> bool {
        self.get(keypath).is_some()
    }

    /// Apply a patch of keypath/value pairs in order.
    pub fn apply_patch(&mut self, patch: &Map<String, Value>) {
        for (keypath, value) in patch {
            self.set(keypath, value.clone());
        }
    }

    /// Borrow the root mapping.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    /// Convert the state into a JSON value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.root.clone())
    }

    // ----- graph bookkeeping -----

    /// Identifier of the graph node currently playing.
    pub fn current_node_id(&self) -> Option<&str> {
        self.graph_field("currentNodeId").and_then(Value::as_str)
    }

    /// Index of the passage the current graph node is waiting on.
    pub fn current_passage_index(&self) -> Option<usize> {
        self.graph_field("currentPassageIndex")
            .and_then(Value::as_u64)
            .and_then(|index| usize::try_from(index).ok())
    }

    /// Whether the current graph node has run out of passages without a
    /// transition.
    pub fn node_complete(&self) -> bool {
        self.graph_field("nodeComplete")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Record the node the graph is entering.
    pub fn set_current_node_id(&mut self, node_id: &str) {
        self.with_graph(|graph| {
            graph.insert("currentNodeId".to_string(), Value::from(node_id));
        });
    }

    /// Record the passage the current graph node is waiting on.
    pub fn set_current_passage_index(&mut self, index: Option<usize>) {
        self.with_graph(|graph| match index {
            Some(index) => {
                graph.insert("currentPassageIndex".to_string(), Value::from(index));
            }
            None => {
                graph.remove("currentPassageIndex");
            }
        });
    }

    /// Flag whether the current graph node has exhausted its passages.
    pub fn set_node_complete(&mut self, complete: bool) {
        self.with_graph(|graph| {
            graph.insert("nodeComplete".to_string(), Value::Bool(complete));
        });
    }

    /// Record a graph transition taking `choice` towards `target`.
    ///
    /// The previous node and the choice are pushed on the front of their
    /// histories, so both read most-recent-first.
    pub fn record_graph_choice(&mut self, target: &str, choice: Value) {
        self.with_graph(|graph| {
            let previous = graph.get("currentNodeId").cloned();

            if let Some(previous) = previous.clone() {
                push_front(graph, "nodeHistory", previous);
            }
            push_front(graph, "choiceHistory", choice.clone());

            graph.insert("previousChoice".to_string(), choice);
            match previous {
                Some(previous) => graph.insert("previousNodeId".to_string(), previous),
                None => graph.remove("previousNodeId"),
            };
            graph.insert("currentNodeId".to_string(), Value::from(target));
        });
    }

    // ----- bag bookkeeping -----

    /// Passage index of a running bag node, `None` when the node is idle.
    pub fn active_passage_index(&self, node_id: &str) -> Option<usize> {
        self.bag_field("activePassageIndexes")
            .and_then(|indexes| indexes.get(node_id))
            .and_then(Value::as_u64)
            .and_then(|index| usize::try_from(index).ok())
    }

    /// Whether a bag node is currently running.
    pub fn is_bag_node_active(&self, node_id: &str) -> bool {
        self.bag_field("activePassageIndexes")
            .and_then(|indexes| indexes.get(node_id))
            .is_some()
    }

    /// Record the passage a running bag node is waiting on.
    pub fn set_active_passage_index(&mut self, node_id: &str, index: usize) {
        self.with_bag(|bag| {
            with_child_table(bag, "activePassageIndexes", |indexes| {
                indexes.insert(node_id.to_string(), Value::from(index));
            });
        });
    }

    /// Mark a bag node as finished: it leaves the running set and its trigger
    /// count goes up by one.
    pub fn record_bag_completion(&mut self, node_id: &str) {
        self.with_bag(|bag| {
            with_child_table(bag, "activePassageIndexes", |indexes| indexes.remove(node_id));
            with_child_table(bag, "nodeHistory", |history| {
                let count = history.get(node_id).and_then(Value::as_u64).unwrap_or(0);
                history.insert(node_id.to_string(), Value::from(count + 1));
            });
        });
    }

    /// Number of times a bag node has run to completion.
    pub fn bag_completion_count(&self, node_id: &str) -> u64 {
        self.bag_field("nodeHistory")
            .and_then(|history| history.get(node_id))
            .and_then(Value::as_u64)
            .unwrap_or(0)
    }

    fn graph_field(&self, field: &str) -> Option<&Value> {
        self.root.get(GRAPH_KEY)?.get(field)
    }

    fn bag_field(&self, field: &str) -> Option<&Value> {
        self.root.get(BAG_KEY)?.get(field)
    }

    fn with_graph<R>(&mut self, f: impl FnOnce(&mut Map<String, Value>) -> R) -> R {
        with_child_table(&mut self.root, GRAPH_KEY, f)
    }

    fn with_bag<R>(&mut self, f: impl FnOnce(&mut Map<String, Value>) -> R) -> R {
        with_child_table(&mut self.root, BAG_KEY, f)
    }
}

fn push_front(map: &mut Map<String, Value>, key: &str, value: Value) {
    let entry = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    match entry {
        Value::Array(items) => items.insert(0, value),
        other => *other = Value::Array(vec![value]),
    }
}
