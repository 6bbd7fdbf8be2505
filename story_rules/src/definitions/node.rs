//! Node, passage and choice definitions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::predicate::Predicate;

/// Identifier of a node, unique within its graph or bag.
pub type NodeId = String;

/// Identifier of a passage, unique within its node.
pub type PassageId = String;

/// A unit of content and branching, shared by the graph and the bag.
///
/// Nodes are immutable definitions; playback progress lives in the state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Filled in from the declaring key when the definition omits it.
    #[serde(default)]
    pub node_id: NodeId,

    /// Passages played in order.
    #[serde(default)]
    pub passages: Vec<Passage>,

    /// Outgoing edges, evaluated in order (graph nodes only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,

    /// Trigger gate (bag nodes only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<Predicate>,

    /// Lane of mutual exclusion within the bag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<String>,

    /// Whether the node may trigger again after a completed run.
    #[serde(default)]
    pub allow_repeats: bool,
}

impl Node {
    /// Create an empty node.
    pub fn new(node_id: impl Into<NodeId>) -> Self {
        Self {
            node_id: node_id.into(),
            ..Self::default()
        }
    }

    /// Append a passage.
    pub fn with_passage(mut self, passage: Passage) -> Self {
        self.passages.push(passage);
        self
    }

    /// Append a choice.
    pub fn with_choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }

    /// Set the trigger predicate.
    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Put the node on a named track.
    pub fn on_track(mut self, track: impl Into<String>) -> Self {
        self.track = Some(track.into());
        self
    }

    /// Allow the node to trigger again once a run has completed.
    pub fn with_repeats(mut self, allow_repeats: bool) -> Self {
        self.allow_repeats = allow_repeats;
        self
    }

    /// The node's track, falling back to `default` when none is declared.
    pub fn track_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.track.as_deref().unwrap_or(default)
    }

    /// Get a passage by index.
    pub fn passage(&self, index: usize) -> Option<&Passage> {
        self.passages.get(index)
    }
}

/// One content/side-effect step within a node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Passage {
    pub passage_id: PassageId,

    /// Template string announced to outputs. A passage without content
    /// completes as soon as it is played.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Content type used to pick outputs.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// State patch (keypath -> value) applied when the passage plays.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<Map<String, Value>>,

    /// Guard checked when the passage is reached; failing passages are skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<Predicate>,
}

impl Passage {
    /// Create an empty passage.
    pub fn new(passage_id: impl Into<PassageId>) -> Self {
        Self {
            passage_id: passage_id.into(),
            ..Self::default()
        }
    }

    /// Set the content template.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Set the content type.
    pub fn with_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Add a keypath/value pair to the passage's state patch.
    pub fn with_set(mut self, keypath: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set
            .get_or_insert_with(Map::new)
            .insert(keypath.into(), value.into());
        self
    }

    /// Set the guard predicate.
    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Whether the passage waits for an external completion signal.
    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }
}

/// An outgoing edge of a graph node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    /// Target node.
    pub node_id: NodeId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<Predicate>,
}

impl Choice {
    /// Create an unguarded choice.
    pub fn new(node_id: impl Into<NodeId>) -> Self {
        Self {
            node_id: node_id.into(),
            predicate: None,
        }
    }

    /// Guard the choice with a predicate.
    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }
}
