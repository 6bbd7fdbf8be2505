//! Actions applied by the dispatch reducer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use story_rules::{Choice, NodeId, Passage, PassageId};

/// The fixed set of actions the reducer understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Announce a passage's content to the outputs registered for its type.
    Output(OutputPayload),

    /// Write each keypath/value pair into the state.
    SetVariables(Map<String, Value>),

    /// A passage has finished playing.
    CompletePassage(PassageCompletion),

    /// Move the graph along a choice.
    MakeGraphChoice(Choice),

    /// A bag node has run out of passages.
    CompleteBagNode(NodeId),
}

impl Action {
    /// Completion of `passage_id`, matched against every playing node.
    pub fn complete_passage(passage_id: impl Into<PassageId>) -> Self {
        Action::CompletePassage(PassageCompletion::new(passage_id))
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Output(_) => "OUTPUT",
            Action::SetVariables(_) => "SET_VARIABLES",
            Action::CompletePassage(_) => "COMPLETE_PASSAGE",
            Action::MakeGraphChoice(_) => "MAKE_GRAPH_CHOICE",
            Action::CompleteBagNode(_) => "COMPLETE_BAG_NODE",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind())
    }
}

/// A passage merged with the track of the node playing it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputPayload {
    pub passage_id: PassageId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Output routing key; the configured default type when absent.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<String>,
}

impl OutputPayload {
    /// Build the payload for a passage played on `track`.
    pub fn from_passage(passage: &Passage, track: Option<&str>) -> Self {
        Self {
            passage_id: passage.passage_id.clone(),
            content: passage.content.clone(),
            content_type: passage.content_type.clone(),
            track: track.map(str::to_string),
        }
    }
}

/// The machine a node belongs to. Node ids are only unique within one machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Machine {
    Graph,
    Bag,
}

impl Machine {
    pub fn name(&self) -> &'static str {
        match self {
            Machine::Graph => "graph",
            Machine::Bag => "bag",
        }
    }
}

impl std::fmt::Display for Machine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Identifies a finished passage.
///
/// Completions reported by the host only carry the passage id (optionally a
/// node id) and advance every node waiting on that passage. Completions raised
/// while a machine plays a content-free passage name the machine and node that
/// played it. They announce a step the owning machine has already taken, so no
/// machine advances on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassageCompletion {
    pub passage_id: PassageId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raised_by: Option<Machine>,
}

impl PassageCompletion {
    /// Completion reported without a node.
    pub fn new(passage_id: impl Into<PassageId>) -> Self {
        Self {
            passage_id: passage_id.into(),
            node_id: None,
            raised_by: None,
        }
    }

    /// Restrict the completion to one node.
    pub fn for_node(mut self, node_id: impl Into<NodeId>) -> Self {
        self.node_id = Some(node_id.into());
        self
    }

    /// Mark the completion as raised by `machine` while playing `node_id`.
    pub fn raised(mut self, machine: Machine, node_id: impl Into<NodeId>) -> Self {
        self.raised_by = Some(machine);
        self.for_node(node_id)
    }

    /// Whether the engine raised this completion for a content-free passage.
    pub fn is_raised(&self) -> bool {
        self.raised_by.is_some()
    }

    /// Whether this completion should advance `node_id` waiting on
    /// `passage_id`.
    pub fn matches(&self, node_id: &str, passage_id: &str) -> bool {
        !self.is_raised()
            && self.passage_id == passage_id
            && self.node_id.as_deref().map_or(true, |id| id == node_id)
    }
}
