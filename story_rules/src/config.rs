//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::StoryResult;

/// Tunables shared by the story definitions and the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct EngineConfig {
    /// Track assigned to nodes that do not name one.
    pub default_track: String,

    /// Content type used to route passages that carry no `type`.
    pub default_content_type: String,

    /// How often one node may be entered by the graph, or triggered by the
    /// bag, while a single external event is handled. Only cycles of nodes
    /// without content reach it.
    pub max_node_visits: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_track: DEFAULT_TRACK.to_string(),
            default_content_type: DEFAULT_CONTENT_TYPE.to_string(),
            max_node_visits: 256,
        }
    }
}

/// Name of the track used when a node does not declare one.
pub const DEFAULT_TRACK: &str = "default";

/// Content type used when a passage does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "text";

impl EngineConfig {
    /// Parse a configuration from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> StoryResult<Self> {
        Ok(toml::from_str(source)?)
    }
}
