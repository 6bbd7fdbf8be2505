//! External events a host can feed into a game.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use story_rules::PassageId;

/// Events driving a game from outside, in the wire form hosts use for event
/// streams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum GameEvent {
    /// Activate the graph and run the initial bag scan.
    Start,

    /// Persistent write followed by re-evaluation.
    Input { keypath: String, value: Value },

    /// Write, re-evaluate, then retract the key.
    MomentaryInput {
        keypath: String,
        #[serde(default = "pressed")]
        value: Value,
    },

    /// The host finished presenting a passage.
    CompletePassage {
        #[serde(rename = "passageId")]
        passage_id: PassageId,
    },
}

fn pressed() -> Value {
    Value::Bool(true)
}
