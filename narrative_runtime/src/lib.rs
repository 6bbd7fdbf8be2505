//! # Narrative Runtime
//!
//! The playback engine of the interactive narrative system. This crate drives
//! the state defined in `story_rules` from external events and announces
//! passage content to host callbacks.
//!
//! ## Core Components
//!
//! - **dispatch**: The action reducer and the per-event runtime context
//! - **graph**: Single-active-node branching story machine
//! - **bag**: Storylets triggered from state, one running node per track
//! - **node**: Passage playback shared by the graph and the bag
//! - **output**: Content type -> host callback registry
//! - **game**: Host-facing facade tying the pieces together
//! - **events**: Serializable input events for host event streams
//!
//! ## Design Philosophy
//!
//! - **State-Driven**: All playback progress lives in the state, so predicates can observe it
//! - **Event-Driven**: The runtime reacts to host events and never owns the presentation loop
//! - **Synchronous**: Every cascade completes before the triggering call returns

pub mod bag;
pub mod dispatch;
pub mod events;
pub mod game;
pub mod graph;
pub mod node;
pub mod output;

pub use bag::*;
pub use dispatch::*;
pub use events::*;
pub use game::*;
pub use graph::*;
pub use node::*;
pub use output::*;
