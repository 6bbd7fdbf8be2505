//! Dispatch - the reducer every narrative side effect goes through.
//!
//! Processing an external event works as follows:
//! 1. **Context**: the game lends its state, outputs, graph and bag to a [`Runtime`]
//! 2. **Playback**: nodes raise [`Action`]s through the [`Dispatch`] trait
//! 3. **Reduction**: the runtime applies each action to the state synchronously
//! 4. **Propagation**: the graph and bag advance past passages that finish on
//!    the spot, and bag completions rescan, before control returns to the caller

mod action;

pub use action::*;

use std::collections::HashMap;

use story_rules::{interpolate, EngineConfig, NodeId, State};

use crate::bag::NodeBag;
use crate::graph::NodeGraph;
use crate::output::OutputRegistry;

/// Receiver of the actions raised during playback.
pub trait Dispatch {
    /// Apply an action synchronously.
    fn dispatch(&mut self, action: Action);
}

/// Explicit context for one external event: the reducer plus everything the
/// graph and bag machines need while handling it.
pub struct Runtime<'a> {
    state: &'a mut State,
    outputs: &'a mut OutputRegistry,
    graph: Option<&'a NodeGraph>,
    bag: Option<&'a NodeBag>,
    config: &'a EngineConfig,
    started: bool,
    visits: HashMap<(Machine, NodeId), u32>,
    scanning: bool,
    rescan_requested: bool,
}

impl<'a> Runtime<'a> {
    /// Create a runtime over borrowed game parts.
    pub fn new(
        state: &'a mut State,
        outputs: &'a mut OutputRegistry,
        graph: Option<&'a NodeGraph>,
        bag: Option<&'a NodeBag>,
        config: &'a EngineConfig,
        started: bool,
    ) -> Self {
        Self {
            state,
            outputs,
            graph,
            bag,
            config,
            started,
            visits: HashMap::new(),
            scanning: false,
            rescan_requested: false,
        }
    }

    /// Current state.
    pub fn state(&self) -> &State {
        self.state
    }

    /// Mutable state, for machine bookkeeping.
    pub fn state_mut(&mut self) -> &mut State {
        self.state
    }

    /// Engine configuration.
    pub fn config(&self) -> &'a EngineConfig {
        self.config
    }

    /// The story graph, if the story has one.
    pub fn graph(&self) -> Option<&'a NodeGraph> {
        self.graph
    }

    /// The storylet bag, if the story has one.
    pub fn bag(&self) -> Option<&'a NodeBag> {
        self.bag
    }

    /// Whether the game has been started.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Re-check the graph's pending choice, then rescan the bag.
    pub fn reevaluate(&mut self) {
        if let Some(graph) = self.graph {
            graph.check_choices(self);
        }
        self.rescan();
    }

    /// Scan the bag until no completion asks for another pass.
    ///
    /// A rescan requested while a scan is running is folded into the running
    /// one, so chains of bag completions never nest.
    pub fn rescan(&mut self) {
        let Some(bag) = self.bag else {
            return;
        };
        if self.scanning {
            self.rescan_requested = true;
            return;
        }

        self.scanning = true;
        self.rescan_requested = true;
        while self.rescan_requested {
            self.rescan_requested = false;
            bag.scan(self);
        }
        self.scanning = false;
    }

    /// Count one entry of `machine` into `node_id` for the current event.
    ///
    /// Returns false once the node has been entered `max_node_visits` times,
    /// which only a cycle of nodes without content can reach.
    pub(crate) fn enter(&mut self, machine: Machine, node_id: &str) -> bool {
        let limit = self.config.max_node_visits;
        let visits = self
            .visits
            .entry((machine, node_id.to_string()))
            .or_insert(0);
        if *visits >= limit {
            tracing::warn!(
                machine = %machine,
                node_id,
                limit,
                "Node visit limit reached for this event"
            );
            return false;
        }
        *visits += 1;
        true
    }

    fn reduce(&mut self, action: Action) {
        match action {
            Action::Output(payload) => {
                let Some(content) = payload.content.as_deref() else {
                    return;
                };
                let resolved = interpolate(content, self.state);
                let content_type = payload
                    .content_type
                    .as_deref()
                    .unwrap_or(&self.config.default_content_type);
                let delivered = self.outputs.emit(content_type, &resolved, &payload.passage_id);
                tracing::debug!(
                    passage_id = %payload.passage_id,
                    content_type,
                    track = payload.track.as_deref().unwrap_or(&self.config.default_track),
                    delivered,
                    "Output"
                );
            }
            Action::SetVariables(patch) => {
                self.state.apply_patch(&patch);
            }
            Action::CompletePassage(completion) => {
                if let Some(graph) = self.graph {
                    graph.on_passage_complete(&completion, self);
                }
                if let Some(bag) = self.bag {
                    bag.on_passage_complete(&completion, self);
                }
            }
            Action::MakeGraphChoice(choice) => {
                let target = choice.node_id.clone();
                let record = serde_json::to_value(&choice).unwrap_or_default();
                self.state.record_graph_choice(&target, record);
            }
            Action::CompleteBagNode(node_id) => {
                self.state.record_bag_completion(&node_id);
                self.rescan();
            }
        }
    }
}

impl Dispatch for Runtime<'_> {
    fn dispatch(&mut self, action: Action) {
        tracing::debug!(action = action.kind(), "Dispatch");
        self.reduce(action);
    }
}
