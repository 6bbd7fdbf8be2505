//! Node bag - storylets triggered reactively from state, one per track.
//!
//! Every input event rescans the bag in declaration order. A node whose
//! predicate holds starts playing when its track is free; while it plays its
//! passage index sits in `bag.activePassageIndexes`, which is also what makes
//! the track busy. Finishing the last passage raises COMPLETE_BAG_NODE, which
//! frees the track and asks the runtime for another scan before the event
//! returns. A node triggered `max_node_visits` times during one event is
//! skipped until the next one.

use std::collections::BTreeSet;

use story_rules::{holds, BagDefinition, Node, NodeSet, State};

use crate::dispatch::{Action, Dispatch, Machine, PassageCompletion, Runtime};
use crate::node::{NodePlayback, PassageState};

/// The storylet bag machine.
#[derive(Debug, Clone, Default)]
pub struct NodeBag {
    definition: BagDefinition,
}

impl NodeBag {
    /// Create a bag machine over a definition.
    pub fn new(definition: BagDefinition) -> Self {
        Self { definition }
    }

    /// All nodes in declaration order.
    pub fn nodes(&self) -> &NodeSet {
        &self.definition.nodes
    }

    /// Get a node by id.
    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.definition.nodes.get(node_id)
    }

    /// Whether some running node plays on `track`.
    pub fn is_track_busy(&self, track: &str, state: &State, default_track: &str) -> bool {
        self.nodes().iter().any(|node| {
            node.track_or(default_track) == track && state.is_bag_node_active(&node.node_id)
        })
    }

    /// Whether `node` may be triggered now, ignoring track occupancy.
    pub fn is_eligible(&self, node: &Node, state: &State) -> bool {
        if state.is_bag_node_active(&node.node_id) {
            return false;
        }
        if !node.allow_repeats && state.bag_completion_count(&node.node_id) > 0 {
            return false;
        }
        holds(state, node.predicate.as_ref())
    }

    /// Trigger every eligible node whose track is free, at most one per track.
    ///
    /// Completions raised while scanning are picked up by [`Runtime::rescan`],
    /// which runs this again once the current pass is over.
    pub fn scan(&self, rt: &mut Runtime<'_>) {
        if !rt.is_started() {
            return;
        }

        let default_track = rt.config().default_track.as_str();
        let mut claimed: BTreeSet<&str> = BTreeSet::new();

        for node in self.nodes() {
            let track = node.track_or(default_track);
            if claimed.contains(track) || self.is_track_busy(track, rt.state(), default_track) {
                continue;
            }
            if !self.is_eligible(node, rt.state()) {
                continue;
            }
            if !rt.enter(Machine::Bag, &node.node_id) {
                continue;
            }

            claimed.insert(track);
            tracing::debug!(node_id = %node.node_id, track, "Triggering bag node");
            self.play_from(node, 0, rt);
        }
    }

    /// Advance every running node waiting on the completed passage.
    pub fn on_passage_complete(&self, completion: &PassageCompletion, rt: &mut Runtime<'_>) {
        let waiting: Vec<(&Node, usize)> = self
            .nodes()
            .iter()
            .filter_map(|node| {
                let index = rt.state().active_passage_index(&node.node_id)?;
                let passage = node.passage(index)?;
                completion
                    .matches(&node.node_id, &passage.passage_id)
                    .then_some((node, index))
            })
            .collect();

        for (node, index) in waiting {
            // A rescan triggered by an earlier node may already have moved this one on.
            if rt.state().active_passage_index(&node.node_id) != Some(index) {
                continue;
            }
            tracing::debug!(node_id = %node.node_id, passage_index = index, "Bag passage complete");
            self.play_from(node, index + 1, rt);
        }
    }

    fn play_from(&self, node: &Node, mut from: usize, rt: &mut Runtime<'_>) {
        while let Some(index) = node.next_playable(from, rt.state()) {
            rt.state_mut().set_active_passage_index(&node.node_id, index);
            if node.play_passage(index, Machine::Bag, rt) == PassageState::Waiting {
                return;
            }
            from = index + 1;
        }
        rt.dispatch(Action::CompleteBagNode(node.node_id.clone()));
    }
}
