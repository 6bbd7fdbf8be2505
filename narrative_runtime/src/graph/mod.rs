//! Node graph - the single-active-node linear/branching story machine.
//!
//! The graph plays one node at a time. Each passage of the current node plays
//! in order; once they are exhausted the node's choices are evaluated in
//! declaration order and the first one that holds moves the graph on. When no
//! choice holds, `graph.nodeComplete` is set and the choices are re-checked on
//! every later input event.
//!
//! Passages without content finish on the spot, so the graph walks past them
//! and through any transitions they lead to in a loop. A node entered
//! `max_node_visits` times during one event is refused, which leaves a cycle
//! of such nodes parked with `graph.nodeComplete` set.

use story_rules::{holds, Choice, GraphDefinition, Node, NodeSet, State};

use crate::dispatch::{Action, Dispatch, Machine, PassageCompletion, Runtime};
use crate::node::{NodePlayback, PassageState};

/// The story graph machine. Holds only definitions; progress lives in the state.
#[derive(Debug, Clone, Default)]
pub struct NodeGraph {
    definition: GraphDefinition,
}

impl NodeGraph {
    /// Create a graph machine over a definition.
    pub fn new(definition: GraphDefinition) -> Self {
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

    /// The node the graph starts from.
    pub fn start_node_id(&self) -> Option<&str> {
        self.definition.start_node_id()
    }

    /// The node currently playing.
    pub fn current_node<'g>(&'g self, state: &State) -> Option<&'g Node> {
        self.node(state.current_node_id()?)
    }

    /// Enter the start node and play its first passage.
    pub fn start(&self, rt: &mut Runtime<'_>) {
        let Some(start) = self.start_node_id() else {
            tracing::debug!("Graph has no nodes, nothing to start");
            return;
        };
        let Some(node) = self.node(start) else {
            tracing::warn!(node_id = %start, "Start node is not part of the graph");
            return;
        };
        if !rt.enter(Machine::Graph, &node.node_id) {
            return;
        }
        Self::enter(node, rt);
        self.play_from(node, 0, rt);
    }

    /// Advance the current node when `completion` matches the passage it is
    /// waiting on.
    pub fn on_passage_complete(&self, completion: &PassageCompletion, rt: &mut Runtime<'_>) {
        let Some(node) = self.current_node(rt.state()) else {
            return;
        };
        let Some(index) = rt.state().current_passage_index() else {
            return;
        };
        let Some(passage) = node.passage(index) else {
            return;
        };
        if !completion.matches(&node.node_id, &passage.passage_id) {
            return;
        }

        tracing::debug!(node_id = %node.node_id, passage_id = %passage.passage_id, "Graph passage complete");
        self.play_from(node, index + 1, rt);
    }

    /// Re-check the choices of a node that has exhausted its passages.
    pub fn check_choices(&self, rt: &mut Runtime<'_>) {
        if !rt.state().node_complete() {
            return;
        }
        let Some(node) = self.current_node(rt.state()) else {
            return;
        };
        if let Some(next) = self.take_choice(node, rt) {
            self.play_from(next, 0, rt);
        }
    }

    /// The first choice of `node` that holds and points at a node of this graph.
    pub fn eligible_choice<'n>(&self, node: &'n Node, state: &State) -> Option<&'n Choice> {
        node.choices.iter().find(|choice| {
            if self.node(&choice.node_id).is_none() {
                tracing::warn!(
                    from = %node.node_id,
                    to = %choice.node_id,
                    "Choice points at a missing node, skipping"
                );
                return false;
            }
            holds(state, choice.predicate.as_ref())
        })
    }

    fn enter(node: &Node, rt: &mut Runtime<'_>) {
        tracing::debug!(node_id = %node.node_id, "Entering graph node");
        let state = rt.state_mut();
        state.set_current_node_id(&node.node_id);
        state.set_node_complete(false);
        state.set_current_passage_index(None);
    }

    /// Play `node` from passage `from`, walking on through passages and
    /// transitions that finish on the spot until one waits on the host.
    fn play_from<'g>(&'g self, mut node: &'g Node, mut from: usize, rt: &mut Runtime<'_>) {
        loop {
            if let Some(index) = node.next_playable(from, rt.state()) {
                rt.state_mut().set_current_passage_index(Some(index));
                if node.play_passage(index, Machine::Graph, rt) == PassageState::Waiting {
                    return;
                }
                from = index + 1;
                continue;
            }

            rt.state_mut().set_current_passage_index(None);
            match self.take_choice(node, rt) {
                Some(next) => {
                    node = next;
                    from = 0;
                }
                None => return,
            }
        }
    }

    /// Follow the first eligible choice out of an exhausted node, or mark the
    /// node complete when there is none.
    fn take_choice<'g>(&'g self, node: &Node, rt: &mut Runtime<'_>) -> Option<&'g Node> {
        let next = self
            .eligible_choice(node, rt.state())
            .and_then(|choice| Some((choice, self.node(&choice.node_id)?)));
        let Some((choice, next)) = next else {
            Self::park(node, rt);
            return None;
        };
        if !rt.enter(Machine::Graph, &next.node_id) {
            Self::park(node, rt);
            return None;
        }

        tracing::debug!(from = %node.node_id, to = %choice.node_id, "Graph choice");
        rt.dispatch(Action::MakeGraphChoice(choice.clone()));
        Self::enter(next, rt);
        Some(next)
    }

    fn park(node: &Node, rt: &mut Runtime<'_>) {
        if !rt.state().node_complete() {
            tracing::debug!(node_id = %node.node_id, "Graph node complete, waiting for a choice");
        }
        rt.state_mut().set_node_complete(true);
    }
}
