//! Node playback shared by the graph and the bag.

use story_rules::{holds, Node, State};

use crate::dispatch::{Action, Dispatch, Machine, OutputPayload, PassageCompletion};

/// What a played passage leaves behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassageState {
    /// Content was announced; the host reports completion later.
    Waiting,
    /// The passage finished on the spot.
    Done,
}

/// Playback behaviour for node definitions.
pub trait NodePlayback {
    /// Play the passage at `index` on behalf of `machine`.
    ///
    /// Content is announced through OUTPUT, the passage's patch applied through
    /// SET_VARIABLES, and a passage without content raises its COMPLETE_PASSAGE
    /// on the spot and reports [`PassageState::Done`]; the caller moves on to
    /// the next passage itself. Out of range indexes are ignored.
    fn play_passage(
        &self,
        index: usize,
        machine: Machine,
        dispatch: &mut dyn Dispatch,
    ) -> PassageState;

    /// Index of the first passage at or after `from` whose guard holds.
    fn next_playable(&self, from: usize, state: &State) -> Option<usize>;
}

impl NodePlayback for Node {
    fn play_passage(
        &self,
        index: usize,
        machine: Machine,
        dispatch: &mut dyn Dispatch,
    ) -> PassageState {
        let Some(passage) = self.passage(index) else {
            return PassageState::Done;
        };

        if passage.has_content() {
            dispatch.dispatch(Action::Output(OutputPayload::from_passage(
                passage,
                self.track.as_deref(),
            )));
        }

        if let Some(patch) = &passage.set {
            dispatch.dispatch(Action::SetVariables(patch.clone()));
        }

        if passage.has_content() {
            return PassageState::Waiting;
        }
        dispatch.dispatch(Action::CompletePassage(
            PassageCompletion::new(passage.passage_id.clone()).raised(machine, self.node_id.clone()),
        ));
        PassageState::Done
    }

    fn next_playable(&self, from: usize, state: &State) -> Option<usize> {
        self.passages
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, passage)| holds(state, passage.predicate.as_ref()))
            .map(|(index, _)| index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use story_rules::{Operator, Passage, Predicate};

    #[derive(Default)]
    struct Recorder {
        actions: Vec<Action>,
    }

    impl Dispatch for Recorder {
        fn dispatch(&mut self, action: Action) {
            self.actions.push(action);
        }
    }

    #[test]
    fn test_content_passage_outputs_with_track() {
        let node = Node::new("1")
            .on_track("primary")
            .with_passage(Passage::new("5").with_content("Hello").with_type("text"));
        let mut recorder = Recorder::default();

        let played = node.play_passage(0, Machine::Graph, &mut recorder);

        assert_eq!(played, PassageState::Waiting);
        assert_eq!(recorder.actions.len(), 1);
        match &recorder.actions[0] {
            Action::Output(payload) => {
                assert_eq!(payload.passage_id, "5");
                assert_eq!(payload.track.as_deref(), Some("primary"));
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn test_content_free_passage_sets_and_completes() {
        let node = Node::new("1").with_passage(Passage::new("5").with_set("foo", 1));
        let mut recorder = Recorder::default();

        let played = node.play_passage(0, Machine::Bag, &mut recorder);

        assert_eq!(played, PassageState::Done);
        let kinds: Vec<_> = recorder.actions.iter().map(Action::kind).collect();
        assert_eq!(kinds, vec!["SET_VARIABLES", "COMPLETE_PASSAGE"]);
        assert_eq!(
            recorder.actions[1],
            Action::CompletePassage(PassageCompletion::new("5").raised(Machine::Bag, "1"))
        );
    }

    #[test]
    fn test_content_passage_with_set_does_not_complete() {
        let node = Node::new("1").with_passage(
            Passage::new("5").with_content("Hi!").with_set("foo", json!(1)),
        );
        let mut recorder = Recorder::default();

        let played = node.play_passage(0, Machine::Graph, &mut recorder);

        assert_eq!(played, PassageState::Waiting);
        let kinds: Vec<_> = recorder.actions.iter().map(Action::kind).collect();
        assert_eq!(kinds, vec!["OUTPUT", "SET_VARIABLES"]);
    }

    #[test]
    fn test_out_of_range_is_noop() {
        let node = Node::new("1");
        let mut recorder = Recorder::default();

        node.play_passage(3, Machine::Graph, &mut recorder);

        assert!(recorder.actions.is_empty());
    }

    #[test]
    fn test_next_playable_skips_failing_guards() {
        let node = Node::new("1")
            .with_passage(
                Passage::new("a").with_predicate(Predicate::new().with_condition(
                    "foo",
                    Operator::Lte,
                    0,
                )),
            )
            .with_passage(Passage::new("b"));
        let mut state = State::new();

        assert_eq!(node.next_playable(0, &state), Some(0));

        state.set("foo", json!(1));
        assert_eq!(node.next_playable(0, &state), Some(1));
        assert_eq!(node.next_playable(2, &state), None);
    }
}
