//! Game - the host-facing facade over the state, the machines and the outputs.
//!
//! Every external event follows the same path:
//! 1. **Write**: inputs land in the state directly
//! 2. **Context**: the game lends its parts to a [`Runtime`] for the event
//! 3. **Re-evaluation**: the graph re-checks a pending choice, the bag rescans
//! 4. **Return**: every triggered playback has settled before the call returns

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use uuid::Uuid;

use story_rules::{EngineConfig, State, StoryDefinition, StoryResult};

use crate::bag::NodeBag;
use crate::dispatch::{Action, Dispatch, Runtime};
use crate::events::GameEvent;
use crate::graph::NodeGraph;
use crate::output::OutputRegistry;

/// Unique identifier for a game, attached to its log span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameId(pub Uuid);

impl GameId {
    /// Create a new random game ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GameId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A running story.
#[derive(Debug)]
pub struct Game {
    id: GameId,
    config: EngineConfig,
    state: State,
    graph: Option<NodeGraph>,
    bag: Option<NodeBag>,
    outputs: OutputRegistry,
    started: bool,
}

impl Game {
    /// Create a game with the default configuration.
    pub fn new(definition: StoryDefinition) -> Self {
        Self::with_config(definition, EngineConfig::default())
    }

    /// Create a game with an explicit configuration.
    pub fn with_config(definition: StoryDefinition, config: EngineConfig) -> Self {
        Self {
            id: GameId::new(),
            config,
            state: State::new(),
            graph: definition.graph.map(NodeGraph::new),
            bag: definition.bag.map(NodeBag::new),
            outputs: OutputRegistry::new(),
            started: false,
        }
    }

    /// Parse a JSON story and create a game over it.
    pub fn from_json_str(source: &str) -> StoryResult<Self> {
        Ok(Self::new(StoryDefinition::from_json_str(source)?))
    }

    /// Load a `.json` or `.toml` story file and create a game over it.
    pub fn from_path(path: impl AsRef<Path>) -> StoryResult<Self> {
        Ok(Self::new(StoryDefinition::from_path(path)?))
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Mutable access for seeding state. Writes made here are not evaluated
    /// until the next event.
    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    pub fn graph(&self) -> Option<&NodeGraph> {
        self.graph.as_ref()
    }

    pub fn bag(&self) -> Option<&NodeBag> {
        self.bag.as_ref()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Subscribe to resolved content of one content type.
    ///
    /// The callback receives `(content, passage_id)`. It cannot reach back into
    /// the game; report completion with a later [`Game::complete_passage`].
    pub fn add_output<F>(&mut self, content_type: impl Into<String>, callback: F)
    where
        F: FnMut(&str, &str) + 'static,
    {
        self.outputs.add(content_type, callback);
    }

    /// Activate the graph and run the initial bag scan.
    ///
    /// Calling it again re-enters the start node and rescans.
    pub fn start(&mut self) {
        let _span = tracing::info_span!("game", game_id = %self.id).entered();
        tracing::info!(
            graph = self.graph.is_some(),
            bag = self.bag.is_some(),
            "Starting game"
        );

        self.started = true;
        let mut rt = self.runtime();
        if let Some(graph) = rt.graph() {
            graph.start(&mut rt);
        }
        rt.rescan();
    }

    /// Write `value` at `keypath` and re-evaluate.
    pub fn receive_input(&mut self, keypath: &str, value: impl Into<Value>) {
        let _span = tracing::info_span!("game", game_id = %self.id).entered();
        tracing::debug!(keypath, "Input");

        self.state.set(keypath, value.into());
        self.reevaluate();
    }

    /// Write `value` at `keypath`, re-evaluate, then remove the key again.
    pub fn receive_momentary_input(&mut self, keypath: &str, value: impl Into<Value>) {
        let _span = tracing::info_span!("game", game_id = %self.id).entered();
        tracing::debug!(keypath, "Momentary input");

        self.state.set(keypath, value.into());
        self.reevaluate();
        self.state.remove(keypath);
    }

    /// Momentary `true` at `keypath`, e.g. a button press.
    pub fn press(&mut self, keypath: &str) {
        self.receive_momentary_input(keypath, true);
    }

    /// Report that the host finished presenting a passage.
    pub fn complete_passage(&mut self, passage_id: &str) {
        let _span = tracing::info_span!("game", game_id = %self.id).entered();

        let mut rt = self.runtime();
        rt.dispatch(Action::complete_passage(passage_id));
        if rt.is_started() {
            rt.reevaluate();
        }
    }

    /// Apply a reducer action directly.
    pub fn dispatch(&mut self, action: Action) {
        let _span = tracing::info_span!("game", game_id = %self.id).entered();
        self.runtime().dispatch(action);
    }

    /// Route an external event to the matching operation.
    pub fn handle(&mut self, event: GameEvent) {
        match event {
            GameEvent::Start => self.start(),
            GameEvent::Input { keypath, value } => self.receive_input(&keypath, value),
            GameEvent::MomentaryInput { keypath, value } => {
                self.receive_momentary_input(&keypath, value)
            }
            GameEvent::CompletePassage { passage_id } => self.complete_passage(&passage_id),
        }
    }

    fn reevaluate(&mut self) {
        if self.started {
            self.runtime().reevaluate();
        }
    }

    fn runtime(&mut self) -> Runtime<'_> {
        Runtime::new(
            &mut self.state,
            &mut self.outputs,
            self.graph.as_ref(),
            self.bag.as_ref(),
            &self.config,
            self.started,
        )
    }
}
