use crate::core_breach::prelude::*;
use crate::host::SystemHost;
use crate::search::{Arena, SearchLimits, Searcher};
use crate::wire::{PAGE_SIZE, STACK_SIZE};

/// Default arena size for native play, in shared-memory pages.
pub const DEFAULT_MEMORY_PAGES: usize = 256;

/// An implementation of the actual breach engine driver: owns the live game
/// and a linear undo/redo history around the playout searcher.
pub struct BreachAgent {
    state: GameState,
    past: Vec<(GameState, Option<Move>)>,
    future: Vec<Option<Move>>,
    searcher: Searcher,
    arena: Arena,
    host: SystemHost,
    time_limit: u32,
    difficulty_level: u32,
}

impl BreachAgent {
    /// Starts a new game, from the standard deal or a handed-over position.
    ///
    /// The agent does not parse game strings itself; any user of the agent
    /// needs to synchronize positions across all of its players, so it holds
    /// the responsibility of parsing and replaying moves in order.
    pub fn new_game(&mut self, state: Option<GameState>) {
        self.state = state.unwrap_or_else(GameState::initial);
        self.past.clear();
        self.future.clear();
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Plays an action if it is legal. If the action is a redo, just redo it
    /// and maintain the future history.
    pub fn play(&mut self, action: Option<Move>) -> Result<()> {
        if self.future.last().is_some_and(|&next| next == action) {
            return self.redo();
        }
        let next = self.apply(action)?;
        self.past.push((self.state, action));
        self.state = next;
        self.future.clear(); // anything but the expected redo wipes the future
        Ok(())
    }

    /// Redoes a move, if any; this maintains the linear history.
    pub fn redo(&mut self) -> Result<()> {
        let Some(action) = self.future.pop() else {
            return Err(anyhow!("no move to redo"));
        };
        let next = self.apply(action)?;
        self.past.push((self.state, action));
        self.state = next;
        Ok(())
    }

    /// Undoes the most recent action, if any.
    pub fn undo(&mut self) -> Result<Option<Move>> {
        let Some((state, action)) = self.past.pop() else {
            return Err(anyhow!("no move to undo"));
        };
        self.state = state;
        self.future.push(action);
        Ok(action)
    }

    /// Generates the best action in the current position. None means the
    /// engine has nothing to play and passes.
    pub fn generate_move(&mut self) -> Option<Move> {
        let limits = SearchLimits::for_difficulty(self.difficulty_level, self.time_limit);
        self.searcher.search(&self.state, &limits, &mut self.arena, &mut self.host)
    }

    /// Playouts issued by the most recent `generate_move`.
    pub fn playouts(&self) -> u32 {
        self.searcher.playouts()
    }

    /// Configures the per-move clock on the search.
    pub fn set_max_time(&mut self, ms: u32) {
        self.time_limit = ms;
    }

    /// Configures the difficulty level on the search.
    pub fn set_difficulty(&mut self, level: u32) {
        self.difficulty_level = level;
    }

    fn apply(&self, action: Option<Move>) -> Result<GameState> {
        let Some(mv) = action else {
            return Err(anyhow!("a pass is only ever reported by the engine, not played"));
        };
        if self.state.ended {
            return Err(anyhow!("the game is already over"));
        }
        if !self.state.valid_moves(self.state.to_move).contains(&mv) {
            return Err(anyhow!("move {} is not valid in this position", notate_move(Some(mv))));
        }
        Ok(self.state.next(mv))
    }
}

/// Knobs a frontend may turn before producing an agent.
#[derive(Clone, Copy, Debug)]
pub struct AgentConfig {
    pub time_limit: u32,
    pub difficulty_level: u32,
    pub memory_pages: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            time_limit: 1000,
            difficulty_level: 2,
            memory_pages: DEFAULT_MEMORY_PAGES,
        }
    }
}

impl AgentConfig {
    /// Gets the default configuration for breach.
    pub fn new() -> AgentConfig {
        AgentConfig::default()
    }

    /// Produces an agent.
    pub fn get_agent(&self) -> BreachAgent {
        let budget = (self.memory_pages * PAGE_SIZE).saturating_sub(STACK_SIZE);
        BreachAgent {
            state: GameState::initial(),
            past: vec![],
            future: vec![],
            searcher: Searcher::new(),
            arena: Arena::with_budget(budget),
            host: SystemHost::new(),
            time_limit: self.time_limit,
            difficulty_level: self.difficulty_level,
        }
    }
}
