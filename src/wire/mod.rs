/*
 *  The embedding boundary: byte-exact records over a shared memory window,
 *  and the engine entry points the host calls through it.
 */

use crate::core_breach::prelude::*;
use crate::host::Host;
use crate::search::{Arena, SearchLimits, Searcher};

pub const SETUP_DATA_LEN: usize = 12;
pub const GAME_STATE_DATA_LEN: usize = 31;
pub const PLAYER_MOVE_DATA_LEN: usize = 4;

/// A shared-memory page, as the host counts them.
pub const PAGE_SIZE: usize = 0x10000;

/// Bytes reserved between the data segment and the arena.
pub const STACK_SIZE: usize = 0x20000;

const DEFAULT_TIME_LIMIT: u32 = 100_000;
const PROTOCOL_VERSION: u8 = 1;
const PASS_BYTE: u8 = 0xFF;

/// Host-provided engine configuration (12 bytes, little-endian, packed).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SetupData {
    /// Pages of shared memory available to the engine.
    pub memory_size: u32,
    /// Per-move budget in milliseconds; 0 asks for the default.
    pub time_limit: u32,
    pub difficulty_level: u32,
}

impl SetupData {
    pub fn read(window: &[u8]) -> Result<SetupData> {
        if window.len() < SETUP_DATA_LEN {
            return Err(anyhow!("setup window holds {} bytes, need {SETUP_DATA_LEN}", window.len()));
        }
        let word = |at: usize| u32::from_le_bytes(window[at..at + 4].try_into().unwrap());
        Ok(SetupData {
            memory_size: word(0),
            time_limit: word(4),
            difficulty_level: word(8),
        })
    }

    pub fn write(&self, window: &mut [u8]) -> Result<()> {
        if window.len() < SETUP_DATA_LEN {
            return Err(anyhow!("setup window holds {} bytes, need {SETUP_DATA_LEN}", window.len()));
        }
        window[0..4].copy_from_slice(&self.memory_size.to_le_bytes());
        window[4..8].copy_from_slice(&self.time_limit.to_le_bytes());
        window[8..12].copy_from_slice(&self.difficulty_level.to_le_bytes());
        Ok(())
    }
}

/// The 31-byte state record: current player, the board row-major, and the
/// five program slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameStateData {
    pub current_player: u8,
    pub board: [u8; 25],
    pub progs: [u8; 5],
}

impl GameStateData {
    pub fn read(window: &[u8]) -> Result<GameStateData> {
        if window.len() < GAME_STATE_DATA_LEN {
            return Err(anyhow!("state window holds {} bytes, need {GAME_STATE_DATA_LEN}", window.len()));
        }
        Ok(GameStateData {
            current_player: window[0],
            board: window[1..26].try_into().unwrap(),
            progs: window[26..31].try_into().unwrap(),
        })
    }

    pub fn write(&self, window: &mut [u8]) -> Result<()> {
        if window.len() < GAME_STATE_DATA_LEN {
            return Err(anyhow!("state window holds {} bytes, need {GAME_STATE_DATA_LEN}", window.len()));
        }
        window[0] = self.current_player;
        window[1..26].copy_from_slice(&self.board);
        window[26..31].copy_from_slice(&self.progs);
        Ok(())
    }

    pub fn encode(state: &GameState) -> GameStateData {
        let mut board = [0u8; 25];
        for sq in Square::all() {
            board[sq.scan_index()] = state.get_piece(sq).raw();
        }
        let mut progs = [0u8; 5];
        for (slot, prog) in state.progs.iter().enumerate() {
            progs[slot] = prog.pid();
        }
        GameStateData { current_player: state.to_move.uid(), board, progs }
    }

    /// Lifts the record into a game state. The terminal flag is recomputed
    /// from the board, exactly as a fresh decision sees it.
    pub fn decode(&self) -> Result<GameState> {
        let to_move = Player::from_uid(self.current_player)
            .ok_or(anyhow!("no player with uid {}", self.current_player))?;
        let mut state = GameState {
            to_move,
            board: [[Cell::EMPTY; BOARD_SIZE]; BOARD_SIZE],
            progs: Program::all(),
            ended: false,
            win: false,
        };
        for sq in Square::all() {
            state.set_piece(sq, Cell::from_raw(self.board[sq.scan_index()]));
        }
        for (slot, &pid) in self.progs.iter().enumerate() {
            state.progs[slot] = Program::from_pid(pid).ok_or(anyhow!("no program with pid {pid}"))?;
        }
        state.ended = state.is_terminal();
        Ok(state)
    }
}

/// The 4-byte move record written back to the window. A pass carries 0xFF
/// in every move field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerMoveData {
    pub ver: u8,
    pub from: u8,
    pub to: u8,
    pub pid: u8,
}

impl PlayerMoveData {
    pub fn encode(action: Option<Move>) -> PlayerMoveData {
        match action {
            Some(mv) => PlayerMoveData {
                ver: PROTOCOL_VERSION,
                from: mv.from.raw(),
                to: mv.to.raw(),
                pid: mv.prog.pid(),
            },
            None => PlayerMoveData {
                ver: PROTOCOL_VERSION,
                from: PASS_BYTE,
                to: PASS_BYTE,
                pid: PASS_BYTE,
            },
        }
    }

    /// Reads the record back into an action; the pass sentinel maps to None.
    pub fn decode(&self) -> Result<Option<Move>> {
        if [self.from, self.to, self.pid] == [PASS_BYTE; 3] {
            return Ok(None);
        }
        let from = Square::from_raw(self.from).ok_or(anyhow!("bad origin square {}", self.from))?;
        let to = Square::from_raw(self.to).ok_or(anyhow!("bad target square {}", self.to))?;
        let prog = Program::from_pid(self.pid).ok_or(anyhow!("no program with pid {}", self.pid))?;
        Ok(Some(Move { from, to, prog }))
    }

    pub fn read(window: &[u8]) -> Result<PlayerMoveData> {
        if window.len() < PLAYER_MOVE_DATA_LEN {
            return Err(anyhow!("move window holds {} bytes, need {PLAYER_MOVE_DATA_LEN}", window.len()));
        }
        Ok(PlayerMoveData { ver: window[0], from: window[1], to: window[2], pid: window[3] })
    }

    pub fn write(&self, window: &mut [u8]) -> Result<()> {
        if window.len() < PLAYER_MOVE_DATA_LEN {
            return Err(anyhow!("move window holds {} bytes, need {PLAYER_MOVE_DATA_LEN}", window.len()));
        }
        window[0] = self.ver;
        window[1] = self.from;
        window[2] = self.to;
        window[3] = self.pid;
        Ok(())
    }
}

/// The embeddable engine: reads records from the shared window, searches
/// under the configured budget, and writes the chosen move back.
///
/// Window-size violations are host contract breaches and surface as errors;
/// everything inside the decision degrades instead of failing.
pub struct Engine {
    config: SetupData,
    arena: Arena,
    searcher: Searcher,
}

impl Engine {
    pub fn new() -> Engine {
        Engine {
            config: SetupData { memory_size: 0, time_limit: DEFAULT_TIME_LIMIT, difficulty_level: 2 },
            arena: Arena::with_budget(0),
            searcher: Searcher::new(),
        }
    }

    pub fn config(&self) -> &SetupData {
        &self.config
    }

    /// Reads `setup_data` from the window and sizes the arena to everything
    /// past the reserved stack within the advertised pages.
    pub fn setup(&mut self, window: &[u8]) -> Result<()> {
        let mut config = SetupData::read(window)?;
        if config.time_limit == 0 {
            config.time_limit = DEFAULT_TIME_LIMIT;
        }
        let budget = (config.memory_size as usize * PAGE_SIZE).saturating_sub(STACK_SIZE);
        self.arena = Arena::with_budget(budget);
        self.config = config;
        log::debug!("setup: {budget}B arena, {}ms budget, difficulty {}", config.time_limit, config.difficulty_level);
        Ok(())
    }

    /// Reads `game_state_data` from the window, runs the decision, writes
    /// `player_move_data` back over the same bytes, and returns 1.
    pub fn select_move(&mut self, window: &mut [u8], host: &mut dyn Host) -> Result<u8> {
        let state = GameStateData::read(window)?.decode()?;
        let limits = SearchLimits::for_difficulty(self.config.difficulty_level, self.config.time_limit);
        let action = self.searcher.search(&state, &limits, &mut self.arena, host);
        PlayerMoveData::encode(action).write(window)?;
        Ok(1)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}
