//! Core game state and transition logic

use crate::board::Board;
use crate::piece::Piece;
use crate::shapes::Spawner;

/// Score awarded per cleared line
pub const POINTS_PER_LINE: u64 = 100;

/// Game state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Running,
    GameOver,
}

/// Input commands the game can process
///
/// Gravity is delivered as a command too, so the whole transition function
/// is driven by one event stream and stays deterministic under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    RotateCw,
    HardDrop,
    GravityTick,
    Quit,
}

/// The main game struct
pub struct Game {
    /// The game grid holding locked cells
    pub board: Board,
    /// Current falling piece
    pub piece: Piece,
    /// Flat per-line score counter
    pub score: u64,
    /// Current game state
    pub state: GameState,
    /// Piece randomizer
    spawner: Spawner,
}

impl Game {
    /// Create a new game with an entropy-seeded spawner
    pub fn new() -> Self {
        Self::from_spawner(Spawner::new())
    }

    /// Create a new game with a fixed spawner seed
    pub fn with_seed(seed: u64) -> Self {
        Self::from_spawner(Spawner::with_seed(seed))
    }

    fn from_spawner(mut spawner: Spawner) -> Self {
        let piece = spawner.spawn();
        Self {
            board: Board::new(),
            piece,
            score: 0,
            state: GameState::Running,
            spawner,
        }
    }

    /// Process a single input command
    ///
    /// Commands are consumed one at a time in arrival order; once the game
    /// is over every further command is ignored.
    pub fn apply(&mut self, action: Action) {
        if self.state != GameState::Running {
            return;
        }
        match action {
            Action::MoveLeft => {
                self.piece.move_left(&self.board);
            }
            Action::MoveRight => {
                self.piece.move_right(&self.board);
            }
            Action::RotateCw => {
                self.piece.try_rotate(&self.board);
            }
            Action::HardDrop => {
                self.piece.hard_drop(&self.board);
                self.lock_piece();
            }
            Action::GravityTick => {
                if !self.piece.move_down(&self.board) {
                    self.lock_piece();
                }
            }
            Action::Quit => {
                self.state = GameState::GameOver;
            }
        }
    }

    /// Lock the current piece, clear lines, and spawn the next piece
    fn lock_piece(&mut self) {
        self.board.merge(&self.piece);

        let cleared = self.board.remove_full_lines();
        self.score += POINTS_PER_LINE * cleared as u64;
        if cleared > 0 {
            tracing::debug!(cleared, score = self.score, "lines cleared");
        }

        // The fresh spawn is not validated; an overlapping spawn surfaces
        // on the next move or tick.
        self.piece = self.spawner.spawn();

        if self.board.is_game_over() {
            self.state = GameState::GameOver;
            tracing::info!(score = self.score, "game over");
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
