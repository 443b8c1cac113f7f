use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;

use crate::config::{validate_four_probability, validate_size, GameConfig, DEFAULT_FOUR_PROBABILITY};
use crate::engine::{Board, Move, Score, Tile};
use crate::error::{EngineError, Result};

/// One 2048 game: the board, the running score and the random source used for spawns.
///
/// The random source is injected so runs can be replayed:
/// ```
/// use gym_2048::game::Game;
/// use gym_2048::engine::Move;
///
/// let mut a = Game::seeded(4, 42).unwrap();
/// let mut b = Game::seeded(4, 42).unwrap();
/// a.reset().unwrap();
/// b.reset().unwrap();
/// for dir in [Move::Left, Move::Up, Move::Right, Move::Down] {
///     assert_eq!(a.apply_move(dir).unwrap(), b.apply_move(dir).unwrap());
/// }
/// assert_eq!(a.cells(), b.cells());
/// assert_eq!(a.score(), b.score());
/// ```
#[derive(Debug, Clone)]
pub struct Game<R = StdRng> {
    board: Board,
    score: Score,
    four_probability: f64,
    rng: R,
}

impl Game<StdRng> {
    /// Empty `size`x`size` game seeded from system entropy.
    pub fn new(size: usize) -> Result<Self> {
        Self::with_rng(size, StdRng::from_entropy())
    }

    pub fn seeded(size: usize, seed: u64) -> Result<Self> {
        Self::with_rng(size, StdRng::seed_from_u64(seed))
    }

    /// Empty game built from a validated config. Call `reset` before playing.
    pub fn from_config(config: &GameConfig) -> Result<Self> {
        config.validate()?;
        let mut game = match config.seed {
            Some(seed) => Self::seeded(config.size, seed)?,
            None => Self::new(config.size)?,
        };
        game.four_probability = config.four_probability;
        Ok(game)
    }

    /// Swap in a freshly seeded random source. Board and score are untouched.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}

impl<R: Rng> Game<R> {
    /// All-zero board, score 0.
    pub fn with_rng(size: usize, rng: R) -> Result<Self> {
        validate_size(size)?;
        Ok(Game {
            board: Board::empty(size),
            score: 0,
            four_probability: DEFAULT_FOUR_PROBABILITY,
            rng,
        })
    }

    pub fn set_four_probability(&mut self, four_probability: f64) -> Result<()> {
        validate_four_probability(four_probability)?;
        self.four_probability = four_probability;
        Ok(())
    }

    /// Zero the board and score, then place the two starting tiles.
    pub fn reset(&mut self) -> Result<()> {
        self.board.clear();
        self.score = 0;
        for _ in 0..2 {
            self.spawn()?;
        }
        info!("new {n}x{n} game", n = self.board.size());
        Ok(())
    }

    fn spawn(&mut self) -> Result<()> {
        let spawn = self
            .board
            .spawn_random_tile(&mut self.rng, self.four_probability)?;
        debug!("spawned {} at ({}, {})", spawn.value, spawn.row, spawn.col);
        Ok(())
    }

    /// Slide and merge toward `direction`; if anything moved, add the merge
    /// score and spawn one tile. Returns whether the board changed.
    ///
    /// A changing move always leaves at least one empty cell, so an error
    /// here means the engine itself is broken.
    pub fn apply_move(&mut self, direction: Move) -> Result<bool> {
        let outcome = self.board.shift(direction);
        if !outcome.changed {
            return Ok(false);
        }
        self.score = self.score.saturating_add(outcome.score);
        self.spawn()?;
        debug!("{direction}: +{} (score {})", outcome.score, self.score);
        if self.board.is_locked() {
            info!("board locked with score {}", self.score);
        }
        Ok(true)
    }

    /// True when no move can change the board.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.board.is_locked()
    }

    #[inline]
    pub fn score(&self) -> Score {
        self.score
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.board.size()
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Flattened board, row-major.
    #[inline]
    pub fn cells(&self) -> &[Tile] {
        self.board.cells()
    }

    #[inline]
    pub fn highest_tile(&self) -> Tile {
        self.board.highest_tile()
    }

    /// Install a position. Score is left as is.
    pub fn set_board(&mut self, rows: &[Vec<Tile>]) -> Result<()> {
        let board = Board::from_rows(rows)?;
        if board.size() != self.board.size() {
            return Err(EngineError::InvalidArgument(format!(
                "board is {n}x{n}, expected {m}x{m}",
                n = board.size(),
                m = self.board.size()
            )));
        }
        self.board = board;
        Ok(())
    }
}

impl<R> fmt::Display for Game<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Score: {}", self.score)?;
        write!(f, "{}", self.board)
    }
}
