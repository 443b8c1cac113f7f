//! Gym-style environment around [`Game`].
//!
//! Actions are indices `0=Up, 1=Down, 2=Left, 3=Right`; observations are the
//! flattened board plus the running score. Every type handed back derives
//! `Serialize` so callers can forward steps as JSON.

use log::debug;
use serde::Serialize;

use crate::config::{GameConfig, RewardMode};
use crate::engine::{Move, Score, Tile};
use crate::error::Result;
use crate::game::Game;

/// Discrete action space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionSpace {
    pub n: usize,
}

/// Shape and bounds of an [`Observation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ObservationSpace {
    /// Number of board entries (size * size).
    pub board_len: usize,
    /// Largest tile reachable on this board.
    pub max_tile: Tile,
    /// Upper bound used for the score entry.
    pub max_score: Score,
}

impl ObservationSpace {
    /// With `k` cells the largest reachable tile is `2^(k+1)`; the score bound
    /// is that tile times the cell count (`2^17 * 16` on a 4x4 board).
    pub fn for_size(size: usize) -> Self {
        let board_len = size * size;
        let max_tile = 1u64.checked_shl(board_len as u32 + 1).unwrap_or(Tile::MAX);
        ObservationSpace {
            board_len,
            max_tile,
            max_score: max_tile.saturating_mul(board_len as u64),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Observation {
    pub board: Vec<Tile>,
    pub score: Score,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Info {
    pub changed: bool,
    pub highest_tile: Tile,
    pub empty_cells: usize,
}

/// What `step` returns, in gym order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub observation: Observation,
    pub reward: f64,
    pub terminated: bool,
    /// Always false; episodes only end by locking.
    pub truncated: bool,
    pub info: Info,
}

#[derive(Debug, Clone)]
pub struct Env2048 {
    game: Game,
    reward: RewardMode,
}

impl Env2048 {
    /// Build the environment and place the two starting tiles.
    ///
    /// ```
    /// use gym_2048::config::GameConfig;
    /// use gym_2048::env::Env2048;
    ///
    /// let mut env = Env2048::new(&GameConfig { seed: Some(1), ..GameConfig::default() }).unwrap();
    /// let (obs, _) = env.reset(Some(1)).unwrap();
    /// assert_eq!(obs.board.len(), 16);
    /// let step = env.step(2).unwrap();
    /// assert!(!step.truncated);
    /// assert!(env.step(9).is_err());
    /// ```
    pub fn new(config: &GameConfig) -> Result<Self> {
        let mut game = Game::from_config(config)?;
        game.reset()?;
        Ok(Env2048 {
            game,
            reward: config.reward,
        })
    }

    pub fn action_space(&self) -> ActionSpace {
        ActionSpace { n: Move::ALL.len() }
    }

    pub fn observation_space(&self) -> ObservationSpace {
        ObservationSpace::for_size(self.game.size())
    }

    /// Start a new episode, reseeding first when `seed` is given.
    pub fn reset(&mut self, seed: Option<u64>) -> Result<(Observation, Info)> {
        if let Some(seed) = seed {
            self.game.reseed(seed);
        }
        self.game.reset()?;
        Ok((self.observation(), self.info(false)))
    }

    pub fn step(&mut self, action: usize) -> Result<Step> {
        let direction = Move::try_from(action)?;
        let before = self.game.score();
        let changed = self.game.apply_move(direction)?;
        let reward = match self.reward {
            RewardMode::Cumulative => self.game.score(),
            RewardMode::Delta => self.game.score() - before,
        };
        let terminated = self.game.is_terminal();
        debug!("step {direction}: changed={changed} reward={reward} terminated={terminated}");
        Ok(Step {
            observation: self.observation(),
            reward: reward as f64,
            terminated,
            truncated: false,
            info: self.info(changed),
        })
    }

    /// Text view of the current state.
    pub fn render(&self) -> String {
        self.game.to_string()
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }

    fn observation(&self) -> Observation {
        Observation {
            board: self.game.cells().to_vec(),
            score: self.game.score(),
        }
    }

    fn info(&self, changed: bool) -> Info {
        Info {
            changed,
            highest_tile: self.game.highest_tile(),
            empty_cells: self.game.board().count_empty(),
        }
    }
}
