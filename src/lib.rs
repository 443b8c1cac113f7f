//! gym-2048: a 2048 board engine with a gym-style environment
//!
//! This crate provides:
//! - An N×N `Board` with the slide/merge rules (`engine::merge_line`, `Board::shift`),
//!   random tile spawning and locked-board detection
//! - A `Game` that tracks the running score around an injectable RNG (`game` module)
//! - `Env2048`, a reset/step/render environment for reinforcement learning (`env` module)
//!
//! Quick start:
//! ```
//! use gym_2048::engine::Move;
//! use gym_2048::game::Game;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // Deterministic game with a seeded RNG
//! let mut game = Game::with_rng(4, StdRng::seed_from_u64(42)).unwrap();
//! game.reset().unwrap();
//! let _changed = game.apply_move(Move::Left).unwrap();
//! assert!(game.cells().iter().filter(|&&v| v != 0).count() >= 2);
//! ```
//!
//! Full loop (simplest possible)
//! ```
//! use gym_2048::config::GameConfig;
//! use gym_2048::env::Env2048;
//!
//! let mut env = Env2048::new(&GameConfig { seed: Some(7), ..GameConfig::default() }).unwrap();
//! let mut steps = 0;
//! loop {
//!     let step = env.step(steps % 4).unwrap();
//!     steps += 1;
//!     if step.terminated || steps == 32 {
//!         break;
//!     }
//! }
//! println!("{}", env.render());
//! ```
//!
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod game;

pub use error::EngineError;
