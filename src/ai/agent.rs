use std::str::FromStr;

use derive_more::{Display, Error};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::minimax::{self, ScoredMove};
use crate::config::GameConfig;
use crate::game::{Board, BoardError, Move, Symbol};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiDifficulty {
    Easy,
    #[default]
    Hard,
}

impl FromStr for AiDifficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" | "random" => Ok(AiDifficulty::Easy),
            "hard" | "minimax" | "impossible" => Ok(AiDifficulty::Hard),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Display, Error)]
#[serde(tag = "type")]
pub enum SelectError {
    #[display("no empty cell left to play")]
    NoLegalMove,
    #[display("invalid board: {error}")]
    InvalidBoard {
        #[error(source)]
        error: BoardError,
    },
}

impl From<BoardError> for SelectError {
    fn from(error: BoardError) -> Self {
        SelectError::InvalidBoard { error }
    }
}

/// 选择一步棋：简单难度随机，困难难度完整 minimax。
pub fn select_move<R: Rng + ?Sized>(
    board: &Board,
    ai_symbol: Symbol,
    difficulty: AiDifficulty,
    rng: &mut R,
) -> Result<Move, SelectError> {
    match difficulty {
        AiDifficulty::Easy => random_move(board, rng),
        AiDifficulty::Hard => minimax::best_move(board, ai_symbol),
    }
}

/// Uniform pick among the empty cells.
pub fn random_move<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Result<Move, SelectError> {
    board
        .empty_indices()
        .choose(rng)
        .copied()
        .ok_or(SelectError::NoLegalMove)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AiConfig {
    pub difficulty: AiDifficulty,
    pub symbol: Symbol,
}

impl AiConfig {
    pub fn from_difficulty(difficulty: AiDifficulty) -> Self {
        Self {
            difficulty,
            symbol: Symbol::O,
        }
    }

    pub fn with_symbol(mut self, symbol: Symbol) -> Self {
        self.symbol = symbol;
        self
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig::from_difficulty(AiDifficulty::default())
    }
}

impl From<&GameConfig> for AiConfig {
    fn from(config: &GameConfig) -> Self {
        AiConfig::from_difficulty(config.difficulty).with_symbol(config.ai_symbol)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AiDecision {
    pub index: Move,
    pub symbol: Symbol,
    pub difficulty: AiDifficulty,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
    pub nodes: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<ScoredMove>,
}

pub struct AiAgent<R = SmallRng> {
    config: AiConfig,
    rng: R,
}

impl AiAgent<SmallRng> {
    pub fn new(config: AiConfig) -> Self {
        Self {
            config,
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_seed(config: AiConfig, seed: u64) -> Self {
        Self {
            config,
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> AiAgent<R> {
    pub fn with_rng(config: AiConfig, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn set_config(&mut self, config: AiConfig) {
        self.config = config;
    }

    /// A child agent seeded from this agent's RNG.
    pub fn fork(&mut self) -> AiAgent<SmallRng> {
        AiAgent::with_rng(self.config, SmallRng::seed_from_u64(self.rng.gen()))
    }

    pub fn decide(&mut self, board: &Board) -> Result<AiDecision, SelectError> {
        let AiConfig { difficulty, symbol } = self.config;
        let decision = match difficulty {
            AiDifficulty::Easy => AiDecision {
                index: random_move(board, &mut self.rng)?,
                symbol,
                difficulty,
                score: None,
                nodes: 0,
                candidates: Vec::new(),
            },
            AiDifficulty::Hard => {
                let outcome = minimax::search(board, symbol)?;
                AiDecision {
                    index: outcome.best.index,
                    symbol,
                    difficulty,
                    score: Some(outcome.best.score),
                    nodes: outcome.stats.nodes,
                    candidates: outcome.candidates,
                }
            }
        };
        debug!(index = decision.index, ?difficulty, "ai decision");
        Ok(decision)
    }

    pub fn select_move(&mut self, board: &Board) -> Result<Move, SelectError> {
        select_move(
            board,
            self.config.symbol,
            self.config.difficulty,
            &mut self.rng,
        )
    }
}
