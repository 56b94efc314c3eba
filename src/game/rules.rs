use derive_more::{Display, Error};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::board::{Move, CELL_COUNT};
use super::state::{GameEvent, GameState, GameStatus, IntegrityError};
use crate::ai::{AiAgent, AiConfig, AiDecision, SelectError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Display, Error)]
#[serde(tag = "type")]
pub enum RuleError {
    #[display("the game is already over")]
    GameFinished,
    #[display("cell {index} is off the board")]
    CellOutOfRange { index: Move },
    #[display("cell {index} is already taken")]
    CellOccupied { index: Move },
    #[display("it is the AI's turn")]
    NotPlayerTurn,
    #[display("it is not the AI's turn")]
    NotAiTurn,
    #[display("AI could not pick a move: {error}")]
    Selection {
        #[error(source)]
        error: SelectError,
    },
    #[display("inconsistent game state: {error}")]
    IntegrityViolation {
        #[error(source)]
        error: IntegrityError,
    },
}

impl From<SelectError> for RuleError {
    fn from(error: SelectError) -> Self {
        RuleError::Selection { error }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleResolution {
    pub state: GameState,
    pub events: Vec<GameEvent>,
    pub status: GameStatus,
}

impl RuleResolution {
    pub fn new(state: GameState, events: Vec<GameEvent>) -> Self {
        let status = state.status;
        Self {
            state,
            events,
            status,
        }
    }
}

pub struct RuleEngine;

impl RuleEngine {
    fn ensure_in_progress(state: &GameState) -> Result<(), RuleError> {
        if state.is_finished() {
            return Err(RuleError::GameFinished);
        }
        Ok(())
    }

    fn ensure_vacant(state: &GameState, index: Move) -> Result<(), RuleError> {
        if index >= CELL_COUNT {
            return Err(RuleError::CellOutOfRange { index });
        }
        if !state.board.is_vacant(index) {
            return Err(RuleError::CellOccupied { index });
        }
        Ok(())
    }

    pub fn ensure_integrity(state: &GameState) -> Result<(), RuleError> {
        state
            .integrity_check()
            .map_err(|error| RuleError::IntegrityViolation { error })
    }

    /// Places the current player's mark and advances the game.
    #[instrument(level = "debug", skip(state), fields(player = %state.current_player))]
    pub fn play_move(state: &mut GameState, index: Move) -> Result<Vec<GameEvent>, RuleError> {
        Self::ensure_in_progress(state)?;
        Self::ensure_vacant(state, index)?;

        let symbol = state.current_player;
        state.board.set(index, Some(symbol));

        let mut events = vec![GameEvent::MovePlayed { symbol, index }];
        state.status = state.board.status();
        match state.status {
            GameStatus::Won { winner } => {
                state.scores.record_win(winner);
                events.push(GameEvent::GameWon { winner });
                debug!(%winner, "game won");
            }
            GameStatus::Draw => {
                events.push(GameEvent::GameDrawn);
                debug!("game drawn");
            }
            GameStatus::InProgress => {
                state.current_player = symbol.opponent();
            }
        }

        for event in &events {
            state.record_event(event.clone());
        }
        Ok(events)
    }

    /// 玩家点击格子；人机模式下轮到 AI 时拒绝。
    pub fn human_move(state: &mut GameState, index: Move) -> Result<Vec<GameEvent>, RuleError> {
        Self::ensure_in_progress(state)?;
        if state.is_ai_turn() {
            return Err(RuleError::NotPlayerTurn);
        }
        Self::play_move(state, index)
    }

    pub fn apply_ai_move<R: Rng>(
        state: &mut GameState,
        agent: &mut AiAgent<R>,
    ) -> Result<(AiDecision, Vec<GameEvent>), RuleError> {
        Self::ensure_in_progress(state)?;
        if !state.is_ai_turn() {
            return Err(RuleError::NotAiTurn);
        }

        agent.set_config(AiConfig::from(&state.config));
        let decision = agent.decide(&state.board)?;
        let events = Self::play_move(state, decision.index)?;
        Ok((decision, events))
    }

    pub fn reset(state: &mut GameState) -> Vec<GameEvent> {
        state.reset_board();
        vec![GameEvent::BoardReset]
    }
}
