use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

use super::board::{Board, Move, Symbol};
use crate::config::GameConfig;

/// 对局状态。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "type")]
pub enum GameStatus {
    #[default]
    InProgress,
    Won {
        winner: Symbol,
    },
    Draw,
}

impl GameStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

/// 游戏事件流，前端据此播放音效、刷新提示。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameEvent {
    MovePlayed { symbol: Symbol, index: Move },
    GameWon { winner: Symbol },
    GameDrawn,
    BoardReset,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Scoreboard {
    pub x: u32,
    pub o: u32,
}

impl Scoreboard {
    pub fn record_win(&mut self, winner: Symbol) {
        match winner {
            Symbol::X => self.x += 1,
            Symbol::O => self.o += 1,
        }
    }

    pub fn wins(&self, symbol: Symbol) -> u32 {
        match symbol {
            Symbol::X => self.x,
            Symbol::O => self.o,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Display, Error)]
#[serde(tag = "type")]
pub enum IntegrityError {
    #[display("piece counts out of balance: {x} X against {o} O")]
    PieceCountImbalance { x: usize, o: usize },
    #[display("expected {expected} to move, state says {actual}")]
    TurnMismatch { expected: Symbol, actual: Symbol },
    #[display("recorded status {recorded:?} does not match board status {actual:?}")]
    StatusMismatch {
        recorded: GameStatus,
        actual: GameStatus,
    },
    #[display("both X and O have a completed line")]
    MultipleWinners,
    #[display("a move was played after {winner} had already won")]
    MoveAfterWin { winner: Symbol },
}

/// 一局井字棋的完整状态，由前端持有。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameState {
    pub board: Board,
    pub current_player: Symbol,
    #[serde(default)]
    pub status: GameStatus,
    #[serde(default)]
    pub scores: Scoreboard,
    #[serde(default)]
    pub config: GameConfig,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub event_log: Vec<GameEvent>,
}

impl GameState {
    pub fn new(config: GameConfig) -> Self {
        Self {
            board: Board::new(),
            current_player: Symbol::X,
            status: GameStatus::InProgress,
            scores: Scoreboard::default(),
            config,
            event_log: Vec::new(),
        }
    }

    pub fn record_event(&mut self, event: GameEvent) {
        self.event_log.push(event);
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_ai_turn(&self) -> bool {
        self.config.is_ai_mode()
            && !self.is_finished()
            && self.current_player == self.config.ai_symbol
    }

    /// Clears the board and hands the first move to X. Scores are kept.
    pub fn reset_board(&mut self) {
        self.board = Board::new();
        self.current_player = Symbol::X;
        self.status = GameStatus::InProgress;
        self.event_log.clear();
        self.record_event(GameEvent::BoardReset);
    }

    /// Changing mode or difficulty starts a fresh board.
    pub fn set_config(&mut self, config: GameConfig) {
        self.config = config;
        self.reset_board();
    }

    pub fn integrity_check(&self) -> Result<(), IntegrityError> {
        let x = self.board.count(Symbol::X);
        let o = self.board.count(Symbol::O);
        if x != o && x != o + 1 {
            return Err(IntegrityError::PieceCountImbalance { x, o });
        }

        if self.board.has_won(Symbol::X) && self.board.has_won(Symbol::O) {
            return Err(IntegrityError::MultipleWinners);
        }
        // the winner must have made the last move
        if let Some(winner) = self.board.winner() {
            let last_mover = if x == o { Symbol::O } else { Symbol::X };
            if winner != last_mover {
                return Err(IntegrityError::MoveAfterWin { winner });
            }
        }

        let actual = self.board.status();
        if actual != self.status {
            return Err(IntegrityError::StatusMismatch {
                recorded: self.status,
                actual,
            });
        }

        if !self.is_finished() {
            let expected = if x == o { Symbol::X } else { Symbol::O };
            if self.current_player != expected {
                return Err(IntegrityError::TurnMismatch {
                    expected,
                    actual: self.current_player,
                });
            }
        }

        Ok(())
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_game_starts_with_x() {
        let state = GameState::default();
        assert_eq!(state.current_player, Symbol::X);
        assert_eq!(state.status, GameStatus::InProgress);
        assert_eq!(state.scores, Scoreboard::default());
        assert!(state.integrity_check().is_ok());
        assert!(!state.is_ai_turn());
    }

    #[test]
    fn reset_keeps_scores() {
        let mut state = GameState::default();
        state.board.set(0, Some(Symbol::X));
        state.current_player = Symbol::O;
        state.scores.record_win(Symbol::O);

        state.reset_board();
        assert_eq!(state.board, Board::new());
        assert_eq!(state.current_player, Symbol::X);
        assert_eq!(state.scores.wins(Symbol::O), 1);
        assert_eq!(state.event_log, vec![GameEvent::BoardReset]);
    }

    #[test]
    fn integrity_flags_turn_and_count_problems() {
        let mut state = GameState::default();
        state.board.set(0, Some(Symbol::X));
        assert_eq!(
            state.integrity_check(),
            Err(IntegrityError::TurnMismatch {
                expected: Symbol::O,
                actual: Symbol::X
            })
        );

        state.board.set(1, Some(Symbol::X));
        state.current_player = Symbol::O;
        assert_eq!(
            state.integrity_check(),
            Err(IntegrityError::PieceCountImbalance { x: 2, o: 0 })
        );
    }

    #[test]
    fn integrity_flags_stale_status() {
        let mut state = GameState::default();
        let moves = [
            (0, Symbol::X),
            (3, Symbol::O),
            (1, Symbol::X),
            (4, Symbol::O),
            (2, Symbol::X),
        ];
        for (index, symbol) in moves {
            state.board.set(index, Some(symbol));
        }
        state.current_player = Symbol::O;
        assert!(matches!(
            state.integrity_check(),
            Err(IntegrityError::StatusMismatch { .. })
        ));

        state.status = GameStatus::Won { winner: Symbol::X };
        assert!(state.integrity_check().is_ok());
    }

    fn state_with(x_cells: &[usize], o_cells: &[usize]) -> GameState {
        let mut state = GameState::default();
        for &index in x_cells {
            state.board.set(index, Some(Symbol::X));
        }
        for &index in o_cells {
            state.board.set(index, Some(Symbol::O));
        }
        state.status = state.board.status();
        state
    }

    #[test]
    fn integrity_rejects_two_winners() {
        let state = state_with(&[0, 1, 2, 6], &[3, 4, 5]);
        assert_eq!(state.integrity_check(), Err(IntegrityError::MultipleWinners));
    }

    #[test]
    fn integrity_rejects_moves_after_a_win() {
        let state = state_with(&[0, 1, 2], &[3, 4, 8]);
        assert_eq!(
            state.integrity_check(),
            Err(IntegrityError::MoveAfterWin { winner: Symbol::X })
        );

        let state = state_with(&[0, 1, 6, 8], &[3, 4, 5]);
        assert_eq!(
            state.integrity_check(),
            Err(IntegrityError::MoveAfterWin { winner: Symbol::O })
        );
    }

    #[test]
    fn integrity_accepts_a_fair_win_for_either_side() {
        let mut state = state_with(&[0, 1, 2], &[3, 4]);
        state.current_player = Symbol::X;
        assert!(state.integrity_check().is_ok());

        let mut state = state_with(&[0, 1, 8], &[3, 4, 5]);
        state.current_player = Symbol::O;
        assert!(state.integrity_check().is_ok());
    }

    #[test]
    fn state_json_uses_tagged_status() {
        let mut state = GameState::default();
        state.status = GameStatus::Won { winner: Symbol::O };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["status"]["type"], "Won");
        assert_eq!(json["status"]["winner"], "O");
        assert_eq!(json["board"].as_array().map(Vec::len), Some(9));

        let parsed: GameState = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, state);
    }
}
