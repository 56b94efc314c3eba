//! 游戏核心逻辑模块（棋盘判定、对局状态、规则）。

pub mod board;
pub mod rules;
pub mod state;

pub use board::{Board, BoardError, Move, Symbol, CELL_COUNT, WIN_PATTERNS};
pub use rules::{RuleEngine, RuleError, RuleResolution};
pub use state::{GameEvent, GameState, GameStatus, IntegrityError, Scoreboard};
