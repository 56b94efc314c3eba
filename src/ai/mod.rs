//! AI 模块：随机落子与 minimax 完整搜索。

pub mod agent;
pub mod minimax;

pub use agent::{
    random_move, select_move, AiAgent, AiConfig, AiDecision, AiDifficulty, SelectError,
};
pub use minimax::{best_move, minimax, score_moves, search, ScoredMove, SearchOutcome, SearchStats};
