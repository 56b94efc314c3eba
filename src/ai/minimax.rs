use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::agent::SelectError;
use crate::game::{Board, Move, Symbol, CELL_COUNT};

/// 立即获胜的得分；输棋为其相反数，二者都按搜索深度衰减。
pub const WIN_SCORE: i32 = 10;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub depth_reached: u8,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoredMove {
    pub index: Move,
    pub score: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchOutcome {
    pub best: ScoredMove,
    pub candidates: Vec<ScoredMove>,
    pub stats: SearchStats,
}

/// A mark placed on the working board for the lifetime of the guard.
/// Dropping the guard empties the cell again.
struct Trial<'a> {
    board: &'a mut Board,
    index: Move,
}

impl<'a> Trial<'a> {
    fn place(board: &'a mut Board, index: Move, symbol: Symbol) -> Self {
        board.set(index, Some(symbol));
        Self { board, index }
    }
}

impl Deref for Trial<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl DerefMut for Trial<'_> {
    fn deref_mut(&mut self) -> &mut Board {
        self.board
    }
}

impl Drop for Trial<'_> {
    fn drop(&mut self) {
        self.board.set(self.index, None);
    }
}

/// Scores `board` for `ai`. `depth` counts plies below the top-level trial,
/// `maximizing` is true when `ai` is the one to move.
pub fn minimax(
    board: &mut Board,
    depth: u8,
    maximizing: bool,
    ai: Symbol,
    stats: &mut SearchStats,
) -> i32 {
    stats.nodes += 1;
    stats.depth_reached = stats.depth_reached.max(depth);

    let opponent = ai.opponent();
    if board.has_won(ai) {
        return WIN_SCORE - i32::from(depth);
    }
    if board.has_won(opponent) {
        return i32::from(depth) - WIN_SCORE;
    }
    if board.is_full() {
        return 0;
    }

    let mover = if maximizing { ai } else { opponent };
    let mut best = if maximizing { i32::MIN } else { i32::MAX };
    for index in 0..CELL_COUNT {
        if !board.is_vacant(index) {
            continue;
        }
        let mut trial = Trial::place(board, index, mover);
        let score = minimax(&mut trial, depth + 1, !maximizing, ai, stats);
        best = if maximizing {
            best.max(score)
        } else {
            best.min(score)
        };
    }
    best
}

/// Minimax score of every empty cell, ascending by index.
pub fn score_moves(board: &Board, ai: Symbol, stats: &mut SearchStats) -> Vec<ScoredMove> {
    let mut scratch = *board;
    let mut scored = Vec::with_capacity(CELL_COUNT);
    for index in 0..CELL_COUNT {
        if !scratch.is_vacant(index) {
            continue;
        }
        let mut trial = Trial::place(&mut scratch, index, ai);
        let score = minimax(&mut trial, 0, false, ai, stats);
        scored.push(ScoredMove { index, score });
    }
    debug_assert_eq!(&scratch, board);
    scored
}

/// 穷举搜索，同分时取索引最小的格子。
pub fn search(board: &Board, ai: Symbol) -> Result<SearchOutcome, SelectError> {
    let mut stats = SearchStats::default();
    let candidates = score_moves(board, ai, &mut stats);

    let mut best: Option<ScoredMove> = None;
    for candidate in &candidates {
        if best.map_or(true, |current| candidate.score > current.score) {
            best = Some(*candidate);
        }
    }
    let best = best.ok_or(SelectError::NoLegalMove)?;

    debug!(
        ai = %ai,
        index = best.index,
        score = best.score,
        nodes = stats.nodes,
        "minimax search complete"
    );

    Ok(SearchOutcome {
        best,
        candidates,
        stats,
    })
}

pub fn best_move(board: &Board, ai: Symbol) -> Result<Move, SelectError> {
    search(board, ai).map(|outcome| outcome.best.index)
}
