use std::fmt;
use std::str::FromStr;

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::state::GameStatus;

/// 棋盘格子数量。
pub const CELL_COUNT: usize = 9;

/// Rows, columns, then the two diagonals.
pub const WIN_PATTERNS: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// 落子位置（0-8，按行优先）。
pub type Move = usize;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display)]
pub enum Symbol {
    X,
    O,
}

impl Symbol {
    pub fn opponent(self) -> Self {
        match self {
            Symbol::X => Symbol::O,
            Symbol::O => Symbol::X,
        }
    }
}

impl FromStr for Symbol {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "X" | "x" => Ok(Symbol::X),
            "O" | "o" => Ok(Symbol::O),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Display, Error)]
#[serde(tag = "type")]
pub enum BoardError {
    #[display("board must be an array of cells, got {value}")]
    NotAnArray { value: String },
    #[display("board must have 9 cells, got {len}")]
    InvalidLength { len: usize },
    #[display("cell {index} holds unknown symbol {value:?}")]
    UnknownSymbol { index: usize, value: String },
}

/// 3x3 棋盘，`None` 表示空格。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Vec<Option<Symbol>>")]
pub struct Board {
    cells: [Option<Symbol>; CELL_COUNT],
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [None; CELL_COUNT],
        }
    }

    pub fn get(&self, index: Move) -> Option<Symbol> {
        self.cells.get(index).copied().flatten()
    }

    /// `false` for occupied cells and for indices off the board.
    pub fn is_vacant(&self, index: Move) -> bool {
        matches!(self.cells.get(index), Some(None))
    }

    pub(crate) fn set(&mut self, index: Move, value: Option<Symbol>) {
        self.cells[index] = value;
    }

    /// 判断 `symbol` 是否占满任意一条连线。
    pub fn has_won(&self, symbol: Symbol) -> bool {
        WIN_PATTERNS
            .iter()
            .any(|pattern| pattern.iter().all(|&i| self.cells[i] == Some(symbol)))
    }

    pub fn winner(&self) -> Option<Symbol> {
        WIN_PATTERNS.iter().find_map(|&[a, b, c]| {
            let mark = self.cells[a]?;
            (self.cells[b] == Some(mark) && self.cells[c] == Some(mark)).then_some(mark)
        })
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    pub fn status(&self) -> GameStatus {
        if let Some(winner) = self.winner() {
            GameStatus::Won { winner }
        } else if self.is_full() {
            GameStatus::Draw
        } else {
            GameStatus::InProgress
        }
    }

    /// Empty cells in ascending index order.
    pub fn empty_indices(&self) -> Vec<Move> {
        (0..CELL_COUNT).filter(|&i| self.is_vacant(i)).collect()
    }

    pub fn count(&self, symbol: Symbol) -> usize {
        self.cells.iter().filter(|&&cell| cell == Some(symbol)).count()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Wire form: an array of nine `null | "X" | "O"` entries.
impl TryFrom<Value> for Board {
    type Error = BoardError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Array(slots) = value else {
            return Err(BoardError::NotAnArray {
                value: value.to_string(),
            });
        };
        if slots.len() != CELL_COUNT {
            return Err(BoardError::InvalidLength { len: slots.len() });
        }
        let mut board = Board::new();
        for (index, slot) in slots.into_iter().enumerate() {
            board.cells[index] = match slot {
                Value::Null => None,
                Value::String(value) => Some(
                    Symbol::from_str(&value)
                        .map_err(|_| BoardError::UnknownSymbol { index, value })?,
                ),
                other => {
                    return Err(BoardError::UnknownSymbol {
                        index,
                        value: other.to_string(),
                    })
                }
            };
        }
        Ok(board)
    }
}

impl From<Board> for Vec<Option<Symbol>> {
    fn from(board: Board) -> Self {
        board.cells.to_vec()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, cells) in self.cells.chunks(3).enumerate() {
            if row > 0 {
                writeln!(f)?;
            }
            for cell in cells {
                let mark = match cell {
                    Some(Symbol::X) => 'X',
                    Some(Symbol::O) => 'O',
                    None => '.',
                };
                write!(f, "{mark}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn board_from(cells: [Option<Symbol>; CELL_COUNT]) -> Board {
    Board { cells }
}
