//! 对局配置：模式、难度、AI 执子与思考延迟。

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::ai::AiDifficulty;
use crate::game::Symbol;

const DEFAULT_THINK_DELAY_MS: u32 = 500;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Human,
    #[default]
    Ai,
}

impl FromStr for GameMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "human" | "pvp" | "local" => Ok(GameMode::Human),
            "ai" | "cpu" | "computer" => Ok(GameMode::Ai),
            _ => Err(()),
        }
    }
}

/// Select values from the page go through `FromStr`; anything unknown keeps the default.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .and_then(|value| T::from_str(&value).ok())
        .unwrap_or_default())
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GameConfig {
    #[serde(deserialize_with = "lenient")]
    pub mode: GameMode,
    #[serde(deserialize_with = "lenient")]
    pub difficulty: AiDifficulty,
    pub ai_symbol: Symbol,
    pub think_delay_ms: u32,
}

impl GameConfig {
    /// Parses the raw `<select>` values; unknown strings keep the defaults.
    pub fn from_parts(mode: Option<&str>, difficulty: Option<&str>) -> Self {
        let defaults = Self::default();
        Self {
            mode: mode
                .and_then(|value| GameMode::from_str(value).ok())
                .unwrap_or(defaults.mode),
            difficulty: difficulty
                .and_then(|value| AiDifficulty::from_str(value).ok())
                .unwrap_or(defaults.difficulty),
            ..defaults
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_mode(mut self, mode: GameMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_difficulty(mut self, difficulty: AiDifficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_ai_symbol(mut self, symbol: Symbol) -> Self {
        self.ai_symbol = symbol;
        self
    }

    pub fn is_ai_mode(&self) -> bool {
        self.mode == GameMode::Ai
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            mode: GameMode::default(),
            difficulty: AiDifficulty::default(),
            ai_symbol: Symbol::O,
            think_delay_ms: DEFAULT_THINK_DELAY_MS,
        }
    }
}
