pub mod ai;
pub mod config;
pub mod game;
pub mod utils;

use std::fmt::Display;
use std::str::FromStr;

use gloo_timers::future::TimeoutFuture;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

pub use ai::{
    best_move, minimax, random_move, score_moves, search, select_move, AiAgent, AiConfig,
    AiDecision, AiDifficulty, ScoredMove, SearchOutcome, SearchStats, SelectError,
};
pub use config::{GameConfig, GameMode};
pub use game::{
    Board, BoardError, GameEvent, GameState, GameStatus, IntegrityError, Move, RuleEngine,
    RuleError, RuleResolution, Scoreboard, Symbol, CELL_COUNT, WIN_PATTERNS,
};

#[cfg(all(feature = "wee_alloc", target_arch = "wasm32"))]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    utils::set_panic_hook();
    utils::init_tracing();
}

fn to_js_error<E: Serialize + Display>(error: E) -> JsValue {
    to_value(&error).unwrap_or_else(|_| JsValue::from_str(&error.to_string()))
}

fn serde_to_js_error<E: Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn board_from_js(board: JsValue) -> Result<Board, JsValue> {
    let value: serde_json::Value = from_value(board).map_err(|error| {
        to_js_error(SelectError::from(BoardError::NotAnArray {
            value: error.to_string(),
        }))
    })?;
    Board::try_from(value).map_err(|error| to_js_error(SelectError::from(error)))
}

fn symbol_from_js(value: &str) -> Result<Symbol, JsValue> {
    Symbol::from_str(value).map_err(|_| JsValue::from_str(&format!("unknown symbol {value:?}")))
}

fn state_from_js(state: JsValue) -> Result<GameState, JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    RuleEngine::ensure_integrity(&state).map_err(to_js_error)?;
    Ok(state)
}

fn difficulty_or_default(difficulty: Option<&str>) -> AiDifficulty {
    difficulty
        .and_then(|value| AiDifficulty::from_str(value).ok())
        .unwrap_or_default()
}

fn make_agent(config: AiConfig, seed: Option<u32>) -> AiAgent {
    match seed {
        Some(seed) => AiAgent::with_seed(config, u64::from(seed)),
        None => AiAgent::new(config),
    }
}

fn resolution_json(state: &GameState, events: Vec<GameEvent>) -> Result<String, JsValue> {
    serde_json::to_string(&RuleResolution::new(state.clone(), events)).map_err(serde_to_js_error)
}

#[derive(Serialize)]
struct AiMoveResponse {
    decision: AiDecision,
    applied: RuleResolution,
}

#[wasm_bindgen]
pub struct GameEngine {
    state: GameState,
    agent: AiAgent,
}

#[wasm_bindgen]
impl GameEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>, seed: Option<u32>) -> Result<GameEngine, JsValue> {
        let config = match config_json {
            Some(json) => GameConfig::from_json(&json).map_err(serde_to_js_error)?,
            None => GameConfig::default(),
        };
        Ok(GameEngine {
            state: GameState::new(config),
            agent: make_agent(AiConfig::from(&config), seed),
        })
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state).map_err(serde_to_js_error)
    }

    pub fn set_state_json(&mut self, json: &str) -> Result<(), JsValue> {
        let state: GameState = serde_json::from_str(json).map_err(serde_to_js_error)?;
        RuleEngine::ensure_integrity(&state).map_err(to_js_error)?;
        self.state = state;
        Ok(())
    }

    pub fn config_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state.config).map_err(serde_to_js_error)
    }

    /// 切换模式或难度会重新开局（比分保留）。
    pub fn set_config_json(&mut self, json: &str) -> Result<String, JsValue> {
        let config = GameConfig::from_json(json).map_err(serde_to_js_error)?;
        self.state.set_config(config);
        resolution_json(&self.state, vec![GameEvent::BoardReset])
    }

    pub fn play_json(&mut self, index: usize) -> Result<String, JsValue> {
        let events = RuleEngine::human_move(&mut self.state, index).map_err(to_js_error)?;
        resolution_json(&self.state, events)
    }

    pub fn apply_ai_move(&mut self) -> Result<String, JsValue> {
        let (decision, events) =
            RuleEngine::apply_ai_move(&mut self.state, &mut self.agent).map_err(to_js_error)?;
        tracing::info!(
            symbol = %decision.symbol,
            index = decision.index,
            nodes = decision.nodes,
            "ai move applied"
        );
        let response = AiMoveResponse {
            decision,
            applied: RuleResolution::new(self.state.clone(), events),
        };
        serde_json::to_string(&response).map_err(serde_to_js_error)
    }

    /// Resolves with the AI decision JSON after the configured thinking delay.
    /// The decision is not applied; the RNG is forked from the engine's agent.
    pub fn think_ai(&mut self) -> Promise {
        let state = self.state.clone();
        let delay = state.config.think_delay_ms;
        let mut agent = self.agent.fork();
        agent.set_config(AiConfig::from(&state.config));

        future_to_promise(async move {
            if delay > 0 {
                TimeoutFuture::new(delay).await;
            }
            if !state.is_ai_turn() {
                return Err(to_js_error(RuleError::NotAiTurn));
            }
            let decision = agent.decide(&state.board).map_err(to_js_error)?;
            let json = serde_json::to_string(&decision).map_err(serde_to_js_error)?;
            Ok(JsValue::from_str(&json))
        })
    }

    pub fn reset(&mut self) -> Result<String, JsValue> {
        let events = RuleEngine::reset(&mut self.state);
        resolution_json(&self.state, events)
    }

    pub fn is_ai_turn(&self) -> bool {
        self.state.is_ai_turn()
    }

    pub fn think_delay_ms(&self) -> u32 {
        self.state.config.think_delay_ms
    }
}

/// 为给定棋盘挑选 AI 的下一步。
#[wasm_bindgen(js_name = "selectMove")]
pub fn select_move_js(
    board: JsValue,
    ai_symbol: &str,
    difficulty: Option<String>,
    seed: Option<u32>,
) -> Result<usize, JsValue> {
    let board = board_from_js(board)?;
    let symbol = symbol_from_js(ai_symbol)?;
    let difficulty = difficulty_or_default(difficulty.as_deref());
    let mut agent = make_agent(AiConfig::from_difficulty(difficulty).with_symbol(symbol), seed);
    agent.select_move(&board).map_err(to_js_error)
}

#[wasm_bindgen(js_name = "evaluateBoard")]
pub fn evaluate_board(board: JsValue) -> Result<JsValue, JsValue> {
    let board = board_from_js(board)?;
    to_value(&board.status()).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "checkWin")]
pub fn check_win(board: JsValue, symbol: &str) -> Result<bool, JsValue> {
    let board = board_from_js(board)?;
    Ok(board.has_won(symbol_from_js(symbol)?))
}

#[wasm_bindgen(js_name = "createGameState")]
pub fn create_game_state(config: JsValue) -> Result<JsValue, JsValue> {
    let config = if config.is_undefined() || config.is_null() {
        GameConfig::default()
    } else {
        from_value(config).map_err(JsValue::from)?
    };
    to_value(&GameState::new(config)).map_err(JsValue::from)
}

/// Builds a config from the page's mode/difficulty selectors; unknown values fall back.
#[wasm_bindgen(js_name = "createConfig")]
pub fn create_config(
    mode: Option<String>,
    difficulty: Option<String>,
) -> Result<JsValue, JsValue> {
    let config = GameConfig::from_parts(mode.as_deref(), difficulty.as_deref());
    to_value(&config).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "playMove")]
pub fn play_move(state: JsValue, index: usize) -> Result<JsValue, JsValue> {
    let mut state = state_from_js(state)?;
    match RuleEngine::human_move(&mut state, index) {
        Ok(events) => to_value(&RuleResolution::new(state, events)).map_err(JsValue::from),
        Err(error) => Err(to_js_error(error)),
    }
}

#[wasm_bindgen(js_name = "computeAiMove")]
pub fn compute_ai_move(state: JsValue, seed: Option<u32>) -> Result<JsValue, JsValue> {
    let state = state_from_js(state)?;
    if !state.is_ai_turn() {
        return Err(to_js_error(RuleError::NotAiTurn));
    }
    let mut agent = make_agent(AiConfig::from(&state.config), seed);
    let decision = agent.decide(&state.board).map_err(to_js_error)?;
    to_value(&decision).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "validateState")]
pub fn validate_state(state: JsValue) -> Result<(), JsValue> {
    state_from_js(state).map(|_| ())
}
