//! Browser-boundary tests; run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use serde_wasm_bindgen::{from_value, to_value};
use tictactoe_wasm::{
    check_win, create_config, create_game_state, evaluate_board, play_move, select_move_js,
    AiDecision, AiDifficulty, GameConfig, GameEngine, GameMode, GameState, GameStatus, Symbol,
};
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn js_board(cells: [Option<&str>; 9]) -> JsValue {
    to_value(&cells.to_vec()).unwrap()
}

#[wasm_bindgen_test]
fn select_move_completes_the_row() {
    let board = js_board([
        Some("X"),
        Some("X"),
        None,
        Some("O"),
        Some("O"),
        None,
        None,
        None,
        None,
    ]);
    let index = select_move_js(board, "X", Some("hard".into()), None).unwrap();
    assert_eq!(index, 2);
}

#[wasm_bindgen_test]
fn select_move_rejects_short_board() {
    let board = to_value(&vec![Option::<String>::None; 4]).unwrap();
    assert!(select_move_js(board, "O", None, Some(1)).is_err());
}

#[wasm_bindgen_test]
fn evaluate_and_check_win() {
    let cells = [
        Some("O"),
        Some("X"),
        None,
        Some("O"),
        Some("X"),
        None,
        Some("O"),
        None,
        None,
    ];
    let status: GameStatus = from_value(evaluate_board(js_board(cells)).unwrap()).unwrap();
    assert_eq!(status, GameStatus::Won { winner: Symbol::O });
    assert!(check_win(js_board(cells), "O").unwrap());
    assert!(!check_win(js_board(cells), "X").unwrap());
}

#[wasm_bindgen_test]
fn stateless_play_move_advances_turn() {
    let state = create_game_state(JsValue::UNDEFINED).unwrap();
    let resolution = play_move(state, 4).unwrap();
    let value: serde_json::Value = from_value(resolution).unwrap();
    assert_eq!(value["state"]["current_player"], "O");
}

#[wasm_bindgen_test]
fn engine_plays_human_then_ai() {
    let mut engine = GameEngine::new(None, Some(3)).unwrap();
    engine.play_json(0).unwrap();
    assert!(engine.is_ai_turn());

    engine.apply_ai_move().unwrap();
    let state: GameState = serde_json::from_str(&engine.state_json().unwrap()).unwrap();
    assert_eq!(state.board.get(4), Some(Symbol::O));
    assert_eq!(state.current_player, Symbol::X);
}

#[wasm_bindgen_test]
fn non_string_cells_are_tagged_board_errors() {
    let board = to_value(&vec![serde_json::json!(1); 9]).unwrap();
    let error = select_move_js(board, "O", None, Some(1)).unwrap_err();
    let error: serde_json::Value = from_value(error).unwrap();
    assert_eq!(error["type"], "InvalidBoard");

    let error = check_win(JsValue::from_str("XOX"), "X").unwrap_err();
    let error: serde_json::Value = from_value(error).unwrap();
    assert_eq!(error["type"], "InvalidBoard");
}

#[wasm_bindgen_test]
fn create_config_falls_back_on_unknown_values() {
    let config: GameConfig =
        from_value(create_config(Some("human".into()), Some("medium".into())).unwrap()).unwrap();
    assert_eq!(config.mode, GameMode::Human);
    assert_eq!(config.difficulty, AiDifficulty::Hard);
}

async fn think_once(seed: u32) -> AiDecision {
    let config = r#"{"difficulty":"easy","think_delay_ms":0}"#.to_string();
    let mut engine = GameEngine::new(Some(config), Some(seed)).unwrap();
    engine.play_json(4).unwrap();
    let decision = JsFuture::from(engine.think_ai()).await.unwrap();
    serde_json::from_str(&decision.as_string().unwrap()).unwrap()
}

#[wasm_bindgen_test]
async fn think_ai_follows_the_engine_seed() {
    let first = think_once(11).await;
    let second = think_once(11).await;
    assert_eq!(first.index, second.index);
    assert_ne!(first.index, 4);
}
