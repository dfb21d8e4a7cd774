//! 浏览器 / Node 环境下的导出函数测试，使用 `wasm-pack test --node` 运行。
#![cfg(target_arch = "wasm32")]

use nim_core::{
    apply_move_value, check_state_value, choose_move_value, new_game_value,
    new_game_with_heaps_value, try_apply_move_value, validate_move_value, Actor, GameState, Move,
    MoveResolution,
};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

fn start_state(heaps: &[u32], misere: bool) -> JsValue {
    let config = serde_json::json!({
        "heapSizes": heaps,
        "misere": misere,
        "maxTake": null,
        "firstMove": "player",
    });
    let config = web_sys::js_sys::JSON::parse(&config.to_string()).unwrap();
    new_game_value(config).unwrap()
}

fn js_move(heap_index: usize, count: u32) -> JsValue {
    to_value(&Move::new(heap_index, count)).unwrap()
}

#[wasm_bindgen_test]
fn default_game_has_three_heaps() {
    let state: GameState = from_value(new_game_value(JsValue::UNDEFINED).unwrap()).unwrap();
    assert_eq!(state.heaps, vec![3, 4, 5]);
    assert_eq!(state.max_take, Some(3));
    assert_eq!(state.current_actor, Actor::Human);
}

#[wasm_bindgen_test]
fn invalid_move_is_echoed() {
    let state = start_state(&[3, 4, 5], false);
    assert!(!validate_move_value(state.clone(), js_move(0, 4)).unwrap());
    let before: GameState = from_value(state.clone()).unwrap();
    let after: GameState = from_value(apply_move_value(state, js_move(0, 4)).unwrap()).unwrap();
    assert_eq!(before, after);
}

#[wasm_bindgen_test]
fn malformed_move_is_ignored() {
    let state = start_state(&[3, 4, 5], false);
    for raw in [
        r#"{"heapIndex":-1,"count":1}"#,
        r#"{"heapIndex":0,"count":-2}"#,
        r#"{"heapIndex":0,"count":1.5}"#,
    ] {
        let mv = web_sys::js_sys::JSON::parse(raw).unwrap();
        assert!(!validate_move_value(state.clone(), mv.clone()).unwrap());
        let echoed = apply_move_value(state.clone(), mv).unwrap();
        assert_eq!(echoed, state);
    }
}

#[wasm_bindgen_test]
fn positional_game_honours_mode() {
    let state: GameState = from_value(
        new_game_with_heaps_value(vec![2, 0, 6], true, None, Some("pvp".into())).unwrap(),
    )
    .unwrap();
    assert_eq!(state.heaps, vec![2, 0, 6]);
    assert!(state.misere);
    assert_eq!(state.max_take, None);
    assert_eq!(state.current_actor, Actor::Player1);
}

#[wasm_bindgen_test]
fn try_apply_reports_rule_error() {
    let state = start_state(&[1], false);
    let error = try_apply_move_value(state.clone(), js_move(0, 2)).unwrap_err();
    assert!(error.is_object());

    let resolution: MoveResolution =
        from_value(try_apply_move_value(state, js_move(0, 1)).unwrap()).unwrap();
    assert_eq!(resolution.winner, Some(Actor::Human));
}

#[wasm_bindgen_test]
fn choose_move_follows_nim_sum() {
    let state = start_state(&[3, 4, 5], false);
    let mv: Move = from_value(choose_move_value(state, Some("optimal".into())).unwrap()).unwrap();
    assert_eq!(mv, Move::new(0, 2));
}

#[wasm_bindgen_test]
fn finished_game_yields_null_move() {
    let state = start_state(&[1], true);
    let done = apply_move_value(state, js_move(0, 1)).unwrap();
    assert!(check_state_value(done.clone()).is_ok());
    assert!(choose_move_value(done, None).unwrap().is_null());
}
