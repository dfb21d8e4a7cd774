pub mod ai;
pub mod game;
pub mod utils;

use gloo_timers::future::TimeoutFuture;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use std::str::FromStr;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

pub use ai::{
    choose_move, choose_move_with_rng, AiAgent, AiConfig, AiDecision, AiDifficulty, DecisionRule,
    MisereCase,
};
pub use game::{
    apply_move, check_move, nim_sum, new_game, new_game_with_mode, new_game_with_rng,
    try_apply_move, validate, Actor, FirstMove, GameConfig, GameEvent, GameMode, GameState,
    HeapSize, IntegrityError, Move, MoveResolution, RuleError, VictoryReason,
};

#[cfg(all(feature = "wee_alloc", target_arch = "wasm32"))]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    utils::set_panic_hook();
    utils::init_logging();
}

fn to_js_error<E: Serialize + std::fmt::Display>(error: E) -> JsValue {
    to_value(&error).unwrap_or_else(|_| JsValue::from_str(&error.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn parse_difficulty(difficulty: Option<&str>) -> AiDifficulty {
    difficulty
        .and_then(|value| AiDifficulty::from_str(value).ok())
        .unwrap_or_default()
}

fn parse_mode(mode: Option<&str>) -> GameMode {
    mode
        .and_then(|value| GameMode::from_str(value).ok())
        .unwrap_or_default()
}

fn config_from_value(config: JsValue) -> Result<GameConfig, JsValue> {
    if config.is_undefined() || config.is_null() {
        Ok(GameConfig::default())
    } else {
        from_value(config).map_err(JsValue::from)
    }
}

#[derive(Serialize)]
struct AiMoveResponse {
    decision: AiDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    applied: Option<MoveResolution>,
}

/// 持有当前状态的引擎，供宿主以 JSON 字符串交互。
#[wasm_bindgen]
pub struct NimEngine {
    state: GameState,
}

#[wasm_bindgen]
impl NimEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<NimEngine, JsValue> {
        let config = match config_json {
            Some(json) => serde_json::from_str(&json).map_err(serde_to_js_error)?,
            None => GameConfig::default(),
        };
        Ok(NimEngine {
            state: config.build(),
        })
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state).map_err(serde_to_js_error)
    }

    pub fn set_state_json(&mut self, json: &str) -> Result<(), JsValue> {
        let state: GameState = serde_json::from_str(json).map_err(serde_to_js_error)?;
        state.integrity_check().map_err(to_js_error)?;
        self.state = state;
        Ok(())
    }

    pub fn play_json(&mut self, move_json: &str) -> Result<String, JsValue> {
        let mv: Move = serde_json::from_str(move_json).map_err(serde_to_js_error)?;
        let resolution = try_apply_move(&self.state, mv).map_err(to_js_error)?;
        self.state = resolution.state.clone();
        serde_json::to_string(&resolution).map_err(serde_to_js_error)
    }

    pub fn apply_ai_move(&mut self, difficulty: Option<String>) -> Result<String, JsValue> {
        let config = AiConfig::from_difficulty(parse_difficulty(difficulty.as_deref()));
        let decision = AiAgent::new(config).decide_move(&self.state);

        let applied = match decision.mv {
            Some(mv) => {
                let resolution = try_apply_move(&self.state, mv).map_err(to_js_error)?;
                self.state = resolution.state.clone();
                Some(resolution)
            }
            None => None,
        };

        let response = AiMoveResponse { decision, applied };
        serde_json::to_string(&response).map_err(serde_to_js_error)
    }

    /// 等待 `delay_ms`（缺省取难度对应的停顿）后计算 AI 走法，不修改状态。
    pub fn think_ai(&self, difficulty: Option<String>, delay_ms: Option<u32>) -> Promise {
        let state = self.state.clone();
        let mut agent = AiAgent::new(AiConfig::from_difficulty(parse_difficulty(
            difficulty.as_deref(),
        )));
        let delay = delay_ms.unwrap_or(agent.config().think_delay_ms);

        future_to_promise(async move {
            if delay > 0 {
                TimeoutFuture::new(delay).await;
            }
            let decision = agent.decide_move(&state);
            let json = serde_json::to_string(&decision).map_err(serde_to_js_error)?;
            Ok(JsValue::from_str(&json))
        })
    }
}

#[wasm_bindgen(js_name = "newGame")]
pub fn new_game_value(config: JsValue) -> Result<JsValue, JsValue> {
    let config = config_from_value(config)?;
    to_value(&config.build()).map_err(JsValue::from)
}

/// 按位置参数开局，先手为 A 方；`mode` 无法识别时按人机对战处理。
#[wasm_bindgen(js_name = "newGameWithHeaps")]
pub fn new_game_with_heaps_value(
    heap_sizes: Vec<HeapSize>,
    misere: bool,
    max_take: Option<HeapSize>,
    mode: Option<String>,
) -> Result<JsValue, JsValue> {
    let config = GameConfig::default()
        .with_heaps(heap_sizes)
        .with_misere(misere)
        .with_max_take(max_take)
        .with_mode(parse_mode(mode.as_deref()));
    to_value(&config.build()).map_err(JsValue::from)
}

/// 非法走法（包括负数、小数等无法解析的走法）时原样返回状态。
#[wasm_bindgen(js_name = "applyMove")]
pub fn apply_move_value(state: JsValue, mv: JsValue) -> Result<JsValue, JsValue> {
    let parsed: GameState = from_value(state.clone()).map_err(JsValue::from)?;
    match from_value::<Move>(mv) {
        Ok(mv) => to_value(&apply_move(&parsed, mv)).map_err(JsValue::from),
        Err(error) => {
            log::debug!("unreadable move ignored: {error}");
            Ok(state)
        }
    }
}

#[wasm_bindgen(js_name = "tryApplyMove")]
pub fn try_apply_move_value(state: JsValue, mv: JsValue) -> Result<JsValue, JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    let mv: Move = from_value(mv).map_err(JsValue::from)?;
    match try_apply_move(&state, mv) {
        Ok(resolution) => to_value(&resolution).map_err(JsValue::from),
        Err(error) => Err(to_js_error(error)),
    }
}

#[wasm_bindgen(js_name = "validateMove")]
pub fn validate_move_value(state: JsValue, mv: JsValue) -> Result<bool, JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    Ok(from_value::<Move>(mv).is_ok_and(|mv| validate(&state, mv)))
}

#[wasm_bindgen(js_name = "chooseMove")]
pub fn choose_move_value(state: JsValue, difficulty: Option<String>) -> Result<JsValue, JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    match choose_move(&state, parse_difficulty(difficulty.as_deref())) {
        Some(mv) => to_value(&mv).map_err(JsValue::from),
        None => Ok(JsValue::NULL),
    }
}

#[wasm_bindgen(js_name = "checkState")]
pub fn check_state_value(state: JsValue) -> Result<(), JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    state.integrity_check().map_err(to_js_error)
}
