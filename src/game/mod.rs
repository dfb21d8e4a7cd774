//! 游戏核心逻辑模块（状态、取子校验与结算）。

pub mod rules;
pub mod state;

pub use rules::{
    apply_move,
    check_move,
    new_game,
    new_game_with_mode,
    new_game_with_rng,
    try_apply_move,
    validate,
    FirstMove,
    GameConfig,
    MoveResolution,
    RuleError,
};
pub use state::{
    nim_sum,
    Actor,
    GameEvent,
    GameMode,
    GameState,
    HeapSize,
    IntegrityError,
    Move,
    VictoryReason,
};
