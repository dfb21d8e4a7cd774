//! AI 取子策略模块（随机与 nim-sum 最优策略）。

pub mod misere;
pub mod strategy;

pub use misere::{misere_move, MisereCase};
pub use strategy::{
    choose_move, choose_move_with_rng, decide_with_rng, normal_move, random_move, AiAgent,
    AiConfig, AiDecision, AiDifficulty, DecisionRule,
};
