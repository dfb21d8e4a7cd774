use std::str::FromStr;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::misere::{misere_move, MisereCase};
use crate::game::{nim_sum, validate, GameState, HeapSize, Move};

const RANDOM_THINK_DELAY_MS: u32 = 300;
const OPTIMAL_THINK_DELAY_MS: u32 = 500;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiDifficulty {
    Random,
    #[default]
    Optimal,
}

impl FromStr for AiDifficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" | "easy" => Ok(AiDifficulty::Random),
            "optimal" | "hard" | "perfect" => Ok(AiDifficulty::Optimal),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AiConfig {
    pub difficulty: AiDifficulty,
    /// 宿主展示 AI 走法前的停顿，仅用于节奏。
    pub think_delay_ms: u32,
}

impl AiConfig {
    pub fn from_difficulty(difficulty: AiDifficulty) -> Self {
        match difficulty {
            AiDifficulty::Random => Self {
                difficulty,
                think_delay_ms: RANDOM_THINK_DELAY_MS,
            },
            AiDifficulty::Optimal => Self {
                difficulty,
                think_delay_ms: OPTIMAL_THINK_DELAY_MS,
            },
        }
    }

    pub fn with_think_delay(mut self, think_delay_ms: u32) -> Self {
        self.think_delay_ms = think_delay_ms;
        self
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig::from_difficulty(AiDifficulty::default())
    }
}

/// 决策所依据的规则，便于宿主展示与测试对照。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DecisionRule {
    /// 棋盘已结束或没有可取的对象。
    NoMove,
    Random,
    /// nim-sum 为 0：从最大的堆取 1 以拖延。
    NimSumZero,
    /// 取子使 nim-sum 归零。
    NimSumReduce,
    Misere { case: MisereCase },
    /// 最优策略没有给出合法走法，退回随机。
    RandomFallback,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AiDecision {
    #[serde(rename = "move", skip_serializing_if = "Option::is_none")]
    pub mv: Option<Move>,
    pub difficulty: AiDifficulty,
    pub rule: DecisionRule,
    /// 最优难度下，截断后堆的 nim-sum。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nim_sum: Option<HeapSize>,
}

pub struct AiAgent {
    config: AiConfig,
    rng: SmallRng,
}

impl AiAgent {
    pub fn new(config: AiConfig) -> Self {
        Self {
            config,
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_seed(config: AiConfig, seed: u64) -> Self {
        Self {
            config,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    pub fn decide_move(&mut self, state: &GameState) -> AiDecision {
        decide_with_rng(state, self.config.difficulty, &mut self.rng)
    }
}

/// 为自动行动方选择一步；只有终局或棋盘为空时返回 `None`。
pub fn choose_move(state: &GameState, difficulty: AiDifficulty) -> Option<Move> {
    AiAgent::new(AiConfig::from_difficulty(difficulty))
        .decide_move(state)
        .mv
}

pub fn choose_move_with_rng<R: Rng + ?Sized>(
    state: &GameState,
    difficulty: AiDifficulty,
    rng: &mut R,
) -> Option<Move> {
    decide_with_rng(state, difficulty, rng).mv
}

pub fn decide_with_rng<R: Rng + ?Sized>(
    state: &GameState,
    difficulty: AiDifficulty,
    rng: &mut R,
) -> AiDecision {
    let decision = |mv: Option<Move>, rule: DecisionRule, nim_sum: Option<HeapSize>| AiDecision {
        mv,
        difficulty,
        rule,
        nim_sum,
    };

    if state.is_finished() || state.non_empty_heaps().next().is_none() {
        return decision(None, DecisionRule::NoMove, None);
    }

    if difficulty == AiDifficulty::Random {
        return decision(random_move(state, rng), DecisionRule::Random, None);
    }

    let heaps = state.restricted_heaps();
    let sum = nim_sum(&heaps);
    let optimal = if state.misere {
        misere_move(&heaps).map(|(case, mv)| (DecisionRule::Misere { case }, mv))
    } else {
        normal_move(&heaps)
    };

    match optimal {
        Some((rule, mv)) if validate(state, mv) => {
            log::debug!("optimal move {mv} via {rule:?} (nim-sum {sum})");
            decision(Some(mv), rule, Some(sum))
        }
        other => {
            log::warn!(
                "optimal strategy produced no legal move ({other:?}) for heaps {:?}; playing randomly",
                state.heaps
            );
            decision(random_move(state, rng), DecisionRule::RandomFallback, Some(sum))
        }
    }
}

/// 随机选择一个非空堆，再在 `[1, min(堆大小, 单步上限)]` 中随机取数。
pub fn random_move<R: Rng + ?Sized>(state: &GameState, rng: &mut R) -> Option<Move> {
    let candidates: Vec<(usize, HeapSize)> = state.non_empty_heaps().collect();
    let &(heap_index, _) = candidates.choose(rng)?;
    let upper = state.effective_max_take(heap_index)?;
    let count = rng.gen_range(1..=upper);
    Some(Move::new(heap_index, count))
}

/// 普通规则下的 nim-sum 策略。
pub fn normal_move(heaps: &[HeapSize]) -> Option<(DecisionRule, Move)> {
    let sum = nim_sum(heaps);
    if sum == 0 {
        let max = *heaps.iter().max()?;
        if max == 0 {
            return None;
        }
        let index = heaps.iter().position(|&heap| heap == max)?;
        return Some((DecisionRule::NimSumZero, Move::new(index, 1)));
    }

    heaps.iter().enumerate().find_map(|(index, &heap)| {
        let target = heap ^ sum;
        (target < heap).then(|| (DecisionRule::NimSumReduce, Move::new(index, heap - target)))
    })
}
