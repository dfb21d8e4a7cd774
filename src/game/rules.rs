use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::state::{Actor, GameEvent, GameMode, GameState, HeapSize, Move, VictoryReason};

const DEFAULT_BASE_HEAP_SIZE: HeapSize = 3;
const DEFAULT_MAX_TAKE: HeapSize = 3;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum RuleError {
    GameFinished,
    HeapOutOfRange {
        heap_index: usize,
        heap_count: usize,
    },
    ZeroCount,
    ExceedsHeap {
        heap_index: usize,
        requested: HeapSize,
        available: HeapSize,
    },
    ExceedsMaxTake {
        requested: HeapSize,
        max_take: HeapSize,
    },
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleError::GameFinished => f.write_str("The game is already over"),
            RuleError::HeapOutOfRange { heap_count: 0, .. } => f.write_str("There are no heaps"),
            RuleError::HeapOutOfRange { heap_count, .. } => {
                write!(f, "Heap index must be between 0 and {}", heap_count - 1)
            }
            RuleError::ZeroCount => f.write_str("Must remove at least one object"),
            RuleError::ExceedsHeap {
                heap_index,
                available,
                ..
            } => write!(f, "Heap {heap_index} only has {available} objects"),
            RuleError::ExceedsMaxTake { max_take, .. } => {
                write!(f, "Cannot remove more than {max_take} objects")
            }
        }
    }
}

impl std::error::Error for RuleError {}

/// 一次取子的结算结果：新状态、事件以及（若终局）胜者。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveResolution {
    pub state: GameState,
    pub events: Vec<GameEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<Actor>,
}

impl MoveResolution {
    pub fn new(state: GameState, events: Vec<GameEvent>) -> Self {
        let winner = state.winner;
        Self {
            state,
            events,
            winner,
        }
    }
}

/// 先手策略。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FirstMove {
    /// 固定由模式中的第一方（人类 / 玩家一）先手。
    #[default]
    #[serde(rename = "player", alias = "human", alias = "first")]
    First,
    /// 固定由第二方（AI / 玩家二）先手。
    #[serde(rename = "ai", alias = "opponent", alias = "second")]
    Second,
    Random,
}

impl FirstMove {
    pub fn pick<R: Rng + ?Sized>(self, mode: GameMode, rng: &mut R) -> Actor {
        let (first, second) = mode.actors();
        match self {
            FirstMove::First => first,
            FirstMove::Second => second,
            FirstMove::Random => {
                if rng.gen_bool(0.5) {
                    first
                } else {
                    second
                }
            }
        }
    }
}

impl FromStr for FirstMove {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "player" | "human" | "first" => Ok(FirstMove::First),
            "ai" | "opponent" | "second" => Ok(FirstMove::Second),
            "random" => Ok(FirstMove::Random),
            _ => Err(()),
        }
    }
}

/// 开局配置，由宿主以 JSON 传入。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct GameConfig {
    pub heap_sizes: Vec<HeapSize>,
    pub misere: bool,
    pub max_take: Option<HeapSize>,
    pub first_move: FirstMove,
    pub mode: GameMode,
}

impl GameConfig {
    /// 三个堆，大小依次为 `base`, `base + 1`, `base + 2`。
    pub fn from_base_heap_size(base: HeapSize) -> Self {
        Self {
            heap_sizes: vec![base, base.saturating_add(1), base.saturating_add(2)],
            misere: false,
            max_take: Some(DEFAULT_MAX_TAKE),
            first_move: FirstMove::default(),
            mode: GameMode::default(),
        }
    }

    pub fn with_heaps(mut self, heap_sizes: Vec<HeapSize>) -> Self {
        self.heap_sizes = heap_sizes;
        self
    }

    pub fn with_misere(mut self, misere: bool) -> Self {
        self.misere = misere;
        self
    }

    pub fn with_max_take(mut self, max_take: Option<HeapSize>) -> Self {
        self.max_take = max_take;
        self
    }

    pub fn with_first_move(mut self, first_move: FirstMove) -> Self {
        self.first_move = first_move;
        self
    }

    pub fn with_mode(mut self, mode: GameMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn build(&self) -> GameState {
        self.build_with_rng(&mut SmallRng::from_entropy())
    }

    pub fn build_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> GameState {
        new_game_with_rng(
            self.mode,
            self.heap_sizes.clone(),
            self.misere,
            self.max_take,
            self.first_move,
            rng,
        )
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_base_heap_size(DEFAULT_BASE_HEAP_SIZE)
    }
}

/// 人机对战开局。
pub fn new_game(
    heap_sizes: Vec<HeapSize>,
    misere: bool,
    max_take: Option<HeapSize>,
    first_move: FirstMove,
) -> GameState {
    new_game_with_mode(GameMode::PlayerVsAi, heap_sizes, misere, max_take, first_move)
}

pub fn new_game_with_mode(
    mode: GameMode,
    heap_sizes: Vec<HeapSize>,
    misere: bool,
    max_take: Option<HeapSize>,
    first_move: FirstMove,
) -> GameState {
    let mut rng = SmallRng::from_entropy();
    new_game_with_rng(mode, heap_sizes, misere, max_take, first_move, &mut rng)
}

pub fn new_game_with_rng<R: Rng + ?Sized>(
    mode: GameMode,
    heap_sizes: Vec<HeapSize>,
    misere: bool,
    max_take: Option<HeapSize>,
    first_move: FirstMove,
    rng: &mut R,
) -> GameState {
    let first = first_move.pick(mode, rng);
    let state = GameState::new(heap_sizes, first, misere, max_take);
    if state.game_over {
        log::warn!("new game has no objects to take; starting finished without a winner");
    } else {
        log::debug!(
            "new game: heaps={:?} misere={} max_take={:?} first={}",
            state.heaps,
            state.misere,
            state.max_take,
            state.current_actor
        );
    }
    state
}

/// 检查取子是否合法，返回第一个不满足的条件。
pub fn check_move(state: &GameState, mv: Move) -> Result<(), RuleError> {
    if state.game_over {
        return Err(RuleError::GameFinished);
    }
    let available = state.heap(mv.heap_index).ok_or(RuleError::HeapOutOfRange {
        heap_index: mv.heap_index,
        heap_count: state.heaps.len(),
    })?;
    if mv.count == 0 {
        return Err(RuleError::ZeroCount);
    }
    if mv.count > available {
        return Err(RuleError::ExceedsHeap {
            heap_index: mv.heap_index,
            requested: mv.count,
            available,
        });
    }
    if let Some(max_take) = state.take_limit() {
        if mv.count > max_take {
            return Err(RuleError::ExceedsMaxTake {
                requested: mv.count,
                max_take,
            });
        }
    }
    Ok(())
}

pub fn validate(state: &GameState, mv: Move) -> bool {
    check_move(state, mv).is_ok()
}

/// 终局时的胜负归属。普通规则下取走最后一个对象者胜，反常规则下其对手胜。
fn terminal_outcome(mover: Actor, misere: bool) -> (Actor, VictoryReason) {
    if misere {
        (
            mover.opponent(),
            VictoryReason::OpponentTookLastObject { mover },
        )
    } else {
        (mover, VictoryReason::TookLastObject { mover })
    }
}

pub fn try_apply_move(state: &GameState, mv: Move) -> Result<MoveResolution, RuleError> {
    check_move(state, mv)?;

    let mover = state.current_actor;
    let mut next = state.clone();
    next.heaps[mv.heap_index] -= mv.count;

    let mut events = vec![GameEvent::ObjectsRemoved {
        actor: mover,
        heap_index: mv.heap_index,
        count: mv.count,
        remaining: next.heaps[mv.heap_index],
    }];

    if next.is_terminal() {
        let (winner, reason) = terminal_outcome(mover, next.misere);
        next.game_over = true;
        next.winner = Some(winner);
        log::debug!("{mover} took the last object; {winner} wins");
        events.push(GameEvent::GameWon { winner, reason });
    } else {
        next.current_actor = mover.opponent();
        log::trace!("{mover}: {mv}, heaps now {:?}", next.heaps);
        events.push(GameEvent::TurnPassed {
            next: next.current_actor,
        });
    }

    Ok(MoveResolution::new(next, events))
}

/// 非法取子时原样返回状态，不报告错误。
pub fn apply_move(state: &GameState, mv: Move) -> GameState {
    match try_apply_move(state, mv) {
        Ok(resolution) => resolution.state,
        Err(error) => {
            log::debug!("ignoring invalid move ({mv}): {error}");
            state.clone()
        }
    }
}
