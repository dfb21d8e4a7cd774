use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 单个堆中的对象数量。
pub type HeapSize = u32;

/// 所有堆大小的按位异或（nim-sum）。
pub fn nim_sum(heaps: &[HeapSize]) -> HeapSize {
    heaps.iter().fold(0, |acc, heap| acc ^ heap)
}

/// 行动方标识。人机对战使用 `Human`/`Ai`，双人对战使用 `Player1`/`Player2`。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Actor {
    Human,
    Ai,
    Player1,
    Player2,
}

impl Actor {
    pub fn opponent(self) -> Actor {
        match self {
            Actor::Human => Actor::Ai,
            Actor::Ai => Actor::Human,
            Actor::Player1 => Actor::Player2,
            Actor::Player2 => Actor::Player1,
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Actor::Human => "Human",
            Actor::Ai => "AI",
            Actor::Player1 => "Player 1",
            Actor::Player2 => "Player 2",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum GameMode {
    #[default]
    #[serde(alias = "human-vs-ai")]
    PlayerVsAi,
    #[serde(alias = "human-vs-human")]
    PlayerVsPlayer,
}

impl GameMode {
    /// 返回 (先手候选, 后手候选)。
    pub fn actors(self) -> (Actor, Actor) {
        match self {
            GameMode::PlayerVsAi => (Actor::Human, Actor::Ai),
            GameMode::PlayerVsPlayer => (Actor::Player1, Actor::Player2),
        }
    }
}

impl FromStr for GameMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "player-vs-ai" | "human-vs-ai" | "pve" | "ai" => Ok(GameMode::PlayerVsAi),
            "player-vs-player" | "human-vs-human" | "pvp" | "local" => {
                Ok(GameMode::PlayerVsPlayer)
            }
            _ => Err(()),
        }
    }
}

/// 一次取子：从 `heap_index` 号堆中取走 `count` 个对象。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Move {
    pub heap_index: usize,
    pub count: HeapSize,
}

impl Move {
    pub fn new(heap_index: usize, count: HeapSize) -> Self {
        Self { heap_index, count }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "remove {} from heap {}", self.count, self.heap_index)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum VictoryReason {
    /// 普通规则：取走最后一个对象的一方获胜。
    TookLastObject { mover: Actor },
    /// 反常规则（misère）：取走最后一个对象的一方落败。
    OpponentTookLastObject { mover: Actor },
}

/// 游戏事件流。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum GameEvent {
    ObjectsRemoved {
        actor: Actor,
        heap_index: usize,
        count: HeapSize,
        remaining: HeapSize,
    },
    TurnPassed {
        next: Actor,
    },
    GameWon {
        winner: Actor,
        reason: VictoryReason,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum IntegrityError {
    WinnerBeforeGameOver { winner: Actor },
    GameOverWithObjectsLeft { remaining: u64 },
    BoardEmptyButNotOver,
    ZeroMaxTake,
}

impl fmt::Display for IntegrityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityError::WinnerBeforeGameOver { winner } => {
                write!(f, "{winner} is recorded as winner but the game is still running")
            }
            IntegrityError::GameOverWithObjectsLeft { remaining } => {
                write!(f, "game is over but {remaining} objects remain")
            }
            IntegrityError::BoardEmptyButNotOver => {
                f.write_str("all heaps are empty but the game is not over")
            }
            IntegrityError::ZeroMaxTake => f.write_str("max take must be positive"),
        }
    }
}

impl std::error::Error for IntegrityError {}

/// 游戏整体状态。每次取子都会产生一个新值，旧值由调用方丢弃。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub heaps: Vec<HeapSize>,
    pub current_actor: Actor,
    #[serde(default)]
    pub game_over: bool,
    #[serde(default)]
    pub winner: Option<Actor>,
    #[serde(default)]
    pub max_take: Option<HeapSize>,
    #[serde(default)]
    pub misere: bool,
}

impl GameState {
    /// `max_take` 为 `Some(0)` 时视为不限。堆全部为空时直接进入终局且没有胜者。
    pub fn new(
        heaps: Vec<HeapSize>,
        current_actor: Actor,
        misere: bool,
        max_take: Option<HeapSize>,
    ) -> Self {
        let game_over = heaps.iter().all(|&heap| heap == 0);
        Self {
            heaps,
            current_actor,
            game_over,
            winner: None,
            max_take: max_take.filter(|&limit| limit > 0),
            misere,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.game_over
    }

    pub fn is_terminal(&self) -> bool {
        self.heaps.iter().all(|&heap| heap == 0)
    }

    pub fn nim_sum(&self) -> HeapSize {
        nim_sum(&self.heaps)
    }

    pub fn total_objects(&self) -> u64 {
        self.heaps.iter().map(|&heap| u64::from(heap)).sum()
    }

    pub fn heap(&self, index: usize) -> Option<HeapSize> {
        self.heaps.get(index).copied()
    }

    pub fn non_empty_heaps(&self) -> impl Iterator<Item = (usize, HeapSize)> + '_ {
        self.heaps
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, heap)| heap > 0)
    }

    /// 有效的单步上限；`Some(0)` 与 `None` 一样表示不限。
    pub fn take_limit(&self) -> Option<HeapSize> {
        self.max_take.filter(|&limit| limit > 0)
    }

    /// 该堆当前单步最多可取的数量。
    pub fn effective_max_take(&self, index: usize) -> Option<HeapSize> {
        let heap = self.heap(index)?;
        Some(match self.take_limit() {
            Some(limit) => heap.min(limit),
            None => heap,
        })
    }

    /// 按单步上限截断后的堆，供最优策略计算 nim-sum。
    pub fn restricted_heaps(&self) -> Vec<HeapSize> {
        match self.take_limit() {
            Some(limit) => self.heaps.iter().map(|&heap| heap.min(limit)).collect(),
            None => self.heaps.clone(),
        }
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        if self.game_over {
            return Vec::new();
        }
        (0..self.heaps.len())
            .flat_map(|index| {
                let upper = self.effective_max_take(index).unwrap_or(0);
                (1..=upper).map(move |count| Move::new(index, count))
            })
            .collect()
    }

    pub fn integrity_check(&self) -> Result<(), IntegrityError> {
        if self.max_take == Some(0) {
            return Err(IntegrityError::ZeroMaxTake);
        }
        if let Some(winner) = self.winner {
            if !self.game_over {
                return Err(IntegrityError::WinnerBeforeGameOver { winner });
            }
        }
        let remaining = self.total_objects();
        if self.game_over && remaining > 0 {
            return Err(IntegrityError::GameOverWithObjectsLeft { remaining });
        }
        if !self.game_over && remaining == 0 {
            return Err(IntegrityError::BoardEmptyButNotOver);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nim_sum_of_three_four_five() {
        assert_eq!(nim_sum(&[3, 4, 5]), 2);
        assert_eq!(nim_sum(&[1, 1, 1]), 1);
        assert_eq!(nim_sum(&[2, 2]), 0);
        assert_eq!(nim_sum(&[]), 0);
    }

    #[test]
    fn opponents_pair_up_by_mode() {
        let (human, ai) = GameMode::PlayerVsAi.actors();
        assert_eq!(human.opponent(), ai);
        assert_eq!(ai.opponent(), human);
        let (first, second) = GameMode::PlayerVsPlayer.actors();
        assert_eq!(first.opponent(), second);
        assert_eq!(second.opponent().opponent(), second);
    }

    #[test]
    fn new_state_normalizes_zero_max_take() {
        let state = GameState::new(vec![3, 4], Actor::Human, false, Some(0));
        assert_eq!(state.max_take, None);
        assert!(!state.game_over);
        assert!(state.integrity_check().is_ok());
    }

    #[test]
    fn degenerate_board_starts_finished_without_winner() {
        let empty = GameState::new(Vec::new(), Actor::Human, false, None);
        assert!(empty.game_over);
        assert_eq!(empty.winner, None);
        assert!(empty.integrity_check().is_ok());

        let zeros = GameState::new(vec![0, 0], Actor::Player1, true, None);
        assert!(zeros.game_over);
        assert!(zeros.legal_moves().is_empty());
    }

    #[test]
    fn legal_moves_respect_take_limit() {
        let state = GameState::new(vec![2, 5], Actor::Human, false, Some(3));
        let moves = state.legal_moves();
        assert_eq!(moves.len(), 2 + 3);
        assert!(moves.iter().all(|mv| mv.count >= 1 && mv.count <= 3));
        assert_eq!(state.effective_max_take(0), Some(2));
        assert_eq!(state.effective_max_take(1), Some(3));
        assert_eq!(state.effective_max_take(2), None);
        assert_eq!(state.restricted_heaps(), vec![2, 3]);
    }

    #[test]
    fn deserialized_zero_limit_reads_as_unlimited() {
        let json = r#"{"heaps":[4],"currentActor":"ai","maxTake":0}"#;
        let state: GameState = serde_json::from_str(json).expect("state should parse");
        assert_eq!(state.take_limit(), None);
        assert_eq!(state.effective_max_take(0), Some(4));
        assert_eq!(state.integrity_check(), Err(IntegrityError::ZeroMaxTake));
    }

    #[test]
    fn integrity_rejects_inconsistent_terminal_flags() {
        let mut state = GameState::new(vec![1, 2], Actor::Human, false, None);
        state.winner = Some(Actor::Human);
        assert_eq!(
            state.integrity_check(),
            Err(IntegrityError::WinnerBeforeGameOver {
                winner: Actor::Human
            })
        );

        state.game_over = true;
        assert_eq!(
            state.integrity_check(),
            Err(IntegrityError::GameOverWithObjectsLeft { remaining: 3 })
        );

        let mut drained = GameState::new(vec![1], Actor::Human, false, None);
        drained.heaps[0] = 0;
        assert_eq!(
            drained.integrity_check(),
            Err(IntegrityError::BoardEmptyButNotOver)
        );
    }

    #[test]
    fn state_serializes_with_camel_case_fields() {
        let state = GameState::new(vec![3, 4, 5], Actor::Human, true, Some(3));
        let json = serde_json::to_value(&state).expect("state should serialize");
        assert_eq!(json["currentActor"], "human");
        assert_eq!(json["maxTake"], 3);
        assert_eq!(json["gameOver"], false);
        assert!(json["winner"].is_null());
    }
}
