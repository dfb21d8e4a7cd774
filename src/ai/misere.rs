//! 反常规则（misère）下的最优取子：按顺序匹配的规则表，第一条命中且能给出走法的规则生效。

use serde::{Deserialize, Serialize};

use crate::game::{nim_sum, HeapSize, Move};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum MisereCase {
    /// 只剩一个非空堆。
    SingleHeap,
    /// 所有堆都不超过 1，且大小为 1 的堆为奇数个。
    AllOnesOdd,
    /// 恰好一个堆大于 1。
    OneLargeHeap,
    /// 至少两个堆大于 1，按 nim-sum 取子。
    GeneralPosition,
    Fallback,
}

struct Position<'a> {
    heaps: &'a [HeapSize],
    non_empty: usize,
    ones: usize,
    large: usize,
}

impl<'a> Position<'a> {
    fn new(heaps: &'a [HeapSize]) -> Self {
        Self {
            heaps,
            non_empty: heaps.iter().filter(|&&heap| heap > 0).count(),
            ones: heaps.iter().filter(|&&heap| heap == 1).count(),
            large: heaps.iter().filter(|&&heap| heap > 1).count(),
        }
    }

    fn first_where(&self, predicate: impl Fn(HeapSize) -> bool) -> Option<usize> {
        self.heaps.iter().position(|&heap| predicate(heap))
    }

    fn largest(&self) -> Option<usize> {
        let max = *self.heaps.iter().max()?;
        if max == 0 {
            return None;
        }
        self.first_where(|heap| heap == max)
    }
}

struct MisereRule {
    case: MisereCase,
    applies: fn(&Position) -> bool,
    produce: fn(&Position) -> Option<Move>,
}

const RULES: [MisereRule; 5] = [
    MisereRule {
        case: MisereCase::SingleHeap,
        applies: |p| p.non_empty == 1,
        produce: single_heap,
    },
    MisereRule {
        case: MisereCase::AllOnesOdd,
        applies: |p| p.large == 0 && p.ones % 2 == 1,
        produce: |p| p.first_where(|heap| heap == 1).map(|index| Move::new(index, 1)),
    },
    MisereRule {
        case: MisereCase::OneLargeHeap,
        applies: |p| p.large == 1,
        produce: one_large_heap,
    },
    MisereRule {
        case: MisereCase::GeneralPosition,
        applies: |p| p.large >= 2,
        produce: general_position,
    },
    MisereRule {
        case: MisereCase::Fallback,
        applies: |_| true,
        produce: |p| p.largest().map(|index| Move::new(index, 1)),
    },
];

fn single_heap(p: &Position) -> Option<Move> {
    let index = p.first_where(|heap| heap > 0)?;
    let heap = p.heaps[index];
    let count = if heap > 1 { heap - 1 } else { 1 };
    Some(Move::new(index, count))
}

// 取完后留给对手奇数个大小为 1 的堆。
fn one_large_heap(p: &Position) -> Option<Move> {
    let index = p.first_where(|heap| heap > 1)?;
    let leave = if p.ones % 2 == 0 { 1 } else { 0 };
    let count = (p.heaps[index] - leave).max(1);
    Some(Move::new(index, count))
}

fn general_position(p: &Position) -> Option<Move> {
    let sum = nim_sum(p.heaps);
    if sum == 0 {
        let index = p.first_where(|heap| heap > 1)?;
        return Some(Move::new(index, p.heaps[index] - 1));
    }
    p.heaps.iter().enumerate().find_map(|(index, &heap)| {
        if heap <= 1 {
            return None;
        }
        let target = heap ^ sum;
        // 清空该堆会只剩一个非空堆时不取。
        (target < heap && (p.non_empty > 2 || target > 0))
            .then(|| Move::new(index, heap - target))
    })
}

/// 计算反常规则下的取子；只有棋盘全空时返回 `None`。
pub fn misere_move(heaps: &[HeapSize]) -> Option<(MisereCase, Move)> {
    let position = Position::new(heaps);
    RULES
        .iter()
        .filter(|rule| (rule.applies)(&position))
        .find_map(|rule| (rule.produce)(&position).map(|mv| (rule.case, mv)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decide(heaps: &[HeapSize]) -> (MisereCase, Move) {
        misere_move(heaps).expect("non-empty board should yield a move")
    }

    #[test]
    fn single_heap_of_one_is_forced() {
        assert_eq!(decide(&[1]), (MisereCase::SingleHeap, Move::new(0, 1)));
        assert_eq!(decide(&[0, 0, 1]), (MisereCase::SingleHeap, Move::new(2, 1)));
    }

    #[test]
    fn single_large_heap_leaves_one() {
        assert_eq!(decide(&[0, 7, 0]), (MisereCase::SingleHeap, Move::new(1, 6)));
    }

    #[test]
    fn odd_ones_take_a_whole_heap() {
        assert_eq!(decide(&[0, 1, 1, 1]), (MisereCase::AllOnesOdd, Move::new(1, 1)));
    }

    #[test]
    fn even_ones_fall_through_to_fallback() {
        assert_eq!(decide(&[1, 1]), (MisereCase::Fallback, Move::new(0, 1)));
        assert_eq!(decide(&[0, 1, 0, 1]), (MisereCase::Fallback, Move::new(1, 1)));
    }

    #[test]
    fn one_large_heap_sets_parity() {
        // 两个 1：留下 1，对手面对三个 1。
        assert_eq!(decide(&[1, 5, 1]), (MisereCase::OneLargeHeap, Move::new(1, 4)));
        // 一个 1：清空，对手面对一个 1。
        assert_eq!(decide(&[4, 1]), (MisereCase::OneLargeHeap, Move::new(0, 4)));
        assert_eq!(decide(&[0, 2, 1, 1, 1]), (MisereCase::OneLargeHeap, Move::new(1, 2)));
    }

    #[test]
    fn general_position_zeroes_nim_sum() {
        let heaps = [3, 4, 5];
        let (case, mv) = decide(&heaps);
        assert_eq!(case, MisereCase::GeneralPosition);
        assert_eq!(mv, Move::new(0, 2));
    }

    #[test]
    fn general_position_losing_delays() {
        assert_eq!(decide(&[1, 2, 3]), (MisereCase::GeneralPosition, Move::new(1, 1)));
        assert_eq!(decide(&[5, 5]), (MisereCase::GeneralPosition, Move::new(0, 4)));
    }

    #[test]
    fn general_position_picks_first_reducible_heap() {
        // nim-sum 为 1：唯一候选是把第一个堆从 3 取到 2；目标非零，允许。
        assert_eq!(decide(&[3, 2]), (MisereCase::GeneralPosition, Move::new(0, 1)));
        // [2, 3, 0]：nim-sum 1，候选 2->3 不成立，3->2 成立。
        assert_eq!(decide(&[2, 3, 0]), (MisereCase::GeneralPosition, Move::new(1, 1)));
    }

    #[test]
    fn two_large_heaps_are_equalized() {
        assert_eq!(decide(&[6, 2]), (MisereCase::GeneralPosition, Move::new(0, 4)));
        assert_eq!(decide(&[6, 2, 4]), (MisereCase::GeneralPosition, Move::new(0, 5)));
    }

    #[test]
    fn empty_board_has_no_move() {
        assert_eq!(misere_move(&[]), None);
        assert_eq!(misere_move(&[0, 0]), None);
    }
}
