//! Pure position calculator.
//!
//! An entry's rank key is its signup time pushed earlier by the points it
//! has earned; the externally visible position is the 1-based rank of that
//! key among the whole population, ascending. Ties break on `created_at`
//! then `id`, so the ordering is total and no two entries can share a
//! position after a full renumber pass.

use std::cmp::Ordering;

/// Weight of one point in milliseconds of signup time. A single 100-point
/// referral outweighs normal millisecond-scale signup separation.
pub const POINTS_WEIGHT: i64 = 1000;

/// The fields ranking depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankInput {
    pub id: i64,
    pub created_at: u64,
    pub points_earned: u32,
}

/// Sortable rank key: earlier signup and more points both rank better.
#[inline]
pub fn rank_key(created_at_ms: u64, points_earned: u32) -> i64 {
    created_at_ms as i64 - points_earned as i64 * POINTS_WEIGHT
}

/// Total order over entries: rank key, then creation time, then id.
pub fn cmp(a: &RankInput, b: &RankInput) -> Ordering {
    rank_key(a.created_at, a.points_earned)
        .cmp(&rank_key(b.created_at, b.points_earned))
        .then(a.created_at.cmp(&b.created_at))
        .then(a.id.cmp(&b.id))
}

/// 1-based rank of `target` within `population`. `population` may or may
/// not contain `target` itself; only strictly-better entries count.
pub fn rank_of(target: &RankInput, population: &[RankInput]) -> i64 {
    let ahead = population
        .iter()
        .filter(|e| e.id != target.id && cmp(e, target) == Ordering::Less)
        .count();
    ahead as i64 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, created_at: u64, points: u32) -> RankInput {
        RankInput {
            id,
            created_at,
            points_earned: points,
        }
    }

    #[test]
    fn earlier_signup_ranks_first() {
        let a = entry(1, 1_000, 0);
        let b = entry(2, 2_000, 0);
        assert_eq!(rank_of(&a, &[a, b]), 1);
        assert_eq!(rank_of(&b, &[a, b]), 2);
    }

    #[test]
    fn points_outweigh_signup_time() {
        // b signed up 60s later but one referral pulls it ahead.
        let a = entry(1, 1_000, 0);
        let b = entry(2, 61_000, 100);
        assert!(rank_key(b.created_at, b.points_earned) < rank_key(a.created_at, a.points_earned));
        assert_eq!(rank_of(&b, &[a, b]), 1);
        assert_eq!(rank_of(&a, &[a, b]), 2);
    }

    #[test]
    fn equal_keys_break_on_created_at_then_id() {
        // Same rank key via offsetting points.
        let a = entry(1, 1_000, 0);
        let b = entry(2, 2_000, 1); // key = 2000 - 1000 = 1000
        assert_eq!(rank_of(&a, &[a, b]), 1);
        assert_eq!(rank_of(&b, &[a, b]), 2);

        let c = entry(3, 1_000, 0);
        assert_eq!(rank_of(&a, &[a, c]), 1);
        assert_eq!(rank_of(&c, &[a, c]), 2);
    }

    #[test]
    fn ranks_are_a_permutation() {
        let pop: Vec<_> = (0..20)
            .map(|i| entry(i, 10_000 + (i as u64 % 7) * 3, (i as u32 * 31) % 5))
            .collect();
        let mut ranks: Vec<_> = pop.iter().map(|e| rank_of(e, &pop)).collect();
        ranks.sort_unstable();
        assert_eq!(ranks, (1..=20).collect::<Vec<i64>>());
    }
}
