// Single round-robin planning by the circle method.
//
// The first entrant stays fixed while the rest rotate one place per week.
// An odd field gets a bye sentinel, so every week has exactly one entrant
// sitting out. Output depends only on the input order.

/// Pairings for one week of the round-robin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedWeek<T> {
    /// 1-based week number.
    pub week_number: u32,
    /// Fixtures in match order.
    pub pairings: Vec<(T, T)>,
    /// Entrant without an opponent this week (odd fields only).
    pub bye: Option<T>,
}

/// Plan a full single round-robin over `entrants`.
///
/// Produces `M - 1` weeks where `M` is the entrant count rounded up to even.
/// Every unordered pair meets exactly once. Fewer than two entrants yields no
/// fixtures.
pub fn plan<T: Clone>(entrants: &[T]) -> Vec<PlannedWeek<T>> {
    if entrants.is_empty() {
        return Vec::new();
    }

    let mut slots: Vec<Option<T>> = entrants.iter().cloned().map(Some).collect();
    if slots.len() % 2 == 1 {
        slots.push(None);
    }
    let m = slots.len();

    let mut weeks = Vec::with_capacity(m - 1);
    for week in 1..m {
        let mut pairings = Vec::with_capacity(m / 2);
        let mut bye = None;

        for i in 0..m / 2 {
            match (&slots[i], &slots[m - 1 - i]) {
                (Some(a), Some(b)) => pairings.push((a.clone(), b.clone())),
                (Some(a), None) | (None, Some(a)) => bye = Some(a.clone()),
                (None, None) => {}
            }
        }

        weeks.push(PlannedWeek {
            week_number: week as u32,
            pairings,
            bye,
        });

        slots[1..].rotate_right(1);
    }

    weeks
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    fn unordered(a: u32, b: u32) -> (u32, u32) {
        (a.min(b), a.max(b))
    }

    fn assert_valid_round_robin(n: u32) {
        let entrants: Vec<u32> = (1..=n).collect();
        let weeks = plan(&entrants);
        let m = n + n % 2;

        assert_eq!(weeks.len() as u32, m - 1, "N = {n}");

        let mut pairs = HashSet::new();
        for week in &weeks {
            let mut playing = HashSet::new();
            for &(a, b) in &week.pairings {
                assert_ne!(a, b);
                assert!(playing.insert(a), "{a} twice in week {}", week.week_number);
                assert!(playing.insert(b), "{b} twice in week {}", week.week_number);
                assert!(pairs.insert(unordered(a, b)), "repeat pairing {a} v {b}");
            }
            if let Some(bye) = week.bye {
                assert!(!playing.contains(&bye));
            }
        }
        assert_eq!(pairs.len() as u32, n * (n - 1) / 2, "N = {n}");
    }

    #[test]
    fn six_entrants_five_weeks_fifteen_matches() {
        let weeks = plan(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(weeks.len(), 5);
        assert_eq!(weeks.iter().map(|w| w.pairings.len()).sum::<usize>(), 15);
        assert!(weeks.iter().all(|w| w.bye.is_none()));
        assert_valid_round_robin(6);
    }

    #[test]
    fn five_entrants_one_bye_per_week_and_per_entrant() {
        let weeks = plan(&[1, 2, 3, 4, 5]);
        assert_eq!(weeks.len(), 5);

        let mut byes: HashMap<u32, u32> = HashMap::new();
        for week in &weeks {
            assert_eq!(week.pairings.len(), 2);
            let bye = week.bye.expect("odd field must have a bye every week");
            *byes.entry(bye).or_default() += 1;
        }
        assert_eq!(byes.len(), 5);
        assert!(byes.values().all(|&count| count == 1));
    }

    #[test]
    fn various_field_sizes_are_complete() {
        for n in [2, 3, 4, 7, 8, 9, 12] {
            assert_valid_round_robin(n);
        }
    }

    #[test]
    fn four_entrant_rotation() {
        let weeks = plan(&['a', 'b', 'c', 'd']);
        let pairings: Vec<Vec<(char, char)>> = weeks.into_iter().map(|w| w.pairings).collect();
        assert_eq!(
            pairings,
            vec![
                vec![('a', 'd'), ('b', 'c')],
                vec![('a', 'c'), ('d', 'b')],
                vec![('a', 'b'), ('c', 'd')],
            ]
        );
    }

    #[test]
    fn deterministic_for_same_order() {
        let entrants = [11, 42, 7, 19, 3, 8, 27];
        assert_eq!(plan(&entrants), plan(&entrants));
    }

    #[test]
    fn degenerate_fields() {
        assert!(plan::<u32>(&[]).is_empty());

        let solo = plan(&[1]);
        assert_eq!(solo.len(), 1);
        assert!(solo[0].pairings.is_empty());
        assert_eq!(solo[0].bye, Some(1));

        let pair = plan(&[1, 2]);
        assert_eq!(pair.len(), 1);
        assert_eq!(pair[0].pairings, vec![(1, 2)]);
    }
}
