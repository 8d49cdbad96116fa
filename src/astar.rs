use fxhash::FxBuildHasher;
/// This module implements a bounded variant of
/// [pathfinding's astar function](https://docs.rs/pathfinding/latest/pathfinding/directed/astar/index.html).
/// Every pop from the open set counts as one expansion and the search gives up with
/// [BudgetExceeded] once the caller-provided limit is spent.
use indexmap::map::Entry::{Occupied, Vacant};
use indexmap::IndexMap;
use num_traits::Zero;

type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

use log::{debug, warn};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use std::hash::Hash;

/// Returned when a search pops more nodes than its budget allows.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BudgetExceeded {
    pub limit: usize,
}

struct SmallestCostHolder<K> {
    estimated_cost: K,
    cost: K,
    index: usize,
}

impl<K: PartialEq> Eq for SmallestCostHolder<K> {}

impl<K: PartialEq> PartialEq for SmallestCostHolder<K> {
    fn eq(&self, other: &Self) -> bool {
        self.estimated_cost.eq(&other.estimated_cost) && self.cost.eq(&other.cost)
    }
}

impl<K: Ord> PartialOrd for SmallestCostHolder<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord> Ord for SmallestCostHolder<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Smallest estimated cost first; among equals, the node furthest from the start
        match other.estimated_cost.cmp(&self.estimated_cost) {
            Ordering::Equal => self.cost.cmp(&other.cost),
            s => s,
        }
    }
}

fn reverse_path<N, V, F>(parents: &FxIndexMap<N, V>, mut parent: F, start: usize) -> Vec<N>
where
    N: Eq + Hash + Clone,
    F: FnMut(&V) -> usize,
{
    let mut cursor = start;
    let mut path: Vec<N> = std::iter::from_fn(|| {
        parents.get_index(cursor).map(|(node, value)| {
            cursor = parent(value);
            node.clone()
        })
    })
    .collect();
    path.reverse();
    path
}

/// Finds a cheapest path from `start` to the first node accepted by `success`.
///
/// Successors are only relaxed when a strictly cheaper cost is found, so on equal costs the
/// first discovered predecessor is kept. Returns `Ok(None)` once the open set is exhausted.
pub fn astar<N, C, FN, IN, FH, FS>(
    start: &N,
    mut successors: FN,
    mut heuristic: FH,
    mut success: FS,
    max_expansions: usize,
) -> Result<Option<(Vec<N>, C)>, BudgetExceeded>
where
    N: Eq + Hash + Clone,
    C: Zero + Ord + Copy,
    FN: FnMut(&N) -> IN,
    IN: IntoIterator<Item = (N, C)>,
    FH: FnMut(&N) -> C,
    FS: FnMut(&N) -> bool,
{
    let mut to_see = BinaryHeap::new();
    to_see.push(SmallestCostHolder {
        estimated_cost: Zero::zero(),
        cost: Zero::zero(),
        index: 0,
    });
    let mut parents: FxIndexMap<N, (usize, C)> = FxIndexMap::default();
    parents.insert(start.clone(), (usize::MAX, Zero::zero()));
    let mut expansions = 0usize;
    while let Some(SmallestCostHolder { cost, index, .. }) = to_see.pop() {
        let successors = {
            let Some((node, &(_, c))) = parents.get_index(index) else {
                continue;
            };
            if success(node) {
                let path = reverse_path(&parents, |&(p, _)| p, index);
                debug!("Goal reached after {} expansions", expansions);
                return Ok(Some((path, cost)));
            }
            // We may have inserted a node several time into the binary heap if we found
            // a better way to access it. Ensure that we are currently dealing with the
            // best path and discard the others.
            if cost > c {
                continue;
            }
            expansions += 1;
            if expansions > max_expansions {
                warn!("Search gave up after {} expansions", max_expansions);
                return Err(BudgetExceeded {
                    limit: max_expansions,
                });
            }
            successors(node)
        };
        for (successor, move_cost) in successors {
            let new_cost = cost + move_cost;
            let h; // heuristic(&successor)
            let n; // index for successor
            match parents.entry(successor) {
                Vacant(e) => {
                    h = heuristic(e.key());
                    n = e.index();
                    e.insert((index, new_cost));
                }
                Occupied(mut e) => {
                    if e.get().1 > new_cost {
                        h = heuristic(e.key());
                        n = e.index();
                        e.insert((index, new_cost));
                    } else {
                        continue;
                    }
                }
            }

            to_see.push(SmallestCostHolder {
                estimated_cost: new_cost + h,
                cost: new_cost,
                index: n,
            });
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Line graph 0 - 1 - 2 - ... - 9 with unit edges.
    fn line_successors(n: &i32) -> Vec<(i32, i32)> {
        [n - 1, n + 1]
            .into_iter()
            .filter(|m| (0..10).contains(m))
            .map(|m| (m, 1))
            .collect()
    }

    #[test]
    fn finds_path_on_line() {
        let (path, cost) = astar(&0, line_successors, |n| 9 - n, |n| *n == 9, 100)
            .unwrap()
            .unwrap();
        assert_eq!(path, (0..10).collect::<Vec<_>>());
        assert_eq!(cost, 9);
    }

    #[test]
    fn start_is_goal() {
        let (path, cost) = astar(&3, line_successors, |_| 0, |n| *n == 3, 0)
            .unwrap()
            .unwrap();
        assert_eq!(path, vec![3]);
        assert_eq!(cost, 0);
    }

    #[test]
    fn exhausted_open_set_is_none() {
        let result = astar(&0, line_successors, |_| 0, |n| *n == 42, 100).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn budget_is_enforced() {
        let result = astar(&0, line_successors, |_| 0, |n| *n == 9, 3);
        assert_eq!(result, Err(BudgetExceeded { limit: 3 }));
    }
}
