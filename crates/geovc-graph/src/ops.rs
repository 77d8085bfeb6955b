use std::collections::{BinaryHeap, HashSet, VecDeque};

use tracing::trace;

use geovc_types::ObjectId;

use crate::error::GraphResult;
use crate::traits::GraphStore;

/// Is `ancestor` reachable from `descendant` through parent edges?
/// A commit is considered its own ancestor. Parents missing from the
/// graph terminate their line, matching the history walk.
pub fn is_ancestor(
    graph: &dyn GraphStore,
    ancestor: &ObjectId,
    descendant: &ObjectId,
) -> GraphResult<bool> {
    if ancestor == descendant {
        return Ok(true);
    }
    let mut visited = HashSet::new();
    let mut queue = VecDeque::from([*descendant]);
    while let Some(id) = queue.pop_front() {
        if !visited.insert(id) {
            continue;
        }
        for parent in graph.node(&id)?.parents {
            if parent == *ancestor {
                return Ok(true);
            }
            if graph.contains(&parent)? {
                queue.push_back(parent);
            }
        }
    }
    Ok(false)
}

/// Every commit reachable from `id`, inclusive. Parents missing from
/// the graph terminate their line.
fn ancestors_of(graph: &dyn GraphStore, id: &ObjectId) -> GraphResult<HashSet<ObjectId>> {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::from([*id]);
    while let Some(current) = queue.pop_front() {
        if !visited.insert(current) {
            continue;
        }
        for parent in graph.node(&current)?.parents {
            if graph.contains(&parent)? {
                queue.push_back(parent);
            }
        }
    }
    Ok(visited)
}

/// The nearest common ancestor of two commits, if any.
///
/// Walks up from `right`, stopping each line at the first commit that is
/// also an ancestor of `left`, then discards candidates dominated by
/// another candidate. When several equally-near bases remain (criss-cross
/// histories), the one with the earliest author timestamp wins, with the
/// ObjectId ordering as the final tie-break, so every replica resolves
/// the same base. Parents missing from the graph terminate their line,
/// so a partially replicated history yields the nearest known base.
pub fn merge_base(
    graph: &dyn GraphStore,
    left: &ObjectId,
    right: &ObjectId,
) -> GraphResult<Option<ObjectId>> {
    if left == right {
        return Ok(Some(*left));
    }
    let left_ancestors = ancestors_of(graph, left)?;

    let mut candidates = Vec::new();
    let mut visited = HashSet::new();
    let mut queue = VecDeque::from([*right]);
    while let Some(id) = queue.pop_front() {
        if !visited.insert(id) {
            continue;
        }
        if left_ancestors.contains(&id) {
            candidates.push(id);
            continue; // anything above is dominated by this candidate
        }
        for parent in graph.node(&id)?.parents {
            if graph.contains(&parent)? {
                queue.push_back(parent);
            }
        }
    }

    if candidates.len() > 1 {
        // Different lines from `right` can still reach candidates that
        // are ancestors of one another.
        let mut dominated = HashSet::new();
        for a in &candidates {
            for b in &candidates {
                if a != b && !dominated.contains(a) && is_ancestor(graph, b, a)? {
                    dominated.insert(*b);
                }
            }
        }
        candidates.retain(|c| !dominated.contains(c));
    }

    trace!(candidates = candidates.len(), "merge-base candidates");
    let mut best: Option<(i64, ObjectId)> = None;
    for id in candidates {
        let key = (graph.node(&id)?.timestamp_ms, id);
        if best.map_or(true, |b| key < b) {
            best = Some(key);
        }
    }
    Ok(best.map(|(_, id)| id))
}

/// Pagination window for a history walk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LogQuery {
    pub skip: usize,
    pub limit: Option<usize>,
}

/// Walks ancestry from a head, most recent author timestamp first.
///
/// Parents missing from the graph terminate their line silently, so a
/// partially replicated history still walks as far as it is known.
pub struct HistoryIter<'a> {
    graph: &'a dyn GraphStore,
    heap: BinaryHeap<(i64, ObjectId)>,
    visited: HashSet<ObjectId>,
    skip: usize,
    remaining: Option<usize>,
}

impl Iterator for HistoryIter<'_> {
    type Item = GraphResult<ObjectId>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == Some(0) {
            return None;
        }
        loop {
            let (_, id) = self.heap.pop()?;
            match self.graph.node(&id) {
                Ok(node) => {
                    for parent in node.parents {
                        if !self.visited.insert(parent) {
                            continue;
                        }
                        match self.graph.contains(&parent) {
                            Ok(true) => match self.graph.node(&parent) {
                                Ok(p) => self.heap.push((p.timestamp_ms, parent)),
                                Err(e) => return Some(Err(e)),
                            },
                            Ok(false) => {} // graph boundary
                            Err(e) => return Some(Err(e)),
                        }
                    }
                }
                Err(e) => return Some(Err(e)),
            }
            if self.skip > 0 {
                self.skip -= 1;
                continue;
            }
            if let Some(remaining) = self.remaining.as_mut() {
                *remaining -= 1;
            }
            return Some(Ok(id));
        }
    }
}

/// Walk history from `head` under a pagination window.
pub fn history<'a>(
    graph: &'a dyn GraphStore,
    head: &ObjectId,
    query: LogQuery,
) -> GraphResult<HistoryIter<'a>> {
    let node = graph.node(head)?;
    let mut heap = BinaryHeap::new();
    heap.push((node.timestamp_ms, *head));
    let mut visited = HashSet::new();
    visited.insert(*head);
    Ok(HistoryIter {
        graph,
        heap,
        visited,
        skip: query.skip,
        remaining: query.limit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryGraphStore;

    fn oid(b: u8) -> ObjectId {
        ObjectId::from_raw([b; 20])
    }

    /// c1(t=1) <- c2(t=2) <- c3(t=3)
    ///        \<- c4(t=4)
    fn branched() -> InMemoryGraphStore {
        let graph = InMemoryGraphStore::new();
        graph.register(oid(1), &[], 1).unwrap();
        graph.register(oid(2), &[oid(1)], 2).unwrap();
        graph.register(oid(3), &[oid(2)], 3).unwrap();
        graph.register(oid(4), &[oid(1)], 4).unwrap();
        graph
    }

    #[test]
    fn ancestry_is_reflexive_and_transitive() {
        let graph = branched();
        assert!(is_ancestor(&graph, &oid(3), &oid(3)).unwrap());
        assert!(is_ancestor(&graph, &oid(1), &oid(3)).unwrap());
        assert!(is_ancestor(&graph, &oid(2), &oid(3)).unwrap());
        assert!(!is_ancestor(&graph, &oid(3), &oid(1)).unwrap());
        assert!(!is_ancestor(&graph, &oid(4), &oid(3)).unwrap());
    }

    #[test]
    fn merge_base_of_diverged_branches() {
        let graph = branched();
        assert_eq!(merge_base(&graph, &oid(3), &oid(4)).unwrap(), Some(oid(1)));
        assert_eq!(merge_base(&graph, &oid(4), &oid(3)).unwrap(), Some(oid(1)));
    }

    #[test]
    fn merge_base_when_one_side_is_ancestor() {
        let graph = branched();
        assert_eq!(merge_base(&graph, &oid(1), &oid(3)).unwrap(), Some(oid(1)));
        assert_eq!(merge_base(&graph, &oid(3), &oid(2)).unwrap(), Some(oid(2)));
        assert_eq!(merge_base(&graph, &oid(3), &oid(3)).unwrap(), Some(oid(3)));
    }

    #[test]
    fn disjoint_histories_have_no_base() {
        let graph = InMemoryGraphStore::new();
        graph.register(oid(1), &[], 1).unwrap();
        graph.register(oid(2), &[], 2).unwrap();
        assert_eq!(merge_base(&graph, &oid(1), &oid(2)).unwrap(), None);
    }

    #[test]
    fn criss_cross_tie_break_is_deterministic() {
        // Two common ancestors, neither dominating the other:
        //   a(t=1)   b(t=2)
        //     | \   / |
        //     |  \ /  |
        //   left   right  (each merges both a and b)
        let graph = InMemoryGraphStore::new();
        graph.register(oid(1), &[], 1).unwrap();
        graph.register(oid(2), &[], 2).unwrap();
        graph.register(oid(10), &[oid(1), oid(2)], 10).unwrap();
        graph.register(oid(11), &[oid(1), oid(2)], 11).unwrap();

        // Earliest timestamp wins.
        assert_eq!(
            merge_base(&graph, &oid(10), &oid(11)).unwrap(),
            Some(oid(1))
        );
        assert_eq!(
            merge_base(&graph, &oid(11), &oid(10)).unwrap(),
            Some(oid(1))
        );

        // Equal timestamps fall back to the id ordering.
        let graph = InMemoryGraphStore::new();
        graph.register(oid(1), &[], 5).unwrap();
        graph.register(oid(2), &[], 5).unwrap();
        graph.register(oid(10), &[oid(1), oid(2)], 10).unwrap();
        graph.register(oid(11), &[oid(2), oid(1)], 11).unwrap();
        assert_eq!(
            merge_base(&graph, &oid(10), &oid(11)).unwrap(),
            Some(oid(1))
        );
    }

    #[test]
    fn dominated_candidates_are_discarded() {
        // base(t=1) <- mid(t=2); left merges mid, right merges base and
        // mid through separate parents. mid dominates base.
        let graph = InMemoryGraphStore::new();
        graph.register(oid(1), &[], 1).unwrap();
        graph.register(oid(2), &[oid(1)], 2).unwrap();
        graph.register(oid(10), &[oid(2)], 10).unwrap();
        graph.register(oid(11), &[oid(2), oid(1)], 11).unwrap();
        assert_eq!(
            merge_base(&graph, &oid(10), &oid(11)).unwrap(),
            Some(oid(2))
        );
    }

    #[test]
    fn ancestry_tolerates_a_graph_boundary() {
        // Parent oid(1) was never registered (shallow history).
        let graph = InMemoryGraphStore::new();
        graph.register(oid(2), &[oid(1)], 2).unwrap();
        graph.register(oid(3), &[oid(2)], 3).unwrap();
        graph.register(oid(4), &[oid(2)], 4).unwrap();

        // A direct-parent hit still counts even past the boundary.
        assert!(is_ancestor(&graph, &oid(1), &oid(3)).unwrap());
        assert!(!is_ancestor(&graph, &oid(9), &oid(3)).unwrap());
        assert_eq!(merge_base(&graph, &oid(3), &oid(4)).unwrap(), Some(oid(2)));
    }

    #[test]
    fn history_orders_by_timestamp_descending() {
        let graph = InMemoryGraphStore::new();
        graph.register(oid(1), &[], 1).unwrap();
        graph.register(oid(2), &[oid(1)], 2).unwrap();
        graph.register(oid(3), &[oid(1)], 5).unwrap();
        graph.register(oid(4), &[oid(2), oid(3)], 7).unwrap();

        let ids: Vec<ObjectId> = history(&graph, &oid(4), LogQuery::default())
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(ids, vec![oid(4), oid(3), oid(2), oid(1)]);
    }

    #[test]
    fn history_pagination() {
        let graph = InMemoryGraphStore::new();
        graph.register(oid(1), &[], 1).unwrap();
        graph.register(oid(2), &[oid(1)], 2).unwrap();
        graph.register(oid(3), &[oid(2)], 3).unwrap();
        graph.register(oid(4), &[oid(3)], 4).unwrap();

        let page: Vec<ObjectId> = history(
            &graph,
            &oid(4),
            LogQuery {
                skip: 1,
                limit: Some(2),
            },
        )
        .unwrap()
        .map(|r| r.unwrap())
        .collect();
        assert_eq!(page, vec![oid(3), oid(2)]);
    }

    #[test]
    fn history_stops_at_graph_boundary() {
        // Parent oid(1) was never registered (shallow history).
        let graph = InMemoryGraphStore::new();
        graph.register(oid(2), &[oid(1)], 2).unwrap();
        graph.register(oid(3), &[oid(2)], 3).unwrap();

        let ids: Vec<ObjectId> = history(&graph, &oid(3), LogQuery::default())
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(ids, vec![oid(3), oid(2)]);
    }
}
