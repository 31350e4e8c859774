//! Sort ranges: where in the canonical node order a matcher's nodes can lie.
//!
//! Every matcher covers an interval of the canonical order (`compare_expr`):
//! the whole order, one kind rank, the nodes of one rank sharing a head, or a
//! single node. Two ranges are ordered (`precedes`) when every node of the
//! first sorts strictly before every node of the second. This is the partial
//! order the commutative matcher decomposes into chains.

use std::cmp::Ordering;
use sym_ast::{compare_expr, NodeKind, Node, Symbol};

/// Interval of the canonical node order a matcher can match inside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortRange {
    /// Any node.
    Unbounded,
    /// Any node of one kind rank.
    Kind(NodeKind),
    /// Branches of one kind rank with a given head.
    Head(NodeKind, Symbol),
    /// Exactly one node.
    Point(Node),
}

impl SortRange {
    fn kind(&self) -> Option<NodeKind> {
        match self {
            SortRange::Unbounded => None,
            SortRange::Kind(k) | SortRange::Head(k, _) => Some(*k),
            SortRange::Point(n) => Some(n.kind()),
        }
    }

    /// 3 for a point, 2 for a head, 1 for a kind, 0 when unbounded.
    pub fn specificity(&self) -> u32 {
        match self {
            SortRange::Unbounded => 0,
            SortRange::Kind(_) => 1,
            SortRange::Head(..) => 2,
            SortRange::Point(_) => 3,
        }
    }

    /// Every node in `self` sorts strictly before every node in `other`.
    pub fn precedes(&self, other: &SortRange) -> bool {
        let (Some(ka), Some(kb)) = (self.kind(), other.kind()) else {
            return false;
        };
        match ka.rank().cmp(&kb.rank()) {
            Ordering::Less => return true,
            Ordering::Greater => return false,
            Ordering::Equal => {}
        }
        // Same rank: order is by head/name first, then children.
        match (self, other) {
            (SortRange::Head(_, h1), SortRange::Head(_, h2)) => h1 < h2,
            (SortRange::Head(_, h), SortRange::Point(n)) => n.head().is_some_and(|nh| h < nh),
            (SortRange::Point(n), SortRange::Head(_, h)) => n.head().is_some_and(|nh| nh < h),
            (SortRange::Point(a), SortRange::Point(b)) => compare_expr(a, b) == Ordering::Less,
            _ => false,
        }
    }

    /// Either range precedes the other, or both are the same single node.
    pub fn comparable(&self, other: &SortRange) -> bool {
        self.precedes(other)
            || other.precedes(self)
            || matches!((self, other), (SortRange::Point(a), SortRange::Point(b)) if a == b)
    }
}

/// Minimum chain cover of `ranges` (Dilworth), via maximum bipartite matching.
///
/// Each returned chain lists indices in ascending range order. Equal points
/// are chained in index order. Chains come out most specific first: by sum of
/// specificities, then by length, then by first index.
pub fn chain_decomposition(ranges: &[SortRange]) -> Vec<Vec<usize>> {
    let n = ranges.len();
    // below[i][j]: i must come before j in a chain.
    let below = |i: usize, j: usize| {
        ranges[i].precedes(&ranges[j])
            || (i < j
                && matches!((&ranges[i], &ranges[j]), (SortRange::Point(a), SortRange::Point(b)) if a == b))
    };
    let successors: Vec<Vec<usize>> = (0..n)
        .map(|i| (0..n).filter(|&j| i != j && below(i, j)).collect())
        .collect();

    // Kuhn's augmenting paths: pred[j] = Some(i) when edge i→j is matched.
    let mut pred: Vec<Option<usize>> = vec![None; n];
    for i in 0..n {
        let mut visited = vec![false; n];
        augment(i, &successors, &mut pred, &mut visited);
    }

    let mut next: Vec<Option<usize>> = vec![None; n];
    for (j, p) in pred.iter().enumerate() {
        if let Some(i) = p {
            next[*i] = Some(j);
        }
    }

    let mut chains: Vec<Vec<usize>> = (0..n)
        .filter(|&i| pred[i].is_none())
        .map(|start| {
            let mut chain = vec![start];
            let mut cur = start;
            while let Some(j) = next[cur] {
                chain.push(j);
                cur = j;
            }
            chain
        })
        .collect();

    let score = |chain: &Vec<usize>| -> u32 { chain.iter().map(|&i| ranges[i].specificity()).sum() };
    chains.sort_by(|a, b| {
        score(b)
            .cmp(&score(a))
            .then_with(|| b.len().cmp(&a.len()))
            .then_with(|| a[0].cmp(&b[0]))
    });
    chains
}

fn augment(
    i: usize,
    successors: &[Vec<usize>],
    pred: &mut [Option<usize>],
    visited: &mut [bool],
) -> bool {
    for &j in &successors[i] {
        if visited[j] {
            continue;
        }
        visited[j] = true;
        let free = match pred[j] {
            None => true,
            Some(k) => augment(k, successors, pred, visited),
        };
        if free {
            pred[j] = Some(i);
            return true;
        }
    }
    false
}
