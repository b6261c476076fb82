use std::collections::BTreeSet;

use crate::UnionFind;

/// Mutex constraints between cluster representatives.
#[derive(Debug, Clone)]
pub(crate) struct MutexStore {
    sets: Vec<BTreeSet<usize>>,
}

impl MutexStore {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            sets: vec![BTreeSet::new(); len],
        }
    }

    /// Looks for the other root in the smaller constraint set.
    pub(crate) fn check(&self, ru: usize, rv: usize) -> bool {
        let (small, other) = if self.sets[ru].len() < self.sets[rv].len() {
            (ru, rv)
        } else {
            (rv, ru)
        };
        self.sets[small].contains(&other)
    }

    pub(crate) fn insert(&mut self, ru: usize, rv: usize) {
        self.sets[ru].insert(rv);
        self.sets[rv].insert(ru);
    }

    /// Moves all constraints of `from` onto `to` and rewrites back references.
    pub(crate) fn merge(&mut self, from: usize, to: usize) {
        let moved = std::mem::take(&mut self.sets[from]);
        for &v in &moved {
            if v == to {
                continue;
            }
            let back = &mut self.sets[v];
            back.remove(&from);
            back.insert(to);
        }

        let target = &mut self.sets[to];
        target.remove(&from);
        target.extend(moved.into_iter().filter(|&v| v != to));
    }

    #[cfg(test)]
    pub(crate) fn constraints(&self, root: usize) -> &BTreeSet<usize> {
        &self.sets[root]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EdgeOutcome {
    Connected,
    Constrained,
    Merged,
    MutexAdded,
}

/// Union-find plus mutex constraints: the state shared by every mutex
/// watershed variant.
#[derive(Debug, Clone)]
pub(crate) struct MutexWatershed {
    uf: UnionFind,
    mutexes: MutexStore,
}

impl MutexWatershed {
    pub(crate) fn new(num_nodes: usize) -> Self {
        Self {
            uf: UnionFind::new(num_nodes),
            mutexes: MutexStore::new(num_nodes),
        }
    }

    pub(crate) fn find(&mut self, x: usize) -> usize {
        self.uf.find(x)
    }

    pub(crate) fn is_constrained(&self, ru: usize, rv: usize) -> bool {
        self.mutexes.check(ru, rv)
    }

    pub(crate) fn insert_mutex(&mut self, ru: usize, rv: usize) {
        self.mutexes.insert(ru, rv);
    }

    /// Merges two distinct roots and carries their constraints over.
    pub(crate) fn merge_roots(&mut self, ru: usize, rv: usize) {
        let root = self.uf.union(ru, rv);
        let from = if root == ru { rv } else { ru };
        self.mutexes.merge(from, root);
    }

    /// Greedy mutex watershed step for one edge.
    pub(crate) fn add_edge(&mut self, u: usize, v: usize, is_mutex: bool) -> EdgeOutcome {
        let ru = self.uf.find(u);
        let rv = self.uf.find(v);
        if ru == rv {
            return EdgeOutcome::Connected;
        }
        if self.mutexes.check(ru, rv) {
            return EdgeOutcome::Constrained;
        }

        if is_mutex {
            self.mutexes.insert(ru, rv);
            EdgeOutcome::MutexAdded
        } else {
            self.merge_roots(ru, rv);
            EdgeOutcome::Merged
        }
    }

    pub(crate) fn into_labels(mut self) -> Vec<u64> {
        self.uf.labels()
    }
}
