use std::collections::BTreeMap;

/// Disjoint-set union keyed by dense indices, with union by size and path
/// compression.
///
/// Ties between equally sized sets are broken towards the lower root index,
/// so the resulting partition and its representatives are deterministic.
#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSet {
    pub fn new(len: usize) -> Self {
        DisjointSet {
            parent: (0..len).collect(),
            size: vec![1; len],
        }
    }

    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    /// Merges the sets of `x` and `y`. Returns `false` if they already shared one.
    pub fn union(&mut self, x: usize, y: usize) -> bool {
        let (rx, ry) = (self.find(x), self.find(y));
        if rx == ry {
            return false;
        }
        let (keep, absorb) = match self.size[rx].cmp(&self.size[ry]) {
            std::cmp::Ordering::Greater => (rx, ry),
            std::cmp::Ordering::Less => (ry, rx),
            std::cmp::Ordering::Equal => (rx.min(ry), rx.max(ry)),
        };
        self.parent[absorb] = keep;
        self.size[keep] += self.size[absorb];
        true
    }

    /// Every set with at least `min_size` members. Members are ascending and
    /// sets are ordered by their lowest member.
    pub fn groups(&mut self, min_size: usize) -> Vec<Vec<usize>> {
        let mut by_root: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for index in 0..self.parent.len() {
            let root = self.find(index);
            by_root.entry(root).or_default().push(index);
        }
        let mut groups: Vec<Vec<usize>> = by_root
            .into_values()
            .filter(|members| members.len() >= min_size)
            .collect();
        groups.sort_by_key(|members| members[0]);
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singletons_until_merged() {
        let mut set = DisjointSet::new(3);
        assert_ne!(set.find(0), set.find(1));
        assert_eq!(set.groups(2), Vec::<Vec<usize>>::new());
        assert_eq!(set.groups(1), vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn chains_are_transitive() {
        let mut set = DisjointSet::new(6);
        assert!(set.union(0, 1));
        assert!(set.union(4, 5));
        assert!(set.union(1, 2));
        assert!(set.union(2, 3));
        assert!(!set.union(3, 0));
        assert_eq!(set.groups(2), vec![vec![0, 1, 2, 3], vec![4, 5]]);
    }

    #[test]
    fn merges_two_groups() {
        let mut set = DisjointSet::new(5);
        set.union(3, 4);
        set.union(0, 1);
        set.union(4, 1);
        assert_eq!(set.groups(2), vec![vec![0, 1, 3, 4]]);
    }

    #[test]
    fn equal_sizes_keep_lower_root() {
        let mut set = DisjointSet::new(4);
        set.union(3, 2);
        assert_eq!(set.find(3), 2);
        set.union(1, 0);
        set.union(2, 1);
        assert_eq!(set.find(3), 0);
    }
}
