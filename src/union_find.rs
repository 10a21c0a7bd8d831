/// Disjoint sets over dense indices, used to split a graph into components
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    /// `len` singleton sets
    pub fn new(len: usize) -> Self {
        UnionFind {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    /// Representative of the set containing `x`. Every index visited on the
    /// way is pointed straight at the representative.
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

    /// Merge the sets of `x` and `y`; false if they already were one set
    pub fn union(&mut self, x: usize, y: usize) -> bool {
        let mut keep = self.find(x);
        let mut merged = self.find(y);
        if keep == merged {
            return false;
        }
        if self.rank[keep] < self.rank[merged] {
            std::mem::swap(&mut keep, &mut merged);
        }
        self.parent[merged] = keep;
        if self.rank[keep] == self.rank[merged] {
            self.rank[keep] += 1;
        }
        true
    }

    /// All sets, ordered by their smallest member, with members ascending
    pub fn get_sets(&mut self) -> Vec<Vec<usize>> {
        let mut set_of_root: Vec<Option<usize>> = vec![None; self.parent.len()];
        let mut sets: Vec<Vec<usize>> = Vec::new();

        for i in 0..self.parent.len() {
            let root = self.find(i);
            match set_of_root[root] {
                Some(set) => sets[set].push(i),
                None => {
                    set_of_root[root] = Some(sets.len());
                    sets.push(vec![i]);
                }
            }
        }

        sets
    }
}
