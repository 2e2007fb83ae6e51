//! Join graph over catalog aliases.
//!
//! ## Architecture
//!
//! Aliases live in an arena indexed by their position in the catalog's
//! sorted alias list; edges are per-node bit sets. Two aliases are adjacent
//! iff a join rule connects them and both of their tables qualify under the
//! caller's liveness test. Pair rules never create edges.
//!
//! The searches are breadth-first over alias *sets*, so the first answer
//! found is a smallest one; iteration follows arena order, so the answer is
//! the same on every run.

use std::collections::{HashSet, VecDeque};
use std::fmt;

use crate::catalog::{AliasBinding, Catalog};

/// Fixed-capacity set of small indices.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitSet {
    words: Vec<u64>,
}

impl BitSet {
    pub fn new(capacity: usize) -> Self {
        BitSet {
            words: vec![0; capacity.div_ceil(64)],
        }
    }

    pub fn insert(&mut self, index: usize) {
        if let Some(word) = self.words.get_mut(index / 64) {
            *word |= 1 << (index % 64);
        }
    }

    pub fn remove(&mut self, index: usize) {
        if let Some(word) = self.words.get_mut(index / 64) {
            *word &= !(1 << (index % 64));
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.words
            .get(index / 64)
            .is_some_and(|word| word & (1 << (index % 64)) != 0)
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|word| *word == 0)
    }

    pub fn len(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }

    pub fn intersects(&self, other: &BitSet) -> bool {
        self.words
            .iter()
            .zip(&other.words)
            .any(|(a, b)| a & b != 0)
    }

    pub fn union_with(&mut self, other: &BitSet) {
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a |= b;
        }
    }

    pub fn difference_with(&mut self, other: &BitSet) {
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a &= !b;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(w, word)| {
            (0..64)
                .filter(move |bit| word & (1 << bit) != 0)
                .map(move |bit| w * 64 + bit)
        })
    }
}

/// Undirected adjacency between aliases whose tables currently qualify.
#[derive(Debug, Clone)]
pub struct JoinGraph {
    names: Vec<String>,
    adjacent: Vec<BitSet>,
}

impl JoinGraph {
    /// `qualifies` decides whether an alias's table may take part in joins.
    pub fn build<F>(catalog: &Catalog, qualifies: F) -> Self
    where
        F: Fn(&AliasBinding) -> bool,
    {
        let bindings: Vec<&AliasBinding> = catalog.bindings().collect();
        let names: Vec<String> = bindings.iter().map(|b| b.alias.clone()).collect();
        let live: Vec<bool> = bindings.iter().map(|b| qualifies(b)).collect();
        let mut adjacent = vec![BitSet::new(names.len()); names.len()];

        let position = |alias: &str| names.binary_search_by(|n| n.as_str().cmp(alias)).ok();
        for rule in catalog.joins() {
            for (left, right) in rule.alias_pairs() {
                let (Some(l), Some(r)) = (position(left), position(right)) else {
                    continue;
                };
                if live[l] && live[r] {
                    adjacent[l].insert(r);
                    adjacent[r].insert(l);
                }
            }
        }

        JoinGraph { names, adjacent }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn index_of(&self, alias: &str) -> Option<usize> {
        self.names
            .binary_search_by(|n| n.as_str().cmp(alias))
            .ok()
    }

    pub fn name(&self, index: usize) -> &str {
        &self.names[index]
    }

    pub fn empty_set(&self) -> BitSet {
        BitSet::new(self.names.len())
    }

    /// Whether the alias has at least one live join partner.
    pub fn contains(&self, alias: &str) -> bool {
        self.index_of(alias).is_some_and(|i| self.has_edges(i))
    }

    pub fn has_edges(&self, index: usize) -> bool {
        !self.adjacent[index].is_empty()
    }

    pub fn has_any_edges(&self) -> bool {
        self.adjacent.iter().any(|a| !a.is_empty())
    }

    pub fn neighbors(&self, alias: &str) -> Vec<&str> {
        self.index_of(alias)
            .map(|i| self.adjacent[i].iter().map(|j| self.name(j)).collect())
            .unwrap_or_default()
    }

    pub fn names_of<'a>(&'a self, set: &'a BitSet) -> impl Iterator<Item = &'a str> + 'a {
        set.iter().map(move |i| self.name(i))
    }

    /// Nodes reachable from `start` through nodes accepted by `through`.
    fn reachable(&self, start: &BitSet, through: &BitSet) -> BitSet {
        let mut seen = start.clone();
        let mut queue: VecDeque<usize> = start.iter().collect();
        while let Some(node) = queue.pop_front() {
            for next in self.adjacent[node].iter() {
                if through.contains(next) && !seen.contains(next) {
                    seen.insert(next);
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    /// Smallest connected alias set containing every seed.
    pub fn connect(&self, seeds: &BitSet) -> Option<BitSet> {
        let first = seeds.iter().next()?;
        let mut inside = self.empty_set();
        inside.insert(first);

        let mut joinable = self.empty_set();
        for i in 0..self.len() {
            if self.has_edges(i) {
                joinable.insert(i);
            }
        }
        let mut unreached = seeds.clone();
        unreached.difference_with(&self.reachable(&inside, &joinable));
        if !unreached.is_empty() {
            return None;
        }

        let mut remaining = seeds.clone();
        remaining.remove(first);
        self.grow(inside, &joinable, remaining, |remaining, added| {
            remaining.remove(added)
        })
    }

    /// Smallest connected extension of `inside`, through `allowed` aliases,
    /// that covers every column in `remaining`. `covers[alias]` is the set
    /// of columns an alias can supply.
    pub fn cover(
        &self,
        inside: &BitSet,
        allowed: &BitSet,
        remaining: BitSet,
        covers: &[BitSet],
    ) -> Option<BitSet> {
        let mut coverable = remaining.clone();
        for alias in self.reachable(inside, allowed).iter() {
            coverable.difference_with(&covers[alias]);
        }
        if !coverable.is_empty() {
            return None;
        }

        self.grow(inside.clone(), allowed, remaining, |remaining, added| {
            remaining.difference_with(&covers[added])
        })
    }

    fn grow<F>(&self, inside: BitSet, allowed: &BitSet, remaining: BitSet, satisfy: F) -> Option<BitSet>
    where
        F: Fn(&mut BitSet, usize),
    {
        let mut visited: HashSet<BitSet> = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(inside.clone());
        queue.push_back((inside, remaining));

        while let Some((inside, remaining)) = queue.pop_front() {
            if remaining.is_empty() {
                return Some(inside);
            }
            for candidate in allowed.iter() {
                if inside.contains(candidate) || !self.adjacent[candidate].intersects(&inside) {
                    continue;
                }
                let mut next = inside.clone();
                next.insert(candidate);
                if visited.insert(next.clone()) {
                    let mut left = remaining.clone();
                    satisfy(&mut left, candidate);
                    queue.push_back((next, left));
                }
            }
        }
        None
    }

    /// Shortest path from `start` to the first node accepted by `is_target`,
    /// both ends included.
    pub fn shortest_path<F>(&self, start: usize, is_target: F) -> Option<Vec<usize>>
    where
        F: Fn(usize) -> bool,
    {
        let mut parent: Vec<Option<usize>> = vec![None; self.len()];
        let mut seen = self.empty_set();
        let mut queue = VecDeque::from([start]);
        seen.insert(start);

        while let Some(node) = queue.pop_front() {
            if is_target(node) {
                let mut path = vec![node];
                let mut cursor = node;
                while let Some(previous) = parent[cursor] {
                    path.push(previous);
                    cursor = previous;
                }
                path.reverse();
                return Some(path);
            }
            for next in self.adjacent[node].iter() {
                if !seen.contains(next) {
                    seen.insert(next);
                    parent[next] = Some(node);
                    queue.push_back(next);
                }
            }
        }
        None
    }
}

impl fmt::Display for JoinGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, name) in self.names.iter().enumerate() {
            if self.has_edges(i) {
                let neighbors: Vec<&str> = self.adjacent[i].iter().map(|j| self.name(j)).collect();
                writeln!(f, "  {} : {}", name, neighbors.join(", "))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogConfig, Namespace};

    /// a - b - c - d, plus e joined to nothing live.
    fn chain() -> JoinGraph {
        let config = CatalogConfig::default()
            .alias("a", Namespace::Main, "t")
            .alias("b", Namespace::Db, "t")
            .alias("c", Namespace::Db, "t")
            .alias("d", Namespace::Db, "t")
            .alias("e", Namespace::Alt, "t")
            .join(&["a"], &["b"], &["{L}.x = {R}.x"])
            .join(&["b"], &["c"], &["{L}.x = {R}.x"])
            .join(&["c"], &["d"], &["{L}.x = {R}.x"])
            .join(&["d"], &["e"], &["{L}.x = {R}.x"])
            .pair(&["a"], &["d"], &["{L}.y = {R}.y"]);
        let catalog = Catalog::from_config(config).unwrap();
        JoinGraph::build(&catalog, |b| b.table.namespace != Namespace::Alt)
    }

    fn set(graph: &JoinGraph, names: &[&str]) -> BitSet {
        let mut set = graph.empty_set();
        for name in names {
            set.insert(graph.index_of(name).unwrap());
        }
        set
    }

    #[test]
    fn test_bitset_operations() {
        let mut set = BitSet::new(130);
        set.insert(3);
        set.insert(129);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![3, 129]);
        assert_eq!(set.len(), 2);
        set.remove(3);
        assert!(!set.contains(3));
        set.insert(500);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_edges_require_live_tables() {
        let graph = chain();
        assert!(graph.contains("a"));
        assert!(!graph.contains("e"));
        assert_eq!(graph.neighbors("d"), vec!["c"]);
        // pair rules are not edges
        assert_eq!(graph.neighbors("a"), vec!["b"]);
    }

    #[test]
    fn test_connect_adds_intermediates() {
        let graph = chain();
        let joined = graph.connect(&set(&graph, &["a", "d"])).unwrap();
        assert_eq!(graph.names_of(&joined).collect::<Vec<_>>(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_connect_fails_across_components() {
        let graph = chain();
        assert!(graph.connect(&set(&graph, &["a", "e"])).is_none());
    }

    #[test]
    fn test_cover_grows_minimally() {
        let graph = chain();
        // column 0 only from c, column 1 from b or d
        let mut covers = vec![BitSet::new(2); graph.len()];
        covers[graph.index_of("c").unwrap()].insert(0);
        covers[graph.index_of("b").unwrap()].insert(1);
        covers[graph.index_of("d").unwrap()].insert(1);
        let mut remaining = BitSet::new(2);
        remaining.insert(0);
        remaining.insert(1);

        let allowed = set(&graph, &["b", "c", "d"]);
        let grown = graph
            .cover(&set(&graph, &["a"]), &allowed, remaining.clone(), &covers)
            .unwrap();
        assert_eq!(graph.names_of(&grown).collect::<Vec<_>>(), vec!["a", "b", "c"]);

        let only_d = set(&graph, &["d"]);
        assert!(graph
            .cover(&set(&graph, &["a"]), &only_d, remaining, &covers)
            .is_none());
    }

    #[test]
    fn test_shortest_path_stops_at_first_target() {
        let graph = chain();
        let start = graph.index_of("d").unwrap();
        let target = graph.index_of("b").unwrap();
        let path = graph.shortest_path(start, |i| i == target).unwrap();
        let names: Vec<&str> = path.iter().map(|i| graph.name(*i)).collect();
        assert_eq!(names, vec!["d", "c", "b"]);
    }
}
