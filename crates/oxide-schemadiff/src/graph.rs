//! Dependency graph over schema entities or changes.
//!
//! Nodes live in an arena indexed by insertion order; edges are adjacency
//! sets of indices. Insertion order doubles as the tie-break for nodes with
//! no ordering constraint between them, which keeps every ordering the
//! graph produces deterministic.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use crate::error::CycleError;

/// Which way to walk the dependency edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Dependencies first: parents before children.
    Create,
    /// The exact reverse of [`Direction::Create`].
    Drop,
}

/// A directed graph where an edge `a -> b` means `a` depends on `b`.
#[derive(Debug, Clone)]
pub struct DependencyGraph<K> {
    nodes: Vec<K>,
    index: BTreeMap<K, usize>,
    /// `dependencies[i]`: nodes that node `i` depends on.
    dependencies: Vec<BTreeSet<usize>>,
}

impl<K> Default for DependencyGraph<K> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            index: BTreeMap::new(),
            dependencies: Vec::new(),
        }
    }
}

impl<K: Clone + Ord + Display> DependencyGraph<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `node` if it is not present yet and returns its index.
    pub fn add_node(&mut self, node: K) -> usize {
        if let Some(&i) = self.index.get(&node) {
            return i;
        }
        let i = self.nodes.len();
        self.index.insert(node.clone(), i);
        self.nodes.push(node);
        self.dependencies.push(BTreeSet::new());
        i
    }

    /// Records that `node` depends on `depends_on`, adding either node when
    /// missing. Self-dependencies are ignored.
    pub fn add_dependency(&mut self, node: K, depends_on: K) {
        let from = self.add_node(node);
        let to = self.add_node(depends_on);
        if from != to {
            self.dependencies[from].insert(to);
        }
    }

    /// Nodes in insertion order.
    #[must_use]
    pub fn nodes(&self) -> &[K] {
        &self.nodes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn contains(&self, node: &K) -> bool {
        self.index.contains_key(node)
    }

    /// Direct dependencies of `node`, in insertion order.
    #[must_use]
    pub fn dependencies(&self, node: &K) -> Vec<&K> {
        self.index.get(node).map_or_else(Vec::new, |&i| {
            self.dependencies[i].iter().map(|&j| &self.nodes[j]).collect()
        })
    }

    /// Whether `node` depends on `other`, directly or transitively.
    #[must_use]
    pub fn depends_on(&self, node: &K, other: &K) -> bool {
        let (Some(&start), Some(&target)) = (self.index.get(node), self.index.get(other)) else {
            return false;
        };
        let mut seen = BTreeSet::new();
        let mut stack = vec![start];
        while let Some(i) = stack.pop() {
            for &next in &self.dependencies[i] {
                if next == target {
                    return true;
                }
                if seen.insert(next) {
                    stack.push(next);
                }
            }
        }
        false
    }

    /// Orders every node so that each comes after its dependencies
    /// ([`Direction::Create`]) or before them ([`Direction::Drop`]).
    ///
    /// Among nodes that are ready at the same time the earliest inserted
    /// goes first.
    ///
    /// # Errors
    ///
    /// Returns a `CycleError` naming the nodes of one cycle.
    pub fn topological_order(&self, direction: Direction) -> Result<Vec<K>, CycleError> {
        let n = self.nodes.len();
        let mut pending: Vec<usize> = self.dependencies.iter().map(BTreeSet::len).collect();
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (i, deps) in self.dependencies.iter().enumerate() {
            for &dep in deps {
                dependents[dep].push(i);
            }
        }

        // Kahn's algorithm with an ordered ready set
        let mut ready: BTreeSet<usize> = (0..n).filter(|&i| pending[i] == 0).collect();
        let mut order: Vec<K> = Vec::with_capacity(n);
        while let Some(i) = ready.pop_first() {
            order.push(self.nodes[i].clone());
            for &dependent in &dependents[i] {
                pending[dependent] -= 1;
                if pending[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        if order.len() != n {
            let path = self.find_cycle().unwrap_or_default();
            return Err(CycleError {
                path: path.iter().map(ToString::to_string).collect(),
            });
        }
        if direction == Direction::Drop {
            order.reverse();
        }
        Ok(order)
    }

    /// Finds one cycle, returned as a closed path (`a, b, a`).
    #[must_use]
    pub fn find_cycle(&self) -> Option<Vec<K>> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            New,
            Active,
            Done,
        }

        let mut marks = vec![Mark::New; self.nodes.len()];
        for start in 0..self.nodes.len() {
            if marks[start] != Mark::New {
                continue;
            }
            // Current path, each node paired with the dependencies left to visit.
            let mut path = vec![(start, self.dependencies[start].iter())];
            marks[start] = Mark::Active;
            while let Some((node, pending)) = path.last_mut() {
                let node = *node;
                let Some(&next) = pending.next() else {
                    marks[node] = Mark::Done;
                    path.pop();
                    continue;
                };
                match marks[next] {
                    Mark::Active => {
                        let from = path.iter().position(|(i, _)| *i == next).unwrap_or(0);
                        let mut cycle: Vec<K> = path[from..]
                            .iter()
                            .map(|(i, _)| self.nodes[*i].clone())
                            .collect();
                        cycle.push(self.nodes[next].clone());
                        return Some(cycle);
                    }
                    Mark::New => {
                        marks[next] = Mark::Active;
                        path.push((next, self.dependencies[next].iter()));
                    }
                    Mark::Done => {}
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&'static str, &'static str)]) -> DependencyGraph<&'static str> {
        let mut graph = DependencyGraph::new();
        for (node, dep) in edges {
            graph.add_dependency(*node, *dep);
        }
        graph
    }

    #[test]
    fn test_create_order_puts_dependencies_first() {
        let graph = graph(&[("v1", "v2"), ("v2", "t")]);
        assert_eq!(
            graph.topological_order(Direction::Create),
            Ok(vec!["t", "v2", "v1"])
        );
        assert_eq!(
            graph.topological_order(Direction::Drop),
            Ok(vec!["v1", "v2", "t"])
        );
    }

    #[test]
    fn test_ties_follow_insertion_order() {
        let mut graph = DependencyGraph::new();
        for node in ["c", "a", "b"] {
            graph.add_node(node);
        }
        graph.add_dependency("c", "b");
        assert_eq!(
            graph.topological_order(Direction::Create),
            Ok(vec!["a", "b", "c"])
        );
    }

    #[test]
    fn test_self_dependency_is_ignored() {
        let graph = graph(&[("t", "t")]);
        assert_eq!(graph.topological_order(Direction::Create), Ok(vec!["t"]));
        assert!(graph.find_cycle().is_none());
    }

    #[test]
    fn test_cycle_is_reported_with_path() {
        let graph = graph(&[("a", "b"), ("b", "c"), ("c", "a"), ("d", "a")]);
        let err = graph
            .topological_order(Direction::Create)
            .expect_err("cycle expected");
        assert_eq!(err.path, vec!["a", "b", "c", "a"]);
        assert_eq!(err.to_string(), "Dependency cycle: a -> b -> c -> a");
    }

    #[test]
    fn test_cycle_search_handles_long_chains() {
        const LEN: usize = 200_000;
        let mut graph = DependencyGraph::new();
        for i in 0..LEN - 1 {
            graph.add_dependency(i, i + 1);
        }
        assert!(graph.find_cycle().is_none());
        assert_eq!(
            graph.topological_order(Direction::Create).map(|o| o[0]),
            Ok(LEN - 1)
        );

        graph.add_dependency(LEN - 1, 0);
        let cycle = graph.find_cycle().expect("cycle expected");
        assert_eq!(cycle.len(), LEN + 1);
        assert_eq!((cycle[0], cycle[LEN - 1], cycle[LEN]), (0, LEN - 1, 0));
    }

    #[test]
    fn test_dependencies_lookup() {
        let graph = graph(&[("x", "y"), ("x", "z")]);
        assert_eq!(graph.dependencies(&"x"), vec![&"y", &"z"]);
        assert!(graph.dependencies(&"y").is_empty());
        assert_eq!(graph.len(), 3);
        assert!(graph.contains(&"z"));
    }

    #[test]
    fn test_transitive_dependency() {
        let graph = graph(&[("a", "b"), ("b", "c"), ("d", "c")]);
        assert!(graph.depends_on(&"a", &"c"));
        assert!(!graph.depends_on(&"c", &"a"));
        assert!(!graph.depends_on(&"a", &"d"));
        assert!(!graph.depends_on(&"a", &"missing"));
    }
}
