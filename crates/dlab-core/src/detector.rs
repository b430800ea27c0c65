//! The wait-for graph and cycle detector.
//!
//! Ported from `fs_deadlock_sim/deadlock_detector.py`: build a directed process-to-
//! process "blocked on" graph, then DFS from each unvisited node tracking both a global
//! visited set and the current-stack set, returning the stack suffix as the cycle
//! witness the moment a back-edge into the stack is found.

use std::collections::HashSet;

/// A directed wait-for graph: `edges[i] = (p, q)` means `p` is blocked on a resource
/// `q` currently holds. Insertion order is preserved (and iterated) for stable,
/// reproducible output, since a `HashMap`-backed adjacency would reorder it.
#[derive(Debug, Default, Clone)]
pub struct WaitForGraph {
    edges: Vec<(String, String)>,
}

impl WaitForGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an edge `p -> q` ("p waits for q"). Self-loops (`p == q`) are elided.
    pub fn add_edge(&mut self, p: impl Into<String>, q: impl Into<String>) {
        let p = p.into();
        let q = q.into();
        if p != q {
            self.edges.push((p, q));
        }
    }

    pub fn edges(&self) -> &[(String, String)] {
        &self.edges
    }

    fn neighbors<'a>(&'a self, node: &str) -> impl Iterator<Item = &'a str> {
        self.edges
            .iter()
            .filter(move |(p, _)| p == node)
            .map(|(_, q)| q.as_str())
    }

    fn nodes_in_insertion_order(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        for (p, q) in &self.edges {
            if seen.insert(p.clone()) {
                order.push(p.clone());
            }
            if seen.insert(q.clone()) {
                order.push(q.clone());
            }
        }
        order
    }

    /// Runs DFS-based cycle discovery. Returns the empty vector when the graph is
    /// acyclic, signalling no deadlock.
    pub fn find_cycle(&self) -> Vec<String> {
        let mut visited = HashSet::new();
        for node in self.nodes_in_insertion_order() {
            if !visited.contains(&node) {
                let mut on_stack = HashSet::new();
                let mut path = Vec::new();
                if let Some(cycle) = self.dfs(&node, &mut visited, &mut on_stack, &mut path) {
                    return cycle;
                }
            }
        }
        Vec::new()
    }

    fn dfs(
        &self,
        node: &str,
        visited: &mut HashSet<String>,
        on_stack: &mut HashSet<String>,
        path: &mut Vec<String>,
    ) -> Option<Vec<String>> {
        visited.insert(node.to_string());
        on_stack.insert(node.to_string());
        path.push(node.to_string());

        for neighbor in self.neighbors(node).collect::<Vec<_>>() {
            if !visited.contains(neighbor) {
                if let Some(cycle) = self.dfs(neighbor, visited, on_stack, path) {
                    return Some(cycle);
                }
            } else if on_stack.contains(neighbor) {
                let idx = path.iter().position(|n| n == neighbor).expect("on_stack implies in path");
                let mut cycle = path[idx..].to_vec();
                cycle.push(neighbor.to_string());
                return Some(cycle);
            }
        }

        on_stack.remove(node);
        path.pop();
        None
    }

    /// Convenience bundle: `(has_deadlock, edges, cycle)`.
    pub fn detect(&self) -> (bool, Vec<(String, String)>, Vec<String>) {
        let cycle = self.find_cycle();
        (!cycle.is_empty(), self.edges.clone(), cycle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // graph {A->B, B->C, C->A, D->B} returns cycle [A,B,C,A] (or any rotation).
    #[test]
    fn finds_the_textbook_cycle() {
        let mut graph = WaitForGraph::new();
        graph.add_edge("A", "B");
        graph.add_edge("B", "C");
        graph.add_edge("C", "A");
        graph.add_edge("D", "B");

        let (has_deadlock, _, cycle) = graph.detect();
        assert!(has_deadlock);
        assert_eq!(cycle.first(), cycle.last());
        // Every consecutive pair in the witness must be a real edge (L3: soundness).
        for pair in cycle.windows(2) {
            assert!(graph.edges().contains(&(pair[0].clone(), pair[1].clone())));
        }
        let mut nodes_on_cycle: Vec<&str> = cycle[..cycle.len() - 1].iter().map(String::as_str).collect();
        nodes_on_cycle.sort();
        assert_eq!(nodes_on_cycle, vec!["A", "B", "C"]);
    }

    #[test]
    fn acyclic_graph_reports_no_deadlock() {
        let mut graph = WaitForGraph::new();
        graph.add_edge("A", "B");
        graph.add_edge("B", "C");

        let (has_deadlock, edges, cycle) = graph.detect();
        assert!(!has_deadlock);
        assert!(cycle.is_empty());
        assert_eq!(edges.len(), 2);
    }

    #[test]
    fn self_loops_are_elided() {
        let mut graph = WaitForGraph::new();
        graph.add_edge("A", "A");
        assert!(graph.edges().is_empty());
        assert!(!graph.detect().0);
    }

    // completeness — if any cycle exists, one is returned, even with multiple
    // disjoint components in the graph.
    #[test]
    fn finds_a_cycle_among_multiple_components() {
        let mut graph = WaitForGraph::new();
        graph.add_edge("X", "Y");
        graph.add_edge("A", "B");
        graph.add_edge("B", "A");

        let (has_deadlock, _, cycle) = graph.detect();
        assert!(has_deadlock);
        assert!(cycle.contains(&"A".to_string()));
        assert!(cycle.contains(&"B".to_string()));
    }
}
