// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Temporal Cascade Simulation Suite - Contact Graph
//
// Static adjacency lists. The order inside each list is not meaningful, which
// lets the engine partition a list in place into an unvisited prefix and a
// visited suffix for sampling without replacement.

use crate::error::GraphError;
use crate::types::NodeId;

#[derive(Debug, Clone)]
pub struct ContactGraph {
    links: Vec<Vec<NodeId>>,
    edge_count: usize,
}

impl ContactGraph {
    /// Build from per-node neighbor lists (possibly asymmetric).
    pub fn from_adjacency(links: Vec<Vec<NodeId>>) -> Result<Self, GraphError> {
        if links.is_empty() {
            return Err(GraphError::Empty);
        }
        let node_count = links.len();
        for (u, neighbors) in links.iter().enumerate() {
            if let Some(&v) = neighbors.iter().find(|&&v| v as usize >= node_count) {
                return Err(GraphError::NodeOutOfRange { from: u as NodeId, to: v, node_count });
            }
        }
        let edge_count = links.iter().map(Vec::len).sum();
        Ok(Self { links, edge_count })
    }

    /// Build an undirected graph from an edge list. Each edge is appended to
    /// both endpoint lists; a self loop is appended once.
    ///
    /// `node_count` defaults to the largest id plus one.
    pub fn from_edges(node_count: Option<usize>, edges: &[(NodeId, NodeId)]) -> Result<Self, GraphError> {
        let inferred = edges
            .iter()
            .map(|&(u, v)| u.max(v) as usize + 1)
            .max()
            .unwrap_or(0);
        let n = node_count.unwrap_or(inferred);
        if n == 0 {
            return Err(GraphError::Empty);
        }

        let mut links = vec![Vec::new(); n];
        for &(u, v) in edges {
            if u as usize >= n || v as usize >= n {
                return Err(GraphError::NodeOutOfRange { from: u, to: v, node_count: n });
            }
            links[u as usize].push(v);
            if u != v {
                links[v as usize].push(u);
            }
        }
        Ok(Self { links, edge_count: edges.len() })
    }

    pub fn node_count(&self) -> usize {
        self.links.len()
    }

    /// Number of edges as supplied: arcs for adjacency input, undirected
    /// edges for edge lists.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    #[inline]
    pub fn degree(&self, u: NodeId) -> usize {
        self.links[u as usize].len()
    }

    /// Current neighbor order of `u`.
    pub fn neighbors(&self, u: NodeId) -> &[NodeId] {
        &self.links[u as usize]
    }

    /// The sampling pool of `u`: the first `degree - visited` slots.
    #[inline]
    pub fn unvisited(&self, u: NodeId, visited: usize) -> &[NodeId] {
        let list = &self.links[u as usize];
        &list[..list.len() - visited]
    }

    /// Move the neighbor in `slot` out of the unvisited prefix by swapping it
    /// with the last unvisited slot. The caller then bumps its visited count.
    #[inline]
    pub fn retire(&mut self, u: NodeId, slot: usize, visited: usize) {
        let list = &mut self.links[u as usize];
        let last = list.len() - visited - 1;
        list.swap(slot, last);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undirected_edges() {
        let g = ContactGraph::from_edges(None, &[(0, 1), (1, 2), (2, 2)]).unwrap();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.neighbors(0), &[1]);
        assert_eq!(g.neighbors(1), &[0, 2]);
        assert_eq!(g.neighbors(2), &[1, 2]);
    }

    #[test]
    fn test_explicit_node_count_keeps_isolated_nodes() {
        let g = ContactGraph::from_edges(Some(5), &[(0, 1)]).unwrap();
        assert_eq!(g.node_count(), 5);
        assert_eq!(g.degree(4), 0);
        assert_eq!(
            ContactGraph::from_edges(Some(2), &[(0, 3)]).unwrap_err(),
            GraphError::NodeOutOfRange { from: 0, to: 3, node_count: 2 }
        );
    }

    #[test]
    fn test_rejects_empty_and_dangling() {
        assert_eq!(ContactGraph::from_edges(None, &[]).unwrap_err(), GraphError::Empty);
        assert_eq!(ContactGraph::from_adjacency(vec![]).unwrap_err(), GraphError::Empty);
        assert_eq!(
            ContactGraph::from_adjacency(vec![vec![1], vec![2]]).unwrap_err(),
            GraphError::NodeOutOfRange { from: 1, to: 2, node_count: 2 }
        );
    }

    #[test]
    fn test_retire_partitions_in_place() {
        let mut g = ContactGraph::from_adjacency(vec![vec![1, 2, 3], vec![], vec![], vec![]]).unwrap();
        assert_eq!(g.unvisited(0, 0), &[1, 2, 3]);

        g.retire(0, 0, 0);
        assert_eq!(g.unvisited(0, 1), &[3, 2]);
        assert_eq!(g.neighbors(0)[2], 1);

        g.retire(0, 1, 1);
        assert_eq!(g.unvisited(0, 2), &[3]);

        g.retire(0, 0, 2);
        assert!(g.unvisited(0, 3).is_empty());
        let mut all = g.neighbors(0).to_vec();
        all.sort_unstable();
        assert_eq!(all, vec![1, 2, 3]);
    }
}
