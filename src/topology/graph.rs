//! Append-only topology graph

use serde::{Deserialize, Serialize};

use crate::types::Address;

/// Directed graph of child→parent edges, built incrementally.
///
/// The graph is monotonic for the process lifetime: nodes and edges are only
/// ever added, never removed (the protocol has no leave or timeout message).
/// Insertion order is preserved so exports and snapshots are stable across
/// runs of the same capture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologyGraph {
    nodes: Vec<Address>,
    edges: Vec<(Address, Address)>,
}

impl TopologyGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `address` as an isolated node if it is not already present.
    ///
    /// Returns true when the node is new.
    pub fn ensure_node(&mut self, address: Address) -> bool {
        if self.nodes.contains(&address) {
            return false;
        }
        self.nodes.push(address);
        true
    }

    /// Append the directed edge child→parent.
    ///
    /// The identical pair is not duplicated; a repeated confirmation through
    /// a *different* parent appends a second edge, leaving the stale one in
    /// place. The record map, not the graph, says which parent is current.
    pub fn add_edge(&mut self, child: Address, parent: Address) {
        if !self.edges.contains(&(child, parent)) {
            self.edges.push((child, parent));
        }
    }

    /// Whether `address` has been seen as a node.
    pub fn contains(&self, address: Address) -> bool {
        self.nodes.contains(&address)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[Address] {
        &self.nodes
    }

    /// Child→parent edges in insertion order.
    pub fn edges(&self) -> &[(Address, Address)] {
        &self.edges
    }
}
