//! Graphviz DOT export
//!
//! Thin text export for external renderers; layout and drawing are entirely
//! the consumer's business.

use std::fmt::Write as _;

use crate::types::NodeClass;

use super::TopologySnapshot;

impl TopologySnapshot {
    /// Render this snapshot as a Graphviz `digraph`.
    ///
    /// Nodes are filled by classification (gateways green, relays yellow,
    /// the monitor's traditional colors) and edges point child→parent.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph mesh {\n");
        for node in &self.nodes {
            let fill = match self.class_of(*node) {
                NodeClass::Gateway => "green",
                NodeClass::Relay => "yellow",
            };
            // write! to a String cannot fail
            let _ = writeln!(out, "    \"{node}\" [style=filled, fillcolor={fill}];");
        }
        for (child, parent) in &self.edges {
            let _ = writeln!(out, "    \"{child}\" -> \"{parent}\";");
        }
        out.push_str("}\n");
        out
    }
}
