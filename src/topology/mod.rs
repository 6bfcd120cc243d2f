//! Topology state machine
//!
//! Consumes decoded [`Frame`]s one at a time and folds each into a mutable
//! topology model: the node set, the child→parent edge list, and a per-node
//! record of join and liveness times. The transition function never fails:
//! out-of-order, duplicate and unknown-address input all land in explicit
//! fallback branches that leave prior state untouched.
//!
//! ## Ownership
//!
//! A single [`Topology`] is owned and mutated exclusively by the driver task
//! (one writer, see [`crate::driver`]); everyone else sees immutable
//! [`TopologySnapshot`]s cloned out per applied frame.
//!
//! ## Transition rules
//!
//! | Kind | Effect |
//! |---|---|
//! | JOIN, JOIN_ACK | ensure the source is a known node |
//! | JOIN_CFM | destination becomes the source's parent: record + edge |
//! | REPLY_ALIVE | refresh the destination's `parent_last_alive`, if recorded |
//! | CHECK_ALIVE, GATEWAY_REQ, NODE_REPLY, MULTIHOP | log only |

mod dot;
mod graph;

pub use graph::TopologyGraph;

use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::types::{Address, Frame, MessageKind, NodeClass};

/// Per-node topology state, created by the first JOIN_CFM naming the node as
/// a child and then only ever refreshed (last write wins), never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// The node this node joined through
    pub parent: Address,

    /// When the join confirmation was observed
    pub joined_at: DateTime<Local>,

    /// Most recent liveness confirmation from the parent
    pub parent_last_alive: DateTime<Local>,
}

/// One event per successfully decoded frame, including no-op kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyEvent {
    /// Kind of the frame that produced this event
    pub kind: MessageKind,

    /// Fixed-format log line (see [`Frame::log_line`])
    pub line: String,

    /// Diagnostic for frames the state machine could not act on, such as a
    /// liveness reply for an address with no record
    pub diagnostic: Option<String>,
}

/// Read-only view of the topology handed to renderers and exporters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologySnapshot {
    /// Known nodes in discovery order
    pub nodes: Vec<Address>,

    /// Child→parent edges in confirmation order
    pub edges: Vec<(Address, Address)>,

    /// Join/liveness records keyed by child address
    pub records: BTreeMap<Address, NodeRecord>,
}

impl TopologySnapshot {
    /// Classify a node for coloring.
    ///
    /// Recomputed from the address on every call rather than stored; the
    /// classification is independent of join order and topology history.
    pub fn class_of(&self, address: Address) -> NodeClass {
        address.class()
    }
}

/// The mutable topology model and its transition function.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    graph: TopologyGraph,
    records: BTreeMap<Address, NodeRecord>,
}

impl Topology {
    /// Create an empty topology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one frame into the topology.
    ///
    /// Infallible: every branch that references state which may
    /// not exist degrades to a diagnostic instead of an error, and prior
    /// state is never corrupted by unexpected input.
    pub fn apply(&mut self, frame: &Frame) -> TopologyEvent {
        let line = frame.log_line();
        let mut diagnostic = None;

        match frame.kind {
            MessageKind::Join | MessageKind::JoinAck => {
                // Keep a record of all discovered nodes
                if self.graph.ensure_node(frame.source) {
                    debug!("Discovered node 0x{}", frame.source);
                }
            }
            MessageKind::JoinCfm => {
                // The destination becomes the parent of the source. Both ends
                // are guaranteed present as graph nodes here; the original
                // monitor only appended one of them, which could leave a
                // never-beaconing parent off the node list.
                self.graph.ensure_node(frame.source);
                self.graph.ensure_node(frame.destination);

                self.records.insert(
                    frame.source,
                    NodeRecord {
                        parent: frame.destination,
                        joined_at: frame.timestamp,
                        parent_last_alive: frame.timestamp,
                    },
                );
                self.graph.add_edge(frame.source, frame.destination);
                debug!("0x{} joined through 0x{}", frame.source, frame.destination);
            }
            MessageKind::ReplyAlive => {
                // The destination has confirmed aliveness to the source
                match self.records.get_mut(&frame.destination) {
                    Some(record) => record.parent_last_alive = frame.timestamp,
                    None => {
                        let message = format!("{} is not in the record", frame.destination);
                        warn!("{message}");
                        diagnostic = Some(message);
                    }
                }
            }
            MessageKind::CheckAlive
            | MessageKind::GatewayReq
            | MessageKind::NodeReply
            | MessageKind::Multihop => {
                // Decoded and logged, no topology effect
            }
        }

        TopologyEvent { kind: frame.kind, line, diagnostic }
    }

    /// Clone out a read-only snapshot of the current state.
    pub fn snapshot(&self) -> TopologySnapshot {
        TopologySnapshot {
            nodes: self.graph.nodes().to_vec(),
            edges: self.graph.edges().to_vec(),
            records: self.records.clone(),
        }
    }

    /// The record for `address`, if it has confirmed a join.
    pub fn record(&self, address: Address) -> Option<&NodeRecord> {
        self.records.get(&address)
    }

    /// The underlying graph.
    pub fn graph(&self) -> &TopologyGraph {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(second: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 5, 12, 0, second).unwrap()
    }

    fn frame(kind: MessageKind, src: u16, dest: u16, second: u32) -> Frame {
        Frame {
            kind,
            source: Address(src),
            destination: Address(dest),
            payload: kind.has_payload().then_some(0),
            timestamp: at(second),
        }
    }

    #[test]
    fn join_frames_are_idempotent_on_the_node_set() {
        let mut topology = Topology::new();
        topology.apply(&frame(MessageKind::Join, 0x0001, 0x0000, 0));
        topology.apply(&frame(MessageKind::Join, 0x0001, 0x0000, 1));
        topology.apply(&frame(MessageKind::JoinAck, 0x0001, 0x0000, 2));

        let snapshot = topology.snapshot();
        assert_eq!(snapshot.nodes, vec![Address(0x0001)]);
        assert!(snapshot.edges.is_empty());
        assert!(snapshot.records.is_empty());
    }

    #[test]
    fn join_cfm_records_parent_and_edge() {
        let mut topology = Topology::new();
        topology.apply(&frame(MessageKind::JoinCfm, 0x0001, 0x9001, 5));

        let record = topology.record(Address(0x0001)).expect("record created");
        assert_eq!(record.parent, Address(0x9001));
        assert_eq!(record.joined_at, at(5));
        assert_eq!(record.parent_last_alive, at(5));

        let snapshot = topology.snapshot();
        // Both ends are present even though neither ever sent a JOIN
        assert!(snapshot.nodes.contains(&Address(0x0001)));
        assert!(snapshot.nodes.contains(&Address(0x9001)));
        assert_eq!(snapshot.edges, vec![(Address(0x0001), Address(0x9001))]);
    }

    #[test]
    fn reparenting_overwrites_the_record_and_appends_an_edge() {
        let mut topology = Topology::new();
        topology.apply(&frame(MessageKind::JoinCfm, 0x0001, 0x9001, 1));
        topology.apply(&frame(MessageKind::JoinCfm, 0x0001, 0x9002, 2));

        let record = topology.record(Address(0x0001)).unwrap();
        assert_eq!(record.parent, Address(0x9002), "last write wins");
        assert_eq!(record.joined_at, at(2));

        // Append-only graph keeps the stale edge
        assert_eq!(
            topology.snapshot().edges,
            vec![(Address(0x0001), Address(0x9001)), (Address(0x0001), Address(0x9002))]
        );
    }

    #[test]
    fn repeated_identical_confirmation_does_not_duplicate_the_edge() {
        let mut topology = Topology::new();
        topology.apply(&frame(MessageKind::JoinCfm, 0x0001, 0x9001, 1));
        topology.apply(&frame(MessageKind::JoinCfm, 0x0001, 0x9001, 7));

        assert_eq!(topology.snapshot().edges.len(), 1);
        // But the record's timestamps were refreshed
        assert_eq!(topology.record(Address(0x0001)).unwrap().joined_at, at(7));
    }

    #[test]
    fn reply_alive_refreshes_the_destinations_record() {
        let mut topology = Topology::new();
        topology.apply(&frame(MessageKind::JoinCfm, 0x0001, 0x9001, 1));
        let event = topology.apply(&frame(MessageKind::ReplyAlive, 0x9001, 0x0001, 9));

        assert!(event.diagnostic.is_none());
        assert_eq!(topology.record(Address(0x0001)).unwrap().parent_last_alive, at(9));
        // joined_at untouched
        assert_eq!(topology.record(Address(0x0001)).unwrap().joined_at, at(1));
    }

    #[test]
    fn reply_alive_for_an_unknown_node_is_a_diagnosed_no_op() {
        let mut topology = Topology::new();
        let before = topology.snapshot();

        let event = topology.apply(&frame(MessageKind::ReplyAlive, 0x9001, 0x0042, 3));
        assert_eq!(event.diagnostic.as_deref(), Some("0042 is not in the record"));
        assert_eq!(topology.snapshot(), before, "no mutation on unknown target");
    }

    #[test]
    fn log_only_kinds_leave_state_untouched() {
        let mut topology = Topology::new();
        topology.apply(&frame(MessageKind::JoinCfm, 0x0001, 0x9001, 1));
        let before = topology.snapshot();

        for kind in [
            MessageKind::CheckAlive,
            MessageKind::GatewayReq,
            MessageKind::NodeReply,
            MessageKind::Multihop,
        ] {
            let event = topology.apply(&frame(kind, 0x0001, 0x9001, 2));
            assert!(event.diagnostic.is_none());
            assert!(!event.line.is_empty());
        }
        assert_eq!(topology.snapshot(), before);
    }

    #[test]
    fn every_applied_frame_produces_an_event_line() {
        let mut topology = Topology::new();
        for kind in MessageKind::ALL {
            let event = topology.apply(&frame(kind, 0x0002, 0x9002, 4));
            assert!(event.line.contains(&kind.to_string()));
            assert!(event.line.contains("sent from 0x0002 to 0x9002"));
        }
    }

    #[test]
    fn snapshot_coloring_is_a_pure_function_of_address() {
        let mut topology = Topology::new();
        topology.apply(&frame(MessageKind::JoinCfm, 0x0001, 0x9001, 1));
        let snapshot = topology.snapshot();

        assert_eq!(snapshot.class_of(Address(0x9001)), NodeClass::Gateway);
        assert_eq!(snapshot.class_of(Address(0x0001)), NodeClass::Relay);
        assert_eq!(snapshot.class_of(Address(0x8000)), NodeClass::Relay);
    }
}
