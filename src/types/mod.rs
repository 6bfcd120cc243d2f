//! Core types for mesh topology monitoring.
//!
//! This module provides the foundational data structures for handling the
//! gateway's wire protocol and the reconstructed topology:
//!
//! - [`Address`] is the 16-bit node identifier, displayed as four uppercase
//!   hex digits, with gateway classification as a pure function of value
//! - [`MessageKind`] maps the leading type byte to the frame layout that
//!   follows it (5 or 6 bytes total)
//! - [`Frame`] is a complete decoded protocol unit with its capture time
//! - [`UpdateRate`] controls snapshot stream throttling at subscription time
//!
//! Topology state itself (records, graph, snapshots) lives in
//! [`crate::topology`]; these are the inert value types both sides share.

mod address;
mod frame;
mod kind;
mod update_rate;

// Re-export all public types
pub use address::{Address, GATEWAY_ADDR_THRESHOLD, NodeClass};
pub use frame::Frame;
pub use kind::{HEADER_LEN, MessageKind};
pub use update_rate::UpdateRate;
