//! Connection layer
//!
//! A connection owns the driver task for one byte source and hands out
//! snapshot and event streams. [`ReplayConnection`] replays capture files on
//! any platform; [`LiveConnection`] reads the gateway serial port and needs
//! the `serial` cargo feature.

pub mod live;
pub mod replay;


pub use live::LiveConnection;
pub use replay::ReplayConnection;
