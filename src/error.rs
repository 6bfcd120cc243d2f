//! Error types for mesh monitoring.
//!
//! This module provides the error handling for the meshdeck monitoring library.
//! All errors implement the `std::error::Error` trait and include structured context
//! for debugging and recovery guidance.
//!
//! ## Error Categories
//!
//! - **Connection Errors**: Issues opening the serial gateway port
//! - **File Errors**: Problems reading capture files
//! - **Stream Errors**: I/O failures on the gateway byte stream
//! - **Frame Errors**: Truncation or stalls inside an in-progress frame
//!
//! Note what is *not* here: an invalid type byte and a liveness reply for an
//! unknown node are normal protocol noise, handled inline by the decoder and
//! the topology state machine. Only stream-level failures become errors.
//!
//! ## Recovery and Retry
//!
//! Errors provide methods to determine if they are recoverable:
//!
//! ```rust
//! use meshdeck::MonitorError;
//!
//! let error = MonitorError::connection_failed("gateway not plugged in");
//! if error.is_retryable() {
//!     println!("Can retry this operation");
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for monitoring operations.
pub type Result<T, E = MonitorError> = std::result::Result<T, E>;

/// Main error type for mesh monitoring operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MonitorError {
    #[error("Failed to connect to gateway: {reason}")]
    Connection {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Capture file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Stream read failed during {context}")]
    Stream {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Stream ended mid-frame: {context} needed {needed} more byte(s)")]
    Truncated { context: String, needed: usize },

    #[error("Frame read stalled: no byte within {duration:?} after the type byte")]
    FrameTimeout { duration: Duration },

    #[error("{feature} requires the '{required_feature}' cargo feature")]
    FeatureDisabled { feature: String, required_feature: String },
}

impl MonitorError {
    /// Returns whether this error is potentially recoverable through retry.
    ///
    /// "Retry" here means reopening the connection; per-frame conditions like
    /// truncation are fatal for the stream that produced them.
    pub fn is_retryable(&self) -> bool {
        match self {
            MonitorError::Connection { .. } => true,
            MonitorError::FrameTimeout { .. } => true,
            MonitorError::Stream { .. } => true,
            MonitorError::File { .. } => false,
            MonitorError::Truncated { .. } => false,
            MonitorError::FeatureDisabled { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            MonitorError::Connection { .. } => vec![
                "Check the gateway is attached and the port path is correct",
                "Verify permissions on the serial device (dialout group on Linux)",
                "Try re-plugging the gateway radio",
            ],
            MonitorError::File { .. } => vec![
                "Check the capture file exists and is readable",
                "Verify the capture contains raw gateway output",
            ],
            MonitorError::Stream { .. } => vec![
                "Check the gateway is still attached",
                "Reopen the connection",
            ],
            MonitorError::Truncated { .. } => vec![
                "Verify the capture was not cut off mid-frame",
                "Check the gateway firmware emits whole frames",
            ],
            MonitorError::FrameTimeout { .. } => vec![
                "Increase the per-frame read timeout",
                "Check for radio interference or a wedged gateway",
                "Reopen the connection",
            ],
            MonitorError::FeatureDisabled { .. } => vec![
                "Rebuild with the required cargo feature enabled",
                "Use a capture file replay for feature-independent testing",
            ],
        }
    }

    /// Helper constructor for capture file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        MonitorError::File { path, source }
    }

    /// Helper constructor for connection errors.
    pub fn connection_failed(reason: impl Into<String>) -> Self {
        MonitorError::Connection { reason: reason.into(), source: None }
    }

    /// Helper constructor for connection errors with source.
    pub fn connection_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        MonitorError::Connection { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for stream read errors.
    pub fn stream_error(context: impl Into<String>, source: std::io::Error) -> Self {
        MonitorError::Stream { context: context.into(), source }
    }

    /// Helper constructor for mid-frame truncation.
    pub fn truncated(context: impl Into<String>, needed: usize) -> Self {
        MonitorError::Truncated { context: context.into(), needed }
    }

    /// Helper constructor for disabled-feature errors.
    pub fn feature_disabled(
        feature: impl Into<String>,
        required_feature: impl Into<String>,
    ) -> Self {
        MonitorError::FeatureDisabled {
            feature: feature.into(),
            required_feature: required_feature.into(),
        }
    }
}
