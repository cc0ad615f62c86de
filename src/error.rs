//! Error types for the telemetry link.
//!
//! The taxonomy separates recoverable events from the single fatal class:
//!
//! - [`DecodeError`]: a received payload could not be turned into a record.
//!   Always recovered by the receiver (logged, frame skipped).
//! - [`LinkError`]: the physical layer refused a send, receive or mode change.
//!   Controllers log it and keep looping.
//! - [`LogParseError`]: a line of the durable measurement log is malformed.
//!   The line is skipped.
//! - [`Error::Configuration`]: the radio session could not be brought up.
//!   This is the only class that aborts start-up.
//!
//! ```rust
//! use rssilink::{DecodeError, Error};
//!
//! let error: Error = DecodeError::SizeMismatch { expected: 8, actual: 3 }.into();
//! assert!(!error.is_fatal());
//!
//! let error = Error::configuration("channel 200 is outside 0..=125");
//! assert!(error.is_fatal());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Boxed source error carried by collaborator failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias for link operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure to decode a received payload into a telemetry record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("payload is {actual} bytes, expected exactly {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("malformed {field} field: {details}")]
    Malformed { field: &'static str, details: String },
}

/// Failure reported by the physical layer behind a transport.
#[derive(Error, Debug)]
pub enum LinkError {
    #[error("radio send failed: {reason}")]
    Send {
        reason: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("radio receive failed: {reason}")]
    Receive {
        reason: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("radio could not enter listen mode: {reason}")]
    Listen {
        reason: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("link peer is gone")]
    Disconnected,
}

impl LinkError {
    /// Helper constructor for send failures with a driver source.
    pub fn send(reason: impl Into<String>, source: impl Into<BoxError>) -> Self {
        LinkError::Send { reason: reason.into(), source: Some(source.into()) }
    }

    /// Helper constructor for receive failures with a driver source.
    pub fn receive(reason: impl Into<String>, source: impl Into<BoxError>) -> Self {
        LinkError::Receive { reason: reason.into(), source: Some(source.into()) }
    }

    /// Helper constructor for listen-mode failures with a driver source.
    pub fn listen(reason: impl Into<String>, source: impl Into<BoxError>) -> Self {
        LinkError::Listen { reason: reason.into(), source: Some(source.into()) }
    }
}

/// A durable log line that does not hold exactly two integer fields.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("log line {line} ({content:?}): {reason}")]
pub struct LogParseError {
    /// 1-based line number in the log file.
    pub line: usize,
    /// The offending line with its terminator stripped.
    pub content: String,
    /// Why the line was rejected.
    pub reason: String,
}

/// Main error type for link operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("radio configuration failed: {reason}")]
    Configuration {
        reason: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    LogParse(#[from] LogParseError),

    #[error("measurement log error: {path}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings error: {details}")]
    Settings { details: String },
}

impl Error {
    /// Returns whether this error must stop the node.
    ///
    /// Only configuration and settings failures are fatal: without a working
    /// radio session there is nothing to retry.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::Configuration { .. } => true,
            Error::Settings { .. } => true,
            Error::Link(_) => false,
            Error::Decode(_) => false,
            Error::LogParse(_) => false,
            Error::Storage { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Error::Configuration { .. } => vec![
                "Check the transceiver wiring and SPI pins",
                "Verify the channel is within 0..=125",
                "Power-cycle the radio module",
            ],
            Error::Link(_) => vec![
                "Check the peer node is powered and on the same channel",
                "Move the nodes closer or raise the power level",
            ],
            Error::Decode(_) => vec![
                "Verify both nodes use the 8-byte frame layout",
                "Check for interference on the configured channel",
            ],
            Error::LogParse(_) => vec![
                "Inspect the measurement log for hand-edited lines",
                "Delete the log to start a fresh history",
            ],
            Error::Storage { .. } => vec![
                "Check the log path is writable",
                "Ensure sufficient storage space",
            ],
            Error::Settings { .. } => vec![
                "Check the settings file is valid YAML",
                "Compare field names with the documented defaults",
            ],
        }
    }

    /// Helper constructor for configuration errors.
    pub fn configuration(reason: impl Into<String>) -> Self {
        Error::Configuration { reason: reason.into(), source: None }
    }

    /// Helper constructor for configuration errors with a driver source.
    pub fn configuration_with_source(reason: impl Into<String>, source: BoxError) -> Self {
        Error::Configuration { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for durable log errors with path context.
    pub fn storage(path: PathBuf, source: std::io::Error) -> Self {
        Error::Storage { path, source }
    }

    /// Helper constructor for settings errors.
    pub fn settings(details: impl Into<String>) -> Self {
        Error::Settings { details: details.into() }
    }
}

impl From<serde_yaml_ng::Error> for Error {
    fn from(err: serde_yaml_ng::Error) -> Self {
        Error::Settings { details: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn messages_carry_their_context(
            reason in "[a-z ]{1,40}",
            actual in 0usize..64,
            line in 1usize..10_000,
        ) {
            let config = Error::configuration(reason.clone());
            prop_assert!(config.to_string().contains(&reason));

            let decode = DecodeError::SizeMismatch { expected: 8, actual };
            prop_assert!(decode.to_string().contains(&actual.to_string()));

            let parse = LogParseError { line, content: reason.clone(), reason: "bad".into() };
            prop_assert!(parse.to_string().contains(&line.to_string()));
        }
    }

    #[test]
    fn only_configuration_class_is_fatal() {
        assert!(Error::configuration("no radio").is_fatal());
        assert!(Error::settings("bad yaml").is_fatal());

        let link: Error = LinkError::Disconnected.into();
        assert!(!link.is_fatal());

        let decode: Error = DecodeError::SizeMismatch { expected: 8, actual: 0 }.into();
        assert!(!decode.is_fatal());

        let storage = Error::storage(
            PathBuf::from("/tmp/log.txt"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!storage.is_fatal());
    }

    #[test]
    fn link_error_keeps_driver_source() {
        let driver = std::io::Error::other("spi timeout");
        let err = LinkError::send("payload rejected", driver);
        let source = std::error::Error::source(&err).expect("source should be chained");
        assert_eq!(source.to_string(), "spi timeout");
    }

    #[test]
    fn recovery_suggestions_are_actionable() {
        let errors = [
            Error::configuration("x"),
            Error::Link(LinkError::Disconnected),
            Error::settings("x"),
        ];
        for error in &errors {
            let suggestions = error.recovery_suggestions();
            assert!(!suggestions.is_empty());
            assert!(suggestions.iter().all(|s| s.len() > 5));
        }
    }

    #[test]
    fn error_is_send_sync_static() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<Error>();
    }
}
