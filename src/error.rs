//! Error types for pose streaming, recording and playback.
//!
//! All errors implement the `std::error::Error` trait and carry structured
//! context for logging and recovery decisions.
//!
//! ## Error Categories
//!
//! - **Network Errors**: Socket bind, receive and send failures
//! - **Wire Errors**: Datagrams that do not decode as a pose snapshot
//! - **File Errors**: Clip files that cannot be read or written
//! - **Parse Errors**: Clip or configuration documents with invalid structure
//! - **State Errors**: Engine operations issued in the wrong state
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use posecast::PoseError;
//!
//! let error = PoseError::malformed_packet("declared 91 joints, 12 bytes present");
//! assert!(error.is_retryable());
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```
//!
//! ## Helper Constructors
//!
//! ```rust
//! use posecast::PoseError;
//! use std::path::PathBuf;
//!
//! let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
//! let file_error = PoseError::file_error(PathBuf::from("/clips/take1.yaml"), io_err);
//!
//! let parse_error = PoseError::parse("clip document", "missing field `frameRate`");
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pose operations.
pub type Result<T, E = PoseError> = std::result::Result<T, E>;

/// Main error type for pose operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PoseError {
    #[error("Failed to bind UDP port {port}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to receive pose packet")]
    Receive {
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed pose packet: {details}")]
    MalformedPacket { details: String },

    #[error("File error: {}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Clip contains no frames")]
    EmptyClip,

    #[error("Invalid frame rate {rate}: must be finite and greater than zero")]
    InvalidFrameRate { rate: f32 },

    #[error("Cannot {operation} while {state}")]
    InvalidState { operation: &'static str, state: &'static str },

    #[error("Failed to send pose packet to {target}")]
    Send {
        target: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {details}")]
    Config { details: String },
}

impl PoseError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            PoseError::Bind { .. } => false,
            PoseError::Receive { .. } => true,
            PoseError::MalformedPacket { .. } => true,
            PoseError::File { .. } => false,
            PoseError::Parse { .. } => false,
            PoseError::EmptyClip => false,
            PoseError::InvalidFrameRate { .. } => false,
            PoseError::InvalidState { .. } => false,
            PoseError::Send { .. } => true,
            PoseError::Config { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            PoseError::Bind { .. } => vec![
                "Check that no other process is listening on the port",
                "Choose a different listen port in the configuration",
                "Verify permissions for binding low-numbered ports",
            ],
            PoseError::Receive { .. } => vec![
                "Check the local network interface is up",
                "Check firewall rules for the listen port",
            ],
            PoseError::MalformedPacket { .. } => vec![
                "Verify sender and receiver use the same joint layout",
                "Check that the sender writes little-endian values",
                "Ignore isolated packets; the next datagram replaces this one",
            ],
            PoseError::File { .. } => vec![
                "Check file exists and is readable",
                "Ensure the destination directory exists",
                "Ensure sufficient disk space",
                "Check file permissions",
            ],
            PoseError::Parse { .. } => vec![
                "Check the document is a clip written by a compatible recorder",
                "Verify the file was not truncated during a write",
            ],
            PoseError::EmptyClip => vec![
                "Record for longer than one sampling period",
                "Check the recording frame rate",
            ],
            PoseError::InvalidFrameRate { .. } => {
                vec!["Use a positive frame rate such as 30 or 60 Hz"]
            }
            PoseError::InvalidState { .. } => vec![
                "Check the engine state before issuing the operation",
                "Stop the current session before starting a new one",
            ],
            PoseError::Send { .. } => vec![
                "Verify the receiver address is reachable",
                "Check the local network interface is up",
            ],
            PoseError::Config { .. } => vec![
                "Check configuration values against their documented ranges",
                "Remove the field to fall back to its default",
            ],
        }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        PoseError::File { path, source }
    }

    /// Helper constructor for malformed datagrams.
    pub fn malformed_packet(details: impl Into<String>) -> Self {
        PoseError::MalformedPacket { details: details.into() }
    }

    /// Helper constructor for document parse failures.
    pub fn parse(context: impl Into<String>, details: impl Into<String>) -> Self {
        PoseError::Parse { context: context.into(), details: details.into() }
    }

    /// Helper constructor for operations issued in the wrong state.
    pub fn invalid_state(operation: &'static str, state: &'static str) -> Self {
        PoseError::InvalidState { operation, state }
    }

    /// Helper constructor for configuration errors.
    pub fn config(details: impl Into<String>) -> Self {
        PoseError::Config { details: details.into() }
    }
}

impl From<std::io::Error> for PoseError {
    fn from(err: std::io::Error) -> Self {
        PoseError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}

impl From<serde_yaml_ng::Error> for PoseError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        PoseError::Parse { context: "YAML document".to_string(), details: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
          #[test]
          fn error_messages_carry_their_context(
            details in ".*",
            context in "\\w+",
            port in 1u16..u16::MAX,
            rate in -100.0f32..0.0f32
          ) {
            let malformed = PoseError::malformed_packet(details.clone());
            prop_assert!(malformed.to_string().contains(&details));

            let parse = PoseError::parse(context.clone(), details.clone());
            let parse_msg = parse.to_string();
            prop_assert!(parse_msg.contains(&context));
            prop_assert!(parse_msg.contains(&details));

            let bind = PoseError::Bind {
                port,
                source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use"),
            };
            prop_assert!(bind.to_string().contains(&port.to_string()));

            let invalid_rate = PoseError::InvalidFrameRate { rate };
            prop_assert!(!invalid_rate.to_string().is_empty());
          }

          #[test]
          fn io_conversion_preserves_message(reason in ".*") {
            let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, reason.clone());
            let converted: PoseError = io_err.into();
            match converted {
              PoseError::File { source, .. } => {
                prop_assert_eq!(source.to_string(), reason);
              }
              _ => prop_assert!(false, "Expected File error from io::Error conversion"),
            }
          }
        }
    }

    #[test]
    fn error_traits_validation() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<PoseError>();

        let error = PoseError::EmptyClip;
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn bind_error_exposes_source() {
        let error = PoseError::Bind {
            port: 8080,
            source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use"),
        };
        let source = std::error::Error::source(&error).expect("bind error should chain its cause");
        assert_eq!(source.to_string(), "address in use");
    }

    #[test]
    fn receive_error_is_a_network_error() {
        let error = PoseError::Receive {
            source: std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset"),
        };
        assert_eq!(error.to_string(), "Failed to receive pose packet");
        assert!(!error.to_string().contains("File"));
        assert!(error.is_retryable());
        assert!(!error.recovery_suggestions().is_empty());

        let source = std::error::Error::source(&error).expect("receive error should chain its cause");
        assert_eq!(source.to_string(), "connection reset");
    }

    #[test]
    fn recovery_methods_work() {
        let malformed = PoseError::malformed_packet("short");
        let bind = PoseError::Bind {
            port: 8080,
            source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use"),
        };
        let state = PoseError::invalid_state("step forward", "stopped");

        assert!(malformed.is_retryable());
        assert!(!bind.is_retryable());
        assert!(!state.is_retryable());

        for error in [&malformed, &bind, &state, &PoseError::EmptyClip] {
            let suggestions = error.recovery_suggestions();
            assert!(!suggestions.is_empty());
            for suggestion in suggestions {
                assert!(suggestion.len() > 5);
            }
        }
    }

    #[test]
    fn yaml_errors_become_parse_errors() {
        let yaml_err = serde_yaml_ng::from_str::<u32>("not: [a number").unwrap_err();
        let error: PoseError = yaml_err.into();
        assert!(matches!(error, PoseError::Parse { .. }));
    }
}
