//! Console error types with fatality classification.
//!
//! [`ConsoleError`] is the central error type for the console. Only a
//! failure to reach the radio is fatal; every other variant is handled
//! where it occurs and drives either continuation or an orderly shutdown.

use std::time::Duration;

/// Result alias used throughout the crate.
pub type Result<T, E = ConsoleError> = std::result::Result<T, E>;

/// Error enum covering every failure the console can observe.
///
/// # Handling
///
/// | Variant            | Raised by            | Outcome                       |
/// |--------------------|----------------------|-------------------------------|
/// | `Connection`       | client construction  | fatal, console never starts   |
/// | `Input`            | line input source    | graceful shutdown             |
/// | `ClientClosed`     | `send_and_wait`      | command loop terminates       |
/// | `Interrupted`      | command loop         | command loop terminates       |
/// | `CommandTimeout`   | bounded command wait | reported inline, loop resumes |
/// | `Output`           | output sink          | logged, line skipped          |
/// | `InvalidUpdate`    | `StateUpdate::new`   | delta rejected                |
/// | `Config`           | startup              | fatal                         |
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// The client could not be constructed or could not reach the radio.
    #[error("cannot connect to radio {address}: {reason}")]
    Connection {
        /// Address that was requested.
        address: String,
        /// Human-readable cause.
        reason: String,
    },

    /// The input source failed or reached end of input.
    #[error("input closed: {0}")]
    Input(String),

    /// The client was closed while a command was outstanding.
    #[error("client closed before command completed")]
    ClientClosed,

    /// The session was stopped by an interrupt.
    #[error("interrupted")]
    Interrupted,

    /// A command did not receive a response within the configured bound.
    #[error("no response after {} ms", .0.as_millis())]
    CommandTimeout(Duration),

    /// Writing a line to the output sink failed.
    #[error("output error: {0}")]
    Output(#[from] std::io::Error),

    /// A state update listed changed keys missing from its snapshot.
    #[error("update for {object} marks unknown keys as changed: {keys:?}")]
    InvalidUpdate {
        /// Object the update refers to.
        object: String,
        /// Keys in `updated_keys` but absent from `current_state`.
        keys: Vec<String>,
    },

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ConsoleError {
    /// Returns `true` if this error must abort the process.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Config(_))
    }

    /// Returns `true` if this error means the command loop should stop.
    #[must_use]
    pub const fn ends_session(&self) -> bool {
        matches!(
            self,
            Self::Input(_) | Self::ClientClosed | Self::Interrupted
        )
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn only_connection_and_config_are_fatal() {
        let conn = ConsoleError::Connection {
            address: "10.0.0.9".to_string(),
            reason: "refused".to_string(),
        };
        assert!(conn.is_fatal());
        assert!(ConsoleError::Config("bad".to_string()).is_fatal());
        assert!(!ConsoleError::Input("eof".to_string()).is_fatal());
        assert!(!ConsoleError::ClientClosed.is_fatal());
    }

    #[test]
    fn session_ending_variants() {
        assert!(ConsoleError::Input("eof".to_string()).ends_session());
        assert!(ConsoleError::ClientClosed.ends_session());
        assert!(ConsoleError::Interrupted.ends_session());
        assert!(!ConsoleError::Interrupted.is_fatal());
        assert!(!ConsoleError::CommandTimeout(Duration::from_millis(5)).ends_session());
    }

    #[test]
    fn timeout_message_reports_millis() {
        let err = ConsoleError::CommandTimeout(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "no response after 1500 ms");
    }
}
