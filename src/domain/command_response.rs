//! Correlated replies to synchronous commands.

/// Reply to a single command, correlated by serial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    /// Serial of the command this response answers.
    pub serial: u32,
    /// Radio status code; `0` means success.
    pub error_code: u32,
    /// Optional payload text; empty when the radio sent none.
    pub body: String,
}

impl CommandResponse {
    /// Creates a successful response with no body.
    #[must_use]
    pub fn ok(serial: u32) -> Self {
        Self {
            serial,
            error_code: 0,
            body: String::new(),
        }
    }

    /// Returns `true` if the radio reported a nonzero status.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error_code != 0
    }

    /// Status code as eight upper-case hex digits.
    #[must_use]
    pub fn error_code_hex(&self) -> String {
        format!("{:08X}", self.error_code)
    }
}
