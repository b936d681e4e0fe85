//! Static access gate in front of the roster.
//!
//! This is a convenience lock screen, not authentication: the code is a
//! constant shipped with the binary.

/// Access code of the lock screen.
pub const DEFAULT_ACCESS_CODE: &str = "2808";

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    #[error("incorrect access code")]
    IncorrectPassword,
}

/// Compares user input against a fixed access code.
#[derive(Debug, Clone)]
pub struct AccessGate {
    code: String,
}

impl Default for AccessGate {
    fn default() -> Self {
        Self::new(DEFAULT_ACCESS_CODE)
    }
}

impl AccessGate {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }

    /// Accepts `input` only when it equals the code exactly.
    pub fn verify(&self, input: &str) -> Result<(), GateError> {
        if input == self.code {
            Ok(())
        } else {
            Err(GateError::IncorrectPassword)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AccessGate, GateError};

    #[test]
    fn default_gate_accepts_only_the_static_code() {
        let gate = AccessGate::default();
        assert!(gate.verify("2808").is_ok());
        assert_eq!(gate.verify("0000"), Err(GateError::IncorrectPassword));
        assert_eq!(gate.verify(""), Err(GateError::IncorrectPassword));
    }

    #[test]
    fn surrounding_whitespace_is_not_ignored() {
        let gate = AccessGate::default();
        assert_eq!(gate.verify(" 2808"), Err(GateError::IncorrectPassword));
        assert_eq!(gate.verify("2808\n"), Err(GateError::IncorrectPassword));
    }

    #[test]
    fn custom_code_replaces_default() {
        let gate = AccessGate::new("1234");
        assert!(gate.verify("1234").is_ok());
        assert!(gate.verify("2808").is_err());
    }
}
