// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use thiserror::Error;

/// Error type shared by every archetype pipeline crate.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ArchetypeError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("numerical issue: {0}")]
    NumericalIssue(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("not supported: {0}")]
    NotSupported(String),
}

impl ArchetypeError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn numerical_issue(msg: impl Into<String>) -> Self {
        Self::NumericalIssue(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn not_supported(msg: impl Into<String>) -> Self {
        Self::NotSupported(msg.into())
    }

    /// Stable machine-readable code for structured error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::NumericalIssue(_) => "numerical_issue",
            Self::Config(_) => "config_error",
            Self::NotSupported(_) => "not_supported",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ArchetypeError;

    #[test]
    fn display_prefixes_variant_kind() {
        assert_eq!(
            ArchetypeError::invalid_input("empty corpus").to_string(),
            "invalid input: empty corpus"
        );
        assert_eq!(
            ArchetypeError::config("min_k must be >= 2; got 1").to_string(),
            "configuration error: min_k must be >= 2; got 1"
        );
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(ArchetypeError::invalid_input("x").code(), "invalid_input");
        assert_eq!(ArchetypeError::numerical_issue("x").code(), "numerical_issue");
        assert_eq!(ArchetypeError::config("x").code(), "config_error");
        assert_eq!(ArchetypeError::not_supported("x").code(), "not_supported");
    }
}
