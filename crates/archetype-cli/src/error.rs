// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use archetype_core::ArchetypeError;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Archetype(#[from] ArchetypeError),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    MissingArtifact(String),
}

impl CliError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    pub fn missing(path: &Path, hint: &str) -> Self {
        Self::MissingArtifact(format!("'{}' not found; {hint}", path.display()))
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Archetype(err) => err.code(),
            Self::Io { .. } => "io_error",
            Self::Json { .. } => "json_error",
            Self::InvalidInput(_) => "invalid_input",
            Self::MissingArtifact(_) => "missing_artifact",
        }
    }
}
