// ---------------------------------------------------------------------------
// Error types for loading configuration, catalog lookups and anchor creation
// ---------------------------------------------------------------------------

use std::fmt;

use crate::catalog::ToolId;

/// Errors that can occur while loading parameters or a tool catalog.
#[derive(Debug)]
pub enum LoadError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The file is not valid JSON for the expected shape.
    Parse(String),
    /// The file parsed but its contents are unusable.
    Invalid(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "I/O error: {e}"),
            LoadError::Parse(msg) => write!(f, "Parse error: {msg}"),
            LoadError::Invalid(msg) => write!(f, "Invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Io(e)
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        LoadError::Parse(e.to_string())
    }
}

/// A tool id that is not present in the injected catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownTool(pub ToolId);

impl fmt::Display for UnknownTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No tool with id {} in the catalog", self.0)
    }
}

impl std::error::Error for UnknownTool {}

/// Why the rendering subsystem could not create an anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateError {
    /// The renderer has no room for another anchor.
    ResourceExhausted,
    /// The requested pose cannot be anchored (non-finite, degenerate rotation).
    InvalidPose,
    Backend(String),
}

impl fmt::Display for CreateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreateError::ResourceExhausted => write!(f, "rendering resources exhausted"),
            CreateError::InvalidPose => write!(f, "invalid pose"),
            CreateError::Backend(msg) => write!(f, "renderer error: {msg}"),
        }
    }
}

impl std::error::Error for CreateError {}
