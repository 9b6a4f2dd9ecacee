//! Structured error types for the Platen rendering engine.
//!
//! Three variants cover the real error sources: JSON parsing, font metric
//! loading, and render-time failures that prevent a complete artifact.

use std::fmt;

/// The unified error type returned by all public Platen API functions.
#[derive(Debug)]
pub enum PlatenError {
    /// JSON input failed to parse as a valid render request.
    ParseError {
        source: serde_json::Error,
        hint: String,
    },
    /// A font could not be parsed for measurement.
    FontError(String),
    /// The render could not produce a complete artifact.
    RenderError(String),
}

impl fmt::Display for PlatenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatenError::ParseError { source, hint } => {
                write!(f, "Failed to parse request: {}", source)?;
                if !hint.is_empty() {
                    write!(f, "\n  Hint: {}", hint)?;
                }
                Ok(())
            }
            PlatenError::FontError(msg) => write!(f, "Font error: {}", msg),
            PlatenError::RenderError(msg) => write!(f, "Render error: {}", msg),
        }
    }
}

impl std::error::Error for PlatenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlatenError::ParseError { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PlatenError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the request schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input — is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        PlatenError::ParseError { source: e, hint }
    }
}
