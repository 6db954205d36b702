//! Error types for the Docent domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; the top-level `Error`
//! wraps them for call sites that cross contexts.

use thiserror::Error;

/// The top-level error type for all Docent operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Schema errors ---
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    // --- Session store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Retrieval errors ---
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// What went wrong while a tool was executing.
///
/// Distinct from [`ToolError::InvalidInput`]: execution errors happen
/// after the input has already passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExecErrorKind {
    #[error("division by zero")]
    DivisionByZero,

    #[error("non-finite result")]
    NonFinite,

    #[error("upstream failure")]
    Upstream,
}

#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// The input was rejected before any execution took place.
    #[error("Invalid input for {tool}: {reason}")]
    InvalidInput { tool: String, reason: String },

    #[error("Tool execution failed: {tool} ({kind}): {reason}")]
    Execution {
        tool: String,
        kind: ExecErrorKind,
        reason: String,
    },
}

/// Violations of the typed response contracts. Fatal to a turn when
/// raised while composing an answer.
#[derive(Debug, Clone, Error)]
pub enum SchemaError {
    #[error("confidence {0} outside the closed interval [0.0, 1.0]")]
    ConfidenceOutOfRange(f64),

    #[error("required field is empty: {0}")]
    EmptyField(&'static str),

    #[error("malformed {shape} payload: {reason}")]
    Malformed { shape: String, reason: String },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Session record corrupt: {0}")]
    Corrupt(String),
}

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Retrieval failed: {0}")]
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn division_by_zero_is_its_own_kind() {
        let err = ToolError::Execution {
            tool: "calculator".into(),
            kind: ExecErrorKind::DivisionByZero,
            reason: "10 / 0".into(),
        };
        assert!(err.to_string().contains("division by zero"));
        assert!(matches!(
            err,
            ToolError::Execution {
                kind: ExecErrorKind::DivisionByZero,
                ..
            }
        ));
    }

    #[test]
    fn invalid_input_names_the_tool() {
        let err = ToolError::InvalidInput {
            tool: "calculator".into(),
            reason: "unexpected character 'i'".into(),
        };
        assert!(err.to_string().contains("calculator"));
        assert!(err.to_string().contains("unexpected character"));
    }
}
