//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//! Provides error classification for HTTP status mapping and fallback
//! decisions.
//!
//! ## Error Categories
//!
//! - **RateLimit**: provider quota exhausted (maps to 429)
//! - **Auth**: credential rejected by the provider (maps to 401)
//! - **Permission**: model or resource access denied (maps to 403)
//! - **Network**: connectivity failures (maps to 503)
//! - **Unavailable**: provider-side outages (maps to 503)
//! - **ParseError**: unusable provider output (maps to 500)
//!
//! ## Design Principles
//!
//! - Single unified error type (LoomError) for the entire application
//! - Category-based routing: the analysis endpoint maps categories to
//!   distinct HTTP statuses; the tag endpoint collapses every category
//!   into the static fallback
//! - No panic/unwrap - all errors are recoverable

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Error categories for provider failures.
///
/// Classification is best-effort: provider error bodies are matched by
/// substring, so the mapping is advisory diagnostics rather than a
/// contract from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rate limited or quota exhausted
    RateLimit,
    /// Credential rejected - fail fast, don't retry
    Auth,
    /// Model or resource access denied
    Permission,
    /// Network/connectivity issues
    Network,
    /// Provider unavailable
    Unavailable,
    /// Invalid request - fix the request
    BadRequest,
    /// Parsing the provider response failed
    ParseError,
    /// Unknown error
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Permission => write!(f, "PERMISSION"),
            Self::Network => write!(f, "NETWORK"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::ParseError => write!(f, "PARSE_ERROR"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl ErrorCategory {
    /// HTTP status the analysis endpoint reports for this category.
    ///
    /// The tag-generation endpoint never uses this: its failures all
    /// degrade to fallback content inside a 200 response.
    pub fn client_status(&self) -> u16 {
        match self {
            Self::Auth => 401,
            Self::Permission => 403,
            Self::RateLimit => 429,
            Self::Network | Self::Unavailable => 503,
            Self::BadRequest => 400,
            Self::ParseError | Self::Unknown => 500,
        }
    }
}

// =============================================================================
// LLM Error
// =============================================================================

/// Provider error with category and context
#[derive(Debug, Clone)]
pub struct LlmError {
    /// Error category for status mapping
    pub category: ErrorCategory,
    /// Detailed error message
    pub message: String,
    /// Provider that produced the error
    pub provider: Option<String>,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    /// Create a new provider error
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
        }
    }

    /// Create error with provider context
    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            provider: Some(provider.into()),
        }
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Error classifier for provider failure routing
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an error message from the provider
    pub fn classify(message: &str, provider: &str) -> LlmError {
        let lower = message.to_lowercase();

        // Rate limiting patterns
        if lower.contains("rate limit")
            || lower.contains("429")
            || lower.contains("too many requests")
            || lower.contains("quota")
            || lower.contains("resource_exhausted")
        {
            return LlmError::with_provider(ErrorCategory::RateLimit, message, provider);
        }

        // Credential patterns
        if lower.contains("401")
            || lower.contains("api key")
            || lower.contains("invalid key")
            || lower.contains("unauthenticated")
            || lower.contains("unauthorized")
        {
            return LlmError::with_provider(ErrorCategory::Auth, message, provider);
        }

        // Permission patterns
        if lower.contains("403")
            || lower.contains("permission")
            || lower.contains("forbidden")
            || lower.contains("access denied")
        {
            return LlmError::with_provider(ErrorCategory::Permission, message, provider);
        }

        // Network patterns
        if lower.contains("network")
            || lower.contains("connection")
            || lower.contains("dns")
            || lower.contains("timeout")
            || lower.contains("timed out")
            || lower.contains("unreachable")
        {
            return LlmError::with_provider(ErrorCategory::Network, message, provider);
        }

        // Provider outage patterns
        if lower.contains("503")
            || lower.contains("502")
            || lower.contains("service unavailable")
            || lower.contains("500")
            || lower.contains("internal error")
            || lower.contains("overloaded")
        {
            return LlmError::with_provider(ErrorCategory::Unavailable, message, provider);
        }

        // Bad request patterns
        if lower.contains("400") || lower.contains("bad request") || lower.contains("malformed") {
            return LlmError::with_provider(ErrorCategory::BadRequest, message, provider);
        }

        // Parse error patterns
        if lower.contains("parse") || lower.contains("json") || lower.contains("unexpected token") {
            return LlmError::with_provider(ErrorCategory::ParseError, message, provider);
        }

        LlmError::with_provider(ErrorCategory::Unknown, message, provider)
    }

    /// Classify an HTTP status code directly (more accurate than string matching)
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> LlmError {
        match status {
            429 => LlmError::with_provider(ErrorCategory::RateLimit, message, provider),
            401 => LlmError::with_provider(ErrorCategory::Auth, message, provider),
            403 => LlmError::with_provider(ErrorCategory::Permission, message, provider),
            400 => LlmError::with_provider(ErrorCategory::BadRequest, message, provider),
            500 | 502 | 503 | 504 => {
                LlmError::with_provider(ErrorCategory::Unavailable, message, provider)
            }
            _ => LlmError::with_provider(ErrorCategory::Unknown, message, provider),
        }
    }

    /// Classify a LoomError with proper type-based routing
    pub fn classify_loom_error(err: &LoomError, provider: &str) -> LlmError {
        match err {
            LoomError::Io(_) => {
                LlmError::with_provider(ErrorCategory::Network, err.to_string(), provider)
            }
            LoomError::LlmApi(msg) => Self::classify(msg, provider),
            LoomError::Llm(llm_err) => llm_err.clone(),
            LoomError::Json(_) => {
                LlmError::with_provider(ErrorCategory::ParseError, err.to_string(), provider)
            }
            LoomError::Timeout { .. } => {
                LlmError::with_provider(ErrorCategory::Network, err.to_string(), provider)
            }
            _ => LlmError::with_provider(ErrorCategory::Unknown, err.to_string(), provider),
        }
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum LoomError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // LLM Errors
    // -------------------------------------------------------------------------
    /// Structured provider error with category
    #[error("LLM error: {0}")]
    Llm(LlmError),

    /// Simple provider API error (use Llm variant for structured errors)
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// Operation timeout with context
    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Server error: {0}")]
    Server(String),
}

impl From<LlmError> for LoomError {
    fn from(err: LlmError) -> Self {
        LoomError::Llm(err)
    }
}

/// Application-wide result type
pub type Result<T> = std::result::Result<T, LoomError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_rate_limit() {
        let err = ErrorClassifier::classify("Quota exceeded for model", "gemini");
        assert_eq!(err.category, ErrorCategory::RateLimit);
        assert_eq!(err.category.client_status(), 429);
    }

    #[test]
    fn test_classify_auth_vs_permission() {
        let auth = ErrorClassifier::classify("API key not valid", "gemini");
        assert_eq!(auth.category, ErrorCategory::Auth);
        assert_eq!(auth.category.client_status(), 401);

        let perm = ErrorClassifier::classify("Permission denied on model", "gemini");
        assert_eq!(perm.category, ErrorCategory::Permission);
        assert_eq!(perm.category.client_status(), 403);
    }

    #[test]
    fn test_classify_network_maps_to_503() {
        let err = ErrorClassifier::classify("connection refused", "gemini");
        assert_eq!(err.category, ErrorCategory::Network);
        assert_eq!(err.category.client_status(), 503);
    }

    #[test]
    fn test_classify_http_status() {
        let err = ErrorClassifier::classify_http_status(429, "slow down", "gemini");
        assert_eq!(err.category, ErrorCategory::RateLimit);

        let err = ErrorClassifier::classify_http_status(403, "nope", "gemini");
        assert_eq!(err.category, ErrorCategory::Permission);

        let err = ErrorClassifier::classify_http_status(503, "down", "gemini");
        assert_eq!(err.category, ErrorCategory::Unavailable);
    }

    #[test]
    fn test_classify_unknown_is_500() {
        let err = ErrorClassifier::classify("something odd happened", "gemini");
        assert_eq!(err.category, ErrorCategory::Unknown);
        assert_eq!(err.category.client_status(), 500);
    }

    #[test]
    fn test_classify_config_error_is_server_fault() {
        // A misconfigured server is never the client's fault
        let err = ErrorClassifier::classify_loom_error(
            &LoomError::Config("missing credential".to_string()),
            "gemini",
        );
        assert_eq!(err.category, ErrorCategory::Unknown);
        assert_eq!(err.category.client_status(), 500);
    }

    #[test]
    fn test_display_includes_provider() {
        let err = LlmError::with_provider(ErrorCategory::Auth, "bad key", "gemini");
        assert_eq!(err.to_string(), "[gemini:AUTH] bad key");
    }
}
