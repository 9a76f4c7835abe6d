use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Configuration key or cache key that caused the error (e.g., "backend.rest_url", "embeddings:emb:...")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected value, actual response)
    pub details: Option<String>,
    /// Source of the error (e.g., "backend_factory", "rest_store")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the caching and rate-limiting runtime.
///
/// Everything here is an internal condition: public cache methods swallow
/// these and return safe defaults, the backend factory rejects the failing
/// candidate and tries the next one. The rate limiter's over-limit outcome
/// is NOT an error variant; it is the `Rejected` arm of
/// [`crate::limiter::RateLimitDecision`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("Backend connectivity error: {message}{}", format_context(.context))]
    Connectivity {
        message: String,
        context: ErrorContext,
    },

    #[error("Backend consistency error: {message}{}", format_context(.context))]
    Consistency {
        message: String,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a new connectivity error
    pub fn connectivity(msg: impl Into<String>) -> Self {
        Error::Connectivity {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a new connectivity error with structured context
    pub fn connectivity_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Connectivity {
            message: msg.into(),
            context,
        }
    }

    /// Create a new consistency error with structured context
    pub fn consistency_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Consistency {
            message: msg.into(),
            context,
        }
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Connectivity { context, .. }
            | Error::Consistency { context, .. }
            | Error::Configuration { context, .. } => Some(context),
            _ => None,
        }
    }
}
