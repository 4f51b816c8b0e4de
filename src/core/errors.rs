//! Custom error types for the summarize/translate pipeline

use std::fmt;
use thiserror::Error;

/// Which external capability produced a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// The hosted LLM used for summaries
    Summarization,
    /// The translation provider
    Translation,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::Summarization => write!(f, "summarization"),
            Service::Translation => write!(f, "translation"),
        }
    }
}

/// Failures raised by the HTTP adapters talking to external services
#[derive(Error, Debug)]
pub enum ServiceError {
    /// API request failed
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limit exceeded
    #[error("Rate limit exceeded. Retry after {retry_after:?} seconds")]
    RateLimited { retry_after: Option<u64> },

    /// Provider quota exhausted
    #[error("Quota exceeded")]
    QuotaExceeded,

    /// Network error
    #[error("Network error: {message}")]
    Network { message: String },

    /// Invalid response from API
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    /// Request timeout
    #[error("Request timeout")]
    Timeout,
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::Timeout
        } else if err.is_decode() {
            ServiceError::InvalidResponse {
                message: err.to_string(),
            }
        } else {
            ServiceError::Network {
                message: err.to_string(),
            }
        }
    }
}

/// Pipeline errors surfaced to the user
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input text is empty or whitespace only
    #[error("Please enter some text to summarize.")]
    InvalidInput,

    /// Splitting produced no usable segment
    #[error("Text splitting resulted in no valid segments.")]
    NoValidSegments,

    /// Language display name is not part of the supported set
    #[error("Language not found: {name}")]
    LanguageNotFound { name: String },

    /// Credential does not look like an API key
    #[error("Invalid API key: it should start with \"{expected_prefix}\"")]
    InvalidCredential { expected_prefix: String },

    /// Missing required field
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Request body could not be read
    #[error("Malformed request body: {message}")]
    MalformedBody { message: String },

    /// Failure reported by an external capability
    #[error("{service} service error: {source}")]
    ExternalService {
        service: Service,
        #[source]
        source: ServiceError,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl PipelineError {
    /// Wrap a summarization failure
    pub fn summarization(source: ServiceError) -> Self {
        PipelineError::ExternalService {
            service: Service::Summarization,
            source,
        }
    }

    /// Wrap a translation failure
    pub fn translation(source: ServiceError) -> Self {
        PipelineError::ExternalService {
            service: Service::Translation,
            source,
        }
    }

    /// Stable machine-readable code used by the HTTP API
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::InvalidInput => "invalid_input",
            PipelineError::NoValidSegments => "no_valid_segments",
            PipelineError::LanguageNotFound { .. } => "language_not_found",
            PipelineError::InvalidCredential { .. } => "invalid_credential",
            PipelineError::MissingField { .. } => "missing_field",
            PipelineError::MalformedBody { .. } => "malformed_body",
            PipelineError::ExternalService { .. } => "external_service_error",
            PipelineError::Config { .. } => "config_error",
        }
    }

    /// Whether the caller can fix this by changing the request
    pub fn is_request_error(&self) -> bool {
        !matches!(
            self,
            PipelineError::ExternalService { .. } | PipelineError::Config { .. }
        )
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
