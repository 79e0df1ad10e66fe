//! Common error types for Mosaic components.

use thiserror::Error;

/// Common errors across Mosaic components
#[derive(Debug, Error)]
pub enum MosaicError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// No template matched the requested name(s)
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// Template source or structure is invalid, or nothing matched a partial render
    #[error("Template syntax error: {0}")]
    TemplateSyntax(String),

    /// Rendering a template failed
    #[error("Render error: {0}")]
    Render(String),

    /// A named block is absent from the whole inheritance chain
    #[error("Block not found: {0}")]
    BlockNotFound(String),

    /// Captcha generation error
    #[error("CAPTCHA error: {0}")]
    Captcha(String),

    /// Invalid input/request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MosaicError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Config(_) => 500,
            Self::TemplateNotFound(_) => 404,
            Self::TemplateSyntax(_) => 500,
            Self::Render(_) => 500,
            Self::BlockNotFound(_) => 404,
            Self::Captcha(_) => 503,
            Self::InvalidInput(_) => 400,
            Self::Internal(_) => 500,
        }
    }

    /// Returns true if this error should be retried
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Captcha(_))
    }

    /// Short machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::TemplateNotFound(_) => "TEMPLATE_NOT_FOUND",
            Self::TemplateSyntax(_) => "TEMPLATE_SYNTAX",
            Self::Render(_) => "RENDER",
            Self::BlockNotFound(_) => "BLOCK_NOT_FOUND",
            Self::Captcha(_) => "CAPTCHA",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Internal(_) => "INTERNAL",
        }
    }
}
