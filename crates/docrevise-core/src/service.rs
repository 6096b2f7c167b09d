//! Contract with the external text-transformation service
//!
//! The core treats the service as an opaque `(text, instruction, context)
//! -> new_text` function. Retries, timeouts and transport details belong
//! to the implementor.

use thiserror::Error;

/// One transformation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformRequest<'a> {
    /// Paragraph text to transform
    pub text: &'a str,
    /// User instruction
    pub instruction: &'a str,
    /// Preceding paragraph texts, oldest first
    pub context: &'a [String],
    /// Language hint for the response
    pub detected_language: Option<&'a str>,
}

impl<'a> TransformRequest<'a> {
    /// Request without context or language hint
    pub fn new(text: &'a str, instruction: &'a str) -> Self {
        Self {
            text,
            instruction,
            context: &[],
            detected_language: None,
        }
    }

    /// Attach preceding paragraphs
    pub fn with_context(mut self, context: &'a [String]) -> Self {
        self.context = context;
        self
    }

    /// Attach a language hint
    pub fn with_language(mut self, language: Option<&'a str>) -> Self {
        self.detected_language = language;
        self
    }
}

/// Failure of the text-transformation service
#[derive(Error, Debug)]
pub enum ServiceError {
    /// No credentials were available
    #[error("missing credentials: environment variable {0} is not set")]
    MissingCredentials(String),

    /// The service could not be reached or timed out
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The service answered with an error status
    #[error("service rejected the request ({status}): {message}")]
    Rejected {
        /// HTTP-like status code
        status: u16,
        /// Message returned by the service
        message: String,
    },

    /// The response could not be interpreted
    #[error("invalid service response: {0}")]
    InvalidResponse(String),
}

impl ServiceError {
    /// Create an unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create an invalid response error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }
}

/// Something that rewrites paragraph text following an instruction
pub trait TextTransformer {
    /// Returns the transformed text, or an error when no result could be
    /// produced. An empty string means "no change".
    fn transform(&mut self, request: &TransformRequest<'_>) -> Result<String, ServiceError>;
}

impl<F> TextTransformer for F
where
    F: FnMut(&TransformRequest<'_>) -> Result<String, ServiceError>,
{
    fn transform(&mut self, request: &TransformRequest<'_>) -> Result<String, ServiceError> {
        self(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_is_a_transformer() {
        let mut upper = |req: &TransformRequest<'_>| Ok(req.text.to_uppercase());
        let request = TransformRequest::new("bonjour", "shout");
        assert_eq!(upper.transform(&request).unwrap(), "BONJOUR");
    }

    #[test]
    fn test_request_builders() {
        let context = vec!["Avant.".to_string()];
        let request = TransformRequest::new("texte", "corrige")
            .with_context(&context)
            .with_language(Some("fr"));
        assert_eq!(request.context, ["Avant.".to_string()]);
        assert_eq!(request.detected_language, Some("fr"));
    }

    #[test]
    fn test_error_display() {
        let err = ServiceError::Rejected {
            status: 429,
            message: "rate limited".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "service rejected the request (429): rate limited"
        );
        assert!(ServiceError::MissingCredentials("OPENAI_API_KEY".into())
            .to_string()
            .contains("OPENAI_API_KEY"));
    }
}
