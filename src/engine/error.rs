use thiserror::Error;

/// Failures of the text, speech or image services.
/// Always surfaced as a warning; the story state is left alone.
#[derive(Debug, Error)]
pub enum GenerationFailure {
    #[error("No API key configured - add openai_api_key to the config file or set OPENAI_API_KEY")]
    MissingApiKey,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GenerationFailure {
    pub fn is_quota(&self) -> bool {
        matches!(self, GenerationFailure::Api { status: 429, .. })
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("The storybook is empty - finish at least one part of the story first")]
    EmptyHistory,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_errors_are_recognised() {
        let quota = GenerationFailure::Api {
            status: 429,
            message: "You exceeded your current quota".into(),
        };
        assert!(quota.is_quota());
        assert!(!GenerationFailure::MissingApiKey.is_quota());
    }

    #[test]
    fn messages_are_readable() {
        let err = GenerationFailure::Api {
            status: 500,
            message: "server error".into(),
        };
        assert_eq!(err.to_string(), "API error 500: server error");
        assert!(ExportError::EmptyHistory.to_string().starts_with("The storybook is empty"));
    }
}
