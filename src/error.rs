pub type AppResult<T> = Result<T, AppError>;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },
    #[error("transport failure for {url}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("server returned status {status} for {url}")]
    Status { status: u16, url: String },
    #[error("failed to decode response: {context}")]
    Decode {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl From<std::io::Error> for AppError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            context: "I/O operation failed".to_string(),
        }
    }
}

impl AppError {
    pub fn io_with_context(source: std::io::Error, context: impl Into<String>) -> Self {
        Self::Io {
            source,
            context: context.into(),
        }
    }

    pub fn transport(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            url: url.into(),
            source: Box::new(source),
        }
    }

    pub fn status(status: u16, url: impl Into<String>) -> Self {
        Self::Status {
            status,
            url: url.into(),
        }
    }

    pub fn decode(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Decode {
            context: context.into(),
            source: Box::new(source),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }

    /// True for failures that arrived from the network rather than from
    /// argument validation. Rollback and fallback paths only ever see these.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Status { .. } | Self::Decode { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::AppError;

    #[test]
    fn status_error_reports_code_and_url() {
        let err = AppError::status(502, "/ajax_request/new_molts");
        assert!(matches!(err, AppError::Status { status: 502, .. }));
        assert_eq!(
            err.to_string(),
            "server returned status 502 for /ajax_request/new_molts"
        );
        assert!(err.is_remote());
    }

    #[test]
    fn invalid_argument_is_not_remote() {
        let err = AppError::invalid_argument("empty molt");
        assert!(!err.is_remote());
    }
}
