use axum::http::StatusCode;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("metrics store credentials must be set in production (METRICS_STORE_URL, METRICS_STORE_KEY)")]
    MissingStore,
    #[error("backend configuration must be set in production (BACKEND_URL, BACKEND_API_KEY)")]
    MissingBackend,
    #[error("invalid PORT value '{0}'")]
    InvalidPort(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("metrics store request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("metrics store returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error(
        "Backend configuration missing. Please set BACKEND_URL and BACKEND_API_KEY environment variables."
    )]
    MissingConfig,
    #[error("Backend unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),
    #[error("Backend call failed: {status} - {body}")]
    Backend {
        status: reqwest::StatusCode,
        body: String,
    },
}
