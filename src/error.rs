use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Failures talking to the marketplace API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("building http client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("sending request: {source}")]
    Request {
        #[source]
        source: reqwest::Error,
        timeout: bool,
    },

    #[error("upstream responded with {status}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("decoding upstream response: {0}")]
    Decode(#[source] reqwest::Error),
}

impl UpstreamError {
    pub fn request(source: reqwest::Error) -> Self {
        let timeout = source.is_timeout();
        Self::Request { source, timeout }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Request { timeout: true, .. })
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Collection symbol '{0}' not found.")]
    NotFound(String),

    #[error("Loading collection failed: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Collection symbol '{symbol}' has more than {pages} pages.")]
    TooLarge { symbol: String, pages: usize },
}

impl FetchError {
    /// Label used for the failure metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Upstream(_) => "upstream",
            Self::TooLarge { .. } => "too_large",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Collection symbol '{0}' can not be used as a file name.")]
    InvalidName(String),

    #[error("Writing {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serializing collection: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid bind address {0:?}")]
    BindAddress(String),
}

/// Startup and serving failures of the binary.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("registering metrics: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("serving http: {0}")]
    Serve(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Everything a handler can fail with, mapped onto a status code and a
/// `{"error": ...}` body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    /// Label used for the failure metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Fetch(e) => e.reason(),
            Self::Store(_) => "store",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Fetch(FetchError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Fetch(FetchError::Upstream(e)) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            Self::Fetch(FetchError::Upstream(_)) => StatusCode::BAD_GATEWAY,
            Self::Fetch(FetchError::TooLarge { .. }) => StatusCode::BAD_GATEWAY,
            Self::Store(StoreError::InvalidName(_)) => StatusCode::BAD_REQUEST,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<UpstreamError> for ApiError {
    fn from(value: UpstreamError) -> Self {
        Self::Fetch(FetchError::Upstream(value))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message() {
        let err = FetchError::NotFound("nonexistent".to_string());
        assert_eq!(err.to_string(), "Collection symbol 'nonexistent' not found.");
        assert_eq!(err.reason(), "not_found");
    }

    #[test]
    fn api_reasons() {
        assert_eq!(ApiError::from(StoreError::InvalidName("..".into())).reason(), "store");
        assert_eq!(
            ApiError::from(UpstreamError::Status {
                status: reqwest::StatusCode::BAD_GATEWAY,
                body: String::new(),
            })
            .reason(),
            "upstream"
        );
    }

    #[tokio::test]
    async fn timeout_maps_to_gateway_timeout() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(3)))
            .mount(&server)
            .await;

        let source = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(200))
            .build()
            .unwrap()
            .get(server.uri())
            .send()
            .await
            .unwrap_err();

        let err = ApiError::from(UpstreamError::request(source));
        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.reason(), "upstream");
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            ApiError::from(FetchError::NotFound("x".into())).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(UpstreamError::Status {
                status: reqwest::StatusCode::UNAUTHORIZED,
                body: String::new(),
            })
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(FetchError::TooLarge {
                symbol: "x".into(),
                pages: 3
            })
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(StoreError::InvalidName("..".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(StoreError::Io {
                path: PathBuf::from("x"),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            })
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
