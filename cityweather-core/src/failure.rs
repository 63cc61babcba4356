use reqwest::StatusCode;
use thiserror::Error;

/// Every way a single weather fetch can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherFailure {
    #[error("bad request (400)")]
    BadRequest,

    #[error("unauthorized (401)")]
    Unauthorized,

    #[error("forbidden (403)")]
    Forbidden,

    #[error("not found (404)")]
    NotFound,

    #[error("server error ({code})")]
    ServerError { code: u16 },

    #[error("gateway error ({code})")]
    GatewayError { code: u16 },

    #[error("connection error")]
    ConnectionError,

    #[error("request timed out")]
    Timeout,

    #[error("too many redirects")]
    TooManyRedirects,

    #[error("HTTP error {code}: {message}")]
    OtherHttpError { code: u16, message: String },

    #[error("request error: {0}")]
    OtherRequestError(String),
}

impl WeatherFailure {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: StatusCode) -> Self {
        Self::from_status_line(status, None)
    }

    /// Classify a non-success HTTP status, keeping the server's own reason
    /// phrase when it sent one that differs from the canonical text.
    pub fn from_status_line(status: StatusCode, reason: Option<&str>) -> Self {
        match status.as_u16() {
            400 => WeatherFailure::BadRequest,
            401 => WeatherFailure::Unauthorized,
            403 => WeatherFailure::Forbidden,
            404 => WeatherFailure::NotFound,
            code @ (500 | 503) => WeatherFailure::ServerError { code },
            code @ (502 | 504) => WeatherFailure::GatewayError { code },
            code => WeatherFailure::OtherHttpError { code, message: status_line(status, reason) },
        }
    }

    /// Classify a transport-level error. A connect error wins over a timeout.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_connect() {
            WeatherFailure::ConnectionError
        } else if err.is_timeout() {
            WeatherFailure::Timeout
        } else if err.is_redirect() {
            WeatherFailure::TooManyRedirects
        } else {
            WeatherFailure::OtherRequestError(err.to_string())
        }
    }
}

fn status_line(status: StatusCode, reason: Option<&str>) -> String {
    match reason.or(status.canonical_reason()) {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}
