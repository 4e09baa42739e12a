use thiserror::Error;

/// Failure of a call to the Ads API or the report download endpoint.
///
/// The platform detail is kept as received; callers forward it, they never
/// reclassify it.
#[derive(Error, Debug)]
pub enum RemoteCallError {
    /// Transport-level failure (connect, TLS, body read).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The platform answered with a non-2xx status.
    #[error("Ads API error ({status}): {body}")]
    Api { status: u16, body: String },
    /// A 2xx answer whose body did not have the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl RemoteCallError {
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteCallError::Api { status, .. } => Some(*status),
            RemoteCallError::Request(e) => e.status().map(|s| s.as_u16()),
            RemoteCallError::Decode(_) => None,
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            RemoteCallError::Api { body, .. } => Some(body),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RemoteCallError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_keeps_platform_detail() {
        let err = RemoteCallError::Api {
            status: 400,
            body: "RateExceededError".into(),
        };
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.body(), Some("RateExceededError"));
        assert_eq!(err.to_string(), "Ads API error (400): RateExceededError");
    }
}
