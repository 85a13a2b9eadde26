//! Fixture error model.

use thiserror::Error;

/// Result type used across the fixture layer.
pub type FixtureResult<T> = Result<T, FixtureError>;

/// Anything that can go wrong while assembling a synthetic request.
///
/// Keep this focused on deterministic assembly failures (bad targets, bad
/// header text, conflicting bodies). Nothing here involves IO.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The request target (or a configured base URL) did not parse.
    #[error("invalid request target: {0}")]
    Target(#[from] url::ParseError),

    /// A header name was not a valid HTTP token.
    #[error("invalid header name: {0}")]
    HeaderName(#[from] http::header::InvalidHeaderName),

    /// A header value carried bytes HTTP does not allow.
    #[error("invalid header value: {0}")]
    HeaderValue(#[from] http::header::InvalidHeaderValue),

    /// The final builder pass rejected the assembled parts.
    #[error("request assembly failed: {0}")]
    Assembly(#[from] http::Error),

    /// A JSON payload failed to serialize.
    #[error("json body encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Form fields failed to urlencode.
    #[error("form body encoding failed: {0}")]
    UrlEncoded(#[from] serde_urlencoded::ser::Error),

    /// Raw content was supplied alongside something else that wants the body.
    #[error("raw body content cannot be combined with {0}")]
    BodyConflict(&'static str),
}

impl FixtureError {
    pub fn body_conflict(what: &'static str) -> Self {
        Self::BodyConflict(what)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_error_wraps_url_parse_failure() {
        let err = url::Url::parse("not a url").unwrap_err();
        let wrapped = FixtureError::from(err);
        assert!(matches!(wrapped, FixtureError::Target(_)));
        assert!(wrapped.to_string().starts_with("invalid request target"));
    }

    #[test]
    fn body_conflict_names_the_offender() {
        let err = FixtureError::body_conflict("form parameters");
        assert_eq!(
            err.to_string(),
            "raw body content cannot be combined with form parameters"
        );
    }
}
