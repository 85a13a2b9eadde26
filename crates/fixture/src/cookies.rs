//! Cookie header assembly.

use cookie::Cookie;
use http::header::HeaderValue;

use crate::error::FixtureResult;

/// Join cookies into a single `cookie` request header value.
///
/// Pairs are rendered `name=value` and joined with `"; "`, the shape a
/// browser sends. Attributes (path, expiry, ...) are a response-side concern
/// and never serialized here. Returns `None` when there is nothing to send.
pub fn to_header_value(cookies: &[Cookie<'static>]) -> FixtureResult<Option<HeaderValue>> {
    if cookies.is_empty() {
        return Ok(None);
    }
    let joined = cookies
        .iter()
        .map(|cookie| format!("{}={}", cookie.name(), cookie.value()))
        .collect::<Vec<_>>()
        .join("; ");
    Ok(Some(HeaderValue::from_str(&joined)?))
}
