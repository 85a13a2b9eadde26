//! Header normalization for synthetic requests.
//!
//! Call sites hand headers over as plain string pairs; everything here turns
//! those into typed [`HeaderMap`] entries merged over harness defaults.

use base64::{engine::general_purpose, Engine as _};
use http::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::FixtureResult;

/// Merge call-site header pairs over a set of default headers.
///
/// The first occurrence of a name in `pairs` replaces any default of that
/// name; repeated occurrences append, so multi-valued headers come through
/// intact. Defaults the pairs never mention survive as-is.
pub fn transform_pairs(defaults: &HeaderMap, pairs: &[(&str, &str)]) -> FixtureResult<HeaderMap> {
    let mut merged = defaults.clone();
    let mut replaced: Vec<HeaderName> = Vec::with_capacity(pairs.len());

    for (name, value) in pairs {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        let value = HeaderValue::from_str(value)?;
        if !replaced.contains(&name) {
            merged.remove(&name);
            replaced.push(name.clone());
        }
        merged.append(name, value);
    }

    Ok(merged)
}

/// Replace every `src`-named header in `dst`, then copy all `src` values in.
///
/// Same-name values in `dst` are dropped rather than appended to, so `src`
/// fully owns any name it mentions. Multi-valued `src` names stay multi.
pub fn overlay(dst: &mut HeaderMap, src: &HeaderMap) {
    for name in src.keys() {
        dst.remove(name);
    }
    for (name, value) in src {
        dst.append(name.clone(), value.clone());
    }
}

/// `authorization` value carrying a bearer token.
pub fn bearer(token: &str) -> FixtureResult<HeaderValue> {
    Ok(HeaderValue::from_str(&format!("Bearer {token}"))?)
}

/// `authorization` value carrying basic credentials.
pub fn basic_auth(username: &str, password: &str) -> FixtureResult<HeaderValue> {
    let encoded = general_purpose::STANDARD.encode(format!("{username}:{password}"));
    Ok(HeaderValue::from_str(&format!("Basic {encoded}"))?)
}
