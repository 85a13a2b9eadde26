//! Batteries-included request factory for middleware tests.

use std::net::SocketAddr;

use cookie::{Cookie, CookieJar};
use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::error::FixtureResult;
use crate::headers;
use crate::requests::CreatesRequests;
use crate::server::ServerVariables;

/// Harness state shared by every request it creates.
///
/// Configure once with the `with_*` methods, then mint as many requests as
/// the test needs; per-call headers and options layer on top of what is set
/// here. The zero-config default targets `http://localhost` from
/// `127.0.0.1:0` with no extra headers or cookies.
///
/// ```
/// use axum_fixture::{CreatesRequests, TestHarness};
///
/// # fn main() -> axum_fixture::FixtureResult<()> {
/// let harness = TestHarness::new().with_token("tok-123")?;
/// let request = harness.create_get_request("/admin", &[])?;
/// assert_eq!(
///     request.headers().get(http::header::AUTHORIZATION).unwrap(),
///     "Bearer tok-123"
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct TestHarness {
    server: ServerVariables,
    default_headers: HeaderMap,
    cookies: CookieJar,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the server defaults wholesale.
    pub fn with_server_variables(mut self, server: ServerVariables) -> Self {
        self.server = server;
        self
    }

    /// Point relative request targets at a different origin.
    pub fn with_base_url(mut self, base_url: &str) -> FixtureResult<Self> {
        self.server.set_base_url(Url::parse(base_url)?);
        Ok(self)
    }

    /// Peer address every request appears to come from.
    pub fn with_remote_addr(mut self, remote_addr: SocketAddr) -> Self {
        self.server.set_remote_addr(remote_addr);
        self
    }

    /// Header sent with every request. Repeating a name appends.
    pub fn with_header(mut self, name: &str, value: &str) -> FixtureResult<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        let value = HeaderValue::from_str(value)?;
        self.default_headers.append(name, value);
        Ok(self)
    }

    pub fn with_headers<'a>(
        mut self,
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> FixtureResult<Self> {
        for (name, value) in pairs {
            self = self.with_header(name, value)?;
        }
        Ok(self)
    }

    /// Bearer token on every request. Replaces any earlier authorization.
    pub fn with_token(mut self, token: &str) -> FixtureResult<Self> {
        let value = headers::bearer(token)?;
        self.default_headers.insert(header::AUTHORIZATION, value);
        Ok(self)
    }

    /// Basic credentials on every request. Replaces any earlier authorization.
    pub fn with_basic_auth(mut self, username: &str, password: &str) -> FixtureResult<Self> {
        let value = headers::basic_auth(username, password)?;
        self.default_headers.insert(header::AUTHORIZATION, value);
        Ok(self)
    }

    pub fn with_cookie(mut self, cookie: Cookie<'static>) -> Self {
        self.cookies.add(cookie);
        self
    }

    pub fn with_cookies(mut self, jar: CookieJar) -> Self {
        for cookie in jar.iter() {
            self.cookies.add(cookie.clone());
        }
        self
    }

    /// Drop every sticky header configured so far.
    pub fn flush_headers(mut self) -> Self {
        self.default_headers.clear();
        self
    }

    pub fn clear_cookies(mut self) -> Self {
        self.cookies = CookieJar::new();
        self
    }
}

impl CreatesRequests for TestHarness {
    fn server_variables(&self) -> &ServerVariables {
        &self.server
    }

    fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    fn cookie_jar(&self) -> &CookieJar {
        &self.cookies
    }
}
