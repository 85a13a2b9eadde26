//! Server-side defaults applied to every assembled request.
//!
//! A real listener would contribute these from the connection itself: the
//! origin requests resolve against, the peer address, and the headers a
//! client always sends. Synthetic requests get them from [`ServerVariables`]
//! instead, with [`ServerOverrides`] layering call-site changes on top.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::error::FixtureResult;
use crate::headers::overlay;

/// Origin used when a request target is relative and nothing else is set.
pub const DEFAULT_BASE_URL: &str = "http://localhost";

const DEFAULT_USER_AGENT: &str = concat!("axum-fixture/", env!("CARGO_PKG_VERSION"));

/// Baseline state every synthetic request starts from.
#[derive(Debug, Clone)]
pub struct ServerVariables {
    base_url: Url,
    remote_addr: SocketAddr,
    headers: HeaderMap,
}

impl ServerVariables {
    pub fn new() -> Self {
        // The literal is a known-good URL; parse cannot fail.
        let base_url = Url::parse(DEFAULT_BASE_URL).expect("default base url parses");

        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("localhost"));
        headers.insert(header::USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
        headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));

        Self {
            base_url,
            remote_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0),
            headers,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Change the origin relative targets resolve against.
    ///
    /// The `host` header tracks the new origin, including any explicit port.
    pub fn set_base_url(&mut self, base_url: Url) {
        if let Some(host) = host_header(&base_url) {
            self.headers.insert(header::HOST, host);
        }
        self.base_url = base_url;
    }

    pub fn set_remote_addr(&mut self, remote_addr: SocketAddr) {
        self.remote_addr = remote_addr;
    }

    /// Add or replace one baseline header.
    pub fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Resolve a request target against these defaults.
    ///
    /// Absolute `http`/`https` targets pass through untouched. Anything else
    /// is treated as a path, given a leading slash if missing, and joined to
    /// the base URL. Query strings on the target survive the join.
    pub fn prepare_url(&self, target: &str) -> FixtureResult<Url> {
        if target.starts_with("http://") || target.starts_with("https://") {
            return Ok(Url::parse(target)?);
        }
        if target.starts_with('/') {
            return Ok(self.base_url.join(target)?);
        }
        Ok(self.base_url.join(&format!("/{target}"))?)
    }

    /// Copy of these defaults with `overrides` applied on top.
    ///
    /// Scalar overrides replace; override headers replace same-named defaults
    /// and keep everything else.
    pub fn merged(&self, overrides: &ServerOverrides) -> ServerVariables {
        let mut merged = self.clone();
        if let Some(base_url) = &overrides.base_url {
            merged.set_base_url(base_url.clone());
        }
        if let Some(remote_addr) = overrides.remote_addr {
            merged.remote_addr = remote_addr;
        }
        overlay(&mut merged.headers, &overrides.headers);
        merged
    }
}

impl Default for ServerVariables {
    fn default() -> Self {
        Self::new()
    }
}

/// Call-site deviations from the harness defaults for a single request.
#[derive(Debug, Clone, Default)]
pub struct ServerOverrides {
    pub base_url: Option<Url>,
    pub remote_addr: Option<SocketAddr>,
    pub headers: HeaderMap,
}

fn host_header(url: &Url) -> Option<HeaderValue> {
    let host = url.host_str()?;
    let text = match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };
    HeaderValue::from_str(&text).ok()
}
