//! Request construction: one assembling primitive, many verb-flavored wrappers.

use axum::body::Body;
use axum::extract::ConnectInfo;
use bytes::Bytes;
use cookie::{Cookie, CookieJar};
use http::header::{self, HeaderMap, HeaderValue};
use http::{Method, Request};
use serde::Serialize;
use serde_json::json;
use url::Url;

use crate::cookies;
use crate::error::{FixtureError, FixtureResult};
use crate::files::{self, FilePart};
use crate::form::FormData;
use crate::headers;
use crate::server::{ServerOverrides, ServerVariables};

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Everything [`CreatesRequests::create_request`] needs for one request.
///
/// `..Default::default()` fills whatever a call site does not care about;
/// the default is a bare `GET /`.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub uri: String,
    pub params: FormData,
    pub cookies: Vec<Cookie<'static>>,
    pub files: Vec<FilePart>,
    pub server: ServerOverrides,
    pub content: Option<Bytes>,
}

impl RequestOptions {
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            ..Self::default()
        }
    }
}

/// Builds fully-formed [`Request`]s for handing straight to middleware or a
/// router under test, no listener involved.
///
/// Implementors supply three pieces of state (the server defaults, the
/// sticky headers, the cookie jar); everything else is a provided method.
/// The normalization hooks ([`transform_headers`], [`cookies_for_request`],
/// [`extract_files`], [`prepare_url`]) have defaults that fit most tests and
/// can be overridden one at a time when a suite needs different rules.
///
/// [`transform_headers`]: CreatesRequests::transform_headers
/// [`cookies_for_request`]: CreatesRequests::cookies_for_request
/// [`extract_files`]: CreatesRequests::extract_files
/// [`prepare_url`]: CreatesRequests::prepare_url
pub trait CreatesRequests {
    /// Baseline server state requests start from.
    fn server_variables(&self) -> &ServerVariables;

    /// Headers applied to every request before per-call headers.
    fn default_headers(&self) -> &HeaderMap;

    /// Cookies sent with every request.
    fn cookie_jar(&self) -> &CookieJar;

    /// Turn call-site header pairs into a typed map merged over
    /// [`default_headers`](CreatesRequests::default_headers).
    fn transform_headers(&self, pairs: &[(&str, &str)]) -> FixtureResult<HeaderMap> {
        headers::transform_pairs(self.default_headers(), pairs)
    }

    /// Cookies to attach to a plain request.
    fn cookies_for_request(&self) -> Vec<Cookie<'static>> {
        self.cookie_jar().iter().cloned().collect()
    }

    /// Cookies to attach to a JSON request. Same jar by default; override
    /// when API-flavored requests should carry a different set.
    fn cookies_for_json_request(&self) -> Vec<Cookie<'static>> {
        self.cookies_for_request()
    }

    /// Pull file entries out of a form payload before encoding.
    fn extract_files(&self, data: &mut FormData) -> Vec<FilePart> {
        data.drain_files()
    }

    /// Resolve a request target against the (already merged) server state.
    fn prepare_url(&self, server: &ServerVariables, target: &str) -> FixtureResult<Url> {
        server.prepare_url(target)
    }

    /// Assemble one request from its parts.
    ///
    /// The steps, in order: files are extracted from `params`, server
    /// overrides merge over the harness defaults, the target resolves
    /// against the merged base URL. `POST`/`PUT`/`PATCH`/`DELETE` carry
    /// params in the body (urlencoded, or multipart once files are
    /// present); every other verb sends them on the query string, appended
    /// after any query already on the target. Raw `content` takes the body
    /// verbatim and refuses to share it. Cookies collapse into one `cookie`
    /// header, `content-type`/`content-length` are derived unless already
    /// set, and the peer address rides along as a [`ConnectInfo`] extension
    /// so extractors see it exactly as they would behind a real listener.
    fn create_request(&self, options: RequestOptions) -> FixtureResult<Request<Body>> {
        let RequestOptions {
            method,
            uri,
            mut params,
            cookies,
            mut files,
            server,
            content,
        } = options;

        files.extend(self.extract_files(&mut params));

        let server = self.server_variables().merged(&server);
        let mut url = self.prepare_url(&server, &uri)?;

        let params_in_body = matches!(method.as_str(), "POST" | "PUT" | "PATCH" | "DELETE");

        if !params_in_body && !params.is_empty() {
            let encoded = params.to_urlencoded()?;
            if !encoded.is_empty() {
                let combined = match url.query() {
                    Some(existing) if !existing.is_empty() => format!("{existing}&{encoded}"),
                    _ => encoded,
                };
                url.set_query(Some(&combined));
            }
        }

        let mut derived_content_type: Option<HeaderValue> = None;
        let body = if let Some(content) = content {
            if params_in_body && !params.is_empty() {
                return Err(FixtureError::body_conflict("form parameters"));
            }
            if !files.is_empty() {
                return Err(FixtureError::body_conflict("file uploads"));
            }
            content
        } else if !files.is_empty() {
            let boundary = files::boundary();
            let fields = if params_in_body {
                params.text_pairs()
            } else {
                Vec::new()
            };
            derived_content_type = Some(HeaderValue::from_str(&format!(
                "multipart/form-data; boundary={boundary}"
            ))?);
            files::encode_multipart(&fields, &files, &boundary)
        } else if params_in_body && !params.is_empty() {
            derived_content_type = Some(HeaderValue::from_static(FORM_CONTENT_TYPE));
            Bytes::from(params.to_urlencoded()?)
        } else {
            Bytes::new()
        };

        let mut headers = server.headers().clone();
        if let Some(value) = cookies::to_header_value(&cookies)? {
            headers.insert(header::COOKIE, value);
        }
        if let Some(content_type) = derived_content_type {
            if !headers.contains_key(header::CONTENT_TYPE) {
                headers.insert(header::CONTENT_TYPE, content_type);
            }
        }
        if !body.is_empty() && !headers.contains_key(header::CONTENT_LENGTH) {
            headers.insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));
        }

        tracing::debug!(
            method = %method,
            target = %url,
            body_bytes = body.len(),
            "assembled synthetic request"
        );

        let mut builder = Request::builder().method(method).uri(url.as_str());
        for (name, value) in &headers {
            builder = builder.header(name, value);
        }
        let request = builder
            .extension(ConnectInfo(server.remote_addr()))
            .body(Body::from(body))?;
        Ok(request)
    }

    /// `GET` request with extra headers.
    fn create_get_request(
        &self,
        uri: &str,
        headers: &[(&str, &str)],
    ) -> FixtureResult<Request<Body>> {
        self.create_request(RequestOptions {
            method: Method::GET,
            uri: uri.to_string(),
            cookies: self.cookies_for_request(),
            server: ServerOverrides {
                headers: self.transform_headers(headers)?,
                ..ServerOverrides::default()
            },
            ..RequestOptions::default()
        })
    }

    /// `POST` request whose form data becomes the body.
    fn create_post_request(
        &self,
        uri: &str,
        data: FormData,
        headers: &[(&str, &str)],
    ) -> FixtureResult<Request<Body>> {
        self.create_request(RequestOptions {
            method: Method::POST,
            uri: uri.to_string(),
            params: data,
            cookies: self.cookies_for_request(),
            server: ServerOverrides {
                headers: self.transform_headers(headers)?,
                ..ServerOverrides::default()
            },
            ..RequestOptions::default()
        })
    }

    fn create_put_request(
        &self,
        uri: &str,
        data: FormData,
        headers: &[(&str, &str)],
    ) -> FixtureResult<Request<Body>> {
        self.create_request(RequestOptions {
            method: Method::PUT,
            uri: uri.to_string(),
            params: data,
            cookies: self.cookies_for_request(),
            server: ServerOverrides {
                headers: self.transform_headers(headers)?,
                ..ServerOverrides::default()
            },
            ..RequestOptions::default()
        })
    }

    fn create_patch_request(
        &self,
        uri: &str,
        data: FormData,
        headers: &[(&str, &str)],
    ) -> FixtureResult<Request<Body>> {
        self.create_request(RequestOptions {
            method: Method::PATCH,
            uri: uri.to_string(),
            params: data,
            cookies: self.cookies_for_request(),
            server: ServerOverrides {
                headers: self.transform_headers(headers)?,
                ..ServerOverrides::default()
            },
            ..RequestOptions::default()
        })
    }

    fn create_delete_request(
        &self,
        uri: &str,
        data: FormData,
        headers: &[(&str, &str)],
    ) -> FixtureResult<Request<Body>> {
        self.create_request(RequestOptions {
            method: Method::DELETE,
            uri: uri.to_string(),
            params: data,
            cookies: self.cookies_for_request(),
            server: ServerOverrides {
                headers: self.transform_headers(headers)?,
                ..ServerOverrides::default()
            },
            ..RequestOptions::default()
        })
    }

    /// `OPTIONS` request. Form data rides the query string, like `GET`.
    fn create_options_request(
        &self,
        uri: &str,
        data: FormData,
        headers: &[(&str, &str)],
    ) -> FixtureResult<Request<Body>> {
        self.create_request(RequestOptions {
            method: Method::OPTIONS,
            uri: uri.to_string(),
            params: data,
            cookies: self.cookies_for_request(),
            server: ServerOverrides {
                headers: self.transform_headers(headers)?,
                ..ServerOverrides::default()
            },
            ..RequestOptions::default()
        })
    }

    /// Request whose body is `data` serialized as JSON.
    ///
    /// `content-type`, `accept` and `content-length` get JSON-shaped
    /// defaults; a call-site pair of the same name beats the default. The
    /// jar comes from [`cookies_for_json_request`], not the plain hook.
    ///
    /// [`cookies_for_json_request`]: CreatesRequests::cookies_for_json_request
    fn create_json_request<T>(
        &self,
        method: Method,
        uri: &str,
        data: &T,
        headers: &[(&str, &str)],
    ) -> FixtureResult<Request<Body>>
    where
        T: Serialize + ?Sized,
    {
        let content = serde_json::to_vec(data)?;
        let length = content.len().to_string();

        let mut pairs: Vec<(&str, &str)> = vec![
            ("content-length", length.as_str()),
            ("content-type", JSON_CONTENT_TYPE),
            ("accept", JSON_CONTENT_TYPE),
        ];
        pairs.retain(|(name, _)| {
            !headers.iter().any(|(given, _)| given.eq_ignore_ascii_case(name))
        });
        pairs.extend_from_slice(headers);

        self.create_request(RequestOptions {
            method,
            uri: uri.to_string(),
            cookies: self.cookies_for_json_request(),
            server: ServerOverrides {
                headers: self.transform_headers(&pairs)?,
                ..ServerOverrides::default()
            },
            content: Some(Bytes::from(content)),
            ..RequestOptions::default()
        })
    }

    /// JSON `GET`. Carries an empty object body so JSON-only middleware
    /// sees a parseable payload.
    fn create_json_get_request(
        &self,
        uri: &str,
        headers: &[(&str, &str)],
    ) -> FixtureResult<Request<Body>> {
        self.create_json_request(Method::GET, uri, &json!({}), headers)
    }

    fn create_json_post_request<T>(
        &self,
        uri: &str,
        data: &T,
        headers: &[(&str, &str)],
    ) -> FixtureResult<Request<Body>>
    where
        T: Serialize + ?Sized,
    {
        self.create_json_request(Method::POST, uri, data, headers)
    }

    fn create_json_put_request<T>(
        &self,
        uri: &str,
        data: &T,
        headers: &[(&str, &str)],
    ) -> FixtureResult<Request<Body>>
    where
        T: Serialize + ?Sized,
    {
        self.create_json_request(Method::PUT, uri, data, headers)
    }

    fn create_json_patch_request<T>(
        &self,
        uri: &str,
        data: &T,
        headers: &[(&str, &str)],
    ) -> FixtureResult<Request<Body>>
    where
        T: Serialize + ?Sized,
    {
        self.create_json_request(Method::PATCH, uri, data, headers)
    }

    fn create_json_delete_request<T>(
        &self,
        uri: &str,
        data: &T,
        headers: &[(&str, &str)],
    ) -> FixtureResult<Request<Body>>
    where
        T: Serialize + ?Sized,
    {
        self.create_json_request(Method::DELETE, uri, data, headers)
    }

    fn create_json_options_request<T>(
        &self,
        uri: &str,
        data: &T,
        headers: &[(&str, &str)],
    ) -> FixtureResult<Request<Body>>
    where
        T: Serialize + ?Sized,
    {
        self.create_json_request(Method::OPTIONS, uri, data, headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::UploadedFile;
    use crate::harness::TestHarness;
    use std::net::SocketAddr;

    async fn body_text(request: Request<Body>) -> String {
        let bytes = axum::body::to_bytes(request.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn get_request_resolves_against_default_origin() {
        let harness = TestHarness::new();
        let request = harness.create_get_request("/admin/users", &[]).unwrap();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.uri().path(), "/admin/users");
        assert_eq!(request.headers().get(header::HOST).unwrap(), "localhost");
        assert!(request.headers().get(header::CONTENT_TYPE).is_none());
    }

    #[test]
    fn peer_address_rides_as_connect_info() {
        let harness = TestHarness::new();
        let request = harness.create_get_request("/", &[]).unwrap();

        let info = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .unwrap();
        assert_eq!(info.0, "127.0.0.1:0".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn get_family_params_ride_the_query_string() {
        let harness = TestHarness::new();
        let options = RequestOptions {
            params: FormData::new().text("page", "2").text("q", "socket wrench"),
            ..RequestOptions::new(Method::GET, "/search?sort=asc")
        };
        let request = harness.create_request(options).unwrap();

        assert_eq!(
            request.uri().query(),
            Some("sort=asc&page=2&q=socket+wrench")
        );
    }

    #[tokio::test]
    async fn post_params_become_urlencoded_body() {
        let harness = TestHarness::new();
        let data = FormData::new().text("sku", "W-1000").text("qty", "3");
        let request = harness.create_post_request("/items", data, &[]).unwrap();

        assert_eq!(
            request.headers().get(header::CONTENT_TYPE).unwrap(),
            FORM_CONTENT_TYPE
        );
        assert_eq!(request.headers().get(header::CONTENT_LENGTH).unwrap(), "16");
        assert_eq!(request.uri().query(), None);
        assert_eq!(body_text(request).await, "sku=W-1000&qty=3");
    }

    #[test]
    fn options_params_go_to_query_not_body() {
        let harness = TestHarness::new();
        let data = FormData::new().text("preflight", "1");
        let request = harness.create_options_request("/items", data, &[]).unwrap();

        assert_eq!(request.uri().query(), Some("preflight=1"));
        assert!(request.headers().get(header::CONTENT_TYPE).is_none());
    }

    #[tokio::test]
    async fn delete_sends_params_in_body_like_post() {
        let harness = TestHarness::new();
        let data = FormData::new().text("reason", "duplicate");
        let request = harness.create_delete_request("/items/7", data, &[]).unwrap();

        assert_eq!(request.uri().query(), None);
        assert_eq!(body_text(request).await, "reason=duplicate");
    }

    #[tokio::test]
    async fn json_request_sets_defaults_and_serialized_body() {
        let harness = TestHarness::new();
        let payload = serde_json::json!({"name": "Widget", "qty": 10});
        let request = harness
            .create_json_post_request("/items", &payload, &[])
            .unwrap();

        let expected = serde_json::to_string(&payload).unwrap();
        assert_eq!(
            request.headers().get(header::CONTENT_TYPE).unwrap(),
            JSON_CONTENT_TYPE
        );
        assert_eq!(
            request.headers().get(header::ACCEPT).unwrap(),
            JSON_CONTENT_TYPE
        );
        assert_eq!(
            request.headers().get(header::CONTENT_LENGTH).unwrap(),
            expected.len().to_string().as_str()
        );
        assert_eq!(body_text(request).await, expected);
    }

    #[tokio::test]
    async fn json_get_carries_empty_object_body() {
        let harness = TestHarness::new();
        let request = harness.create_json_get_request("/status", &[]).unwrap();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(body_text(request).await, "{}");
    }

    #[test]
    fn caller_header_beats_json_default() {
        let harness = TestHarness::new();
        let request = harness
            .create_json_post_request("/items", &json!({"a": 1}), &[("accept", "text/plain")])
            .unwrap();

        assert_eq!(request.headers().get(header::ACCEPT).unwrap(), "text/plain");
        assert_eq!(
            request.headers().get(header::CONTENT_TYPE).unwrap(),
            JSON_CONTENT_TYPE
        );
    }

    #[test]
    fn raw_content_refuses_form_params() {
        let harness = TestHarness::new();
        let options = RequestOptions {
            params: FormData::new().text("a", "1"),
            content: Some(Bytes::from_static(b"raw")),
            ..RequestOptions::new(Method::POST, "/items")
        };
        let err = harness.create_request(options).unwrap_err();
        assert!(matches!(err, FixtureError::BodyConflict("form parameters")));
    }

    #[test]
    fn raw_content_refuses_file_uploads() {
        let harness = TestHarness::new();
        let options = RequestOptions {
            params: FormData::new().file("doc", UploadedFile::new("a.txt", &b"x"[..])),
            content: Some(Bytes::from_static(b"raw")),
            ..RequestOptions::new(Method::POST, "/upload")
        };
        let err = harness.create_request(options).unwrap_err();
        assert!(matches!(err, FixtureError::BodyConflict("file uploads")));
    }

    #[tokio::test]
    async fn raw_content_is_sent_verbatim() {
        let harness = TestHarness::new();
        let options = RequestOptions {
            content: Some(Bytes::from_static(b"raw-bytes")),
            ..RequestOptions::new(Method::POST, "/ingest")
        };
        let request = harness.create_request(options).unwrap();

        assert!(request.headers().get(header::CONTENT_TYPE).is_none());
        assert_eq!(request.headers().get(header::CONTENT_LENGTH).unwrap(), "9");
        assert_eq!(body_text(request).await, "raw-bytes");
    }

    #[tokio::test]
    async fn query_params_coexist_with_raw_content() {
        let harness = TestHarness::new();
        let options = RequestOptions {
            params: FormData::new().text("dry_run", "1"),
            content: Some(Bytes::from_static(b"<import/>")),
            ..RequestOptions::new(Method::GET, "/import")
        };
        let request = harness.create_request(options).unwrap();

        assert_eq!(request.uri().query(), Some("dry_run=1"));
        assert_eq!(body_text(request).await, "<import/>");
    }

    #[tokio::test]
    async fn files_switch_the_body_to_multipart() {
        let harness = TestHarness::new();
        let data = FormData::new()
            .text("title", "Q3 report")
            .file(
                "attachment",
                UploadedFile::new("report.pdf", &b"%PDF-1.7"[..])
                    .with_content_type("application/pdf"),
            );
        let request = harness.create_post_request("/reports", data, &[]).unwrap();

        let content_type = request
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
        let boundary = content_type.rsplit('=').next().unwrap().to_string();

        let body = body_text(request).await;
        assert!(body.contains(&format!("--{boundary}\r\n")));
        assert!(body.contains("name=\"title\""));
        assert!(body.contains("filename=\"report.pdf\""));
        assert!(body.contains("%PDF-1.7"));
        assert!(body.ends_with(&format!("--{boundary}--\r\n")));
    }

    #[test]
    fn cookies_collapse_into_one_header() {
        let harness = TestHarness::new()
            .with_cookie(Cookie::new("session", "abc"))
            .with_cookie(Cookie::new("theme", "dark"));
        let request = harness.create_get_request("/", &[]).unwrap();

        let value = request
            .headers()
            .get(header::COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(value.contains("session=abc"));
        assert!(value.contains("theme=dark"));
    }

    /// Harness keeping separate jars for browser-ish and API-ish requests.
    struct SplitJarHarness {
        server: ServerVariables,
        sticky: HeaderMap,
        browser_jar: CookieJar,
        api_jar: CookieJar,
    }

    impl CreatesRequests for SplitJarHarness {
        fn server_variables(&self) -> &ServerVariables {
            &self.server
        }

        fn default_headers(&self) -> &HeaderMap {
            &self.sticky
        }

        fn cookie_jar(&self) -> &CookieJar {
            &self.browser_jar
        }

        fn cookies_for_json_request(&self) -> Vec<Cookie<'static>> {
            self.api_jar.iter().cloned().collect()
        }
    }

    #[test]
    fn json_requests_pull_cookies_from_the_json_hook() {
        let mut browser_jar = CookieJar::new();
        browser_jar.add(Cookie::new("session", "browser"));
        let mut api_jar = CookieJar::new();
        api_jar.add(Cookie::new("api-session", "machine"));
        let harness = SplitJarHarness {
            server: ServerVariables::new(),
            sticky: HeaderMap::new(),
            browser_jar,
            api_jar,
        };

        let plain = harness.create_get_request("/", &[]).unwrap();
        assert_eq!(
            plain.headers().get(header::COOKIE).unwrap(),
            "session=browser"
        );

        let json_flavored = harness
            .create_json_post_request("/items", &json!({"a": 1}), &[])
            .unwrap();
        assert_eq!(
            json_flavored.headers().get(header::COOKIE).unwrap(),
            "api-session=machine"
        );
    }

    #[test]
    fn server_override_changes_peer_address_for_one_request() {
        let harness = TestHarness::new();
        let options = RequestOptions {
            server: ServerOverrides {
                remote_addr: Some("10.1.2.3:9999".parse().unwrap()),
                ..ServerOverrides::default()
            },
            ..RequestOptions::new(Method::GET, "/")
        };
        let request = harness.create_request(options).unwrap();

        let info = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .unwrap();
        assert_eq!(info.0, "10.1.2.3:9999".parse::<SocketAddr>().unwrap());
    }
}
