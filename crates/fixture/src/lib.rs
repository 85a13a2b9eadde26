//! Synthetic request construction for axum middleware tests.
//!
//! Middleware is easiest to test in isolation: hand it a fully-formed
//! [`http::Request`] and assert on what comes back, no listener or client
//! involved. This crate builds those requests. [`CreatesRequests`] carries
//! one assembling primitive plus verb- and JSON-flavored wrappers;
//! [`TestHarness`] is the ready-made implementor.
//!
//! ```
//! use axum_fixture::{CreatesRequests, FormData, TestHarness};
//!
//! # fn main() -> axum_fixture::FixtureResult<()> {
//! let harness = TestHarness::new().with_token("secret-token")?;
//!
//! let get = harness.create_get_request("/admin", &[("x-trace-id", "t-1")])?;
//! assert_eq!(get.uri().path(), "/admin");
//!
//! let form = FormData::new().text("sku", "W-1000");
//! let post = harness.create_post_request("/items", form, &[])?;
//! assert_eq!(post.method(), http::Method::POST);
//! # Ok(())
//! # }
//! ```

pub mod cookies;
pub mod error;
pub mod files;
pub mod form;
pub mod harness;
pub mod headers;
pub mod requests;
pub mod server;
pub mod trace;

pub use cookie::{Cookie, CookieJar};
pub use error::{FixtureError, FixtureResult};
pub use files::{FilePart, UploadedFile};
pub use form::{FormData, FormValue};
pub use harness::TestHarness;
pub use requests::{CreatesRequests, RequestOptions, FORM_CONTENT_TYPE, JSON_CONTENT_TYPE};
pub use server::{ServerOverrides, ServerVariables, DEFAULT_BASE_URL};
