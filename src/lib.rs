//! Typed REST endpoints over a JSON HTTP client.
//!
//! Public API layers:
//! - [`Endpoint`]/[`RestApi`]: describe an endpoint once (method, path,
//!   request and response types), and [`AnyEndpoint`] to store endpoints of
//!   different concrete types side by side.
//! - [`RestClient`]: base URL, header overrides and basic auth; raw
//!   `get_data`/`post_json`/`upload_file` calls and typed
//!   [`RestClient::dispatch`].
//! - [`HttpExchange`]: the network round-trip, [`ReqwestExchange`] by default.
//! - [`ClientError`]: unified error type used by all operations.

mod auth;
mod client;
mod dispatch;
mod endpoint;
mod erased;
mod error;
mod headers;
pub mod transport;

/// Basic-auth credentials.
pub use auth::BasicAuth;
/// Generic async JSON REST client.
pub use client::{RestClient, UPLOAD_TOKEN_HEADER};
/// Endpoint descriptors and path helpers.
pub use endpoint::{EmptyPayload, Endpoint, Method, PathComponents, RestApi, join_path};
/// Type-erased endpoint.
pub use erased::AnyEndpoint;
/// Error type returned by all client operations.
pub use error::{BoxError, ClientError};
/// Layered request headers.
pub use headers::{ACCEPT, APPLICATION_JSON, AUTHORIZATION, CONTENT_TYPE, HeaderIter, HeaderSet};
pub use transport::{HttpExchange, HttpMethod, HttpRequest, HttpResponse, ReqwestExchange};
