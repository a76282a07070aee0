//! Request construction and outcome classification.
//!
//! # Design
//! The network round-trip sits behind [`HttpExchange`]. [`Transport`] turns a
//! target URL, a header layer and an optional body into a plain-data
//! [`HttpRequest`], traces it, hands it to the exchange and classifies what
//! comes back. Status codes in `300..600` are failures; everything else is
//! returned as raw bytes.

mod curl;
mod multipart;
mod reqwest_exchange;

use std::fmt;
use std::io;
use std::ops::Range;
use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use crate::auth::BasicAuth;
use crate::error::{BoxError, ClientError};
use crate::headers::{AUTHORIZATION, CONTENT_TYPE, HeaderSet};

pub use curl::curl_command;
pub use multipart::{FILE_FIELD_NAME, MultipartForm};
pub use reqwest_exchange::ReqwestExchange;

/// Status codes treated as request failures.
pub const FAILURE_STATUS: Range<u16> = 300..600;

/// HTTP method of an outgoing request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully specified request, ready for the exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: HeaderSet,
    pub body: Option<Vec<u8>>,
}

/// Status line and body bytes of a completed exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Performs one HTTP round-trip.
///
/// Returns `Ok(None)` when the exchange finished without a usable response
/// and `Err` when the underlying mechanism failed (DNS, connect, TLS, ...).
#[async_trait]
pub trait HttpExchange: Send + Sync {
    async fn exchange(&self, request: HttpRequest) -> Result<Option<HttpResponse>, BoxError>;
}

#[async_trait]
impl<T: HttpExchange + ?Sized> HttpExchange for std::sync::Arc<T> {
    async fn exchange(&self, request: HttpRequest) -> Result<Option<HttpResponse>, BoxError> {
        (**self).exchange(request).await
    }
}

/// Builds authenticated requests and maps exchange outcomes to [`ClientError`].
#[derive(Clone, Debug)]
pub struct Transport<E> {
    exchange: E,
    auth: Option<BasicAuth>,
}

impl<E: HttpExchange> Transport<E> {
    pub fn new(exchange: E, auth: Option<BasicAuth>) -> Self {
        Self { exchange, auth }
    }

    /// Replaces the credentials used for the `authorization` header.
    #[must_use]
    pub fn with_auth(mut self, auth: BasicAuth) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn auth(&self) -> Option<&BasicAuth> {
        self.auth.as_ref()
    }

    pub fn exchange(&self) -> &E {
        &self.exchange
    }

    /// Merges `layers` and puts the `authorization` header on top when
    /// credentials are configured.
    pub fn request_headers(&self, layers: &[&HeaderSet]) -> HeaderSet {
        let mut headers = HeaderSet::merge(layers.iter().copied());
        if let Some(auth) = &self.auth {
            headers.insert(AUTHORIZATION, auth.header_value());
        }
        headers
    }

    pub async fn get(&self, url: Url, headers: &HeaderSet) -> Result<Vec<u8>, ClientError> {
        let request = HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: self.request_headers(&[headers]),
            body: None,
        };
        self.send(request).await
    }

    pub async fn post(
        &self,
        url: Url,
        headers: &HeaderSet,
        body: Vec<u8>,
    ) -> Result<Vec<u8>, ClientError> {
        let request = HttpRequest {
            method: HttpMethod::Post,
            url,
            headers: self.request_headers(&[headers]),
            body: Some(body),
        };
        self.send(request).await
    }

    /// Posts the file at `file_path` as a single-part `multipart/form-data`
    /// body under the `file` field.
    pub async fn upload(
        &self,
        url: Url,
        headers: &HeaderSet,
        file_path: &Path,
    ) -> Result<Vec<u8>, ClientError> {
        let read_error = |source| ClientError::FileRead {
            path: file_path.to_path_buf(),
            source,
        };
        let file_name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                read_error(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "upload path has no file name",
                ))
            })?;
        let data = tokio::fs::read(file_path).await.map_err(read_error)?;

        let form = MultipartForm::single_file(&file_name, &data);
        let content_type = HeaderSet::new().with(CONTENT_TYPE, form.content_type());
        let request = HttpRequest {
            method: HttpMethod::Post,
            url,
            headers: self.request_headers(&[headers, &content_type]),
            body: Some(form.into_body()),
        };
        self.send(request).await
    }

    async fn send(&self, request: HttpRequest) -> Result<Vec<u8>, ClientError> {
        debug!(
            method = %request.method,
            url = %request.url,
            "{}",
            curl_command(&request)
        );

        let response = self.exchange.exchange(request).await.map_err(|error| {
            warn!(error = %error, "HTTP exchange failed");
            ClientError::ServiceError(error)
        })?;
        classify(response)
    }
}

/// Maps an exchange outcome to its body bytes or a classified error.
pub fn classify(response: Option<HttpResponse>) -> Result<Vec<u8>, ClientError> {
    let response = response.ok_or(ClientError::MissingResponse)?;
    if FAILURE_STATUS.contains(&response.status) {
        return Err(ClientError::StatusCode {
            status: response.status,
            body: String::from_utf8(response.body).unwrap_or_default(),
        });
    }
    Ok(response.body)
}
