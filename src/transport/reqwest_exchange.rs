use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use super::{HttpExchange, HttpMethod, HttpRequest, HttpResponse};
use crate::error::BoxError;

/// [`HttpExchange`] backed by a shared `reqwest::Client`.
#[derive(Clone, Debug, Default)]
pub struct ReqwestExchange {
    inner: reqwest::Client,
}

impl ReqwestExchange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a preconfigured client (timeouts, proxies, TLS roots).
    pub fn with_client(inner: reqwest::Client) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl HttpExchange for ReqwestExchange {
    async fn exchange(&self, request: HttpRequest) -> Result<Option<HttpResponse>, BoxError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        };

        let mut headers = HeaderMap::with_capacity(request.headers.len());
        for (name, value) in &request.headers {
            headers.insert(
                HeaderName::from_bytes(name.as_bytes())?,
                HeaderValue::from_str(value)?,
            );
        }

        let mut builder = self.inner.request(method, request.url).headers(headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        Ok(Some(HttpResponse { status, body }))
    }
}
