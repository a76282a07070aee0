use std::path::Path;

use serde::Serialize;
use url::Url;

use crate::ClientError;
use crate::auth::BasicAuth;
use crate::headers::{ACCEPT, APPLICATION_JSON, HeaderSet};
use crate::transport::{HttpExchange, ReqwestExchange, Transport};

/// Header sent with uploads unless overridden.
pub const UPLOAD_TOKEN_HEADER: &str = "X-Atlassian-Token";

/// Generic async JSON REST client.
///
/// Holds a base URL, header overrides and optional basic-auth credentials.
/// Configuration is fixed after construction, so one client can serve many
/// concurrent calls by shared reference.
#[derive(Clone, Debug)]
pub struct RestClient<E = ReqwestExchange> {
    base_url: String,
    headers: HeaderSet,
    transport: Transport<E>,
}

impl RestClient<ReqwestExchange> {
    /// Creates a client that talks HTTP through `reqwest`.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, ClientError> {
        Self::with_exchange(base_url, ReqwestExchange::new())
    }
}

impl<E: HttpExchange> RestClient<E> {
    /// Creates a client over a custom [`HttpExchange`].
    ///
    /// The base URL must parse as an absolute URL.
    pub fn with_exchange(base_url: impl AsRef<str>, exchange: E) -> Result<Self, ClientError> {
        let base_url = base_url.as_ref();
        Url::parse(base_url).map_err(|_| ClientError::InvalidBaseUrl(base_url.to_owned()))?;

        Ok(Self {
            base_url: base_url.to_owned(),
            headers: HeaderSet::new(),
            transport: Transport::new(exchange, None),
        })
    }

    /// Returns a new client that sends `authorization: Basic ...` on every request.
    #[must_use]
    pub fn with_basic_auth(mut self, auth: BasicAuth) -> Self {
        self.transport = self.transport.with_auth(auth);
        self
    }

    /// Returns a new client whose header overrides are extended by `headers`.
    #[must_use]
    pub fn with_headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.headers.extend(headers);
        self
    }

    /// Returns a new client with one additional header override.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    pub fn auth(&self) -> Option<&BasicAuth> {
        self.transport.auth()
    }

    pub fn exchange(&self) -> &E {
        self.transport.exchange()
    }

    /// Joins the base URL and `relative` with exactly one `/` between them.
    ///
    /// An empty `relative` yields the base URL unchanged.
    pub fn full_url(&self, relative: &str) -> String {
        if relative.is_empty() {
            return self.base_url.clone();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            relative.trim_start_matches('/')
        )
    }

    /// Sends a `GET` to a path relative to the base URL and returns the body.
    pub async fn get_data(&self, relative: &str) -> Result<Vec<u8>, ClientError> {
        self.get_data_from(&self.full_url(relative)).await
    }

    /// Sends a `GET` to a fully qualified URL and returns the body.
    pub async fn get_data_from(&self, full_url: &str) -> Result<Vec<u8>, ClientError> {
        let url = parse_url(full_url)?;
        let headers = HeaderSet::json_defaults().layered(&self.headers);
        self.transport.get(url, &headers).await
    }

    /// Posts `payload` as JSON to a path relative to the base URL.
    pub async fn post_json<T>(&self, relative: &str, payload: &T) -> Result<Vec<u8>, ClientError>
    where
        T: Serialize + ?Sized,
    {
        self.post_json_to(&self.full_url(relative), payload).await
    }

    /// Posts `payload` as JSON to a fully qualified URL.
    pub async fn post_json_to<T>(&self, full_url: &str, payload: &T) -> Result<Vec<u8>, ClientError>
    where
        T: Serialize + ?Sized,
    {
        let url = parse_url(full_url)?;
        let body = serde_json::to_vec(payload).map_err(ClientError::Serialization)?;
        let headers = HeaderSet::json_defaults().layered(&self.headers);
        self.transport.post(url, &headers, body).await
    }

    /// Uploads a local file as `multipart/form-data` to a path relative to the base URL.
    pub async fn upload_file(
        &self,
        file_path: impl AsRef<Path>,
        relative_destination: &str,
    ) -> Result<Vec<u8>, ClientError> {
        self.upload_file_to(file_path, &self.full_url(relative_destination))
            .await
    }

    /// Uploads a local file as `multipart/form-data` to a fully qualified URL.
    pub async fn upload_file_to(
        &self,
        file_path: impl AsRef<Path>,
        full_destination: &str,
    ) -> Result<Vec<u8>, ClientError> {
        let url = parse_url(full_destination)?;
        let headers = upload_defaults().layered(&self.headers);
        self.transport
            .upload(url, &headers, file_path.as_ref())
            .await
    }
}

fn upload_defaults() -> HeaderSet {
    HeaderSet::new()
        .with(ACCEPT, APPLICATION_JSON)
        .with(UPLOAD_TOKEN_HEADER, "nocheck")
}

fn parse_url(url: &str) -> Result<Url, ClientError> {
    Url::parse(url).map_err(|_| ClientError::InvalidUrl(url.to_owned()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use serde::Serialize;
    use serde::ser::Error as _;

    use super::{RestClient, UPLOAD_TOKEN_HEADER};
    use crate::ClientError;
    use crate::auth::BasicAuth;
    use crate::headers::{ACCEPT, APPLICATION_JSON, AUTHORIZATION, CONTENT_TYPE};
    use crate::transport::HttpMethod;
    use crate::transport::testing::RecordingExchange;

    fn client(exchange: RecordingExchange) -> RestClient<RecordingExchange> {
        RestClient::with_exchange("https://api.example.com", exchange).expect("valid url")
    }

    #[test]
    fn rejects_relative_base_url() {
        let error = RestClient::with_exchange("not a url", RecordingExchange::respond(200, ""))
            .expect_err("invalid base url");
        assert!(matches!(error, ClientError::InvalidBaseUrl(url) if url == "not a url"));
    }

    #[test]
    fn full_url_inserts_single_separator() {
        let client = client(RecordingExchange::respond(200, ""));
        assert_eq!(client.full_url("users/42"), "https://api.example.com/users/42");
        assert_eq!(client.full_url("/users/42"), "https://api.example.com/users/42");

        let trailing = RestClient::with_exchange(
            "https://api.example.com/v1/",
            RecordingExchange::respond(200, ""),
        )
        .expect("valid url");
        assert_eq!(trailing.full_url("items"), "https://api.example.com/v1/items");
        assert_eq!(trailing.full_url(""), "https://api.example.com/v1/");
    }

    #[tokio::test]
    async fn get_data_layers_overrides_on_json_defaults() {
        let client = client(RecordingExchange::respond(200, "[]"))
            .with_header(ACCEPT, "application/vnd.api+json")
            .with_headers([("X-Trace", "abc")]);
        let body = client.get_data("users").await.expect("get succeeds");
        assert_eq!(body, b"[]");

        let request = client.exchange().last_request();
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url.as_str(), "https://api.example.com/users");
        assert_eq!(request.headers.get(ACCEPT), Some("application/vnd.api+json"));
        assert_eq!(request.headers.get(CONTENT_TYPE), Some(APPLICATION_JSON));
        assert_eq!(request.headers.get("X-Trace"), Some("abc"));
    }

    #[tokio::test]
    async fn mixed_case_override_replaces_json_default() {
        let client = client(RecordingExchange::respond(200, ""))
            .with_header("CONTENT-TYPE", "text/plain")
            .with_header("accept", "text/html");
        client.get_data("notes").await.expect("get succeeds");

        let headers = client.exchange().last_request().headers;
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get(CONTENT_TYPE), Some("text/plain"));
        assert_eq!(headers.get(ACCEPT), Some("text/html"));
    }

    #[tokio::test]
    async fn get_data_from_uses_url_verbatim() {
        let client = client(RecordingExchange::respond(200, ""));
        client
            .get_data_from("https://other.example.com/health?full=1")
            .await
            .expect("get succeeds");
        let request = client.exchange().last_request();
        assert_eq!(request.url.as_str(), "https://other.example.com/health?full=1");
    }

    #[tokio::test]
    async fn post_json_encodes_payload() {
        #[derive(Serialize)]
        struct Point {
            x: i32,
        }

        let client = client(RecordingExchange::respond(201, r#"{"ok":true}"#))
            .with_basic_auth(BasicAuth::new("alice", "secret"));
        client
            .post_json("points", &Point { x: 1 })
            .await
            .expect("post succeeds");

        let request = client.exchange().last_request();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.body.as_deref(), Some(br#"{"x":1}"#.as_slice()));
        assert_eq!(request.headers.get(AUTHORIZATION), Some("Basic YWxpY2U6c2VjcmV0"));
    }

    #[tokio::test]
    async fn post_json_reports_encoding_failure() {
        struct Unencodable;

        impl Serialize for Unencodable {
            fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
                Err(S::Error::custom("refused"))
            }
        }

        let exchange = RecordingExchange::respond(200, "");
        let client = client(exchange);
        let error = client
            .post_json("points", &Unencodable)
            .await
            .expect_err("encoding fails");
        assert!(matches!(error, ClientError::Serialization(_)));
        assert!(client.exchange().requests().is_empty());
    }

    #[tokio::test]
    async fn status_errors_propagate_unchanged() {
        let client = client(RecordingExchange::respond(404, "not found"));
        let error = client.get_data("users/1").await.expect_err("404");
        match error {
            ClientError::StatusCode { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "not found");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn invalid_full_url_is_rejected_before_sending() {
        let client = client(RecordingExchange::respond(200, ""));
        let error = client
            .get_data_from("::not-a-url")
            .await
            .expect_err("bad url");
        assert!(matches!(error, ClientError::InvalidUrl(_)));
        assert!(client.exchange().requests().is_empty());
    }

    #[tokio::test]
    async fn upload_uses_upload_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"attachment").expect("write temp file");

        let client = client(RecordingExchange::respond(200, "{}"));
        client
            .upload_file(file.path(), "rest/api/attachments")
            .await
            .expect("upload succeeds");

        let request = client.exchange().last_request();
        assert_eq!(request.url.as_str(), "https://api.example.com/rest/api/attachments");
        assert_eq!(request.headers.get(ACCEPT), Some(APPLICATION_JSON));
        assert_eq!(request.headers.get(UPLOAD_TOKEN_HEADER), Some("nocheck"));
        assert!(
            request
                .headers
                .get(CONTENT_TYPE)
                .is_some_and(|value| value.starts_with("multipart/form-data; boundary="))
        );
    }

    #[tokio::test]
    async fn upload_token_header_is_overridable() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"attachment").expect("write temp file");

        let client = client(RecordingExchange::respond(200, "{}"))
            .with_header(UPLOAD_TOKEN_HEADER, "no-check");
        client
            .upload_file(file.path(), "upload")
            .await
            .expect("upload succeeds");

        let request = client.exchange().last_request();
        assert_eq!(request.headers.get(UPLOAD_TOKEN_HEADER), Some("no-check"));
    }

    #[tokio::test]
    async fn upload_keeps_multipart_content_type_over_override() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"attachment").expect("write temp file");

        let client = client(RecordingExchange::respond(200, "{}"))
            .with_header("content-type", APPLICATION_JSON);
        client
            .upload_file(file.path(), "upload")
            .await
            .expect("upload succeeds");

        let request = client.exchange().last_request();
        let content_types: Vec<_> = request
            .headers
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case(CONTENT_TYPE))
            .collect();
        assert_eq!(content_types.len(), 1);
        assert!(content_types[0].1.starts_with("multipart/form-data; boundary="));
    }

    #[tokio::test]
    async fn shared_exchange_sees_requests_from_client() {
        let exchange = Arc::new(RecordingExchange::respond(200, "{}"));
        let client = RestClient::with_exchange("https://api.example.com", Arc::clone(&exchange))
            .expect("valid url");
        client.get_data("status").await.expect("get succeeds");

        assert_eq!(
            exchange.last_request().url.as_str(),
            "https://api.example.com/status"
        );
    }
}
