use uuid::Uuid;

/// Form field that carries the uploaded file.
pub const FILE_FIELD_NAME: &str = "file";

const FILE_CONTENT_TYPE: &str = "application/octet-stream";

/// A single-part `multipart/form-data` body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartForm {
    /// Wraps `data` as the `file` field under a random boundary.
    pub fn single_file(file_name: &str, data: &[u8]) -> Self {
        let boundary = Uuid::new_v4().hyphenated().to_string().to_uppercase();
        Self::with_boundary(boundary, file_name, data)
    }

    pub fn with_boundary(boundary: impl Into<String>, file_name: &str, data: &[u8]) -> Self {
        let boundary = boundary.into();
        let mut body = Vec::with_capacity(data.len() + 256);
        body.extend_from_slice(format!("\r\n--{boundary}\r\n").as_bytes());
        let disposition = format!(
            "Content-Disposition: form-data; name=\"{FILE_FIELD_NAME}\"; filename=\"{file_name}\""
        );
        body.extend_from_slice(format!("{disposition}\r\n").as_bytes());
        body.extend_from_slice(format!("Content-Type: {FILE_CONTENT_TYPE}\r\n\r\n").as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        Self { boundary, body }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// `Content-Type` header value announcing the boundary.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}
