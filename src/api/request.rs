//! Replayable request specifications.
//!
//! The dispatcher may send a request twice (once before and once after a
//! credential renewal), so a request is a plain value it can clone, not a
//! consumed builder.

use bytes::Bytes;
use serde::Serialize;
use uuid::Uuid;

use crate::traits::Headers;

/// HTTP methods used by the API surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    /// The method name on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// A request relative to the client's base URL.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method
    pub method: Method,
    /// Path joined onto the base URL, e.g. `/users/me`
    pub path: String,
    /// Request headers; the dispatcher adds `Authorization` on top
    pub headers: Headers,
    /// Request body, if any
    pub body: Option<Bytes>,
}

impl Request {
    /// A GET request with no body.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            headers: Headers::new(),
            body: None,
        }
    }

    /// A POST request with no body.
    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            headers: Headers::new(),
            body: None,
        }
    }

    /// A POST request carrying a JSON payload.
    pub fn post_json<T: Serialize>(
        path: impl Into<String>,
        payload: &T,
    ) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_vec(payload)?;
        let mut request = Self::post(path);
        request
            .headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        request.body = Some(Bytes::from(body));
        Ok(request)
    }

    /// A POST request carrying one file as a `multipart/form-data` body.
    ///
    /// The body is assembled here rather than in the transport so that it
    /// travels through the same seam as every other request and replays
    /// byte-identically.
    pub fn post_multipart(
        path: impl Into<String>,
        field: &str,
        filename: &str,
        data: Bytes,
    ) -> Self {
        let boundary = format!("dropline-{}", Uuid::new_v4().simple());

        // Quotes inside the filename would terminate the disposition header
        let safe_filename = filename.replace('"', "_");

        let mut body = Vec::with_capacity(data.len() + 256);
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                field, safe_filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(&data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        let mut request = Self::post(path);
        request.headers.insert(
            "Content-Type".to_string(),
            format!("multipart/form-data; boundary={}", boundary),
        );
        request.body = Some(Bytes::from(body));
        request
    }

    /// Add a header, replacing any previous value for the same name.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_as_str() {
        assert_eq!(Method::Get.as_str(), "GET");
        assert_eq!(Method::Post.as_str(), "POST");
    }

    #[test]
    fn test_get_builder() {
        let request = Request::get("/users/me");
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.path, "/users/me");
        assert!(request.headers.is_empty());
        assert!(request.body.is_none());
    }

    #[test]
    fn test_post_json_sets_header_and_body() {
        #[derive(Serialize)]
        struct Payload {
            name: String,
        }

        let request = Request::post_json(
            "/things",
            &Payload {
                name: "x".to_string(),
            },
        )
        .unwrap();

        assert_eq!(request.method, Method::Post);
        assert_eq!(
            request.headers.get("Content-Type"),
            Some(&"application/json".to_string())
        );
        assert_eq!(request.body, Some(Bytes::from(r#"{"name":"x"}"#)));
    }

    #[test]
    fn test_post_multipart_shape() {
        let request = Request::post_multipart(
            "/upload",
            "file",
            "report.pdf",
            Bytes::from_static(b"%PDF-1.4 content"),
        );

        let content_type = request.headers.get("Content-Type").unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary=dropline-"));
        let boundary = content_type.split("boundary=").nth(1).unwrap();

        let body = String::from_utf8(request.body.unwrap().to_vec()).unwrap();
        assert!(body.starts_with(&format!("--{}\r\n", boundary)));
        assert!(body.contains("Content-Disposition: form-data; name=\"file\"; filename=\"report.pdf\""));
        assert!(body.contains("%PDF-1.4 content"));
        assert!(body.ends_with(&format!("\r\n--{}--\r\n", boundary)));
    }

    #[test]
    fn test_post_multipart_sanitizes_filename() {
        let request =
            Request::post_multipart("/upload", "file", "we\"ird.txt", Bytes::from_static(b"x"));
        let body = String::from_utf8(request.body.unwrap().to_vec()).unwrap();
        assert!(body.contains("filename=\"we_ird.txt\""));
    }

    #[test]
    fn test_with_header() {
        let request = Request::get("/users/me").with_header("Accept", "application/json");
        assert_eq!(
            request.headers.get("Accept"),
            Some(&"application/json".to_string())
        );
    }

    #[test]
    fn test_clone_replays_identical_body() {
        let original = Request::post_multipart("/upload", "file", "a.txt", Bytes::from_static(b"hi"));
        let replayed = original.clone();
        assert_eq!(original.body, replayed.body);
        assert_eq!(
            original.headers.get("Content-Type"),
            replayed.headers.get("Content-Type")
        );
    }
}
