pub mod http;
#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Failure of a backend call, as seen by the page that made it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("backend returned {status}")]
    Status { status: u16, message: Option<String> },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Unauthenticated,
    Forbidden,
    Conflict,
    Rejected,
    Transient,
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref().filter(|m| !m.is_empty()),
            _ => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self.status() {
            Some(404) => ErrorKind::NotFound,
            Some(401) => ErrorKind::Unauthenticated,
            Some(403) => ErrorKind::Forbidden,
            Some(409) => ErrorKind::Conflict,
            Some(400) | Some(422) => ErrorKind::Rejected,
            _ => ErrorKind::Transient,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart {
        fields: Vec<(String, String)>,
        files: Vec<FilePart>,
    },
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    /// Cookie header forwarded from the browser session.
    pub cookie: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError>;
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Credentials-bearing client for the backend REST API.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    cookie: Option<String>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            cookie: None,
        }
    }

    /// Same transport, carrying the caller's session cookie on every request.
    pub fn with_credentials(&self, cookie: Option<String>) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            cookie: cookie.filter(|c| !c.is_empty()),
        }
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, ApiError> {
        let resp = self
            .execute(Method::Get, path, query.to_vec(), RequestBody::Empty)
            .await?;
        decode(&resp)
    }

    pub async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, ApiError> {
        let resp = self
            .execute(method, path, Vec::new(), RequestBody::Json(body))
            .await?;
        decode(&resp)
    }

    pub async fn send_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        fields: Vec<(String, String)>,
        files: Vec<FilePart>,
    ) -> Result<T, ApiError> {
        let resp = self
            .execute(
                Method::Post,
                path,
                Vec::new(),
                RequestBody::Multipart { fields, files },
            )
            .await?;
        decode(&resp)
    }

    /// Fire a request whose response body is irrelevant.
    pub async fn send_empty(&self, method: Method, path: &str) -> Result<(), ApiError> {
        self.execute(method, path, Vec::new(), RequestBody::Empty)
            .await
            .map(|_| ())
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: Vec<(String, String)>,
        body: RequestBody,
    ) -> Result<ApiResponse, ApiError> {
        let request = ApiRequest {
            method,
            path: path.to_string(),
            query,
            body,
            cookie: self.cookie.clone(),
        };

        let resp = self.transport.send(request).await?;
        if (200..300).contains(&resp.status) {
            return Ok(resp);
        }

        let message = serde_json::from_slice::<ErrorBody>(&resp.body)
            .ok()
            .and_then(|b| b.message);
        tracing::warn!(
            method = method.as_str(),
            path,
            status = resp.status,
            message = message.as_deref().unwrap_or(""),
            "backend request rejected"
        );
        Err(ApiError::Status {
            status: resp.status,
            message,
        })
    }
}

fn decode<T: DeserializeOwned>(resp: &ApiResponse) -> Result<T, ApiError> {
    let body: &[u8] = if resp.body.is_empty() { b"null" } else { &resp.body };
    serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::testing::MockTransport;
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = |status| ApiError::Status {
            status,
            message: None,
        };
        assert_eq!(err(404).kind(), ErrorKind::NotFound);
        assert_eq!(err(401).kind(), ErrorKind::Unauthenticated);
        assert_eq!(err(403).kind(), ErrorKind::Forbidden);
        assert_eq!(err(409).kind(), ErrorKind::Conflict);
        assert_eq!(err(400).kind(), ErrorKind::Rejected);
        assert_eq!(err(422).kind(), ErrorKind::Rejected);
        assert_eq!(err(500).kind(), ErrorKind::Transient);
        assert_eq!(
            ApiError::Transport("timeout".to_string()).kind(),
            ErrorKind::Transient
        );
    }

    #[test]
    fn test_empty_server_message_is_ignored() {
        let err = ApiError::Status {
            status: 400,
            message: Some(String::new()),
        };
        assert_eq!(err.server_message(), None);
    }

    #[tokio::test]
    async fn test_credentials_forwarded() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(Method::Get, "/me", 200, serde_json::json!({"ok": true}));
        let client = ApiClient::new(mock.clone()).with_credentials(Some("session=abc".to_string()));

        let _: serde_json::Value = client.get("/me", &[]).await.unwrap();

        let sent = mock.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].cookie.as_deref(), Some("session=abc"));
    }

    #[tokio::test]
    async fn test_error_body_message_extracted() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(
            Method::Post,
            "/things",
            400,
            serde_json::json!({"message": "Booking sudah tidak berlaku"}),
        );
        let client = ApiClient::new(mock);

        let err = client
            .send_json::<serde_json::Value>(Method::Post, "/things", serde_json::json!({}))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(400));
        assert_eq!(err.server_message(), Some("Booking sudah tidak berlaku"));
    }

    #[tokio::test]
    async fn test_empty_body_decodes_as_unit() {
        let mock = Arc::new(MockTransport::new());
        mock.respond_raw(Method::Delete, "/things/1", 204, Vec::new());
        let client = ApiClient::new(mock);

        assert!(client.send_empty(Method::Delete, "/things/1").await.is_ok());
    }
}
