use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use reqwest::multipart;

use super::{ApiError, ApiRequest, ApiResponse, Method, RequestBody, Transport};

/// `Transport` over reqwest, rooted at the backend base URL.
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout_secs: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.url(&request.path);
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, &url)
            .header(header::ACCEPT, "application/json");
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(cookie) = &request.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart { fields, files } => {
                let mut form = multipart::Form::new();
                for (name, value) in fields {
                    form = form.text(name, value);
                }
                for file in files {
                    let part = multipart::Part::bytes(file.bytes)
                        .file_name(file.file_name)
                        .mime_str(&file.content_type)
                        .map_err(|e| ApiError::Transport(e.to_string()))?;
                    form = form.part(file.field, part);
                }
                builder.multipart(form)
            }
        };

        tracing::debug!(method = request.method.as_str(), url = %url, "backend request");

        let resp = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(ApiResponse {
            status,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let transport = HttpTransport::new("http://backend.test/api/", 5).unwrap();
        assert_eq!(
            transport.url("/bookings/INV-1"),
            "http://backend.test/api/bookings/INV-1"
        );
        assert_eq!(transport.url("me"), "http://backend.test/api/me");
    }
}
