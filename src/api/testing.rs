use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ApiError, ApiRequest, ApiResponse, Method, Transport};

/// Scripted backend. Queued responses are consumed in order; the last one sticks.
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<Result<ApiResponse, ApiError>>>>,
    sent: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            routes: Mutex::new(HashMap::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn respond(&self, method: Method, path: &str, status: u16, body: serde_json::Value) {
        let bytes = serde_json::to_vec(&body).unwrap();
        self.respond_raw(method, path, status, bytes);
    }

    pub fn respond_raw(&self, method: Method, path: &str, status: u16, body: Vec<u8>) {
        self.push(method, path, Ok(ApiResponse { status, body }));
    }

    pub fn fail(&self, method: Method, path: &str, error: ApiError) {
        self.push(method, path, Err(error));
    }

    fn push(&self, method: Method, path: &str, result: Result<ApiResponse, ApiError>) {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(result);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let key = (request.method, request.path.clone());
        self.sent.lock().unwrap().push(request);

        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => Ok(ApiResponse {
                status: 404,
                body: br#"{"message":"not found"}"#.to_vec(),
            }),
        }
    }
}
