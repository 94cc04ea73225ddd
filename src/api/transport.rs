use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use crate::api::request::{ApiRequest, Method};
use crate::api::ApiError;
/// Sends a request and returns the parsed JSON reply.
pub trait Transport {
    fn send(&self, request: &ApiRequest) -> Result<Value, ApiError>;
}
impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        (**self).send(request)
    }
}
/// Blocking HTTP transport rooted at a base URL.
pub struct HttpTransport {
    base_url: String,
    client: Client,
    headers: HeaderMap,
}
impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(Self {
            base_url: base_url.into(),
            client,
            headers,
        })
    }
    pub fn with_bearer(self, token: &str) -> Result<Self, ApiError> {
        self.with_header(AUTHORIZATION.as_str(), &format!("Bearer {token}"))
    }
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, ApiError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ApiError::InvalidHeader(format!("{name}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ApiError::InvalidHeader(format!("value for {name}: {e}")))?;
        self.headers.insert(name, value);
        Ok(self)
    }
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
impl Transport for HttpTransport {
    fn send(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        let url = request.url(&self.base_url)?;
        let builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };
        let mut builder = builder.headers(self.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        let response = builder.send().map_err(|e| {
            log::error!("API request failed: {e}");
            ApiError::from(e)
        })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.json::<Value>().unwrap_or(Value::Null);
            let err = ApiError::from_status(status.as_u16(), &body);
            log::error!("API request failed: {err}");
            return Err(err);
        }
        Ok(response.json::<Value>()?)
    }
}
/// Canned reply for [`MemoryTransport`]: `Ok(body)` or `Err((status, body))`.
pub type CannedReply = Result<Value, (u16, Value)>;
/// In-process transport: replies are queued per method and path, every request
/// is recorded.
#[derive(Default)]
pub struct MemoryTransport {
    replies: Mutex<HashMap<(Method, String), VecDeque<CannedReply>>>,
    sent: Mutex<Vec<ApiRequest>>,
}
impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn reply(&self, method: Method, path: &str, reply: CannedReply) -> &Self {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry((method, path.to_owned()))
            .or_default()
            .push_back(reply);
        self
    }
    pub fn sent(&self) -> Vec<ApiRequest> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
impl Transport for MemoryTransport {
    fn send(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());
        let reply = self
            .replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get_mut(&(request.method, request.path.clone()))
            .and_then(VecDeque::pop_front);
        match reply {
            Some(Ok(body)) => Ok(body),
            Some(Err((status, body))) => Err(ApiError::from_status(status, &body)),
            None => Err(ApiError::from_status(404, &Value::Null)),
        }
    }
}
