#![forbid(unsafe_code)]

use crate::error::{ConsoleError, TransportError};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub bearer: Option<String>,
    pub body: Option<Value>,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method,
            path: path.into(),
            bearer: None,
            body,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path, None)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path, Some(body))
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Put, path, Some(body))
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path, None)
    }

    pub fn with_bearer(mut self, token: &str) -> Self {
        self.bearer = Some(token.to_string());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

/// `{"data": ...}` wrapper used by every backend endpoint.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Best-effort human message from an error body.
    pub fn error_message(&self) -> String {
        let parsed = serde_json::from_str::<Value>(&self.body).ok();
        let message = parsed.as_ref().and_then(|value| {
            ["message", "error"]
                .iter()
                .find_map(|key| value.get(*key).and_then(Value::as_str))
        });
        match message {
            Some(message) => message.to_string(),
            None if self.body.trim().is_empty() => "empty response".to_string(),
            None => self.body.trim().chars().take(200).collect(),
        }
    }

    /// Fails with [`ConsoleError::Api`] unless the status is 2xx.
    pub fn expect_success(self, request: &ApiRequest) -> Result<Self, ConsoleError> {
        if self.is_success() {
            return Ok(self);
        }
        Err(ConsoleError::Api {
            method: request.method.as_str(),
            path: request.path.clone(),
            status: self.status,
            message: self.error_message(),
        })
    }

    pub fn envelope<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ConsoleError> {
        if self.body.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str::<Envelope<T>>(&self.body)
            .map(|envelope| envelope.data)
            .map_err(|source| ConsoleError::Decode {
                path: path.to_string(),
                source,
            })
    }
}

/// Seam between the console and the REST backend.
pub trait Transport {
    /// Non-2xx statuses come back as `Ok`; only failures to talk to the
    /// server are errors.
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        (**self).send(request)
    }
}

pub struct UreqTransport {
    agent: ureq::Agent,
    base_url: String,
}

impl UreqTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        tracing::debug!(method = request.method.as_str(), %url, "sending request");

        let mut call = self
            .agent
            .request(request.method.as_str(), &url)
            .set("Accept", "application/json");
        if let Some(token) = request.bearer.as_deref() {
            call = call.set("Authorization", &format!("Bearer {token}"));
        }
        let result = match request.body.as_ref() {
            Some(body) => call.send_json(body),
            None => call.call(),
        };

        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(err)) => return Err(TransportError::Io(err.to_string())),
        };
        let status = response.status();
        let body = response
            .into_string()
            .map_err(|err| TransportError::Body(err.to_string()))?;
        tracing::debug!(status, %url, "received response");
        Ok(ApiResponse { status, body })
    }
}
