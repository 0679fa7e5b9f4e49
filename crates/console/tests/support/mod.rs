#![forbid(unsafe_code)]
#![allow(dead_code)]

use catadmin_console::{ApiRequest, ApiResponse, Method, Transport, TransportError};
use serde_json::{Value, json};
use std::cell::RefCell;
use std::collections::VecDeque;

struct Route {
    method: Method,
    path: String,
    replies: VecDeque<Result<ApiResponse, TransportError>>,
}

/// Scripted backend. Replies for a route are consumed in order; the last
/// one keeps answering. Unscripted routes answer 404.
#[derive(Default)]
pub(crate) struct FakeTransport {
    routes: RefCell<Vec<Route>>,
    requests: RefCell<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        self.push(method, path, Ok(ApiResponse {
            status,
            body: body.to_string(),
        }))
    }

    pub(crate) fn reply_raw(&self, method: Method, path: &str, status: u16, body: &str) -> &Self {
        self.push(method, path, Ok(ApiResponse {
            status,
            body: body.to_string(),
        }))
    }

    pub(crate) fn fail(&self, method: Method, path: &str, message: &str) -> &Self {
        self.push(method, path, Err(TransportError::Io(message.to_string())))
    }

    fn push(
        &self,
        method: Method,
        path: &str,
        reply: Result<ApiResponse, TransportError>,
    ) -> &Self {
        let mut routes = self.routes.borrow_mut();
        match routes
            .iter_mut()
            .find(|route| route.method == method && route.path == path)
        {
            Some(route) => route.replies.push_back(reply),
            None => routes.push(Route {
                method,
                path: path.to_string(),
                replies: VecDeque::from([reply]),
            }),
        }
        self
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }

    pub(crate) fn count(&self, method: Method, path: &str) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|request| request.method == method && request.path == path)
            .count()
    }

    pub(crate) fn mutations(&self) -> Vec<ApiRequest> {
        self.requests
            .borrow()
            .iter()
            .filter(|request| request.method != Method::Get)
            .cloned()
            .collect()
    }
}

fn clone_reply(reply: &Result<ApiResponse, TransportError>) -> Result<ApiResponse, TransportError> {
    match reply {
        Ok(response) => Ok(response.clone()),
        Err(TransportError::Io(message)) => Err(TransportError::Io(message.clone())),
        Err(TransportError::Body(message)) => Err(TransportError::Body(message.clone())),
    }
}

impl Transport for FakeTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.borrow_mut().push(request.clone());
        let mut routes = self.routes.borrow_mut();
        let Some(route) = routes
            .iter_mut()
            .find(|route| route.method == request.method && route.path == request.path)
        else {
            return Ok(ApiResponse {
                status: 404,
                body: json!({ "message": "not found" }).to_string(),
            });
        };
        if route.replies.len() > 1
            && let Some(reply) = route.replies.pop_front()
        {
            return reply;
        }
        match route.replies.front() {
            Some(reply) => clone_reply(reply),
            None => Ok(ApiResponse {
                status: 404,
                body: String::new(),
            }),
        }
    }
}

pub(crate) fn category(id: &str, name: &str, parent: Option<&str>) -> Value {
    json!({ "id": id, "category_name": name, "parent_id": parent })
}

pub(crate) fn data(items: Value) -> Value {
    json!({ "data": items })
}
