// File: ./src/client/middleware.rs
//! Tower middleware that stamps fixed headers (User-Agent, Accept) on requests.
use http::header::{ACCEPT, USER_AGENT};
use http::{HeaderMap, HeaderValue, Request};
use std::task::{Context, Poll};
use tower_layer::Layer;
use tower_service::Service;

#[derive(Clone, Debug)]
pub struct DefaultHeadersLayer {
    headers: HeaderMap,
}

impl DefaultHeadersLayer {
    /// JSON `Accept` plus the given User-Agent (skipped when not a valid header value).
    pub fn new(user_agent: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Ok(val) = HeaderValue::from_str(user_agent) {
            headers.insert(USER_AGENT, val);
        }
        Self { headers }
    }
}

impl<S> Layer<S> for DefaultHeadersLayer {
    type Service = DefaultHeadersService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        DefaultHeadersService {
            inner,
            headers: self.headers.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DefaultHeadersService<S> {
    inner: S,
    headers: HeaderMap,
}

impl<S, ReqBody> Service<Request<ReqBody>> for DefaultHeadersService<S>
where
    S: Service<Request<ReqBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        // Headers set explicitly on the request win.
        for (name, value) in &self.headers {
            if !req.headers().contains_key(name) {
                req.headers_mut().insert(name.clone(), value.clone());
            }
        }
        self.inner.call(req)
    }
}
