// File: ./src/client/auth.rs
// Adds the board service's API key / token authorization to every request.
use crate::error::ApiError;
use http::{HeaderValue, Request};
use std::fmt;
use std::task::{Context, Poll};
use tower_layer::Layer;
use tower_service::Service;

/// Builds `OAuth oauth_consumer_key="<key>", oauth_token="<token>"`.
///
/// Keeping the credentials in a header rather than the query string keeps them
/// out of request logs and redirects.
pub fn authorization_header(api_key: &str, api_token: &str) -> Result<HeaderValue, ApiError> {
    if api_key.is_empty() || api_token.is_empty() {
        return Err(ApiError::InvalidRequest(
            "API key and token must not be empty".to_string(),
        ));
    }
    let raw = format!(
        "OAuth oauth_consumer_key=\"{}\", oauth_token=\"{}\"",
        api_key, api_token
    );
    let mut value = HeaderValue::from_str(&raw).map_err(|_| {
        ApiError::InvalidRequest("API key or token contains invalid characters".to_string())
    })?;
    value.set_sensitive(true);
    Ok(value)
}

#[derive(Clone)]
pub struct ApiKeyAuthLayer {
    authorization: HeaderValue,
}

impl ApiKeyAuthLayer {
    pub fn new(api_key: &str, api_token: &str) -> Result<Self, ApiError> {
        Ok(Self {
            authorization: authorization_header(api_key, api_token)?,
        })
    }
}

impl fmt::Debug for ApiKeyAuthLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyAuthLayer")
            .field("authorization", &"<redacted>")
            .finish()
    }
}

impl<S> Layer<S> for ApiKeyAuthLayer {
    type Service = ApiKeyAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ApiKeyAuthService {
            inner,
            authorization: self.authorization.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ApiKeyAuthService<S> {
    inner: S,
    authorization: HeaderValue,
}

impl<S: fmt::Debug> fmt::Debug for ApiKeyAuthService<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyAuthService")
            .field("inner", &self.inner)
            .field("authorization", &"<redacted>")
            .finish()
    }
}

impl<S, ReqBody> Service<Request<ReqBody>> for ApiKeyAuthService<S>
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
        req.headers_mut()
            .insert(http::header::AUTHORIZATION, self.authorization.clone());
        self.inner.call(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_carries_key_and_token() {
        let value = authorization_header("k123", "t456").unwrap();
        assert!(value.is_sensitive());
        assert_eq!(
            value.to_str().unwrap(),
            "OAuth oauth_consumer_key=\"k123\", oauth_token=\"t456\""
        );
    }

    #[test]
    fn rejects_empty_or_invalid_credentials() {
        assert!(authorization_header("", "t").is_err());
        assert!(authorization_header("k", "bad\ntoken").is_err());
    }

    #[test]
    fn debug_output_hides_the_token() {
        let layer = ApiKeyAuthLayer::new("key", "secret-token").unwrap();
        assert!(!format!("{:?}", layer).contains("secret-token"));
    }
}
