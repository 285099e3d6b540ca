//! Bearer credential extraction
//!
//! Protected routes get the caller's [`Credential`] as a request extension.
//! Requests without a well-formed `Authorization: Bearer <token>` header are
//! answered with 401 before reaching a handler. Whether the token is actually
//! valid is for the backend to decide.

use crate::error::ServerError;
use crate::middleware::request_id::RequestId;
use axum::{
    http::{header, Request},
    response::Response,
};
use crmgate_core::Credential;
use std::task::{Context, Poll};
use tower::{Layer, Service};

#[derive(Clone)]
pub struct BearerAuthLayer;

impl<S> Layer<S> for BearerAuthLayer {
    type Service = BearerAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        BearerAuthService { inner }
    }
}

#[derive(Clone)]
pub struct BearerAuthService<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for BearerAuthService<S>
where
    S: Service<Request<B>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        let header = req.headers().get(header::AUTHORIZATION).and_then(|v| v.to_str().ok());

        match Credential::from_authorization_header(header) {
            Ok(credential) => {
                req.extensions_mut().insert(credential);
                let mut inner = self.inner.clone();
                Box::pin(async move { inner.call(req).await })
            }
            Err(e) => {
                let request_id = req
                    .extensions()
                    .get::<RequestId>()
                    .map(|r| r.0.clone())
                    .unwrap_or_default();
                let resp = ServerError::from(e).to_http_response(&request_id);
                Box::pin(async move { Ok(resp) })
            }
        }
    }
}
