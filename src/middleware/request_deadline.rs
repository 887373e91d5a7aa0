//! Per-request deadline middleware.
//!
//! Requests that outlive the deadline are answered with 504 and the usual
//! `{"error": ...}` body. The in-flight handler future is dropped, which
//! rolls back any open transaction it holds.

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};
use std::time::Duration;
use tracing::warn;

use crate::error::AppError;

/// Deadline middleware factory.
#[derive(Debug, Clone, Copy)]
pub struct RequestDeadline {
    timeout: Duration,
}

impl RequestDeadline {
    pub fn new(timeout: Duration) -> Self {
        RequestDeadline { timeout }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestDeadline
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestDeadlineMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestDeadlineMiddleware {
            service,
            timeout: self.timeout,
        }))
    }
}

/// Deadline middleware service.
pub struct RequestDeadlineMiddleware<S> {
    service: S,
    timeout: Duration,
}

impl<S, B> Service<ServiceRequest> for RequestDeadlineMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let timeout = self.timeout;
        let path = req.path().to_string();
        let fut = self.service.call(req);

        Box::pin(async move {
            match tokio::time::timeout(timeout, fut).await {
                Ok(res) => res,
                Err(_) => {
                    warn!(
                        target: "api",
                        path = %path,
                        timeout_ms = timeout.as_millis() as u64,
                        "request deadline exceeded"
                    );
                    Err(AppError::DeadlineExceeded.into())
                }
            }
        })
    }
}
