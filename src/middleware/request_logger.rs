//! Request logging middleware.
//!
//! Each request runs inside an `http_request` span, so events logged by
//! handlers and the data-access layer carry the method and path.

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};
use std::time::Instant;
use tracing::{Instrument, debug, error, info, info_span, warn};

/// Request logger middleware factory.
pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggerMiddleware { service }))
    }
}

/// Request logger middleware service.
pub struct RequestLoggerMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestLoggerMiddleware<S>
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
        let start = Instant::now();
        let span = info_span!(
            target: "api",
            "http_request",
            method = %req.method(),
            path = %req.path(),
        );
        let remote_addr = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();

        span.in_scope(|| {
            debug!(
                target: "api",
                query = %req.query_string(),
                remote_addr = %remote_addr,
                "request started"
            );
        });

        let fut = span.in_scope(|| self.service.call(req));

        Box::pin(
            async move {
                let res = fut.await?;
                let status = res.status();
                let duration_ms = start.elapsed().as_millis() as u64;

                if status.is_server_error() {
                    error!(target: "api", status = status.as_u16(), duration_ms, "request failed");
                } else if status.is_client_error() {
                    warn!(target: "api", status = status.as_u16(), duration_ms, "client error");
                } else {
                    info!(target: "api", status = status.as_u16(), duration_ms, "request completed");
                }

                Ok(res)
            }
            .instrument(span),
        )
    }
}
