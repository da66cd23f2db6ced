use crate::infrastructure::security::{Identity, TokenError, verify_token};
use crate::presentation::handlers::ApiError;
use actix_web::{
    Error, HttpMessage, ResponseError,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
};
use std::{
    future::{Ready, ready},
    pin::Pin,
    rc::Rc,
    task::{Context, Poll},
    time::Instant,
};
use tracing::{info, warn};
use uuid::Uuid;

/// Identity attached to the request by the auth gate.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

const AUTH_HEADER: &str = "x-auth-token";

/// Endpoints reachable without a token: registration, login, health.
const PUBLIC_PATHS: &[&str] = &["/api/users", "/api/login", "/api/health"];

// JWT auth gate: verifies the x-auth-token header and attaches the
// resolved identity to the request extensions. Stateless, touches no
// store.
pub struct JwtAuthMiddleware {
    jwt_secret: Rc<String>,
}

impl JwtAuthMiddleware {
    pub fn new(jwt_secret: String) -> Self {
        Self {
            jwt_secret: Rc::new(jwt_secret),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
            jwt_secret: self.jwt_secret.clone(),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
    jwt_secret: Rc<String>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        if PUBLIC_PATHS.contains(&req.path()) {
            return Box::pin(async move {
                service.call(req).await.map(|res| res.map_into_left_body())
            });
        }

        let raw_token = req
            .headers()
            .get(AUTH_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let outcome = match raw_token {
            None => {
                warn!(path = %req.path(), "Request without auth token");
                Err(ApiError::Auth("No token, authorization denied".to_string()))
            }
            Some(token) => verify_token(&token, &self.jwt_secret).map_err(|e| {
                warn!(path = %req.path(), error = %e, "Token verification failed");
                match e {
                    TokenError::Expired => ApiError::Auth("Token expired".to_string()),
                    TokenError::Invalid => ApiError::Auth("Token is not valid".to_string()),
                }
            }),
        };

        match outcome {
            Ok(identity) => {
                req.extensions_mut().insert(AuthenticatedUser(identity));
                Box::pin(async move {
                    service.call(req).await.map(|res| res.map_into_left_body())
                })
            }
            Err(err) => Box::pin(async move {
                let response = err.error_response().map_into_right_body();
                Ok(req.into_response(response))
            }),
        }
    }
}

// Request log middleware: tags each request with a UUID, echoes it back
// as x-request-id, and logs method/path/status/duration on completion.
pub struct RequestLogMiddleware;

impl<S, B> Transform<S, ServiceRequest> for RequestLogMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLogMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLogMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct RequestLogMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequestLogMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let start = Instant::now();
        let method = req.method().clone();
        let path = req.path().to_string();
        let request_id = Uuid::new_v4().to_string();

        req.extensions_mut().insert(request_id.clone());

        let fut = service.call(req);

        Box::pin(async move {
            let mut res = fut.await?;
            let duration_ms = start.elapsed().as_millis();

            res.headers_mut().insert(
                HeaderName::from_static("x-request-id"),
                HeaderValue::from_str(&request_id)
                    .unwrap_or_else(|_| HeaderValue::from_static("unknown")),
            );

            info!(
                method = %method,
                path = %path,
                status = %res.status(),
                duration_ms = duration_ms,
                request_id = %request_id,
                "Request processed"
            );

            Ok(res)
        })
    }
}
