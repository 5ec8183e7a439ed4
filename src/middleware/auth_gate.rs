/// Request authorization gate for protected routes.
///
/// Extracts a bearer token from the Authorization header, verifies it
/// against the access secret, and injects the decoded claims into request
/// extensions for handlers to pick up via `web::ReqData<Claims>`. Every
/// rejection returns before the protected handler runs; nothing persisted
/// is ever touched here.
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::verify_access_token;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

/// Gate middleware; constructed with the token settings at startup.
pub struct AuthGate {
    jwt_config: JwtSettings,
}

impl AuthGate {
    pub fn new(jwt_config: JwtSettings) -> Self {
        Self { jwt_config }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGateService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(AuthGateService {
            service: Rc::new(service),
            jwt_config: self.jwt_config.clone(),
        }))
    }
}

pub struct AuthGateService<S> {
    service: Rc<S>,
    jwt_config: JwtSettings,
}

/// Distinguishes "no header" from "header present but not a bearer token":
/// the two reject with different codes.
fn extract_bearer_token(req: &ServiceRequest) -> Result<String, AuthError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?;

    let raw = header_value
        .to_str()
        .map_err(|_| AuthError::MalformedToken)?;

    let token = raw
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MalformedToken)?;

    if token.is_empty() {
        return Err(AuthError::MalformedToken);
    }

    Ok(token.to_string())
}

impl<S, B> Service<ServiceRequest> for AuthGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = match extract_bearer_token(&req) {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(path = %req.path(), error = %e, "Rejected unauthenticated request");
                return Box::pin(async move { Err(AppError::Auth(e).into()) });
            }
        };

        match verify_access_token(&token, &self.jwt_config) {
            Ok(claims) => {
                tracing::debug!(user_id = %claims.sub, "Access token verified");
                req.extensions_mut().insert(claims);

                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
            Err(e) => {
                tracing::warn!(path = %req.path(), "Access token rejected");
                Box::pin(async move { Err(e.into()) })
            }
        }
    }
}
