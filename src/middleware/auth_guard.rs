/// Authorization Guard Middleware
///
/// Validates the access token on protected routes and resolves it to a
/// sanitized account before the handler runs. The token is read from the
/// `accessToken` cookie first, then from `Authorization: Bearer <token>`.
/// The resolved `AuthenticatedUser` is inserted into request extensions.
/// Rejections are rendered here as error responses so the outer
/// middleware still tags them with CORS and request id headers.

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, HttpMessage, ResponseError,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use std::sync::Arc;

use crate::auth::{TokenIssuer, ACCESS_TOKEN_COOKIE};
use crate::error::{AppError, AuthError};
use crate::repository::UserRepository;
use crate::user::{AuthenticatedUser, UserProfile};

/// Resolves access tokens to identities
pub struct AuthGuard {
    issuer: Arc<TokenIssuer>,
    repository: Arc<dyn UserRepository>,
}

impl AuthGuard {
    pub fn new(issuer: Arc<TokenIssuer>, repository: Arc<dyn UserRepository>) -> Self {
        Self { issuer, repository }
    }

    /// # Errors
    /// - Unauthorized if no token was presented
    /// - InvalidToken if verification fails
    /// - Unauthorized if the subject is not an existing account
    pub async fn authorize(&self, token: Option<&str>) -> Result<AuthenticatedUser, AppError> {
        let token = token.ok_or(AuthError::MissingToken)?;

        let claims = self.issuer.verify_access_token(token)?;
        let user_id = claims.user_id()?;

        let account = self
            .repository
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UnknownSubject)?;

        tracing::debug!(user_id = %user_id, "Access token validated");

        Ok(AuthenticatedUser {
            user_id,
            profile: UserProfile::from(account),
        })
    }
}

/// Cookie wins over the Authorization header; empty values count as absent
pub fn extract_access_token(req: &ServiceRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(ACCESS_TOKEN_COOKIE) {
        let value = cookie.value().trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }

    req.headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Middleware for protecting routes
pub struct AuthGuardMiddleware {
    guard: Arc<AuthGuard>,
}

impl AuthGuardMiddleware {
    pub fn new(guard: Arc<AuthGuard>) -> Self {
        Self { guard }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGuardMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGuardService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(AuthGuardService {
            service: Rc::new(service),
            guard: self.guard.clone(),
        }))
    }
}

pub struct AuthGuardService<S> {
    service: Rc<S>,
    guard: Arc<AuthGuard>,
}

impl<S, B> Service<ServiceRequest> for AuthGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = extract_access_token(&req);
        let guard = self.guard.clone();
        let service = self.service.clone();

        Box::pin(async move {
            match guard.authorize(token.as_deref()).await {
                Ok(identity) => {
                    req.extensions_mut().insert(identity);
                    service
                        .call(req)
                        .await
                        .map(|res| res.map_into_left_body())
                }
                Err(err) => {
                    let response = ResponseError::error_response(&err);
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}
