/// HTTP middleware for the marketeer service
///
/// Validates the signed session token on protected routes and stores the
/// decoded `Session` in request extensions for handler extraction.
use crate::error::AppError;
use crate::services::session::{decode_session_token, Session};
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;

/// Actix middleware that resolves the session from the session cookie or an
/// `Authorization: Bearer` header.
pub struct SessionAuth {
    cookie_name: Rc<String>,
}

impl SessionAuth {
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: Rc::new(cookie_name.into()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionAuthService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionAuthService {
            service: Rc::new(service),
            cookie_name: self.cookie_name.clone(),
        }))
    }
}

pub struct SessionAuthService<S> {
    service: Rc<S>,
    cookie_name: Rc<String>,
}

impl<S, B> Service<ServiceRequest> for SessionAuthService<S>
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
        let service = self.service.clone();
        let cookie_name = self.cookie_name.clone();

        Box::pin(async move {
            let token = req
                .cookie(cookie_name.as_str())
                .map(|cookie| cookie.value().to_string())
                .or_else(|| {
                    req.headers()
                        .get("Authorization")
                        .and_then(|header| header.to_str().ok())
                        .and_then(|header| header.strip_prefix("Bearer "))
                        .map(|token| token.to_string())
                });

            let token = match token {
                Some(token) => token,
                None => {
                    return Err(AppError::Unauthorized("No active session".to_string()).into())
                }
            };

            let claims = decode_session_token(&token).map_err(Error::from)?;
            let session = Session::from_claims(&claims).map_err(Error::from)?;

            req.extensions_mut().insert(session);

            service.call(req).await
        })
    }
}

impl FromRequest for Session {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Session>()
                .cloned()
                .ok_or_else(|| AppError::Unauthorized("No active session".to_string()).into()),
        )
    }
}
