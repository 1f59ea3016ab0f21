/// JWT Authentication Middleware
///
/// Authorizes requests with `RequestAuthorizer` and injects the resulting
/// `AuthenticatedUser` into request extensions for route handlers.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::RequestAuthorizer;
use crate::error::AppError;

/// JWT middleware for protecting routes
///
/// Must be applied to routes that require authentication.
pub struct JwtMiddleware {
    authorizer: RequestAuthorizer,
}

impl JwtMiddleware {
    pub fn new(authorizer: RequestAuthorizer) -> Self {
        Self { authorizer }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(JwtMiddlewareService {
            service: Rc::new(service),
            authorizer: self.authorizer.clone(),
        }))
    }
}

pub struct JwtMiddlewareService<S> {
    service: Rc<S>,
    authorizer: RequestAuthorizer,
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
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
        match self.authorizer.authorize(req.headers()) {
            Ok(user) => {
                req.extensions_mut().insert(user);

                tracing::debug!(user_id = %user.user_id, "JWT validated successfully");

                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
            Err(e) => {
                tracing::warn!(error = %e, path = %req.path(), "Request authorization failed");
                Box::pin(async move { Err(AppError::from(e).into()) })
            }
        }
    }
}
