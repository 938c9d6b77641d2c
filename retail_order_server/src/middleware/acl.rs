//! Access control middleware.
//!
//! Can be placed on any route or service. It reads the identity headers asserted by the
//! upstream auth proxy and checks them against the roles the route requires. A request
//! with no asserted user is rejected with 401; an asserted user missing a required role
//! is rejected with 403.

use std::{pin::Pin, rc::Rc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures::{
    future::{ok, Ready},
    Future,
};
use retail_order_engine::db_types::Role;

use crate::{auth::user_from_headers, errors::ServerError};

pub struct AclMiddlewareFactory {
    required_roles: Vec<Role>,
}

impl AclMiddlewareFactory {
    pub fn new(required_roles: &[Role]) -> Self {
        AclMiddlewareFactory { required_roles: required_roles.to_vec() }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AclMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = AclMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AclMiddlewareService { required_roles: self.required_roles.clone(), service: Rc::new(service) })
    }
}

pub struct AclMiddlewareService<S> {
    required_roles: Vec<Role>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AclMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let required_roles = self.required_roles.clone();
        Box::pin(async move {
            let user = user_from_headers(req.request()).map_err(|e| {
                log::debug!("🔐️ Rejecting request without asserted identity");
                Error::from(e)
            })?;
            if required_roles.iter().all(|role| user.roles.contains(role)) {
                service.call(req).await
            } else {
                log::debug!("🔐️ User {} lacks required roles for {}", user.user_id, req.path());
                Err(ServerError::InsufficientPermissions("Insufficient permissions".to_string()).into())
            }
        })
    }
}
