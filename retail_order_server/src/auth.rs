//! The boundary with the upstream identity collaborator.
//!
//! Authentication and profile management live in a separate service; by the time a
//! request reaches this server, an auth proxy has already verified credentials and
//! asserts the caller through two headers. This module turns those headers into a typed
//! extractor. Nothing here verifies secrets; trust in the headers is a deployment
//! concern (the server must not be reachable except through the proxy).

use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use log::debug;
use retail_order_engine::db_types::Role;

use crate::errors::ServerError;

/// Header carrying the authenticated user's id.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying a comma-separated list of the user's roles.
pub const USER_ROLES_HEADER: &str = "x-user-roles";

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub roles: Vec<Role>,
}

impl AuthenticatedUser {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}

/// Reads the identity headers from a request, failing with 401 when no user is asserted.
/// Unknown role names are ignored rather than rejected; a missing roles header means a
/// plain user.
pub fn user_from_headers(req: &HttpRequest) -> Result<AuthenticatedUser, ServerError> {
    let user_id = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ServerError::Unauthenticated)?
        .to_string();
    let roles = req
        .headers()
        .get(USER_ROLES_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| {
            s.split(',')
                .filter_map(|r| {
                    r.trim()
                        .parse::<Role>()
                        .map_err(|e| debug!("💻️ Ignoring unknown role in {USER_ROLES_HEADER}: {e}"))
                        .ok()
                })
                .collect::<Vec<Role>>()
        })
        .unwrap_or_else(|| vec![Role::User]);
    Ok(AuthenticatedUser { user_id, roles })
}

impl FromRequest for AuthenticatedUser {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(user_from_headers(req))
    }
}
