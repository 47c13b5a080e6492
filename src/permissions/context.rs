use axum::{
    async_trait,
    extract::{FromRequestParts, RawPathParams},
    http::{request::Parts, Method},
};
use std::convert::Infallible;

use super::error::AuthzError;
use super::path::{extract_ids, parse_id};
use crate::database::models::UserId;
use crate::middleware::AuthUser;

/// What a verb asks to do with a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// GET, HEAD, OPTIONS
    Read,
    /// POST to a collection
    Create,
    /// PUT, PATCH, DELETE (and any other verb)
    Modify,
}

impl Access {
    pub fn from_method(method: &Method) -> Self {
        match *method {
            Method::GET | Method::HEAD | Method::OPTIONS => Access::Read,
            Method::POST => Access::Create,
            _ => Access::Modify,
        }
    }

    pub fn is_safe(self) -> bool {
        self == Access::Read
    }
}

/// Everything the authorization engine needs to know about a request
#[derive(Debug, Clone)]
pub struct AuthorizationContext {
    pub principal: Option<UserId>,
    pub method: Method,
    /// One slot per identifier the path carries, in path order. A slot is
    /// `None` when its segment is not a number.
    pub path_ids: Vec<Option<i64>>,
}

impl AuthorizationContext {
    /// Context from a raw path; only numeric segments become slots.
    pub fn new(principal: Option<UserId>, method: Method, path: &str) -> Self {
        Self {
            principal,
            method,
            path_ids: extract_ids(path).into_iter().map(Some).collect(),
        }
    }

    /// Context from the values of the matched route's parameters.
    pub fn from_route<'a>(
        principal: Option<UserId>,
        method: Method,
        params: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            principal,
            method,
            path_ids: params.into_iter().map(parse_id).collect(),
        }
    }

    pub fn access(&self) -> Access {
        Access::from_method(&self.method)
    }

    /// First stage: a request without a principal goes no further.
    pub fn authenticate(&self) -> Result<UserId, AuthzError> {
        self.principal.ok_or(AuthzError::Unauthenticated)
    }

    /// Identifier at `position`, required
    pub fn id_at(&self, position: usize, entity: &'static str) -> Result<i64, AuthzError> {
        self.optional_id_at(position, entity)?
            .ok_or(AuthzError::MissingIdentifier { entity })
    }

    /// Identifier at `position` when the path is deep enough to carry one.
    /// A slot that is present but not a number names nothing.
    pub fn optional_id_at(&self, position: usize, entity: &'static str) -> Result<Option<i64>, AuthzError> {
        match self.path_ids.get(position) {
            None => Ok(None),
            Some(Some(id)) => Ok(Some(*id)),
            Some(None) => Err(AuthzError::MissingIdentifier { entity }),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthorizationContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let principal = parts.extensions.get::<AuthUser>().map(|user| user.user_id);
        let method = parts.method.clone();
        match RawPathParams::from_request_parts(parts, state).await {
            Ok(params) => Ok(Self::from_route(principal, method, params.iter().map(|(_, value)| value))),
            Err(_) => Ok(Self::new(principal, method, parts.uri.path())),
        }
    }
}
