// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Security Level: JWT Authentication Required
// Middleware: jwt_auth_middleware injects `AuthUser`; each handler then asks
// the `Authorizer` for a grant before reading the body or touching the store.
//
// A grant carries the entities the path resolved to, so handlers work on
// those instead of loading them again.

pub mod comments;
pub mod contributors;
pub mod issues;
pub mod projects;
