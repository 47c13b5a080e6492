//! Contributor and authorship based access control.
//!
//! A request is described by an [`AuthorizationContext`] (principal, verb,
//! numeric ids taken from its path). The [`Authorizer`] resolves those ids
//! against the entity store and applies the per-resource rules in
//! [`policy`]; [`is_contributor`] is the single membership test they share.

pub mod context;
pub mod engine;
pub mod error;
pub mod membership;
pub mod path;
pub mod policy;

pub use context::{Access, AuthorizationContext};
pub use engine::{Authorizer, CommentGrant, IssueGrant, MembershipGrant, ProjectGrant};
pub use error::AuthzError;
pub use membership::is_contributor;
pub use path::extract_ids;
