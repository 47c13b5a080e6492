//! Per-resource allow/deny predicates.
//!
//! Pure functions over an already-resolved request: the principal, the kind
//! of access, the entities the path names and whether the principal is a
//! contributor of the project. Reads and creates are gated on membership;
//! edits are reserved to the author of the entity (the project author for
//! the project itself and its member list).

use super::context::Access;
use crate::config::IssueEditPolicy;
use crate::database::models::{Comment, Issue, Project, UserId};

pub fn project(principal: UserId, access: Access, project: &Project, is_member: bool) -> bool {
    match access {
        Access::Read => is_member,
        Access::Create | Access::Modify => project.author_user_id == principal,
    }
}

/// Listing members needs membership; adding or removing one needs authorship
pub fn membership(principal: UserId, access: Access, project: &Project, is_member: bool) -> bool {
    match access {
        Access::Read => is_member,
        Access::Create | Access::Modify => project.author_user_id == principal,
    }
}

pub fn issue(
    principal: UserId,
    access: Access,
    project: &Project,
    issue: Option<&Issue>,
    is_member: bool,
    edit_policy: IssueEditPolicy,
) -> bool {
    match access {
        Access::Read | Access::Create => is_member,
        Access::Modify => {
            let Some(issue) = issue else {
                return false;
            };
            let owns_issue = is_member && issue.author_user_id == principal;
            match edit_policy {
                IssueEditPolicy::AuthorOnly => owns_issue,
                IssueEditPolicy::AuthorOrProjectOwner => {
                    owns_issue || project.author_user_id == principal
                }
            }
        }
    }
}

pub fn comment(principal: UserId, access: Access, comment: Option<&Comment>, is_member: bool) -> bool {
    match access {
        Access::Read | Access::Create => is_member,
        Access::Modify => {
            comment.is_some_and(|comment| is_member && comment.author_user_id == principal)
        }
    }
}
