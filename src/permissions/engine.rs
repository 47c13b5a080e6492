use tracing::debug;

use super::context::AuthorizationContext;
use super::error::AuthzError;
use super::membership::is_contributor;
use super::policy;
use crate::config::IssueEditPolicy;
use crate::database::models::{Comment, Contributor, Issue, Project, UserId};
use crate::database::EntityStore;

/// Position of each identifier in a resource path
const PROJECT_POS: usize = 0;
const ISSUE_POS: usize = 1;
const MEMBER_POS: usize = 1;
const COMMENT_POS: usize = 2;

/// Project named by the path, cleared for the requested access
#[derive(Debug)]
pub struct ProjectGrant {
    pub principal: UserId,
    pub project: Project,
}

#[derive(Debug)]
pub struct MembershipGrant {
    pub principal: UserId,
    pub project: Project,
    /// The membership named by `/users/{id}/`, when the path has one
    pub contributor: Option<Contributor>,
}

#[derive(Debug)]
pub struct IssueGrant {
    pub principal: UserId,
    pub project: Project,
    pub issue: Option<Issue>,
}

#[derive(Debug)]
pub struct CommentGrant {
    pub principal: UserId,
    pub project: Project,
    pub issue: Issue,
    pub comment: Option<Comment>,
}

/// Decides whether a request may touch the resource its path names.
///
/// Each check runs three stages in order: the principal must be present
/// (`Unauthenticated`), every id in the path must resolve within its parent
/// (`NotFound`), then the resource policy must allow the access
/// (`Forbidden`). Nothing is written; the resolved entities are handed back
/// so handlers do not load them twice.
pub struct Authorizer<'a> {
    store: &'a dyn EntityStore,
    issue_edit_policy: IssueEditPolicy,
}

impl<'a> Authorizer<'a> {
    pub fn new(store: &'a dyn EntityStore, issue_edit_policy: IssueEditPolicy) -> Self {
        Self {
            store,
            issue_edit_policy,
        }
    }

    /// `/projects/{p}/`
    pub async fn project(&self, ctx: &AuthorizationContext) -> Result<ProjectGrant, AuthzError> {
        let principal = ctx.authenticate()?;
        let project = self.resolve_project(ctx).await?;
        let is_member = is_contributor(self.store, principal, project.id).await?;

        let allowed = policy::project(principal, ctx.access(), &project, is_member);
        self.decide(allowed, principal, ctx, "project", project.id)?;

        Ok(ProjectGrant { principal, project })
    }

    /// `/projects/{p}/users/[{u}/]`
    pub async fn membership(&self, ctx: &AuthorizationContext) -> Result<MembershipGrant, AuthzError> {
        let principal = ctx.authenticate()?;
        let project = self.resolve_project(ctx).await?;
        let contributor = match ctx.optional_id_at(MEMBER_POS, "contributor")? {
            Some(user_id) => Some(
                self.store
                    .get_contributor(user_id, project.id)
                    .await?
                    .ok_or(AuthzError::NotFound {
                        entity: "contributor",
                        id: user_id,
                    })?,
            ),
            None => None,
        };
        let is_member = is_contributor(self.store, principal, project.id).await?;

        let allowed = policy::membership(principal, ctx.access(), &project, is_member);
        self.decide(allowed, principal, ctx, "project members", project.id)?;

        Ok(MembershipGrant {
            principal,
            project,
            contributor,
        })
    }

    /// `/projects/{p}/issues/[{i}/]`
    pub async fn issue(&self, ctx: &AuthorizationContext) -> Result<IssueGrant, AuthzError> {
        let principal = ctx.authenticate()?;
        let project = self.resolve_project(ctx).await?;
        let issue = match ctx.optional_id_at(ISSUE_POS, "issue")? {
            Some(issue_id) => Some(self.resolve_issue(&project, issue_id).await?),
            None => None,
        };
        let is_member = is_contributor(self.store, principal, project.id).await?;

        let allowed = policy::issue(
            principal,
            ctx.access(),
            &project,
            issue.as_ref(),
            is_member,
            self.issue_edit_policy,
        );
        self.decide(allowed, principal, ctx, "issue", issue.as_ref().map_or(project.id, |i| i.id))?;

        Ok(IssueGrant {
            principal,
            project,
            issue,
        })
    }

    /// `/projects/{p}/issues/{i}/comments/[{c}/]`
    pub async fn comment(&self, ctx: &AuthorizationContext) -> Result<CommentGrant, AuthzError> {
        let principal = ctx.authenticate()?;
        let project = self.resolve_project(ctx).await?;
        let issue = self.resolve_issue(&project, ctx.id_at(ISSUE_POS, "issue")?).await?;
        let comment = match ctx.optional_id_at(COMMENT_POS, "comment")? {
            Some(comment_id) => Some(
                self.store
                    .get_comment(issue.id, comment_id)
                    .await?
                    .ok_or(AuthzError::NotFound {
                        entity: "comment",
                        id: comment_id,
                    })?,
            ),
            None => None,
        };
        let is_member = is_contributor(self.store, principal, project.id).await?;

        let allowed = policy::comment(principal, ctx.access(), comment.as_ref(), is_member);
        self.decide(allowed, principal, ctx, "comment", comment.as_ref().map_or(issue.id, |c| c.id))?;

        Ok(CommentGrant {
            principal,
            project,
            issue,
            comment,
        })
    }

    async fn resolve_project(&self, ctx: &AuthorizationContext) -> Result<Project, AuthzError> {
        let project_id = ctx.id_at(PROJECT_POS, "project")?;
        self.store
            .get_project(project_id)
            .await?
            .ok_or(AuthzError::NotFound {
                entity: "project",
                id: project_id,
            })
    }

    async fn resolve_issue(&self, project: &Project, issue_id: i64) -> Result<Issue, AuthzError> {
        self.store
            .get_issue(project.id, issue_id)
            .await?
            .ok_or(AuthzError::NotFound {
                entity: "issue",
                id: issue_id,
            })
    }

    fn decide(
        &self,
        allowed: bool,
        principal: UserId,
        ctx: &AuthorizationContext,
        resource: &str,
        id: i64,
    ) -> Result<(), AuthzError> {
        if allowed {
            return Ok(());
        }
        debug!(
            "Denied {} ({:?}) on {} {} for user {}",
            ctx.method,
            ctx.access(),
            resource,
            id,
            principal
        );
        Err(AuthzError::Forbidden)
    }
}
