use async_trait::async_trait;

use super::manager::DatabaseError;
use super::models::{
    Comment, CommentId, Contributor, Issue, IssueId, NewComment, NewContributor, NewIssue,
    NewProject, Project, ProjectId, User, UserId,
};

pub type StoreResult<T> = Result<T, DatabaseError>;

/// Persistence for projects, memberships, issues and comments.
///
/// Lookups of nested entities are always scoped to their parent so that an
/// id taken from a path can never reach a row belonging to another project
/// or issue. Deleting a project or an issue cascades to everything it owns.
/// Every write touches a single row (plus its cascade), so implementations
/// only need per-statement atomicity.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn health_check(&self) -> StoreResult<()>;

    async fn user_exists(&self, id: UserId) -> StoreResult<bool>;
    async fn create_user(&self, username: &str) -> StoreResult<User>;

    async fn get_project(&self, id: ProjectId) -> StoreResult<Option<Project>>;
    /// Projects the user holds a contributor row for
    async fn projects_for_contributor(&self, user_id: UserId) -> StoreResult<Vec<Project>>;
    async fn create_project(&self, new: NewProject) -> StoreResult<Project>;
    async fn update_project(&self, project: &Project) -> StoreResult<Project>;
    async fn delete_project(&self, id: ProjectId) -> StoreResult<()>;

    /// True when at least one contributor row exists for the pair
    async fn contributor_exists(&self, user_id: UserId, project_id: ProjectId) -> StoreResult<bool>;
    async fn get_contributor(
        &self,
        user_id: UserId,
        project_id: ProjectId,
    ) -> StoreResult<Option<Contributor>>;
    async fn contributors_of(&self, project_id: ProjectId) -> StoreResult<Vec<Contributor>>;
    /// Fails with `Conflict` when the pair is already a member
    async fn add_contributor(&self, new: NewContributor) -> StoreResult<Contributor>;
    /// Removes every row for the pair, returns how many were removed
    async fn remove_contributor(&self, user_id: UserId, project_id: ProjectId) -> StoreResult<u64>;

    async fn get_issue(&self, project_id: ProjectId, id: IssueId) -> StoreResult<Option<Issue>>;
    async fn issues_of(&self, project_id: ProjectId) -> StoreResult<Vec<Issue>>;
    async fn create_issue(&self, new: NewIssue) -> StoreResult<Issue>;
    async fn update_issue(&self, issue: &Issue) -> StoreResult<Issue>;
    async fn delete_issue(&self, id: IssueId) -> StoreResult<()>;

    async fn get_comment(&self, issue_id: IssueId, id: CommentId) -> StoreResult<Option<Comment>>;
    async fn comments_of(&self, issue_id: IssueId) -> StoreResult<Vec<Comment>>;
    async fn create_comment(&self, new: NewComment) -> StoreResult<Comment>;
    async fn update_comment(&self, comment: &Comment) -> StoreResult<Comment>;
    async fn delete_comment(&self, id: CommentId) -> StoreResult<()>;
}
