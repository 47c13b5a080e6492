use async_trait::async_trait;
use sqlx::PgPool;

use super::manager::{DatabaseError, DatabaseManager};
use super::models::{
    Comment, CommentId, Contributor, Issue, IssueId, NewComment, NewContributor, NewIssue,
    NewProject, Project, ProjectId, User, UserId,
};
use super::store::{EntityStore, StoreResult};

const PROJECT_COLUMNS: &str = "id, title, description, type, author_user_id";
const ISSUE_COLUMNS: &str = "id, title, description, tag, priority, status, project_id, \
                             author_user_id, assignee_user_id, created_time";
const COMMENT_COLUMNS: &str = "id, description, author_user_id, issue_id, created_time";

/// `EntityStore` over PostgreSQL; cascades and contributor uniqueness come
/// from the constraints in `schema.sql`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn not_found(what: &str, id: i64) -> DatabaseError {
    DatabaseError::NotFound(format!("{} {} not found", what, id))
}

#[async_trait]
impl EntityStore for PgStore {
    async fn health_check(&self) -> StoreResult<()> {
        DatabaseManager::health_check(&self.pool).await
    }

    async fn user_exists(&self, id: UserId) -> StoreResult<bool> {
        let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists.0)
    }

    async fn create_user(&self, username: &str) -> StoreResult<User> {
        sqlx::query_as::<_, User>("INSERT INTO users (username) VALUES ($1) RETURNING id, username")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_insert(e, &format!("user '{}' already exists", username)))
    }

    async fn get_project(&self, id: ProjectId) -> StoreResult<Option<Project>> {
        let sql = format!("SELECT {} FROM projects WHERE id = $1", PROJECT_COLUMNS);
        Ok(sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn projects_for_contributor(&self, user_id: UserId) -> StoreResult<Vec<Project>> {
        let sql = format!(
            "SELECT {} FROM projects p WHERE EXISTS (\
                SELECT 1 FROM contributors c WHERE c.project_id = p.id AND c.user_id = $1\
             ) ORDER BY p.id",
            PROJECT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Project>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn create_project(&self, new: NewProject) -> StoreResult<Project> {
        let sql = format!(
            "INSERT INTO projects (title, description, type, author_user_id) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            PROJECT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Project>(&sql)
            .bind(&new.title)
            .bind(&new.description)
            .bind(new.kind.as_str())
            .bind(new.author_user_id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_project(&self, project: &Project) -> StoreResult<Project> {
        let sql = format!(
            "UPDATE projects SET title = $2, description = $3, type = $4 WHERE id = $1 RETURNING {}",
            PROJECT_COLUMNS
        );
        sqlx::query_as::<_, Project>(&sql)
            .bind(project.id)
            .bind(&project.title)
            .bind(&project.description)
            .bind(project.kind.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found("project", project.id))
    }

    async fn delete_project(&self, id: ProjectId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found("project", id));
        }
        Ok(())
    }

    async fn contributor_exists(&self, user_id: UserId, project_id: ProjectId) -> StoreResult<bool> {
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM contributors WHERE user_id = $1 AND project_id = $2)",
        )
        .bind(user_id)
        .bind(project_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists.0)
    }

    async fn get_contributor(
        &self,
        user_id: UserId,
        project_id: ProjectId,
    ) -> StoreResult<Option<Contributor>> {
        Ok(sqlx::query_as::<_, Contributor>(
            "SELECT id, user_id, project_id, role FROM contributors \
             WHERE user_id = $1 AND project_id = $2 ORDER BY id LIMIT 1",
        )
        .bind(user_id)
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn contributors_of(&self, project_id: ProjectId) -> StoreResult<Vec<Contributor>> {
        Ok(sqlx::query_as::<_, Contributor>(
            "SELECT id, user_id, project_id, role FROM contributors WHERE project_id = $1 ORDER BY id",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn add_contributor(&self, new: NewContributor) -> StoreResult<Contributor> {
        sqlx::query_as::<_, Contributor>(
            "INSERT INTO contributors (user_id, project_id, role) VALUES ($1, $2, $3) \
             RETURNING id, user_id, project_id, role",
        )
        .bind(new.user_id)
        .bind(new.project_id)
        .bind(&new.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::from_insert(
                e,
                &format!("user {} is already a contributor of project {}", new.user_id, new.project_id),
            )
        })
    }

    async fn remove_contributor(&self, user_id: UserId, project_id: ProjectId) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM contributors WHERE user_id = $1 AND project_id = $2")
            .bind(user_id)
            .bind(project_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn get_issue(&self, project_id: ProjectId, id: IssueId) -> StoreResult<Option<Issue>> {
        let sql = format!("SELECT {} FROM issues WHERE id = $1 AND project_id = $2", ISSUE_COLUMNS);
        Ok(sqlx::query_as::<_, Issue>(&sql)
            .bind(id)
            .bind(project_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn issues_of(&self, project_id: ProjectId) -> StoreResult<Vec<Issue>> {
        let sql = format!("SELECT {} FROM issues WHERE project_id = $1 ORDER BY id", ISSUE_COLUMNS);
        Ok(sqlx::query_as::<_, Issue>(&sql)
            .bind(project_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn create_issue(&self, new: NewIssue) -> StoreResult<Issue> {
        let sql = format!(
            "INSERT INTO issues \
             (title, description, tag, priority, status, project_id, author_user_id, assignee_user_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            ISSUE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Issue>(&sql)
            .bind(&new.title)
            .bind(&new.description)
            .bind(new.tag.as_str())
            .bind(new.priority.as_str())
            .bind(new.status.as_str())
            .bind(new.project_id)
            .bind(new.author_user_id)
            .bind(new.assignee_user_id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_issue(&self, issue: &Issue) -> StoreResult<Issue> {
        // project_id, author_user_id and created_time are never rewritten
        let sql = format!(
            "UPDATE issues SET title = $2, description = $3, tag = $4, priority = $5, status = $6, \
             assignee_user_id = $7 WHERE id = $1 RETURNING {}",
            ISSUE_COLUMNS
        );
        sqlx::query_as::<_, Issue>(&sql)
            .bind(issue.id)
            .bind(&issue.title)
            .bind(&issue.description)
            .bind(issue.tag.as_str())
            .bind(issue.priority.as_str())
            .bind(issue.status.as_str())
            .bind(issue.assignee_user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found("issue", issue.id))
    }

    async fn delete_issue(&self, id: IssueId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM issues WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found("issue", id));
        }
        Ok(())
    }

    async fn get_comment(&self, issue_id: IssueId, id: CommentId) -> StoreResult<Option<Comment>> {
        let sql = format!("SELECT {} FROM comments WHERE id = $1 AND issue_id = $2", COMMENT_COLUMNS);
        Ok(sqlx::query_as::<_, Comment>(&sql)
            .bind(id)
            .bind(issue_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn comments_of(&self, issue_id: IssueId) -> StoreResult<Vec<Comment>> {
        let sql = format!("SELECT {} FROM comments WHERE issue_id = $1 ORDER BY id", COMMENT_COLUMNS);
        Ok(sqlx::query_as::<_, Comment>(&sql)
            .bind(issue_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn create_comment(&self, new: NewComment) -> StoreResult<Comment> {
        let sql = format!(
            "INSERT INTO comments (description, author_user_id, issue_id) VALUES ($1, $2, $3) RETURNING {}",
            COMMENT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Comment>(&sql)
            .bind(&new.description)
            .bind(new.author_user_id)
            .bind(new.issue_id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_comment(&self, comment: &Comment) -> StoreResult<Comment> {
        let sql = format!(
            "UPDATE comments SET description = $2 WHERE id = $1 RETURNING {}",
            COMMENT_COLUMNS
        );
        sqlx::query_as::<_, Comment>(&sql)
            .bind(comment.id)
            .bind(&comment.description)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found("comment", comment.id))
    }

    async fn delete_comment(&self, id: CommentId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found("comment", id));
        }
        Ok(())
    }
}
