use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::manager::DatabaseError;
use super::models::{
    Comment, CommentId, Contributor, Issue, IssueId, NewComment, NewContributor, NewIssue,
    NewProject, Project, ProjectId, User, UserId,
};
use super::store::{EntityStore, StoreResult};

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<UserId, User>,
    projects: BTreeMap<ProjectId, Project>,
    contributors: BTreeMap<i64, Contributor>,
    issues: BTreeMap<IssueId, Issue>,
    comments: BTreeMap<CommentId, Comment>,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn remove_issue_cascade(&mut self, issue_id: IssueId) {
        self.issues.remove(&issue_id);
        self.comments.retain(|_, c| c.issue_id != issue_id);
    }
}

/// In-process `EntityStore` with the same constraints as the PostgreSQL
/// schema. All tables sit behind one lock, so every write is atomic with
/// its cascade.
pub struct MemoryStore {
    tables: RwLock<Tables>,
    enforce_unique_contributors: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::default(),
            enforce_unique_contributors: true,
        }
    }

    /// A store that, like a database missing the composite unique
    /// constraint, accepts duplicate contributor rows.
    pub fn without_contributor_uniqueness() -> Self {
        Self {
            tables: RwLock::default(),
            enforce_unique_contributors: false,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(what: &str, id: i64) -> DatabaseError {
    DatabaseError::NotFound(format!("{} {} not found", what, id))
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn user_exists(&self, id: UserId) -> StoreResult<bool> {
        Ok(self.tables.read().await.users.contains_key(&id))
    }

    async fn create_user(&self, username: &str) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == username) {
            return Err(DatabaseError::Conflict(format!("user '{}' already exists", username)));
        }
        let user = User {
            id: tables.allocate_id(),
            username: username.to_string(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_project(&self, id: ProjectId) -> StoreResult<Option<Project>> {
        Ok(self.tables.read().await.projects.get(&id).cloned())
    }

    async fn projects_for_contributor(&self, user_id: UserId) -> StoreResult<Vec<Project>> {
        let tables = self.tables.read().await;
        Ok(tables
            .projects
            .values()
            .filter(|p| {
                tables
                    .contributors
                    .values()
                    .any(|c| c.project_id == p.id && c.user_id == user_id)
            })
            .cloned()
            .collect())
    }

    async fn create_project(&self, new: NewProject) -> StoreResult<Project> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&new.author_user_id) {
            return Err(not_found("user", new.author_user_id));
        }
        let project = Project {
            id: tables.allocate_id(),
            title: new.title,
            description: new.description,
            kind: new.kind,
            author_user_id: new.author_user_id,
        };
        tables.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn update_project(&self, project: &Project) -> StoreResult<Project> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .projects
            .get_mut(&project.id)
            .ok_or_else(|| not_found("project", project.id))?;
        stored.title = project.title.clone();
        stored.description = project.description.clone();
        stored.kind = project.kind;
        Ok(stored.clone())
    }

    async fn delete_project(&self, id: ProjectId) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.projects.remove(&id).is_none() {
            return Err(not_found("project", id));
        }
        tables.contributors.retain(|_, c| c.project_id != id);
        let issue_ids: Vec<IssueId> = tables
            .issues
            .values()
            .filter(|i| i.project_id == id)
            .map(|i| i.id)
            .collect();
        for issue_id in issue_ids {
            tables.remove_issue_cascade(issue_id);
        }
        Ok(())
    }

    async fn contributor_exists(&self, user_id: UserId, project_id: ProjectId) -> StoreResult<bool> {
        Ok(self
            .tables
            .read()
            .await
            .contributors
            .values()
            .any(|c| c.user_id == user_id && c.project_id == project_id))
    }

    async fn get_contributor(
        &self,
        user_id: UserId,
        project_id: ProjectId,
    ) -> StoreResult<Option<Contributor>> {
        Ok(self
            .tables
            .read()
            .await
            .contributors
            .values()
            .find(|c| c.user_id == user_id && c.project_id == project_id)
            .cloned())
    }

    async fn contributors_of(&self, project_id: ProjectId) -> StoreResult<Vec<Contributor>> {
        Ok(self
            .tables
            .read()
            .await
            .contributors
            .values()
            .filter(|c| c.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn add_contributor(&self, new: NewContributor) -> StoreResult<Contributor> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&new.user_id) {
            return Err(not_found("user", new.user_id));
        }
        if !tables.projects.contains_key(&new.project_id) {
            return Err(not_found("project", new.project_id));
        }
        if self.enforce_unique_contributors
            && tables
                .contributors
                .values()
                .any(|c| c.user_id == new.user_id && c.project_id == new.project_id)
        {
            return Err(DatabaseError::Conflict(format!(
                "user {} is already a contributor of project {}",
                new.user_id, new.project_id
            )));
        }
        let contributor = Contributor {
            id: tables.allocate_id(),
            user_id: new.user_id,
            project_id: new.project_id,
            role: new.role,
        };
        tables.contributors.insert(contributor.id, contributor.clone());
        Ok(contributor)
    }

    async fn remove_contributor(&self, user_id: UserId, project_id: ProjectId) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.contributors.len();
        tables
            .contributors
            .retain(|_, c| !(c.user_id == user_id && c.project_id == project_id));
        Ok((before - tables.contributors.len()) as u64)
    }

    async fn get_issue(&self, project_id: ProjectId, id: IssueId) -> StoreResult<Option<Issue>> {
        Ok(self
            .tables
            .read()
            .await
            .issues
            .get(&id)
            .filter(|i| i.project_id == project_id)
            .cloned())
    }

    async fn issues_of(&self, project_id: ProjectId) -> StoreResult<Vec<Issue>> {
        Ok(self
            .tables
            .read()
            .await
            .issues
            .values()
            .filter(|i| i.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn create_issue(&self, new: NewIssue) -> StoreResult<Issue> {
        let mut tables = self.tables.write().await;
        if !tables.projects.contains_key(&new.project_id) {
            return Err(not_found("project", new.project_id));
        }
        let issue = Issue {
            id: tables.allocate_id(),
            title: new.title,
            description: new.description,
            tag: new.tag,
            priority: new.priority,
            status: new.status,
            project_id: new.project_id,
            author_user_id: new.author_user_id,
            assignee_user_id: new.assignee_user_id,
            created_time: Utc::now(),
        };
        tables.issues.insert(issue.id, issue.clone());
        Ok(issue)
    }

    async fn update_issue(&self, issue: &Issue) -> StoreResult<Issue> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .issues
            .get_mut(&issue.id)
            .ok_or_else(|| not_found("issue", issue.id))?;
        stored.title = issue.title.clone();
        stored.description = issue.description.clone();
        stored.tag = issue.tag;
        stored.priority = issue.priority;
        stored.status = issue.status;
        stored.assignee_user_id = issue.assignee_user_id;
        Ok(stored.clone())
    }

    async fn delete_issue(&self, id: IssueId) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.issues.contains_key(&id) {
            return Err(not_found("issue", id));
        }
        tables.remove_issue_cascade(id);
        Ok(())
    }

    async fn get_comment(&self, issue_id: IssueId, id: CommentId) -> StoreResult<Option<Comment>> {
        Ok(self
            .tables
            .read()
            .await
            .comments
            .get(&id)
            .filter(|c| c.issue_id == issue_id)
            .cloned())
    }

    async fn comments_of(&self, issue_id: IssueId) -> StoreResult<Vec<Comment>> {
        Ok(self
            .tables
            .read()
            .await
            .comments
            .values()
            .filter(|c| c.issue_id == issue_id)
            .cloned()
            .collect())
    }

    async fn create_comment(&self, new: NewComment) -> StoreResult<Comment> {
        let mut tables = self.tables.write().await;
        if !tables.issues.contains_key(&new.issue_id) {
            return Err(not_found("issue", new.issue_id));
        }
        let comment = Comment {
            id: tables.allocate_id(),
            description: new.description,
            author_user_id: new.author_user_id,
            issue_id: new.issue_id,
            created_time: Utc::now(),
        };
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update_comment(&self, comment: &Comment) -> StoreResult<Comment> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .comments
            .get_mut(&comment.id)
            .ok_or_else(|| not_found("comment", comment.id))?;
        stored.description = comment.description.clone();
        Ok(stored.clone())
    }

    async fn delete_comment(&self, id: CommentId) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.comments.remove(&id).is_none() {
            return Err(not_found("comment", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{IssuePriority, IssueStatus, IssueTag, ProjectType};

    async fn seeded() -> (MemoryStore, User, Project, Issue) {
        let store = MemoryStore::new();
        let author = store.create_user("alice").await.unwrap();
        let project = store
            .create_project(NewProject {
                title: "Tracker".into(),
                description: "Issue tracker".into(),
                kind: ProjectType::BackEnd,
                author_user_id: author.id,
            })
            .await
            .unwrap();
        store
            .add_contributor(NewContributor {
                user_id: author.id,
                project_id: project.id,
                role: "lead".into(),
            })
            .await
            .unwrap();
        let issue = store
            .create_issue(NewIssue {
                title: "Crash".into(),
                description: "Crashes on start".into(),
                tag: IssueTag::Bug,
                priority: IssuePriority::High,
                status: IssueStatus::Todo,
                project_id: project.id,
                author_user_id: author.id,
                assignee_user_id: author.id,
            })
            .await
            .unwrap();
        store
            .create_comment(NewComment {
                description: "Reproduced".into(),
                author_user_id: author.id,
                issue_id: issue.id,
            })
            .await
            .unwrap();
        (store, author, project, issue)
    }

    #[tokio::test]
    async fn deleting_project_cascades() {
        let (store, author, project, issue) = seeded().await;

        store.delete_project(project.id).await.unwrap();

        assert!(store.get_project(project.id).await.unwrap().is_none());
        assert!(!store.contributor_exists(author.id, project.id).await.unwrap());
        assert!(store.issues_of(project.id).await.unwrap().is_empty());
        assert!(store.comments_of(issue.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_issue_removes_its_comments_only() {
        let (store, author, project, issue) = seeded().await;

        store.delete_issue(issue.id).await.unwrap();

        assert!(store.get_issue(project.id, issue.id).await.unwrap().is_none());
        assert!(store.comments_of(issue.id).await.unwrap().is_empty());
        assert!(store.contributor_exists(author.id, project.id).await.unwrap());
    }

    #[tokio::test]
    async fn nested_lookups_are_scoped_to_parent() {
        let (store, _, project, issue) = seeded().await;

        assert!(store.get_issue(project.id + 1000, issue.id).await.unwrap().is_none());
        let comment = &store.comments_of(issue.id).await.unwrap()[0];
        assert!(store.get_comment(issue.id + 1000, comment.id).await.unwrap().is_none());
        assert!(store.get_comment(issue.id, comment.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn rejects_duplicate_membership() {
        let (store, author, project, _) = seeded().await;

        let result = store
            .add_contributor(NewContributor {
                user_id: author.id,
                project_id: project.id,
                role: "again".into(),
            })
            .await;

        assert!(matches!(result, Err(DatabaseError::Conflict(_))));
    }

    #[tokio::test]
    async fn update_keeps_server_controlled_fields() {
        let (store, author, project, issue) = seeded().await;
        let mut tampered = issue.clone();
        tampered.project_id = project.id + 1;
        tampered.author_user_id = author.id + 1;
        tampered.title = "Crash on launch".into();

        let updated = store.update_issue(&tampered).await.unwrap();

        assert_eq!(updated.title, "Crash on launch");
        assert_eq!(updated.project_id, issue.project_id);
        assert_eq!(updated.author_user_id, issue.author_user_id);
        assert_eq!(updated.created_time, issue.created_time);
    }
}
