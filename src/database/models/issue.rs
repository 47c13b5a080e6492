use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{text_enum, IssueId, ProjectId, UserId};

text_enum!(IssueTag, "issue tag", {
    Bug => "bug",
    Improvement => "improvement",
    Task => "task",
});

text_enum!(IssuePriority, "issue priority", {
    Low => "low",
    Medium => "medium",
    High => "high",
});

text_enum!(IssueStatus, "issue status", {
    Todo => "todo",
    InProgress => "in-progress",
    Done => "done",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Issue {
    pub id: IssueId,
    pub title: String,
    pub description: String,
    #[sqlx(try_from = "String")]
    pub tag: IssueTag,
    #[sqlx(try_from = "String")]
    pub priority: IssuePriority,
    #[sqlx(try_from = "String")]
    pub status: IssueStatus,
    pub project_id: ProjectId,
    pub author_user_id: UserId,
    pub assignee_user_id: UserId,
    pub created_time: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewIssue {
    pub title: String,
    pub description: String,
    pub tag: IssueTag,
    pub priority: IssuePriority,
    pub status: IssueStatus,
    pub project_id: ProjectId,
    pub author_user_id: UserId,
    pub assignee_user_id: UserId,
}
