use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{CommentId, IssueId, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: CommentId,
    pub description: String,
    pub author_user_id: UserId,
    pub issue_id: IssueId,
    pub created_time: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub description: String,
    pub author_user_id: UserId,
    pub issue_id: IssueId,
}
