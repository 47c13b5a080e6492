use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{ProjectId, UserId};

/// Membership of a user in a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Contributor {
    pub id: i64,
    pub user_id: UserId,
    pub project_id: ProjectId,
    pub role: String,
}

#[derive(Debug, Clone)]
pub struct NewContributor {
    pub user_id: UserId,
    pub project_id: ProjectId,
    pub role: String,
}
