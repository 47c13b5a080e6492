use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{text_enum, ProjectId, UserId};

text_enum!(ProjectType, "project type", {
    BackEnd => "back-end",
    FrontEnd => "front-end",
    Ios => "iOS",
    Android => "Android",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type", try_from = "String")]
    pub kind: ProjectType,
    pub author_user_id: UserId,
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub kind: ProjectType,
    pub author_user_id: UserId,
}
