use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::UserId;

/// Account row owned by the authentication layer; only its id matters here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: UserId,
    pub username: String,
}
