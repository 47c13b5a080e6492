use thiserror::Error;

use crate::database::DatabaseError;

/// Why a request was refused before reaching its handler logic.
///
/// `NotFound` and `Forbidden` are distinct outcomes: a reference that does
/// not resolve is reported as such whatever the principal's rights.
#[derive(Debug, Error)]
pub enum AuthzError {
    #[error("Authentication credentials were not provided")]
    Unauthenticated,

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("{entity} not found")]
    MissingIdentifier { entity: &'static str },

    #[error("You do not have permission to perform this action")]
    Forbidden,

    #[error(transparent)]
    Store(#[from] DatabaseError),
}
