pub mod payload;

pub use payload::{ContributorPayload, CommentPayload, IssuePayload, ProjectPayload, UpdateMode};
