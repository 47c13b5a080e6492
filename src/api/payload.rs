//! Request bodies and their field-level validation.
//!
//! Every field is optional at the serde level so that a bad body reports all
//! of its problems at once, keyed by field name. Text rules are declared with
//! `validator`; enum membership and the PUT "every field" rule are checked on
//! top and merged into the same field map. Server-controlled fields (ids,
//! authorship, parent links, timestamps) are not part of any payload; when a
//! client sends them they are ignored.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::database::models::{
    Comment, Issue, IssueId, IssuePriority, IssueStatus, IssueTag, NewComment, NewContributor,
    NewIssue, NewProject, Project, ProjectId, ProjectType, UserId,
};
use crate::error::ApiError;

const REQUIRED: &str = "This field is required.";

/// PUT replaces every writable field, PATCH only those supplied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    Replace,
    Merge,
}

impl UpdateMode {
    fn requires_all(self) -> bool {
        self == UpdateMode::Replace
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("This field may not be blank.".into()));
    }
    Ok(())
}

/// Field name to its first problem, as carried by `ApiError::ValidationError`
#[derive(Debug, Default)]
struct FieldErrors(HashMap<String, String>);

impl FieldErrors {
    /// Runs the declared rules of `payload`
    fn validate(payload: &impl Validate) -> Self {
        match payload.validate() {
            Ok(()) => Self::default(),
            Err(errors) => Self::from(errors),
        }
    }

    fn require<T>(&mut self, field: &str, value: &Option<T>, required: bool) {
        if required && value.is_none() {
            self.0.entry(field.to_string()).or_insert_with(|| REQUIRED.to_string());
        }
    }

    /// Parses an enum field; unknown values list the accepted ones
    fn choice<E>(&mut self, field: &str, value: Option<String>, allowed: &[E], required: bool) -> Option<E>
    where
        E: FromStr + Display,
    {
        self.require(field, &value, required);
        let value = value?;
        match value.parse() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                let expected: Vec<String> = allowed.iter().map(|e| e.to_string()).collect();
                self.0.insert(
                    field.to_string(),
                    format!("\"{}\" is not a valid choice. Expected one of: {}.", value, expected.join(", ")),
                );
                None
            }
        }
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn finish(self) -> Result<(), ApiError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }

    fn into_error(self) -> ApiError {
        ApiError::validation_error("Invalid field values", Some(self.0))
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, problems)| {
                let message = problems
                    .first()
                    .map(|problem| match &problem.message {
                        Some(message) => message.to_string(),
                        None => format!("Invalid value ({}).", problem.code),
                    })
                    .unwrap_or_default();
                (field.to_string(), message)
            })
            .collect();
        Self(fields)
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ProjectPayload {
    #[validate(custom(function = "not_blank"))]
    #[validate(length(max = 128, message = "Ensure this field has no more than 128 characters."))]
    pub title: Option<String>,

    #[validate(custom(function = "not_blank"))]
    #[validate(length(max = 1024, message = "Ensure this field has no more than 1024 characters."))]
    pub description: Option<String>,

    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl ProjectPayload {
    pub fn into_new(self, author_user_id: UserId) -> Result<NewProject, ApiError> {
        let mut errors = FieldErrors::validate(&self);
        errors.require("title", &self.title, true);
        errors.require("description", &self.description, true);
        let kind = errors.choice("type", self.kind, ProjectType::ALL, true);

        match (self.title, self.description, kind) {
            (Some(title), Some(description), Some(kind)) if errors.is_empty() => Ok(NewProject {
                title,
                description,
                kind,
                author_user_id,
            }),
            _ => Err(errors.into_error()),
        }
    }

    /// Applies the payload onto the stored project; id and author are kept.
    pub fn apply(self, mut project: Project, mode: UpdateMode) -> Result<Project, ApiError> {
        let required = mode.requires_all();
        let mut errors = FieldErrors::validate(&self);
        errors.require("title", &self.title, required);
        errors.require("description", &self.description, required);
        let kind = errors.choice("type", self.kind, ProjectType::ALL, required);
        errors.finish()?;

        if let Some(title) = self.title {
            project.title = title;
        }
        if let Some(description) = self.description {
            project.description = description;
        }
        if let Some(kind) = kind {
            project.kind = kind;
        }
        Ok(project)
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ContributorPayload {
    #[validate(range(min = 1, message = "Invalid pk - object does not exist."))]
    pub user_id: Option<UserId>,

    #[validate(custom(function = "not_blank"))]
    #[validate(length(max = 128, message = "Ensure this field has no more than 128 characters."))]
    pub role: Option<String>,
}

impl ContributorPayload {
    /// The project always comes from the path, never from the body
    pub fn into_new(self, project_id: ProjectId) -> Result<NewContributor, ApiError> {
        let mut errors = FieldErrors::validate(&self);
        errors.require("user_id", &self.user_id, true);
        errors.require("role", &self.role, true);

        match (self.user_id, self.role) {
            (Some(user_id), Some(role)) if errors.is_empty() => Ok(NewContributor {
                user_id,
                project_id,
                role,
            }),
            _ => Err(errors.into_error()),
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct IssuePayload {
    #[validate(custom(function = "not_blank"))]
    #[validate(length(max = 128, message = "Ensure this field has no more than 128 characters."))]
    pub title: Option<String>,

    #[validate(custom(function = "not_blank"))]
    #[validate(length(max = 1024, message = "Ensure this field has no more than 1024 characters."))]
    pub description: Option<String>,

    pub tag: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,

    #[validate(range(min = 1, message = "Invalid pk - object does not exist."))]
    pub assignee_user_id: Option<UserId>,
}

/// Enum fields of an issue body once parsed
struct IssueChoices {
    tag: Option<IssueTag>,
    priority: Option<IssuePriority>,
    status: Option<IssueStatus>,
}

impl IssuePayload {
    fn check(&self, required: bool) -> (FieldErrors, IssueChoices) {
        let mut errors = FieldErrors::validate(self);
        errors.require("title", &self.title, required);
        errors.require("description", &self.description, required);
        let choices = IssueChoices {
            tag: errors.choice("tag", self.tag.clone(), IssueTag::ALL, required),
            priority: errors.choice("priority", self.priority.clone(), IssuePriority::ALL, required),
            status: errors.choice("status", self.status.clone(), IssueStatus::ALL, required),
        };
        (errors, choices)
    }

    /// Project and author are injected; the assignee defaults to the author.
    pub fn into_new(self, project_id: ProjectId, author_user_id: UserId) -> Result<NewIssue, ApiError> {
        let (errors, choices) = self.check(true);

        match (self.title, self.description, choices.tag, choices.priority, choices.status) {
            (Some(title), Some(description), Some(tag), Some(priority), Some(status)) if errors.is_empty() => {
                Ok(NewIssue {
                    title,
                    description,
                    tag,
                    priority,
                    status,
                    project_id,
                    author_user_id,
                    assignee_user_id: self.assignee_user_id.unwrap_or(author_user_id),
                })
            }
            _ => Err(errors.into_error()),
        }
    }

    /// Applies the payload onto the stored issue. Project, author and
    /// creation time are never taken from the request.
    pub fn apply(self, mut issue: Issue, mode: UpdateMode) -> Result<Issue, ApiError> {
        let (errors, choices) = self.check(mode.requires_all());
        errors.finish()?;

        if let Some(title) = self.title {
            issue.title = title;
        }
        if let Some(description) = self.description {
            issue.description = description;
        }
        if let Some(tag) = choices.tag {
            issue.tag = tag;
        }
        if let Some(priority) = choices.priority {
            issue.priority = priority;
        }
        if let Some(status) = choices.status {
            issue.status = status;
        }
        if let Some(assignee) = self.assignee_user_id {
            issue.assignee_user_id = assignee;
        }
        Ok(issue)
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct CommentPayload {
    #[validate(custom(function = "not_blank"))]
    #[validate(length(max = 1024, message = "Ensure this field has no more than 1024 characters."))]
    pub description: Option<String>,
}

impl CommentPayload {
    pub fn into_new(self, issue_id: IssueId, author_user_id: UserId) -> Result<NewComment, ApiError> {
        let mut errors = FieldErrors::validate(&self);
        errors.require("description", &self.description, true);

        match self.description {
            Some(description) if errors.is_empty() => Ok(NewComment {
                description,
                author_user_id,
                issue_id,
            }),
            _ => Err(errors.into_error()),
        }
    }

    pub fn apply(self, mut comment: Comment, mode: UpdateMode) -> Result<Comment, ApiError> {
        let mut errors = FieldErrors::validate(&self);
        errors.require("description", &self.description, mode.requires_all());
        errors.finish()?;

        if let Some(description) = self.description {
            comment.description = description;
        }
        Ok(comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn field_errors(err: ApiError) -> HashMap<String, String> {
        match err {
            ApiError::ValidationError {
                field_errors: Some(fields),
                ..
            } => fields,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    fn issue_payload() -> IssuePayload {
        IssuePayload {
            title: Some("Login fails".into()),
            description: Some("500 on submit".into()),
            tag: Some("bug".into()),
            priority: Some("high".into()),
            status: Some("todo".into()),
            assignee_user_id: None,
        }
    }

    #[test]
    fn reports_every_failing_field() {
        let payload = ProjectPayload {
            title: Some("x".repeat(129)),
            description: Some("   ".into()),
            kind: Some("desktop".into()),
        };

        let fields = field_errors(payload.into_new(1).unwrap_err());

        assert_eq!(fields.len(), 3);
        assert!(fields["title"].contains("128"));
        assert!(fields["description"].contains("blank"));
        assert!(fields["type"].contains("back-end, front-end, iOS, Android"));
    }

    #[test]
    fn project_type_uses_wire_names() {
        let payload: ProjectPayload =
            serde_json::from_value(serde_json::json!({"title": "T", "description": "D", "type": "iOS"}))
                .unwrap();
        assert_eq!(payload.into_new(4).unwrap().kind, ProjectType::Ios);
    }

    #[test]
    fn assignee_defaults_to_author() {
        let new = issue_payload().into_new(3, 8).unwrap();
        assert_eq!(new.assignee_user_id, 8);
        assert_eq!(new.author_user_id, 8);
        assert_eq!(new.project_id, 3);
    }

    #[test]
    fn server_fields_in_body_are_ignored() {
        let payload: IssuePayload = serde_json::from_value(serde_json::json!({
            "title": "T", "description": "D", "tag": "task", "priority": "low", "status": "done",
            "project_id": 999, "author_user_id": 999
        }))
        .unwrap();

        let new = payload.into_new(3, 8).unwrap();

        assert_eq!(new.project_id, 3);
        assert_eq!(new.author_user_id, 8);
    }

    #[test]
    fn merge_keeps_unsupplied_fields_and_replace_requires_them() {
        let issue = Issue {
            id: 1,
            title: "Old".into(),
            description: "Old description".into(),
            tag: IssueTag::Task,
            priority: IssuePriority::Low,
            status: IssueStatus::Todo,
            project_id: 3,
            author_user_id: 8,
            assignee_user_id: 8,
            created_time: Utc::now(),
        };
        let patch = IssuePayload {
            status: Some("in-progress".into()),
            ..Default::default()
        };

        let merged = patch.apply(issue.clone(), UpdateMode::Merge).unwrap();
        assert_eq!(merged.status, IssueStatus::InProgress);
        assert_eq!(merged.title, "Old");

        let replace = IssuePayload {
            status: Some("done".into()),
            ..Default::default()
        };
        let fields = field_errors(replace.apply(issue, UpdateMode::Replace).unwrap_err());
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("tag"));
        assert!(!fields.contains_key("status"));
    }

    #[test]
    fn contributor_requires_user_and_role() {
        let fields = field_errors(ContributorPayload::default().into_new(2).unwrap_err());
        assert!(fields.contains_key("user_id"));
        assert!(fields.contains_key("role"));

        let new = ContributorPayload {
            user_id: Some(5),
            role: Some("frontend dev".into()),
        }
        .into_new(2)
        .unwrap();
        assert_eq!((new.user_id, new.project_id), (5, 2));
    }

    #[test]
    fn declared_rules_run_through_validate() {
        let payload = CommentPayload {
            description: Some("\t\n".into()),
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("description"));

        let long = CommentPayload {
            description: Some("é".repeat(1024)),
        };
        assert!(long.validate().is_ok());

        let fields = field_errors(
            CommentPayload {
                description: Some("é".repeat(1025)),
            }
            .into_new(1, 1)
            .unwrap_err(),
        );
        assert!(fields["description"].contains("1024"));
    }

    #[test]
    fn non_positive_ids_are_rejected() {
        let fields = field_errors(
            ContributorPayload {
                user_id: Some(0),
                role: Some("dev".into()),
            }
            .into_new(2)
            .unwrap_err(),
        );
        assert_eq!(fields.len(), 1);
        assert!(fields["user_id"].contains("does not exist"));
    }
}
