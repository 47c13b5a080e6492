mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;
use softdesk_api::database::EntityStore;

#[tokio::test]
async fn author_adds_a_frontend_developer() -> Result<()> {
    let app = TestApp::new();
    let a = app.user("a").await?;
    let b = app.user("b").await?;
    let project = app.project(a, "P").await?;
    app.enroll(project, a, a, "author").await?;
    let a_issue = app.issue(project, a, "A's issue").await?;

    let res = app
        .post(
            &format!("/projects/{}/users/", project),
            a,
            json!({ "user_id": b, "role": "frontend dev" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);

    let detail = format!("/projects/{}/", project);
    let issues = format!("/projects/{}/issues/", project);
    let a_issue_path = format!("/projects/{}/issues/{}/", project, a_issue);

    assert_eq!(app.get(&detail, b).await?.status, StatusCode::OK);
    assert_eq!(app.get(&issues, b).await?.status, StatusCode::OK);
    assert_eq!(
        app.post(&issues, b, common::issue_body("B's issue")).await?.status,
        StatusCode::CREATED
    );

    assert_eq!(
        app.put(&detail, b, json!({ "title": "T", "description": "D", "type": "front-end" }))
            .await?
            .status,
        StatusCode::FORBIDDEN
    );
    assert_eq!(app.delete(&detail, b).await?.status, StatusCode::FORBIDDEN);
    assert_eq!(
        app.put(&a_issue_path, b, common::issue_body("Hijacked")).await?.status,
        StatusCode::FORBIDDEN
    );
    assert_eq!(app.delete(&a_issue_path, b).await?.status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn issue_thread_between_three_contributors() -> Result<()> {
    let app = TestApp::new();
    let a = app.user("a").await?;
    let b = app.user("b").await?;
    let c = app.user("c").await?;
    let project = app.project(a, "P").await?;
    app.enroll(project, a, b, "frontend dev").await?;
    app.enroll(project, a, c, "backend dev").await?;

    let res = app
        .post(&format!("/projects/{}/issues/", project), b, common::issue_body("Broken button"))
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.data()["assignee_user_id"], b);
    let issue = res.id();

    let comment = app.comment(project, issue, b, "Happens on Safari only").await?;
    let issue_path = format!("/projects/{}/issues/{}/", project, issue);
    let comments_path = format!("/projects/{}/issues/{}/comments/", project, issue);
    let comment_path = format!("{}{}/", comments_path, comment);

    assert_eq!(app.get(&issue_path, c).await?.status, StatusCode::OK);
    let res = app.get(&comments_path, c).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()[0]["id"], comment);

    assert_eq!(
        app.put(&issue_path, c, common::issue_body("Mine")).await?.status,
        StatusCode::FORBIDDEN
    );
    assert_eq!(app.delete(&issue_path, c).await?.status, StatusCode::FORBIDDEN);
    assert_eq!(
        app.put(&comment_path, c, json!({ "description": "Edited" })).await?.status,
        StatusCode::FORBIDDEN
    );
    assert_eq!(app.delete(&comment_path, c).await?.status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn deleting_a_project_cascades() -> Result<()> {
    let app = TestApp::new();
    let a = app.user("a").await?;
    let b = app.user("b").await?;
    let project = app.project(a, "P").await?;
    app.enroll(project, a, b, "dev").await?;
    let issue = app.issue(project, b, "Crash").await?;
    let comment = app.comment(project, issue, b, "Seen").await?;

    let res = app.delete(&format!("/projects/{}/", project), a).await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    assert!(app.store.get_project(project).await?.is_none());
    assert!(app.store.contributors_of(project).await?.is_empty());
    assert!(app.store.get_issue(project, issue).await?.is_none());
    assert!(app.store.get_comment(issue, comment).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn deleting_an_issue_removes_its_comments() -> Result<()> {
    let app = TestApp::new();
    let a = app.user("a").await?;
    let project = app.project(a, "P").await?;
    app.enroll(project, a, a, "author").await?;
    let issue = app.issue(project, a, "Crash").await?;
    let comment = app.comment(project, issue, a, "Seen").await?;

    let res = app.delete(&format!("/projects/{}/issues/{}/", project, issue), a).await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    assert!(app.store.get_comment(issue, comment).await?.is_none());
    assert!(app.store.comments_of(issue).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn trailing_slash_is_optional() -> Result<()> {
    let app = TestApp::new();
    let a = app.user("a").await?;
    let project = app.project(a, "P").await?;
    app.enroll(project, a, a, "author").await?;

    assert_eq!(app.get(&format!("/projects/{}", project), a).await?.status, StatusCode::OK);
    assert_eq!(app.get(&format!("/projects/{}/", project), a).await?.status, StatusCode::OK);
    assert_eq!(app.get("/projects", a).await?.status, StatusCode::OK);
    Ok(())
}
