mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn members_comment_and_read_comments() -> Result<()> {
    let app = TestApp::new();
    let alice = app.user("alice").await?;
    let bob = app.user("bob").await?;
    let project = app.project(alice, "Tracker").await?;
    app.enroll(project, alice, alice, "author").await?;
    app.enroll(project, alice, bob, "dev").await?;
    let issue = app.issue(project, alice, "Crash").await?;
    let list = format!("/projects/{}/issues/{}/comments/", project, issue);

    let res = app
        .post(&list, bob, json!({ "description": "Reproduced", "author_user_id": alice, "issue_id": 9999 }))
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.data()["author_user_id"], bob);
    assert_eq!(res.data()["issue_id"], issue);

    let res = app.get(&list, alice).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()[0]["description"], "Reproduced");
    Ok(())
}

#[tokio::test]
async fn only_the_comment_author_edits_or_deletes() -> Result<()> {
    let app = TestApp::new();
    let alice = app.user("alice").await?;
    let bob = app.user("bob").await?;
    let project = app.project(alice, "Tracker").await?;
    app.enroll(project, alice, alice, "author").await?;
    app.enroll(project, alice, bob, "dev").await?;
    let issue = app.issue(project, alice, "Crash").await?;
    let comment = app.comment(project, issue, bob, "First").await?;
    let detail = format!("/projects/{}/issues/{}/comments/{}/", project, issue, comment);

    assert_eq!(app.get(&detail, alice).await?.status, StatusCode::OK);
    assert_eq!(
        app.put(&detail, alice, json!({ "description": "Edited" })).await?.status,
        StatusCode::FORBIDDEN
    );
    assert_eq!(app.delete(&detail, alice).await?.status, StatusCode::FORBIDDEN);

    let res = app.put(&detail, bob, json!({ "description": "Edited" })).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["description"], "Edited");
    assert_eq!(res.data()["author_user_id"], bob);

    assert_eq!(app.delete(&detail, bob).await?.status, StatusCode::NO_CONTENT);
    assert_eq!(app.get(&detail, bob).await?.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn comments_are_scoped_to_their_issue() -> Result<()> {
    let app = TestApp::new();
    let alice = app.user("alice").await?;
    let project = app.project(alice, "Tracker").await?;
    app.enroll(project, alice, alice, "author").await?;
    let first = app.issue(project, alice, "First").await?;
    let second = app.issue(project, alice, "Second").await?;
    let comment = app.comment(project, first, alice, "On the first").await?;

    let res = app
        .get(&format!("/projects/{}/issues/{}/comments/{}/", project, second, comment), alice)
        .await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app
        .get(&format!("/projects/{}/issues/9999/comments/", project), alice)
        .await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn blank_comment_is_rejected() -> Result<()> {
    let app = TestApp::new();
    let alice = app.user("alice").await?;
    let project = app.project(alice, "Tracker").await?;
    app.enroll(project, alice, alice, "author").await?;
    let issue = app.issue(project, alice, "Crash").await?;

    let res = app
        .post(
            &format!("/projects/{}/issues/{}/comments/", project, issue),
            alice,
            json!({ "description": "  " }),
        )
        .await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body["field_errors"]["description"].is_string());
    Ok(())
}

#[tokio::test]
async fn outsiders_cannot_comment() -> Result<()> {
    let app = TestApp::new();
    let alice = app.user("alice").await?;
    let mallory = app.user("mallory").await?;
    let project = app.project(alice, "Tracker").await?;
    app.enroll(project, alice, alice, "author").await?;
    let issue = app.issue(project, alice, "Crash").await?;
    let list = format!("/projects/{}/issues/{}/comments/", project, issue);

    assert_eq!(app.get(&list, mallory).await?.status, StatusCode::FORBIDDEN);
    assert_eq!(
        app.post(&list, mallory, json!({ "description": "Hi" })).await?.status,
        StatusCode::FORBIDDEN
    );
    Ok(())
}
