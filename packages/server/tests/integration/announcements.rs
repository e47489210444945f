use reqwest::Method;
use reqwest::multipart::Form;
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, Set};

use schoolsite_server::entity::announcement;

use crate::common::{PNG, TestApp, TestResponse, image_part, routes};

async fn create(app: &TestApp, token: &str, form: Form) -> TestResponse {
    app.send_form(Method::POST, routes::ANNOUNCEMENTS, form, Some(token))
        .await
}

fn notice(title: &str) -> Form {
    Form::new()
        .text("title", title.to_string())
        .text("description", "Details inside")
}

#[tokio::test]
async fn created_announcement_is_listed_publicly() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let res = create(
        &app,
        &token,
        notice("Holiday").text("isImportant", "true"),
    )
    .await;
    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["announcement"]["isImportant"], true);
    assert!(res.body["announcement"]["attachmentUrl"].is_null());

    let list = app.get_without_token(routes::ANNOUNCEMENTS).await;
    assert_eq!(list.status, 200);
    assert_eq!(list.body["count"], 1);
    assert_eq!(list.body["announcements"][0]["title"], "Holiday");
}

#[tokio::test]
async fn attachment_is_stored() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let res = create(
        &app,
        &token,
        notice("Timetable").part("attachment", image_part(PNG, "timetable.png")),
    )
    .await;

    assert_eq!(res.status, 201, "{}", res.text);
    let url = res.body["announcement"]["attachmentUrl"].as_str().unwrap();
    assert!(url.starts_with("/media/announcement_uploads/"));
    assert_eq!(app.stored_files("announcement_uploads"), 1);
}

#[tokio::test]
async fn expired_announcements_are_hidden() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    create(&app, &token, notice("Old news").text("expiryDate", "2000-01-01")).await;
    create(&app, &token, notice("Future").text("expiryDate", "2999-12-31")).await;

    let list = app.get_without_token(routes::ANNOUNCEMENTS).await;
    assert_eq!(list.body["count"], 1);
    assert_eq!(list.body["announcements"][0]["title"], "Future");
}

#[tokio::test]
async fn newest_is_listed_first() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let first = create(&app, &token, notice("First")).await;
    create(&app, &token, notice("Second")).await;

    // Pin the first one an hour back so ordering does not depend on clock resolution.
    let model = announcement::Entity::find_by_id(first.id_of("announcement"))
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    let created_at = model.created_at - chrono::Duration::hours(1);
    let mut active = model.into_active_model();
    active.created_at = Set(created_at);
    active.update(&app.db).await.unwrap();

    let list = app.get_without_token(routes::ANNOUNCEMENTS).await;
    assert_eq!(list.body["announcements"][0]["title"], "Second");
    assert_eq!(list.body["announcements"][1]["title"], "First");
}

#[tokio::test]
async fn delete_deactivates() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let created = create(&app, &token, notice("Holiday")).await;
    let id = created.id_of("announcement");

    let res = app
        .delete_with_token(&routes::announcement(id), &token)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);

    let list = app.get_without_token(routes::ANNOUNCEMENTS).await;
    assert_eq!(list.body["count"], 0);

    let row = announcement::Entity::find_by_id(id)
        .one(&app.db)
        .await
        .unwrap()
        .expect("row should be kept");
    assert!(!row.is_active);
}

#[tokio::test]
async fn title_is_required() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let res = create(&app, &token, Form::new().text("description", "No title")).await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["message"], "title is required");
}
