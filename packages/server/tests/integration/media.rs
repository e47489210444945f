use reqwest::Method;
use reqwest::multipart::Form;

use crate::common::{MAX_MEDIA_SIZE, PNG, TestApp, image_part, routes};

fn media_form(title: &str, media_type: &str, bytes: &[u8]) -> Form {
    Form::new()
        .text("title", title.to_string())
        .text("mediaType", media_type.to_string())
        .part("file", image_part(bytes, "photo.png"))
}

async fn upload(app: &TestApp, token: &str, form: Form) -> crate::common::TestResponse {
    app.send_form(Method::POST, routes::MEDIA, form, Some(token))
        .await
}

#[tokio::test]
async fn uploaded_media_is_listed_newest_first() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let first = upload(&app, &token, media_form("Sports Day", "event", PNG)).await;
    assert_eq!(first.status, 201, "{}", first.text);
    assert_eq!(first.body["media"]["mediaType"], "event");
    assert!(
        first.body["media"]["publicId"]
            .as_str()
            .unwrap()
            .starts_with("media_uploads/")
    );

    let mut other = PNG.to_vec();
    other.push(1);
    let second = upload(&app, &token, media_form("Welcome", "banner", &other)).await;
    assert_eq!(second.status, 201, "{}", second.text);

    let res = app.get_without_token(routes::MEDIA).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["count"], 2);
    assert_eq!(res.body["media"][0]["title"], "Welcome");
    assert_eq!(res.body["media"][1]["title"], "Sports Day");
}

#[tokio::test]
async fn list_filters_by_media_type() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    upload(&app, &token, media_form("Sports Day", "event", PNG)).await;

    let events = app
        .get_without_token(&format!("{}?mediaType=event", routes::MEDIA))
        .await;
    let banners = app
        .get_without_token(&format!("{}?mediaType=banner", routes::MEDIA))
        .await;

    assert_eq!(events.body["count"], 1);
    assert_eq!(banners.body["count"], 0);
}

#[tokio::test]
async fn unknown_media_type_is_rejected() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let res = upload(&app, &token, media_form("Poster", "poster", PNG)).await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
    assert_eq!(app.stored_files("media_uploads"), 0);
}

#[tokio::test]
async fn file_is_required() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let form = Form::new()
        .text("title", "No file")
        .text("mediaType", "gallery");
    let res = upload(&app, &token, form).await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["message"], "Please upload an image file");
}

#[tokio::test]
async fn oversized_file_is_rejected() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let big = vec![0u8; MAX_MEDIA_SIZE as usize + 1];
    let res = upload(&app, &token, media_form("Huge", "gallery", &big)).await;

    assert_eq!(res.status, 413, "{}", res.text);
}

#[tokio::test]
async fn delete_removes_file_and_row() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let created = upload(&app, &token, media_form("Sports Day", "event", PNG)).await;
    let id = created.id_of("media");
    let public_id = created.body["media"]["publicId"].as_str().unwrap().to_string();

    let res = app.delete_with_token(&routes::media_item(id), &token).await;
    assert_eq!(res.status, 200, "{}", res.text);

    let list = app.get_without_token(routes::MEDIA).await;
    assert_eq!(list.body["count"], 0);
    assert_eq!(app.stored_files("media_uploads"), 0);

    let served = app.get_without_token(&format!("/media/{public_id}")).await;
    assert_eq!(served.status, 404);
}

#[tokio::test]
async fn upload_and_delete_require_a_token() {
    let app = TestApp::spawn().await;

    let res = app
        .send_form(
            Method::POST,
            routes::MEDIA,
            media_form("Sports Day", "event", PNG),
            None,
        )
        .await;
    assert_eq!(res.status, 401);

    let res = app
        .client
        .delete(app.url(&routes::media_item(1)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);
}

#[tokio::test]
async fn media_route_rejects_path_traversal() {
    let app = TestApp::spawn().await;

    let res = app
        .get_without_token("/media/student_photos/..%2F..%2Fetc%2Fpasswd")
        .await;

    assert_eq!(res.status, 404);
}
