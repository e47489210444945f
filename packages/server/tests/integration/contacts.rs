use serde_json::{Value, json};

use crate::common::{TestApp, routes};

fn message(name: &str, email: &str, subject: &str) -> Value {
    json!({
        "name": name,
        "email": email,
        "phone": "98765 43210",
        "subject": subject,
        "message": "Please call me back.",
    })
}

async fn submit(app: &TestApp, body: &Value) -> i32 {
    let res = app.post_without_token(routes::CONTACT, body).await;
    assert_eq!(res.status, 201, "{}", res.text);
    res.id_of("contact")
}

#[tokio::test]
async fn anyone_can_submit_and_admin_sees_it_as_new() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    submit(&app, &message("Meera", "meera@example.org", "Admission")).await;

    let inbox = app.get_with_token(routes::CONTACTS, &token).await;
    assert_eq!(inbox.status, 200, "{}", inbox.text);
    assert_eq!(inbox.body["total"], 1);
    assert_eq!(inbox.body["contacts"][0]["status"], "new");
    assert_eq!(inbox.body["contacts"][0]["phone"], "98765 43210");
}

#[tokio::test]
async fn invalid_email_is_rejected() {
    let app = TestApp::spawn().await;

    let res = app
        .post_without_token(routes::CONTACT, &message("Meera", "meera", "Admission"))
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn blank_subject_is_rejected() {
    let app = TestApp::spawn().await;

    let res = app
        .post_without_token(routes::CONTACT, &message("Meera", "meera@example.org", "  "))
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["message"], "subject is required");
}

#[tokio::test]
async fn inbox_requires_a_token() {
    let app = TestApp::spawn().await;

    let res = app.get_without_token(routes::CONTACTS).await;

    assert_eq!(res.status, 401);
}

#[tokio::test]
async fn status_can_be_updated_and_filtered() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let id = submit(&app, &message("Meera", "meera@example.org", "Admission")).await;
    submit(&app, &message("Arjun", "arjun@example.org", "Transport")).await;

    let res = app
        .patch_with_token(&routes::contact(id), &json!({"status": "in-progress"}), &token)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["contact"]["status"], "in-progress");

    let in_progress = app
        .get_with_token(&format!("{}?status=in-progress", routes::CONTACTS), &token)
        .await;
    assert_eq!(in_progress.body["total"], 1);
    assert_eq!(in_progress.body["contacts"][0]["name"], "Meera");

    let fresh = app
        .get_with_token(&format!("{}?status=new", routes::CONTACTS), &token)
        .await;
    assert_eq!(fresh.body["total"], 1);
    assert_eq!(fresh.body["contacts"][0]["name"], "Arjun");
}

#[tokio::test]
async fn unknown_status_is_rejected() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let id = submit(&app, &message("Meera", "meera@example.org", "Admission")).await;

    let res = app
        .patch_with_token(&routes::contact(id), &json!({"status": "archived"}), &token)
        .await;

    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn search_and_pagination() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    for i in 0..5 {
        submit(
            &app,
            &message(&format!("Parent {i}"), "parent@example.org", "Fees"),
        )
        .await;
    }
    submit(&app, &message("Meera", "meera@example.org", "Admission")).await;

    let page = app
        .get_with_token(&format!("{}?search=fees&limit=2&page=2", routes::CONTACTS), &token)
        .await;
    assert_eq!(page.body["total"], 5);
    assert_eq!(page.body["pages"], 3);
    assert_eq!(page.body["count"], 2);

    let by_email = app
        .get_with_token(&format!("{}?search=MEERA@", routes::CONTACTS), &token)
        .await;
    assert_eq!(by_email.body["total"], 1);
}

#[tokio::test]
async fn delete_removes_the_message() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let id = submit(&app, &message("Meera", "meera@example.org", "Admission")).await;

    let res = app.delete_with_token(&routes::contact(id), &token).await;
    assert_eq!(res.status, 200, "{}", res.text);

    let again = app.delete_with_token(&routes::contact(id), &token).await;
    assert_eq!(again.status, 404);
}
