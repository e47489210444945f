use serde_json::json;

use crate::common::{ADMIN_PASSWORD, ADMIN_USER, TestApp, routes};

mod login {
    use super::*;

    #[tokio::test]
    async fn bootstrap_admin_can_log_in() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"userName": ADMIN_USER, "password": ADMIN_PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["success"], true);
        assert!(res.body["token"].is_string());
        assert_eq!(res.body["admin"]["userName"], ADMIN_USER);
        assert!(res.body["admin"].get("password").is_none());
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"userName": ADMIN_USER, "password": "not-the-password"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["success"], false);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn unknown_user_gets_the_same_error_as_a_wrong_password() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"userName": "nobody", "password": ADMIN_PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn empty_credentials_are_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::LOGIN, &json!({"userName": "", "password": ""}))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(res.body["message"], "Please provide user name and password");
    }
}

mod register {
    use super::*;

    fn new_admin(user_name: &str, email: &str) -> serde_json::Value {
        json!({
            "name": "Vice Principal",
            "userName": user_name,
            "email": email,
            "password": "another-pass",
        })
    }

    #[tokio::test]
    async fn admin_can_register_another_admin_who_can_then_log_in() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let res = app
            .post_with_token(
                routes::REGISTER,
                &new_admin("vice", "vice@example.org"),
                &token,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["admin"]["userName"], "vice");

        let login = app
            .post_without_token(
                routes::LOGIN,
                &json!({"userName": "vice", "password": "another-pass"}),
            )
            .await;
        assert_eq!(login.status, 200, "{}", login.text);
    }

    #[tokio::test]
    async fn register_requires_a_token() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::REGISTER, &new_admin("vice", "vice@example.org"))
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn duplicate_user_name_or_email_conflicts() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let taken_name = app
            .post_with_token(
                routes::REGISTER,
                &new_admin(ADMIN_USER, "other@example.org"),
                &token,
            )
            .await;
        assert_eq!(taken_name.status, 409);
        assert_eq!(taken_name.body["code"], "CONFLICT");

        let taken_email = app
            .post_with_token(
                routes::REGISTER,
                &new_admin("someone", "Principal@Example.org"),
                &token,
            )
            .await;
        assert_eq!(taken_email.status, 409);
    }
}

mod me {
    use super::*;

    #[tokio::test]
    async fn returns_the_callers_profile() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let res = app.get_with_token(routes::ME, &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["admin"]["userName"], ADMIN_USER);
        assert_eq!(res.body["admin"]["email"], "principal@example.org");
    }

    #[tokio::test]
    async fn garbage_token_is_invalid() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(routes::ME, "not-a-jwt").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }
}
