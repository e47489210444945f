use ::common::{CoScholasticArea, MarkPair, ResultPayload, StudentResult, Subject};
use ::common::student::SubjectInput;
use chrono::NaiveDate;
use reqwest::Method;
use serde_json::json;

use crate::common::{
    MAX_PHOTO_SIZE, PNG, TestApp, image_part, result_form, routes, sample_payload,
};

mod create {
    use super::*;

    #[tokio::test]
    async fn created_result_is_graded_and_fetchable_by_roll_number() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let created = app
            .create_result(&sample_payload("8A028", "Asha Verma", "8"), None, &token)
            .await;
        assert_eq!(created.status, 201, "{}", created.text);
        assert_eq!(created.body["success"], true);

        let res = app.get_without_token(&routes::result("8A028")).await;
        assert_eq!(res.status, 200, "{}", res.text);

        let student = &res.body["student"];
        assert_eq!(student["rollNo"], "8A028");
        assert_eq!(student["attendancePercentage"], 90);
        assert_eq!(student["subjects"][0]["grade"], "B");
        assert_eq!(student["aggregate"]["percentage"], 78.0);
        assert_eq!(student["aggregate"]["grade"], "B");
    }

    #[tokio::test]
    async fn every_input_field_survives_create_and_fetch() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        // Grades are supplied, so the server keeps them as sent.
        let input = ResultPayload {
            roll_no: "9C114".into(),
            name: "Kavya Rao".into(),
            class_name: "9".into(),
            section: "C".into(),
            father_name: "Suresh Rao".into(),
            mother_name: "Lakshmi Rao".into(),
            dob: NaiveDate::from_ymd_opt(2011, 4, 23),
            admission_no: Some("ADM-2019-0457".into()),
            total_present_days: 201,
            total_school_days: Some(220),
            subjects: vec![
                SubjectInput::from(Subject {
                    name: "Science".into(),
                    half_yearly: Some(MarkPair::new(41.0, 50.0)),
                    annual_exam: MarkPair::new(88.0, 100.0),
                    grade: Some("A".into()),
                }),
                SubjectInput::from(Subject {
                    name: "Sanskrit".into(),
                    half_yearly: None,
                    annual_exam: MarkPair::new(29.5, 50.0),
                    grade: Some("C".into()),
                }),
            ],
            co_scholastic_areas: vec![CoScholasticArea {
                area: "Work Education".into(),
                grade: "A".into(),
                remarks: "Neat model of a water filter".into(),
            }],
            fees_paid: false,
            promoted_to_next_class: true,
            result_declaration_date: NaiveDate::from_ymd_opt(2025, 3, 29),
        };

        let created = app.create_result(&input, None, &token).await;
        assert_eq!(created.status, 201, "{}", created.text);

        let res = app.get_without_token(&routes::result("9C114")).await;
        assert_eq!(res.status, 200, "{}", res.text);

        let student: StudentResult = serde_json::from_value(res.body["student"].clone())
            .expect("student should deserialize");
        assert_eq!(student.attendance_percentage, 91);
        assert_eq!(
            serde_json::to_value(ResultPayload::from(student)).unwrap(),
            serde_json::to_value(&input).unwrap()
        );
    }

    #[tokio::test]
    async fn legacy_subject_shape_is_migrated() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let form = result_form(&sample_payload("7B001", "Ravi", "7")).text(
            "subjects",
            json!([{"name": "Science", "maxMarks": 50, "marksObtained": 45}]).to_string(),
        );
        let res = app
            .send_form(Method::POST, routes::RESULTS, form, Some(&token))
            .await;
        assert_eq!(res.status, 201, "{}", res.text);

        let subject = &res.body["student"]["subjects"][0];
        assert_eq!(subject["annualExam"]["obtained"], 45.0);
        assert_eq!(subject["annualExam"]["total"], 50.0);
        assert_eq!(subject["grade"], "A");
    }

    #[tokio::test]
    async fn supplied_grade_is_kept() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let mut payload = sample_payload("6C010", "Meena", "6");
        payload.subjects[0].grade = Some("A".into());
        let res = app.create_result(&payload, None, &token).await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["student"]["subjects"][0]["grade"], "A");
    }

    #[tokio::test]
    async fn duplicate_roll_number_conflicts_and_keeps_one_record() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let payload = sample_payload("8A028", "Asha Verma", "8");

        let first = app.create_result(&payload, None, &token).await;
        assert_eq!(first.status, 201, "{}", first.text);

        let second = app.create_result(&payload, None, &token).await;
        assert_eq!(second.status, 409);
        assert_eq!(second.body["code"], "CONFLICT");

        let list = app.get_with_token(routes::RESULTS, &token).await;
        assert_eq!(list.body["total"], 1);
    }

    #[tokio::test]
    async fn missing_required_fields_are_rejected() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let res = app
            .create_result(&sample_payload("", "Nameless", "8"), None, &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(res.body["message"], "rollNo is required");
    }

    #[tokio::test]
    async fn requires_a_token() {
        let app = TestApp::spawn().await;

        let res = app
            .send_form(
                Method::POST,
                routes::RESULTS,
                result_form(&sample_payload("8A028", "Asha", "8")),
                None,
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn photo_is_stored_and_served() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let res = app
            .create_result(
                &sample_payload("8A028", "Asha", "8"),
                Some(image_part(PNG, "asha.png")),
                &token,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);

        let photo = &res.body["student"]["photo"];
        let public_id = photo["publicId"].as_str().unwrap();
        assert!(public_id.starts_with("student_photos/"));
        assert!(public_id.ends_with(".png"));
        assert_eq!(photo["url"], format!("/media/{public_id}"));

        let served = app
            .client
            .get(app.url(&format!("/media/{public_id}")))
            .send()
            .await
            .unwrap();
        assert_eq!(served.status(), 200);
        assert_eq!(served.headers()["content-type"], "image/png");
        assert_eq!(served.bytes().await.unwrap().as_ref(), PNG);
    }

    #[tokio::test]
    async fn non_image_photo_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let part = reqwest::multipart::Part::bytes(b"%PDF-1.4".to_vec())
            .file_name("report.pdf")
            .mime_str("application/pdf")
            .unwrap();
        let res = app
            .create_result(&sample_payload("8A028", "Asha", "8"), Some(part), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["message"], "Only image files are allowed");
        assert_eq!(app.stored_files("student_photos"), 0);
    }

    #[tokio::test]
    async fn oversized_photo_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let big = vec![0u8; MAX_PHOTO_SIZE as usize + 1];
        let res = app
            .create_result(
                &sample_payload("8A028", "Asha", "8"),
                Some(image_part(&big, "big.png")),
                &token,
            )
            .await;

        assert_eq!(res.status, 413, "{}", res.text);
        assert_eq!(res.body["code"], "PAYLOAD_TOO_LARGE");
    }
}

mod fetch {
    use super::*;

    #[tokio::test]
    async fn unknown_roll_number_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(&routes::result("NOPE")).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["success"], false);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn unpaid_record_is_still_returned_in_full() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let mut payload = sample_payload("5D004", "Kiran", "5");
        payload.fees_paid = false;
        app.create_result(&payload, None, &token).await;

        let res = app.get_without_token(&routes::result("5D004")).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["student"]["feesPaid"], false);
        assert_eq!(res.body["student"]["subjects"][0]["name"], "Math");
    }
}

mod list {
    use super::*;

    async fn seed(app: &TestApp, token: &str) {
        for (roll_no, name, class_name) in [
            ("8A001", "Zara", "8"),
            ("8A002", "Aman", "8"),
            ("8A003", "Mohan", "8"),
            ("7A001", "Bela", "7"),
            ("7A002", "Chetan", "7"),
        ] {
            let res = app
                .create_result(&sample_payload(roll_no, name, class_name), None, token)
                .await;
            assert_eq!(res.status, 201, "{}", res.text);
        }
    }

    #[tokio::test]
    async fn pages_cover_every_record() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        seed(&app, &token).await;

        let first = app
            .get_with_token(&format!("{}?page=1&limit=2", routes::RESULTS), &token)
            .await;
        assert_eq!(first.status, 200, "{}", first.text);
        assert_eq!(first.body["total"], 5);
        assert_eq!(first.body["pages"], 3);
        assert_eq!(first.body["count"], 2);

        let last = app
            .get_with_token(&format!("{}?page=3&limit=2", routes::RESULTS), &token)
            .await;
        assert_eq!(last.body["count"], 1);
        assert_eq!(last.body["page"], 3);
    }

    #[tokio::test]
    async fn default_sort_is_by_name() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        seed(&app, &token).await;

        let res = app.get_with_token(routes::RESULTS, &token).await;
        let names: Vec<&str> = res.body["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap())
            .collect();

        assert_eq!(names, ["Aman", "Bela", "Chetan", "Mohan", "Zara"]);
    }

    #[tokio::test]
    async fn filters_by_class_and_sorts_descending() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        seed(&app, &token).await;

        let res = app
            .get_with_token(
                &format!("{}?className=8&sortBy=rollNo&sortOrder=desc", routes::RESULTS),
                &token,
            )
            .await;

        assert_eq!(res.body["total"], 3);
        assert_eq!(res.body["results"][0]["rollNo"], "8A003");
        assert_eq!(res.body["results"][2]["rollNo"], "8A001");
    }

    #[tokio::test]
    async fn search_matches_name_or_roll_number() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        seed(&app, &token).await;

        let by_name = app
            .get_with_token(&format!("{}?search=MOH", routes::RESULTS), &token)
            .await;
        assert_eq!(by_name.body["total"], 1);
        assert_eq!(by_name.body["results"][0]["name"], "Mohan");

        let by_roll = app
            .get_with_token(&format!("{}?search=7a", routes::RESULTS), &token)
            .await;
        assert_eq!(by_roll.body["total"], 2);
    }

    #[tokio::test]
    async fn unknown_sort_key_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let res = app
            .get_with_token(&format!("{}?sortBy=password", routes::RESULTS), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn listing_requires_a_token() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::RESULTS).await;

        assert_eq!(res.status, 401);
    }
}

mod update {
    use super::*;

    #[tokio::test]
    async fn update_recomputes_attendance_and_grades() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let created = app
            .create_result(&sample_payload("8A028", "Asha", "8"), None, &token)
            .await;
        let id = created.id_of("student");

        let res = app
            .put_with_token(
                &routes::result(id),
                &json!({
                    "totalPresentDays": 150,
                    "subjects": [{"name": "Math", "annualExam": {"obtained": 92, "total": 100}}],
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let student = &res.body["student"];
        assert_eq!(student["attendancePercentage"], 75);
        assert_eq!(student["subjects"][0]["grade"], "A");
        assert_eq!(student["aggregate"]["grade"], "A");
        assert_eq!(student["name"], "Asha");
    }

    #[tokio::test]
    async fn roll_number_cannot_change() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let created = app
            .create_result(&sample_payload("8A028", "Asha", "8"), None, &token)
            .await;
        let id = created.id_of("student");

        let res = app
            .put_with_token(&routes::result(id), &json!({"rollNo": "9Z999"}), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["message"], "rollNo cannot be changed");
    }

    #[tokio::test]
    async fn unknown_fields_are_rejected() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let created = app
            .create_result(&sample_payload("8A028", "Asha", "8"), None, &token)
            .await;
        let id = created.id_of("student");

        let res = app
            .put_with_token(
                &routes::result(id),
                &json!({"attendancePercentage": 100}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn missing_record_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let res = app
            .put_with_token(&routes::result(9999), &json!({"name": "x"}), &token)
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn photo_can_be_replaced() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let created = app
            .create_result(
                &sample_payload("8A028", "Asha", "8"),
                Some(image_part(PNG, "old.png")),
                &token,
            )
            .await;
        let id = created.id_of("student");
        let old_id = created.body["student"]["photo"]["publicId"]
            .as_str()
            .unwrap()
            .to_string();

        let mut new_bytes = PNG.to_vec();
        new_bytes.push(0);
        let form = reqwest::multipart::Form::new().part("photo", image_part(&new_bytes, "new.png"));
        let res = app
            .send_form(Method::PUT, &routes::result_photo(id), form, Some(&token))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let new_id = res.body["student"]["photo"]["publicId"].as_str().unwrap();
        assert_ne!(new_id, old_id);
        assert_eq!(app.stored_files("student_photos"), 1);
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn delete_removes_record_and_photo() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let created = app
            .create_result(
                &sample_payload("8A028", "Asha", "8"),
                Some(image_part(PNG, "asha.png")),
                &token,
            )
            .await;
        let id = created.id_of("student");
        assert_eq!(app.stored_files("student_photos"), 1);

        let res = app.delete_with_token(&routes::result(id), &token).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["success"], true);

        let gone = app.get_without_token(&routes::result("8A028")).await;
        assert_eq!(gone.status, 404);
        assert_eq!(app.stored_files("student_photos"), 0);
    }

    #[tokio::test]
    async fn shared_photo_survives_until_its_last_record_is_deleted() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let first = app
            .create_result(
                &sample_payload("8A001", "Twin One", "8"),
                Some(image_part(PNG, "twin.png")),
                &token,
            )
            .await;
        app.create_result(
            &sample_payload("8A002", "Twin Two", "8"),
            Some(image_part(PNG, "twin.png")),
            &token,
        )
        .await;
        assert_eq!(app.stored_files("student_photos"), 1);

        app.delete_with_token(&routes::result(first.id_of("student")), &token)
            .await;

        assert_eq!(app.stored_files("student_photos"), 1);
    }

    #[tokio::test]
    async fn deleting_twice_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let created = app
            .create_result(&sample_payload("8A028", "Asha", "8"), None, &token)
            .await;
        let id = created.id_of("student");

        app.delete_with_token(&routes::result(id), &token).await;
        let res = app.delete_with_token(&routes::result(id), &token).await;

        assert_eq!(res.status, 404);
    }
}
