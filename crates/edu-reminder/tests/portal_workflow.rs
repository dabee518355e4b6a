//! End-to-end portal scenarios driven through the public HTTP router, the in-memory
//! record store, and the background welcome mailer.

mod common {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use axum::response::Response;
    use serde_json::Value;

    use edu_reminder::workflows::portal::{
        BackgroundMailer, DeliveryReceipt, MailerError, MemoryRecordStore, PortalService,
        WelcomeEmail, WelcomeMailer,
    };

    /// Transport that refuses any address on the `bounce.test` domain.
    pub(super) struct BouncingTransport;

    impl WelcomeMailer for BouncingTransport {
        fn send(&self, email: WelcomeEmail) -> Result<DeliveryReceipt, MailerError> {
            if email.email.ends_with("@bounce.test") {
                return Err(MailerError::Transport("recipient rejected".to_string()));
            }
            Ok(DeliveryReceipt::Delivered {
                message_id: format!("id-{}", email.email),
            })
        }
    }

    pub(super) fn build_portal() -> (
        Arc<PortalService<MemoryRecordStore, BackgroundMailer>>,
        Arc<BackgroundMailer>,
    ) {
        let mailer = Arc::new(BackgroundMailer::spawn(Arc::new(BouncingTransport)));
        let service = Arc::new(PortalService::new(
            Arc::new(MemoryRecordStore::new()),
            mailer.clone(),
        ));
        (service, mailer)
    }

    pub(super) fn json_request(method: Method, uri: &str, payload: &Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(payload).expect("serialize")))
            .expect("request")
    }

    pub(super) async fn read_json_body(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }
}

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::*;
use edu_reminder::workflows::portal::{portal_router, DeliveryStatus, UserType};
use serde_json::json;
use tower::ServiceExt;

fn student(first_name: &str, email: &str, level: &str, department: &str) -> serde_json::Value {
    json!({
        "first_name": first_name,
        "last_name": "Okafor",
        "email": email,
        "phone": "+234 803 555 0101",
        "level": level,
        "department": department,
        "notification_preference": "both",
    })
}

#[tokio::test]
async fn registration_schedule_and_feed_flow() {
    let (service, mailer) = build_portal();
    let router = portal_router(service);

    for payload in [
        student("Ada", "ada@uni.edu", "200", "Computer Science"),
        student("Bola", "bola@bounce.test", "200", "Physics"),
        student("Chidi", "chidi@uni.edu", "300", "Computer Science"),
    ] {
        let response = router
            .clone()
            .oneshot(json_request(Method::POST, "/api/v1/students", &payload))
            .await
            .expect("router call");
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/classes",
            &json!({
                "title": "Algorithms",
                "description": "Midterm review",
                "date": "2025-10-06",
                "time": "14:00",
                "location": "LT 2",
                "target_level": "200",
                "department": "",
            }),
        ))
        .await
        .expect("router call");
    assert_eq!(response.status(), StatusCode::CREATED);
    let scheduled = read_json_body(response).await;
    assert_eq!(scheduled["students_notified"], 2);
    // keep creation timestamps distinct
    std::thread::sleep(std::time::Duration::from_millis(5));

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/classes",
            &json!({
                "title": "Software Engineering Seminar",
                "date": "2025-10-08",
                "time": "10:00",
                "location": "Auditorium",
                "department": "Computer Science",
            }),
        ))
        .await
        .expect("router call");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = router
        .clone()
        .oneshot(
            Request::get("/api/v1/students/feed?email=Ada%40Uni.edu&now=2025-10-06T09:00")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router call");
    assert_eq!(response.status(), StatusCode::OK);
    let feed = read_json_body(response).await;
    let notifications = feed["notifications"].as_array().expect("feed");
    assert_eq!(notifications.len(), 2);
    assert_eq!(notifications[0]["title"], "Software Engineering Seminar");
    assert_eq!(notifications[0]["status_label"], "Upcoming");
    assert_eq!(notifications[1]["title"], "Algorithms");
    assert_eq!(notifications[1]["status_label"], "Due Soon");

    let response = router
        .oneshot(
            Request::get("/api/v1/students/feed?email=bola%40bounce.test&now=2025-10-06T15:00")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router call");
    let feed = read_json_body(response).await;
    let notifications = feed["notifications"].as_array().expect("feed");
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["status"], "past");

    let mailer = Arc::try_unwrap(mailer)
        .ok()
        .expect("router dropped its mailer handle");
    let deliveries = mailer.close().await;
    assert_eq!(deliveries.len(), 3);
    assert!(deliveries
        .iter()
        .all(|record| record.email_type == UserType::Student));
    let failed: Vec<_> = deliveries
        .iter()
        .filter(|record| record.status == DeliveryStatus::Failed)
        .map(|record| record.recipient_email.as_str())
        .collect();
    assert_eq!(failed, ["bola@bounce.test"]);
}

#[tokio::test]
async fn duplicate_registration_keeps_the_first_record() {
    let (service, _mailer) = build_portal();
    let router = portal_router(service.clone());

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/students",
            &student("Ada", "A@B.com", "100", "Mathematics"),
        ))
        .await
        .expect("router call");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = router
        .oneshot(json_request(
            Method::POST,
            "/api/v1/students",
            &student("Imposter", "a@b.com", "400", "Physics"),
        ))
        .await
        .expect("router call");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json_body(response).await;
    assert_eq!(body["errors"]["email"], "This email is already registered");

    let preview = service
        .preview_audience(&Default::default())
        .expect("preview");
    assert_eq!(preview.count, 1);
    assert_eq!(preview.students[0].first_name, "Ada");
}
