//! End-to-end API tests against an in-process router.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use lawdesk::auth::PasswordHasher;
use lawdesk::store::Store;
use serde_json::{Value, json};

use common::{ADMIN_EMAIL, TestApp};

async fn register(app: &TestApp, name: &str, email: &str, password: &str) -> (StatusCode, Value) {
    app.request(
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "name": name, "email": email, "password": password })),
    )
    .await
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let (status, body) = app.request(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::new();

    let request = Request::get("/api/portal").body(Body::empty()).unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Authentication required.");

    let (status, body) = app.get("/api/cases", "not-a-session").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Session expired or invalid.");
}

#[tokio::test]
async fn test_register_login_and_create_case() {
    let app = TestApp::new();

    let (status, registered) = register(&app, "Ana Silva", "ana@example.com", "s3cretpass").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(registered["user"]["email"], "ana@example.com");
    assert_eq!(registered["user"]["name"], "Ana Silva");
    assert!(registered["user"].get("passwordHash").is_none());
    assert!(registered["expiresAt"].is_string());

    let token = app.login("ana@example.com", "s3cretpass").await;
    assert_ne!(token, registered["token"].as_str().unwrap());

    let (status, portal) = app.get("/api/portal", &token).await;
    assert_eq!(status, StatusCode::OK);
    for key in ["cases", "clients", "tasks", "team", "resources", "supportDesks"] {
        assert_eq!(portal[key], json!([]), "{key} should start empty");
    }
    for key in ["activeMatters", "hearingsThisWeek", "filingsPending", "teamUtilisation"] {
        assert_eq!(portal["stats"][key].as_f64(), Some(0.0));
    }

    let (status, first) = app
        .post(
            "/api/cases",
            &token,
            json!({ "caseNumber": "CV-001", "client": "Acme Ltd", "status": "Open" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["caseNumber"], "CV-001");
    assert_eq!(first["opponent"], Value::Null);
    assert!(first["id"].is_string());

    let (status, second) = app
        .post(
            "/api/cases",
            &token,
            json!({ "case_number": "CV-002", "client": "Birch LLP" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(second["caseNumber"], "CV-002");

    let (_, portal) = app.get("/api/portal", &token).await;
    let cases = portal["cases"].as_array().unwrap();
    assert_eq!(cases.len(), 2);
    assert_eq!(cases[0]["id"], second["id"]);
    assert_eq!(cases[1]["id"], first["id"]);
}

#[tokio::test]
async fn test_register_validation() {
    let app = TestApp::new();

    let (status, body) = register(&app, "", "x@example.com", "longenough").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Name, email, and password are required.");

    let (status, body) = register(&app, "X", "x@example.com", "short").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Password must be at least 8 characters long.");

    let (status, _) = register(&app, "X", "x@example.com", "longenough").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = register(&app, "Y", "X@Example.com", "longenough").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "A user with this email already exists.");
}

#[tokio::test]
async fn test_seeded_admin_can_log_in() {
    let app = TestApp::new();
    let token = app.admin_token().await;

    let (status, body) = app.get("/api/auth/session", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], ADMIN_EMAIL);
    assert_eq!(body["token"], token);
}

#[tokio::test]
async fn test_login_failures_create_no_session() {
    let app = TestApp::new();
    let hash = PasswordHasher::new().hash("right-password").unwrap();
    let user = app
        .store
        .create_user("bo@example.com", "Bo", &hash)
        .unwrap();

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "bo@example.com", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials.");

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "nobody@example.com", "password": "whatever1" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials.");

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "bo@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email and password are required.");

    assert_eq!(app.store.count_user_sessions(user.id).unwrap(), 0);
}

#[tokio::test]
async fn test_zero_ttl_sessions_are_rejected() {
    let app = TestApp::with_session_ttl(0.0);
    let token = app.admin_token().await;

    let (status, body) = app.get("/api/auth/session", &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Session expired or invalid.");
}

#[tokio::test]
async fn test_oversized_ttl_still_issues_sessions() {
    let app = TestApp::with_session_ttl(1e10);
    let token = app.admin_token().await;

    let (status, body) = app.get("/api/auth/session", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], ADMIN_EMAIL);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = TestApp::new();
    let token = app.admin_token().await;

    let (status, body) = app
        .request(Method::POST, "/api/auth/logout", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = app.get("/api/auth/session", &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_incomplete_records_are_rejected() {
    let app = TestApp::new();
    let token = app.admin_token().await;

    let (status, body) = app
        .post("/api/cases", &token, json!({ "client": "Acme Ltd" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Case number and client are required.");

    let (status, body) = app
        .post("/api/tasks", &token, json!({ "title": "File brief", "owner": "Ana" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Title, owner, and due date are required.");

    let (_, cases) = app.get("/api/cases", &token).await;
    assert_eq!(cases, json!([]));
    let (_, tasks) = app.get("/api/tasks", &token).await;
    assert_eq!(tasks, json!([]));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new();
    let token = app.admin_token().await;

    let request = Request::post("/api/clients")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_collections_create_list_and_delete() {
    let app = TestApp::new();
    let token = app.admin_token().await;

    let cases = [
        ("/api/clients", json!({ "organisation": "Acme Ltd", "email": "legal@acme.test" })),
        ("/api/team", json!({ "name": "Ana", "role": "Partner" })),
        ("/api/resources", json!({ "title": "Court calendar", "type": "link" })),
        ("/api/support-desks", json!({ "department": "Registry", "hours": "9-5" })),
    ];

    for (path, payload) in cases {
        let (status, created) = app.post(path, &token, payload).await;
        assert_eq!(status, StatusCode::CREATED, "{path}: {created}");

        let (status, listed) = app.get(path, &token).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed[0]["id"], created["id"]);

        let id = created["id"].as_str().unwrap();
        let (status, _) = app.delete(&format!("{path}/{id}"), &token).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, listed) = app.get(path, &token).await;
        assert_eq!(listed, json!([]), "{path} should be empty after delete");
    }
}

#[tokio::test]
async fn test_resource_type_field() {
    let app = TestApp::new();
    let token = app.admin_token().await;

    let (_, created) = app
        .post("/api/resources", &token, json!({ "title": "Templates", "type": "folder" }))
        .await;
    assert_eq!(created["type"], "folder");
}

#[tokio::test]
async fn test_delete_missing_id_is_no_content() {
    let app = TestApp::new();
    let token = app.admin_token().await;

    let (status, _) = app.delete("/api/cases/does-not-exist", &token).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_stats_update_ignores_unknown_keys() {
    let app = TestApp::new();
    let token = app.admin_token().await;

    let (status, body) = app
        .put(
            "/api/portal/stats",
            &token,
            json!({ "activeMatters": 12, "filingsPending": "4", "bogus": 99 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let stats = body["stats"].as_object().unwrap();
    assert_eq!(stats.len(), 4);
    assert_eq!(stats["activeMatters"].as_f64(), Some(12.0));
    assert_eq!(stats["filingsPending"].as_f64(), Some(4.0));
    assert_eq!(stats["hearingsThisWeek"].as_f64(), Some(0.0));
    assert!(!stats.contains_key("bogus"));

    let (status, body) = app
        .put("/api/portal/stats", &token, json!({ "teamUtilisation": 0.75 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["activeMatters"].as_f64(), Some(12.0));
    assert_eq!(body["stats"]["teamUtilisation"].as_f64(), Some(0.75));
}

#[tokio::test]
async fn test_replace_portal_data() {
    let app = TestApp::new();
    let token = app.admin_token().await;

    app.post("/api/tasks", &token, json!({ "title": "Old", "owner": "Ana", "due": "2024-01-01" }))
        .await;

    let (status, snapshot) = app
        .put(
            "/api/portal",
            &token,
            json!({
                "stats": { "activeMatters": 3 },
                "cases": [
                    { "id": "case-1", "caseNumber": "CV-010", "client": "Acme Ltd" },
                    { "caseNumber": "CV-011" }
                ],
                "clients": [{ "name": "Birch LLP" }],
                "supportDesks": [{ "department": "Registry" }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(snapshot["stats"]["activeMatters"].as_f64(), Some(3.0));
    assert_eq!(snapshot["stats"]["filingsPending"].as_f64(), Some(0.0));
    assert_eq!(snapshot["cases"].as_array().unwrap().len(), 1);
    assert_eq!(snapshot["cases"][0]["id"], "case-1");
    assert_eq!(snapshot["clients"][0]["organisation"], "Birch LLP");
    assert_eq!(snapshot["tasks"], json!([]));
    assert_eq!(snapshot["supportDesks"][0]["department"], "Registry");

    let (_, portal) = app.get("/api/portal", &token).await;
    assert_eq!(portal, snapshot);
}
