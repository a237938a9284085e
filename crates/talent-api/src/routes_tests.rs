//! Full-router requests against mocked Firestore and Identity Toolkit servers.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use talent_firestore::{FirestoreClient, FirestoreConfig};
use talent_storage::{S3Client, S3Config};

use crate::auth::{AuthUser, TokenVerifier, INVALID_TOKEN, MISSING_HEADER};
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::identity::{IdentityConfig, IdentityToolkitClient};
use crate::routes::create_router;
use crate::state::AppState;

const DOCS: &str = "/v1/projects/test-project/databases/(default)/documents";
const ACCOUNTS: &str = "/identitytoolkit.googleapis.com/v1/accounts";

/// Accepts a fixed set of tokens.
struct StaticVerifier(HashMap<String, AuthUser>);

#[axum::async_trait]
impl TokenVerifier for StaticVerifier {
    async fn verify(&self, token: &str) -> Result<AuthUser, ApiError> {
        self.0
            .get(token)
            .cloned()
            .ok_or_else(|| ApiError::unauthorized(INVALID_TOKEN))
    }
}

struct Harness {
    firestore: MockServer,
    identity: MockServer,
    storage: MockServer,
    router: Router,
}

fn caller(uid: &str, email: &str) -> AuthUser {
    AuthUser {
        uid: uid.into(),
        email: email.into(),
    }
}

async fn harness() -> Harness {
    harness_with(ApiConfig::default()).await
}

async fn harness_with(config: ApiConfig) -> Harness {
    let firestore = MockServer::start().await;
    let identity = MockServer::start().await;
    let storage = MockServer::start().await;

    let firestore_client = FirestoreClient::new(FirestoreConfig::emulator("test-project", &firestore.uri()))
        .await
        .unwrap();
    let storage_client = S3Client::new(S3Config {
        access_key_id: "test".into(),
        secret_access_key: "test".into(),
        bucket_name: "talent-test".into(),
        region: "us-east-1".into(),
        endpoint_url: Some(storage.uri()),
        presign_ttl: std::time::Duration::from_secs(60),
    })
    .unwrap();
    let identity_client = IdentityToolkitClient::new(IdentityConfig::emulator(&identity.uri(), "test-key")).unwrap();

    let mut tokens = HashMap::new();
    tokens.insert("candidate-token".to_string(), caller("uid-1", "jane@example.com"));
    tokens.insert("employer-token".to_string(), caller("emp-1", "hr@acme.io"));
    tokens.insert("admin-token".to_string(), caller("admin-1", "root@example.com"));
    let verifier = Arc::new(StaticVerifier(tokens));

    let state = AppState::from_parts(config, firestore_client, storage_client, identity_client, verifier);
    Harness {
        firestore,
        identity,
        storage,
        router: create_router(state, None),
    }
}

/// A Firestore document resource as returned by the REST API.
fn doc(collection: &str, id: &str, fields: Value) -> Value {
    json!({
        "name": format!("projects/test-project/databases/(default)/documents/{collection}/{id}"),
        "fields": fields,
        "createTime": "2025-01-01T00:00:00Z",
        "updateTime": "2025-01-01T00:00:00Z"
    })
}

fn strings(values: &[&str]) -> Value {
    json!({ "arrayValue": { "values": values.iter().map(|v| json!({ "stringValue": v })).collect::<Vec<_>>() } })
}

fn job_doc(id: &str, employer_id: &str, skills: &[&str]) -> Value {
    doc(
        "jobs",
        id,
        json!({
            "employer_id": { "stringValue": employer_id },
            "title": { "stringValue": format!("Job {id}") },
            "country": { "stringValue": "South Africa" },
            "skills": strings(skills),
            "salary_min": { "integerValue": "40000" },
            "salary_max": { "integerValue": "60000" },
            "created_at": { "timestampValue": "2025-01-05T10:00:00Z" }
        }),
    )
}

fn candidate_doc(id: &str, email: &str) -> Value {
    doc(
        "candidate",
        id,
        json!({
            "status": { "stringValue": "approved" },
            "basicInfo": { "mapValue": { "fields": {
                "firstName": { "stringValue": "Jane" },
                "email": { "stringValue": email }
            }}},
            "skills": strings(&["Rust", "Go"]),
            "account": { "mapValue": { "fields": {
                "hideFromCompanies": strings(&["Hidden Corp"])
            }}}
        }),
    )
}

async fn mount_candidate_lookup(h: &Harness, candidate: Value) {
    Mock::given(method("POST"))
        .and(path(format!("{DOCS}:runQuery")))
        .and(body_partial_json(json!({ "structuredQuery": { "from": [{ "collectionId": "candidate" }] } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "document": candidate }])))
        .mount(&h.firestore)
        .await;
}

fn multipart_request(uri: &str, token: &str, filename: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let boundary = "talent-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::post(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap()
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn signup_body(user_type: &str) -> Value {
    json!({
        "email": "Jane@Example.com",
        "password": "hunter22!",
        "confirmPassword": "hunter22!",
        "firstName": "Jane",
        "lastName": "Doe",
        "userType": user_type
    })
}

#[tokio::test]
async fn test_health_is_public() {
    let h = harness().await;
    let request = Request::get("/health").body(Body::empty()).unwrap();
    let response = h.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
}

#[tokio::test]
async fn test_ping_requires_authorization_header() {
    let h = harness().await;
    let (status, body) = send(&h.router, json_request(Method::POST, "/ping", None, json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], MISSING_HEADER);

    let (status, body) = send(&h.router, json_request(Method::POST, "/ping", Some("forged"), json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], INVALID_TOKEN);

    let (status, body) = send(
        &h.router,
        json_request(Method::POST, "/ping", Some("candidate-token"), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], "uid-1");
}

#[tokio::test]
async fn test_signup_rejects_admin_without_calling_auth() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path(format!("{ACCOUNTS}:signUp")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.identity)
        .await;

    let (status, _) = send(&h.router, json_request(Method::POST, "/signup", None, signup_body("admin"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_signup_existing_email() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path(format!("{ACCOUNTS}:signUp")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "EMAIL_EXISTS" }
        })))
        .mount(&h.identity)
        .await;

    let (status, body) = send(&h.router, json_request(Method::POST, "/signup", None, signup_body("candidate"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Account already exists for email jane@example.com");
}

#[tokio::test]
async fn test_signup_rolls_back_account_when_profile_write_fails() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path(format!("{ACCOUNTS}:signUp")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "localId": "uid-new",
            "email": "jane@example.com",
            "idToken": "fresh-token",
            "refreshToken": "refresh"
        })))
        .mount(&h.identity)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{ACCOUNTS}:delete")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&h.identity)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCS}/candidate")))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&h.firestore)
        .await;

    let (status, _) = send(&h.router, json_request(Method::POST, "/signup", None, signup_body("candidate"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_login_returns_tokens_for_existing_profile() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path(format!("{ACCOUNTS}:signInWithPassword")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "localId": "uid-1",
            "email": "jane@example.com",
            "idToken": "id-token",
            "refreshToken": "refresh-token"
        })))
        .mount(&h.identity)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/candidate/uid-1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/test-project/databases/(default)/documents/candidate/uid-1",
            "fields": {
                "status": { "stringValue": "pending" },
                "basicInfo": { "mapValue": { "fields": {
                    "email": { "stringValue": "jane@example.com" }
                }}}
            }
        })))
        .mount(&h.firestore)
        .await;

    let (status, body) = send(
        &h.router,
        json_request(
            Method::POST,
            "/login",
            None,
            json!({ "email": "jane@example.com", "password": "hunter22!", "userType": "candidate" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token"], "id-token");
    assert_eq!(body["refreshToken"], "refresh-token");
    assert_eq!(body["uid"], "uid-1");
    assert_eq!(body["userType"], "candidate");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path(format!("{ACCOUNTS}:signInWithPassword")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "INVALID_LOGIN_CREDENTIALS" }
        })))
        .mount(&h.identity)
        .await;

    let (status, body) = send(
        &h.router,
        json_request(
            Method::POST,
            "/login",
            None,
            json!({ "email": "jane@example.com", "password": "wrong-pass" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Invalid login credentials");
}

#[tokio::test]
async fn test_missing_job_is_404() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/jobs/nope")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&h.firestore)
        .await;

    let request = Request::get("/jobs/nope").body(Body::empty()).unwrap();
    let (status, body) = send(&h.router, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Job with ID 'nope' not found");
}

#[tokio::test]
async fn test_create_job_requires_employer() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/employer/uid-1")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&h.firestore)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCS}/jobs")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.firestore)
        .await;

    let body = json!({
        "title": "Backend Engineer",
        "description": "Build APIs",
        "skills": ["Rust"],
        "country": "South Africa",
        "employment_type": "Permanent"
    });
    let (status, _) = send(&h.router, json_request(Method::POST, "/jobs", Some("candidate-token"), body)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_candidate_section_is_404() {
    let h = harness().await;
    let (status, _) = send(
        &h.router,
        json_request(Method::PUT, "/candidate/uid-1/hobbies", Some("candidate-token"), json!([])),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_routes_reject_non_admins() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/admins/uid-1")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&h.firestore)
        .await;

    let request = Request::get("/stats")
        .header(header::AUTHORIZATION, "Bearer candidate-token")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&h.router, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "Admin access required");
}

#[tokio::test]
async fn test_server_error_detail_hidden_in_production() {
    let config = ApiConfig {
        environment: "production".into(),
        ..ApiConfig::default()
    };
    let h = harness_with(config).await;
    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/jobs/broken")))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
        .mount(&h.firestore)
        .await;

    let request = Request::get("/jobs/broken").body(Body::empty()).unwrap();
    let (status, body) = send(&h.router, request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "An internal error occurred");

    // Client errors keep their message.
    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/jobs/nope")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&h.firestore)
        .await;
    let request = Request::get("/jobs/nope").body(Body::empty()).unwrap();
    let (status, body) = send(&h.router, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Job with ID 'nope' not found");
}

#[tokio::test]
async fn test_server_error_detail_visible_in_development() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/jobs/broken")))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
        .mount(&h.firestore)
        .await;

    let request = Request::get("/jobs/broken").body(Body::empty()).unwrap();
    let (status, body) = send(&h.router, request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_ne!(body["detail"], "An internal error occurred");
}

#[tokio::test]
async fn test_update_job_rejects_non_owner() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/jobs/j1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_doc("j1", "emp-2", &["Rust"])))
        .mount(&h.firestore)
        .await;
    Mock::given(method("PATCH"))
        .and(path(format!("{DOCS}/jobs/j1")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.firestore)
        .await;

    let (status, body) = send(
        &h.router,
        json_request(Method::PUT, "/jobs/j1", Some("employer-token"), json!({ "title": "Lead" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "You can only modify your own jobs");
}

#[tokio::test]
async fn test_update_job_checks_salary_against_stored_range() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/jobs/j1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_doc("j1", "emp-1", &["Rust"])))
        .mount(&h.firestore)
        .await;
    Mock::given(method("PATCH"))
        .and(path(format!("{DOCS}/jobs/j1")))
        .and(query_param("updateMask.fieldPaths", "salary_min"))
        .and(query_param("currentDocument.exists", "true"))
        .and(body_partial_json(json!({ "fields": { "salary_min": { "integerValue": "50000" } } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_doc("j1", "emp-1", &["Rust"])))
        .expect(1)
        .mount(&h.firestore)
        .await;

    // Stored range is 40000..60000, so a lone minimum of 90000 inverts it.
    let (status, body) = send(
        &h.router,
        json_request(Method::PUT, "/jobs/j1", Some("employer-token"), json!({ "salaryMin": 90000 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "salary_min cannot exceed salary_max");

    let (status, body) = send(
        &h.router,
        json_request(Method::PUT, "/jobs/j1", Some("employer-token"), json!({ "salaryMin": 50000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "j1");
}

#[tokio::test]
async fn test_list_jobs_resumes_after_cursor() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/jobs/j5")))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_doc("j5", "emp-1", &["Rust"])))
        .expect(1)
        .mount(&h.firestore)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCS}:runQuery")))
        .and(body_partial_json(json!({ "structuredQuery": {
            "from": [{ "collectionId": "jobs" }],
            "limit": 100,
            "startAt": {
                "values": [
                    { "timestampValue": "2025-01-05T10:00:00Z" },
                    { "referenceValue": "projects/test-project/databases/(default)/documents/jobs/j5" }
                ],
                "before": false
            }
        }})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "document": job_doc("j4", "emp-1", &["Go"]) },
            { "document": job_doc("j3", "emp-2", &["Rust"]) }
        ])))
        .expect(1)
        .mount(&h.firestore)
        .await;

    let request = Request::get("/jobs?limit=500&start_after=j5").body(Body::empty()).unwrap();
    let (status, body) = send(&h.router, request).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body["jobs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|j| j["job_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["j4", "j3"]);
}

#[tokio::test]
async fn test_save_job_matches_skips_hidden_company_and_existing_pairs() {
    let h = harness().await;
    mount_candidate_lookup(&h, candidate_doc("uid-1", "jane@example.com")).await;
    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/jobs")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "documents": [
            job_doc("j1", "emp-1", &["Rust", "Kubernetes"]),
            job_doc("j2", "emp-2", &["Rust"]),
            job_doc("j3", "emp-1", &["go"]),
            job_doc("j4", "emp-1", &["Java"])
        ]})))
        .mount(&h.firestore)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/employer")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "documents": [
            doc("employer", "emp-1", json!({ "companyName": { "stringValue": "Acme" } })),
            doc("employer", "emp-2", json!({ "companyName": { "stringValue": "hidden corp" } }))
        ]})))
        .mount(&h.firestore)
        .await;
    // j3 was matched before; j1 is new.
    Mock::given(method("POST"))
        .and(path(format!("{DOCS}:runQuery")))
        .and(body_partial_json(json!({ "structuredQuery": { "from": [{ "collectionId": "matched_jobs" }] } })))
        .and(body_string_contains("\"j3\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "document": doc(
            "matched_jobs",
            "m-old",
            json!({
                "candidate_email": { "stringValue": "jane@example.com" },
                "job_id": { "stringValue": "j3" }
            }),
        )}])))
        .mount(&h.firestore)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCS}:runQuery")))
        .and(body_partial_json(json!({ "structuredQuery": { "from": [{ "collectionId": "matched_jobs" }] } })))
        .and(body_string_contains("\"j1\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "readTime": "2025-01-06T00:00:00Z" }])))
        .mount(&h.firestore)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCS}/matched_jobs")))
        .and(body_partial_json(json!({ "fields": {
            "job_id": { "stringValue": "j1" },
            "candidate_email": { "stringValue": "jane@example.com" },
            "company_name": { "stringValue": "Acme" },
            "status": { "stringValue": "pending" },
            "salary": { "stringValue": "40000 - 60000" }
        }})))
        .respond_with(ResponseTemplate::new(200).set_body_json(doc(
            "matched_jobs",
            "m-new",
            json!({ "job_id": { "stringValue": "j1" } }),
        )))
        .expect(1)
        .mount(&h.firestore)
        .await;

    let (status, body) = send(
        &h.router,
        json_request(
            Method::POST,
            "/candidate/job-matches?email=jane@example.com",
            Some("candidate-token"),
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_matches"], 2);
    assert_eq!(body["created"], json!(["m-new"]));
    assert_eq!(body["message"], "1 new matches saved");
}

#[tokio::test]
async fn test_upload_resume_stores_object_and_records_key() {
    let h = harness().await;
    mount_candidate_lookup(&h, candidate_doc("uid-1", "jane@example.com")).await;
    Mock::given(method("PUT"))
        .and(path_regex(r"^/talent-test/resumes/[0-9a-f-]+\.pdf$"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&h.storage)
        .await;
    Mock::given(method("PATCH"))
        .and(path(format!("{DOCS}/candidate/uid-1")))
        .and(query_param("updateMask.fieldPaths", "resume"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_doc("uid-1", "jane@example.com")))
        .expect(1)
        .mount(&h.firestore)
        .await;

    // Not a document type: rejected before anything is stored.
    let request = multipart_request(
        "/candidate/upload-resume?email=jane@example.com",
        "candidate-token",
        "setup.exe",
        "application/octet-stream",
        b"MZ\x90\x00",
    );
    let (status, _) = send(&h.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = multipart_request(
        "/candidate/upload-resume?email=jane@example.com",
        "candidate-token",
        "cv.pdf",
        "application/pdf",
        b"%PDF-1.7 resume",
    );
    let (status, body) = send(&h.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Resume uploaded successfully");
    let url = body["resumeUrl"].as_str().unwrap();
    assert!(url.contains("/talent-test/resumes/"), "{url}");
    assert!(url.contains("X-Amz-Signature="), "{url}");
}

#[tokio::test]
async fn test_section_update_authorizes_before_reading_body() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/candidate/other-1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_doc("other-1", "other@example.com")))
        .mount(&h.firestore)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/admins/uid-1")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&h.firestore)
        .await;

    // The body is not a valid skills list, but the caller may not edit this
    // candidate at all.
    let (status, body) = send(
        &h.router,
        json_request(
            Method::PUT,
            "/candidate/other-1/skills",
            Some("candidate-token"),
            json!({ "not": "a list" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "Not authorized to access this candidate");
}

#[tokio::test]
async fn test_malformed_json_uses_detail_envelope() {
    let h = harness().await;
    for uri in ["/save-progress?email=jane@example.com", "/matched/m-1/status"] {
        let verb = if uri.starts_with("/save") { Method::POST } else { Method::PUT };
        let request = Request::builder()
            .method(verb)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, "Bearer candidate-token")
            .body(Body::from("{\"steps\": "))
            .unwrap();
        let (status, body) = send(&h.router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["detail"].is_string(), "{uri}: {body}");
    }
}

#[tokio::test]
async fn test_list_users_requires_user_type() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/admins/admin-1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(doc(
            "admins",
            "admin-1",
            json!({ "isActive": { "booleanValue": true } }),
        )))
        .mount(&h.firestore)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/candidate")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "documents": [
            candidate_doc("uid-1", "jane@example.com")
        ]})))
        .mount(&h.firestore)
        .await;

    let get = |uri: &str| {
        Request::get(uri)
            .header(header::AUTHORIZATION, "Bearer admin-token")
            .body(Body::empty())
            .unwrap()
    };

    let (status, body) = send(&h.router, get("/users")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "userType is required");

    let (status, _) = send(&h.router, get("/users?userType=admin")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&h.router, get("/users?userType=candidate&search=JANE")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["users"][0]["id"], "uid-1");
}
