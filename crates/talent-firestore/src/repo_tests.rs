//! Repository behavior against a mocked emulator endpoint.

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use talent_models::{BasicInformation, EmployerProfileUpdate, MatchedJobStatus};

use crate::admin_repo::AdminRepository;
use crate::candidate_repo::CandidateRepository;
use crate::client::{FirestoreClient, FirestoreConfig};
use crate::employer_repo::EmployerRepository;
use crate::jobs_repo::JobRepository;
use crate::matched_repo::MatchedJobRepository;

const DOCS: &str = "/v1/projects/test-project/databases/(default)/documents";

async fn client(server: &MockServer) -> FirestoreClient {
    FirestoreClient::new(FirestoreConfig::emulator("test-project", &server.uri()))
        .await
        .unwrap()
}

fn doc(collection: &str, id: &str, fields: serde_json::Value) -> serde_json::Value {
    json!({
        "name": format!("projects/test-project/databases/(default)/documents/{collection}/{id}"),
        "fields": fields
    })
}

fn query_rows(docs: Vec<serde_json::Value>) -> serde_json::Value {
    serde_json::Value::Array(docs.into_iter().map(|d| json!({ "document": d })).collect())
}

#[tokio::test]
async fn test_find_candidate_by_normalized_email() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCS}:runQuery")))
        .and(body_partial_json(json!({
            "structuredQuery": {
                "where": { "fieldFilter": {
                    "field": { "fieldPath": "basicInfo.email" },
                    "op": "EQUAL",
                    "value": { "stringValue": "jane@example.com" }
                }},
                "limit": 1
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(query_rows(vec![doc(
            "candidate",
            "uid-1",
            json!({
                "status": { "stringValue": "approved" },
                "basicInfo": { "mapValue": { "fields": {
                    "firstName": { "stringValue": "Jane" },
                    "email": { "stringValue": "jane@example.com" }
                }}},
                "skills": { "arrayValue": { "values": [{ "stringValue": "Rust" }] } },
                "createdAt": { "timestampValue": "2025-01-01T10:00:00Z" }
            }),
        )])))
        .expect(1)
        .mount(&server)
        .await;

    let repo = CandidateRepository::new(client(&server).await);
    let candidate = repo.find_by_email("  Jane@Example.com ").await.unwrap().unwrap();
    assert_eq!(candidate.id.as_deref(), Some("uid-1"));
    assert_eq!(candidate.email(), "jane@example.com");
    assert_eq!(candidate.skills, vec!["Rust"]);
    assert!(candidate.created_at.is_some());
}

#[tokio::test]
async fn test_update_basic_info_keeps_stored_email() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/candidate/uid-1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(doc(
            "candidate",
            "uid-1",
            json!({
                "basicInfo": { "mapValue": { "fields": {
                    "email": { "stringValue": "jane@example.com" }
                }}}
            }),
        )))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(format!("{DOCS}/candidate/uid-1")))
        .and(query_param("updateMask.fieldPaths", "basicInfo"))
        .and(body_partial_json(json!({
            "fields": { "basicInfo": { "mapValue": { "fields": {
                "email": { "stringValue": "jane@example.com" },
                "firstName": { "stringValue": "Janet" }
            }}}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(doc("candidate", "uid-1", json!({}))))
        .expect(1)
        .mount(&server)
        .await;

    let repo = CandidateRepository::new(client(&server).await);
    let basic = BasicInformation {
        first_name: "Janet".into(),
        last_name: "Doe".into(),
        email: "attacker@example.com".into(),
        phone: "+27 21 555 0100".into(),
        country: "South Africa".into(),
        ..Default::default()
    };
    repo.update_basic_info("uid-1", basic).await.unwrap();
}

#[tokio::test]
async fn test_update_basic_info_missing_candidate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/candidate/ghost")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let repo = CandidateRepository::new(client(&server).await);
    let err = repo
        .update_basic_info("ghost", BasicInformation::default())
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), Some(404));
}

#[tokio::test]
async fn test_job_page_ignores_unknown_cursor() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/jobs/unknown")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCS}:runQuery")))
        .and(|req: &Request| {
            let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap_or_default();
            body["structuredQuery"].get("startAt").is_none()
                && body["structuredQuery"]["limit"] == json!(20)
        })
        .respond_with(ResponseTemplate::new(200).set_body_json(query_rows(vec![doc(
            "jobs",
            "j1",
            json!({ "title": { "stringValue": "Engineer" }, "country": { "stringValue": "Kenya" } }),
        )])))
        .expect(1)
        .mount(&server)
        .await;

    let repo = JobRepository::new(client(&server).await);
    let jobs = repo.list_page(20, Some("unknown")).await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].job_id, "j1");
}

#[tokio::test]
async fn test_job_page_resumes_after_cursor() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/jobs/j5")))
        .respond_with(ResponseTemplate::new(200).set_body_json(doc(
            "jobs",
            "j5",
            json!({ "created_at": { "timestampValue": "2025-02-01T00:00:00Z" } }),
        )))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCS}:runQuery")))
        .and(body_partial_json(json!({
            "structuredQuery": {
                "startAt": {
                    "values": [
                        { "timestampValue": "2025-02-01T00:00:00Z" },
                        { "referenceValue": "projects/test-project/databases/(default)/documents/jobs/j5" }
                    ],
                    "before": false
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let repo = JobRepository::new(client(&server).await);
    assert!(repo.list_page(50, Some("j5")).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_employer_merge_masks_present_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(format!("{DOCS}/employer/uid-2")))
        .and(|req: &Request| {
            let masks: Vec<String> = req
                .url
                .query_pairs()
                .filter(|(k, _)| k == "updateMask.fieldPaths")
                .map(|(_, v)| v.into_owned())
                .collect();
            masks == ["city", "updatedAt"]
        })
        .respond_with(ResponseTemplate::new(200).set_body_json(doc("employer", "uid-2", json!({}))))
        .expect(1)
        .mount(&server)
        .await;

    let repo = EmployerRepository::new(client(&server).await);
    let update = EmployerProfileUpdate {
        city: Some("Nairobi".into()),
        ..Default::default()
    };
    repo.merge("uid-2", &update).await.unwrap();
}

#[tokio::test]
async fn test_matched_status_sets_job_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(format!("{DOCS}/matched_jobs/m1")))
        .and(body_partial_json(json!({
            "fields": {
                "status": { "stringValue": "accepted" },
                "job_accepted": { "booleanValue": true }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(doc("matched_jobs", "m1", json!({}))))
        .expect(1)
        .mount(&server)
        .await;

    let repo = MatchedJobRepository::new(client(&server).await);
    repo.set_status("m1", MatchedJobStatus::Accepted).await.unwrap();
}

#[tokio::test]
async fn test_matched_summary_over_all_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/matched_jobs")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [
                doc("matched_jobs", "a", json!({
                    "job_title": { "stringValue": "Engineer" },
                    "status": { "stringValue": "Accepted" }
                })),
                doc("matched_jobs", "b", json!({
                    "job_title": { "stringValue": "Engineer" }
                })),
                doc("matched_jobs", "c", json!({
                    "job_title": { "stringValue": "" },
                    "status": { "stringValue": "hired" }
                }))
            ]
        })))
        .mount(&server)
        .await;

    let repo = MatchedJobRepository::new(client(&server).await);
    let summary = repo.summary().await.unwrap();
    assert_eq!(summary.len(), 1);
    let engineer = &summary["Engineer"];
    assert_eq!(engineer.total, 2);
    assert_eq!(engineer.statuses["accepted"], 1);
    assert_eq!(engineer.statuses["pending"], 1);
    assert_eq!(engineer.statuses["hired"], 0);
}

#[tokio::test]
async fn test_inactive_admin_is_not_admin() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/admins/a1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(doc(
            "admins",
            "a1",
            json!({ "isActive": { "booleanValue": false } }),
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/admins/a2")))
        .respond_with(ResponseTemplate::new(200).set_body_json(doc(
            "admins",
            "a2",
            json!({ "email": { "stringValue": "root@example.com" } }),
        )))
        .mount(&server)
        .await;

    let repo = AdminRepository::new(client(&server).await);
    assert!(!repo.is_active_admin("a1").await.unwrap());
    assert!(repo.is_active_admin("a2").await.unwrap());
    assert!(!repo.is_active_admin("nobody").await.unwrap());
}
