mod common;

use axum::http::StatusCode;
use common::{body_json, get_request, json_request, multipart_body, multipart_request, TestApp};
use job_portal_backend::model::application::ApplicationStatus;
use serde_json::json;

const APPLY_FIELDS: [(&str, &str); 5] = [
    ("fullName", "Jane Doe"),
    ("email", "Jane@Example.com"),
    ("phone", "0555123456"),
    ("experience", "4 years"),
    ("skills", "Rust, Go"),
];

#[tokio::test]
async fn test_public_listing_and_detail() {
    let app = TestApp::new().await;
    app.add_job("Backend Engineer", None).await;
    let job = app.add_job("Data Analyst", Some("inactive")).await;

    let resp = app.send(get_request("/api/jobs", None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let resp = app.send(get_request("/api/jobs?search=backend", None)).await;
    let body = body_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "Backend Engineer");

    let id = job.id.unwrap().to_hex();
    let resp = app.send(get_request(&format!("/api/jobs/{}", id), None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["id"], id);
    assert_eq!(body["company"], "Acme");
}

#[tokio::test]
async fn test_job_detail_errors() {
    let app = TestApp::new().await;
    let resp = app.send(get_request("/api/jobs/not-an-id", None)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "Invalid job ID");

    let missing = bson::oid::ObjectId::new().to_hex();
    let resp = app.send(get_request(&format!("/api/jobs/{}", missing), None)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["error"], "Job not found");
}

#[tokio::test]
async fn test_apply_stores_application_and_resume() {
    let app = TestApp::new().await;
    let user = app.add_user("Jane Doe", "jane@example.com").await;
    let job = app.add_job("Backend Engineer", Some("active")).await;

    let body = multipart_body(&APPLY_FIELDS, &[("resume", "my cv.pdf", b"%PDF-1.4 resume")]);
    let uri = format!("/api/jobs/{}/apply", job.id.unwrap().to_hex());
    let resp = app.send(multipart_request("POST", &uri, Some(&app.user_token(&user)), body)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body = body_json(resp).await;
    assert_eq!(body["message"], "Application submitted successfully");
    assert_eq!(body["application"]["email"], "jane@example.com");
    assert_eq!(body["application"]["status"], "pending");
    assert_eq!(body["application"]["skills"], json!(["Rust", "Go"]));

    let stored = body["application"]["resumeLink"].as_str().unwrap().to_string();
    assert!(stored.ends_with(".pdf"));
    let on_disk = std::fs::read(app.storage.resume_path(&stored)).unwrap();
    assert_eq!(on_disk, b"%PDF-1.4 resume");

    let resp = app.send(get_request("/api/jobs/applications/me", Some(&app.user_token(&user)))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let mine = body_json(resp).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
    assert_eq!(mine[0]["job"]["title"], "Backend Engineer");
}

#[tokio::test]
async fn test_apply_rejections() {
    let app = TestApp::new().await;
    let user = app.add_user("Jane Doe", "jane@example.com").await;
    let token = app.user_token(&user);
    let active = app.add_job("Backend Engineer", None).await;
    let closed = app.add_job("Old Role", Some("closed")).await;

    let resp = app
        .send(multipart_request("POST", "/api/jobs/zzz/apply", Some(&token), multipart_body(&APPLY_FIELDS, &[])))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "Invalid job ID");

    let uri = format!("/api/jobs/{}/apply", active.id.unwrap().to_hex());
    let partial = multipart_body(&[("fullName", "Jane Doe"), ("phone", "0555123456")], &[]);
    let resp = app.send(multipart_request("POST", &uri, Some(&token), partial)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "Full name, email, and phone are required");

    let uri_closed = format!("/api/jobs/{}/apply", closed.id.unwrap().to_hex());
    let resp = app
        .send(multipart_request("POST", &uri_closed, Some(&token), multipart_body(&APPLY_FIELDS, &[])))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "Cannot apply to an inactive job");

    let missing = format!("/api/jobs/{}/apply", bson::oid::ObjectId::new().to_hex());
    let resp = app
        .send(multipart_request("POST", &missing, Some(&token), multipart_body(&APPLY_FIELDS, &[])))
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app.send(multipart_request("POST", &uri, Some(&token), multipart_body(&APPLY_FIELDS, &[]))).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let resp = app.send(multipart_request("POST", &uri, Some(&token), multipart_body(&APPLY_FIELDS, &[]))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "You have already applied for this job");
    assert_eq!(app.applications.items.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_apply_requires_candidate_token() {
    let app = TestApp::new().await;
    let job = app.add_job("Backend Engineer", None).await;
    let uri = format!("/api/jobs/{}/apply", job.id.unwrap().to_hex());
    let resp = app.send(multipart_request("POST", &uri, None, multipart_body(&APPLY_FIELDS, &[]))).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_job_lifecycle() {
    let app = TestApp::new().await;
    let admin = app.add_admin("Site Admin", "admin@example.com").await;
    let token = app.admin_token(&admin);

    let payload = json!({
        "title": "Platform Engineer",
        "description": "Keep things running",
        "company": "Acme",
        "requirements": ["Rust", "Linux"]
    });
    let resp = app.send(json_request("POST", "/api/admin/jobs", Some(&token), &payload)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["message"], "Job created successfully");
    assert_eq!(body["job"]["status"], "active");
    assert_eq!(body["job"]["createdBy"], admin.id.unwrap().to_hex());
    let id = body["job"]["id"].as_str().unwrap().to_string();

    let resp = app.send(json_request("POST", "/api/admin/jobs", Some(&token), &json!({ "title": "No description" }))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let status_uri = format!("/api/admin/jobs/{}/status", id);
    let resp = app.send(json_request("PATCH", &status_uri, Some(&token), &json!({ "status": "paused" }))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "Status must be one of: active, inactive, closed");

    let resp = app.send(json_request("PATCH", &status_uri, Some(&token), &json!({ "status": "closed" }))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["message"], "Job status updated successfully");
    assert_eq!(body["job"]["status"], "closed");

    let resp = app.send(get_request("/api/admin/jobs?status=closed", Some(&token))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["jobs"].as_array().unwrap().len(), 1);
    assert_eq!(body["jobs"][0]["applicationCount"], 0);
    assert_eq!(body["pagination"]["totalJobs"], 1);
}

#[tokio::test]
async fn test_public_post_requires_admin() {
    let app = TestApp::new().await;
    let user = app.add_user("Jane Doe", "jane@example.com").await;
    let admin = app.add_admin("Site Admin", "admin@example.com").await;
    let payload = json!({ "title": "Designer", "description": "Pixels" });

    let resp = app.send(json_request("POST", "/api/jobs", Some(&app.user_token(&user)), &payload)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app.send(json_request("POST", "/api/jobs", Some(&app.admin_token(&admin)), &payload)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(body_json(resp).await["title"], "Designer");
}

#[tokio::test]
async fn test_delete_job_cascades_applications() {
    let app = TestApp::new().await;
    let admin = app.add_admin("Site Admin", "admin@example.com").await;
    let token = app.admin_token(&admin);
    let user = app.add_user("Jane Doe", "jane@example.com").await;
    let doomed = app.add_job("Doomed", None).await;
    let kept = app.add_job("Kept", None).await;
    app.add_application(&doomed, &user, None).await;
    app.add_application(&kept, &user, None).await;

    let uri = format!("/api/admin/jobs/{}", doomed.id.unwrap().to_hex());
    let resp = app.send(get_request(&uri, Some(&token))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["applicationCount"], 1);

    let delete = axum::http::Request::builder()
        .method("DELETE")
        .uri(&uri)
        .header("authorization", format!("Bearer {}", token))
        .body(axum::body::Body::empty())
        .unwrap();
    let resp = app.send(delete).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["message"], "Job and associated applications deleted successfully");

    let remaining = app.applications.items.lock().unwrap().clone();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].job, kept.id.unwrap());
    assert_eq!(remaining[0].status, ApplicationStatus::Pending);
    assert_eq!(app.jobs.items.lock().unwrap().len(), 1);
}
