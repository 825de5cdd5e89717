mod common;

use axum::http::StatusCode;
use common::{body_bytes, body_json, get_request, json_request, multipart_body, multipart_request, TestApp, PASSWORD};
use job_portal_backend::model::admin::Admin;
use job_portal_backend::model::application::ApplicationStatus;
use job_portal_backend::util::password::{PasswordUtils, PasswordUtilsImpl};
use serde_json::json;

async fn admin_app() -> (TestApp, Admin, String) {
    let app = TestApp::new().await;
    let admin = app.add_admin("Site Admin", "admin@example.com").await;
    let token = app.admin_token(&admin);
    (app, admin, token)
}

#[tokio::test]
async fn test_update_application_status() {
    let (app, admin, token) = admin_app().await;
    let user = app.add_user("Jane Doe", "jane@example.com").await;
    let job = app.add_job("Backend Engineer", None).await;
    let application = app.add_application(&job, &user, None).await;
    let uri = format!("/api/admin/applications/{}/status", application.id.unwrap().to_hex());

    let body = json!({ "status": "shortlisted", "notes": "Strong profile", "interviewDate": "15-03-2026" });
    let resp = app.send(json_request("PATCH", &uri, Some(&token), &body)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["message"], "Application updated successfully");
    assert_eq!(body["application"]["status"], "shortlisted");
    assert_eq!(body["application"]["statusLabel"], "Interview Scheduled");
    assert_eq!(body["application"]["reviewedBy"], admin.id.unwrap().to_hex());
    assert_eq!(body["application"]["job"]["title"], "Backend Engineer");

    let resp = app.send(json_request("PATCH", &uri, Some(&token), &json!({ "status": "hired", "notes": null }))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let stored = app.applications.items.lock().unwrap()[0].clone();
    assert_eq!(stored.status, ApplicationStatus::Hired);
    assert_eq!(stored.admin_notes, None);
    assert_eq!(stored.interview_date.as_deref(), Some("15-03-2026"));
}

#[tokio::test]
async fn test_invalid_application_status_leaves_document() {
    let (app, _, token) = admin_app().await;
    let user = app.add_user("Jane Doe", "jane@example.com").await;
    let job = app.add_job("Backend Engineer", None).await;
    let application = app.add_application(&job, &user, None).await;
    let uri = format!("/api/admin/applications/{}/status", application.id.unwrap().to_hex());

    let resp = app.send(json_request("PATCH", &uri, Some(&token), &json!({ "status": "maybe" }))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "Invalid status: maybe");

    let resp = app.send(json_request("PATCH", &uri, Some(&token), &json!({}))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "Status is required");

    let stored = app.applications.items.lock().unwrap()[0].clone();
    assert_eq!(stored.status, ApplicationStatus::Pending);
    assert!(stored.reviewed_by.is_none());

    let missing = format!("/api/admin/applications/{}/status", bson::oid::ObjectId::new().to_hex());
    let resp = app.send(json_request("PATCH", &missing, Some(&token), &json!({ "status": "reviewed" }))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["error"], "Application not found");
}

#[tokio::test]
async fn test_list_applications_with_filters() {
    let (app, _, token) = admin_app().await;
    let jane = app.add_user("Jane Doe", "jane@example.com").await;
    let omar = app.add_user("Omar Said", "omar@example.com").await;
    let backend = app.add_job("Backend Engineer", None).await;
    let designer = app.add_job("Designer", None).await;
    app.add_application(&backend, &jane, None).await;
    app.add_application(&designer, &omar, None).await;

    let resp = app.send(get_request("/api/admin/applications?limit=1", Some(&token))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["applications"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["totalPages"], 2);
    assert_eq!(body["pagination"]["hasNext"], true);

    let resp = app.send(get_request("/api/admin/applications?search=omar", Some(&token))).await;
    let body = body_json(resp).await;
    assert_eq!(body["applications"].as_array().unwrap().len(), 1);
    assert_eq!(body["applications"][0]["user"]["email"], "omar@example.com");

    let resp = app.send(get_request("/api/admin/applications?search=backend", Some(&token))).await;
    let body = body_json(resp).await;
    assert_eq!(body["applications"].as_array().unwrap().len(), 1);
    assert_eq!(body["applications"][0]["job"]["title"], "Backend Engineer");

    let resp = app.send(get_request("/api/admin/applications?status=bogus", Some(&token))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app.send(get_request("/api/admin/applications/count", Some(&token))).await;
    assert_eq!(body_json(resp).await["totalApplications"], 2);

    let by_job = format!("/api/admin/applications/by-job/{}", backend.id.unwrap().to_hex());
    let resp = app.send(get_request(&by_job, Some(&token))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["applications"].as_array().unwrap().len(), 1);
    assert_eq!(body["statusCounts"][0]["status"], "pending");
    assert_eq!(body["statusCounts"][0]["count"], 1);
}

#[tokio::test]
async fn test_candidate_listing_and_detail() {
    let (app, _, token) = admin_app().await;
    let jane = app.add_user("Jane Doe", "jane@example.com").await;
    app.add_user("Omar Said", "omar@example.com").await;
    let job = app.add_job("Backend Engineer", None).await;
    app.add_application(&job, &jane, None).await;

    let resp = app.send(get_request("/api/admin/candidates", Some(&token))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["totalCandidates"], 2);
    assert_eq!(body["totalApplications"], 1);
    let candidates = body["candidates"].as_array().unwrap();
    let jane_row = candidates.iter().find(|c| c["email"] == "jane@example.com").unwrap();
    assert_eq!(jane_row["applicationCount"], 1);
    assert_eq!(jane_row["position"], "Backend Engineer");
    assert_eq!(jane_row["status"], "pending");
    let omar_row = candidates.iter().find(|c| c["email"] == "omar@example.com").unwrap();
    assert_eq!(omar_row["position"], "N/A");

    let uri = format!("/api/admin/candidates/{}", jane.id.unwrap().to_hex());
    let resp = app.send(get_request(&uri, Some(&token))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["candidate"]["fullname"], "Jane Doe");
    assert_eq!(body["applications"].as_array().unwrap().len(), 1);

    let resp = app.send(get_request(&format!("{}/applications", uri), Some(&token))).await;
    assert_eq!(body_json(resp).await["applications"].as_array().unwrap().len(), 1);

    let missing = format!("/api/admin/candidates/{}", bson::oid::ObjectId::new().to_hex());
    let resp = app.send(get_request(&missing, Some(&token))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_candidate_status_and_notes() {
    let (app, _, token) = admin_app().await;
    let jane = app.add_user("Jane Doe", "jane@example.com").await;
    let uri = format!("/api/admin/candidates/{}", jane.id.unwrap().to_hex());

    let resp = app.send(json_request("PATCH", &format!("{}/status", uri), Some(&token), &json!({ "status": "contacted" }))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["message"], "Candidate status updated");
    assert_eq!(body["candidate"]["status"], "contacted");

    let resp = app.send(json_request("PATCH", &format!("{}/status", uri), Some(&token), &json!({}))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let notes = format!("{}/notes", uri);
    let resp = app.send(get_request(&notes, Some(&token))).await;
    assert_eq!(body_json(resp).await["notes"], "");

    let resp = app.send(json_request("POST", &notes, Some(&token), &json!({ "notes": "Call back Monday" }))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["message"], "Notes saved");

    let resp = app.send(get_request(&notes, Some(&token))).await;
    assert_eq!(body_json(resp).await["notes"], "Call back Monday");
}

#[tokio::test]
async fn test_dashboard_stats_and_charts() {
    let (app, _, token) = admin_app().await;
    let jane = app.add_user("Jane Doe", "jane@example.com").await;
    let omar = app.add_user("Omar Said", "omar@example.com").await;
    let open = app.add_job("Backend Engineer", Some("active")).await;
    app.add_job("Designer", Some("closed")).await;
    app.add_application(&open, &jane, None).await;
    app.add_application(&open, &omar, None).await;

    let resp = app.send(get_request("/api/admin/dashboard/stats", Some(&token))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["stats"]["totalJobs"], 2);
    assert_eq!(body["stats"]["activeJobs"], 1);
    assert_eq!(body["stats"]["totalApplications"], 2);
    assert_eq!(body["stats"]["totalCandidates"], 2);
    assert_eq!(body["stats"]["positionsAppliedFor"], 1);
    assert_eq!(body["recentApplications"].as_array().unwrap().len(), 2);
    assert_eq!(body["recentJobs"].as_array().unwrap().len(), 2);

    let resp = app.send(get_request("/api/admin/dashboard/charts", Some(&token))).await;
    let body = body_json(resp).await;
    assert_eq!(body["applicationsByStatus"], json!([{ "status": "pending", "count": 2 }]));
    assert_eq!(body["applicationsByMonth"][0]["count"], 2);
}

#[tokio::test]
async fn test_jobs_without_status_count_as_active() {
    let (app, _, token) = admin_app().await;
    app.add_job("Legacy Posting", None).await;
    app.add_job("Backend Engineer", Some("active")).await;
    app.add_job("Designer", Some("inactive")).await;

    let resp = app.send(get_request("/api/admin/dashboard/stats", Some(&token))).await;
    assert_eq!(body_json(resp).await["stats"]["activeJobs"], 2);

    let resp = app.send(get_request("/api/admin/jobs?status=active", Some(&token))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["pagination"]["totalJobs"], 2);
    let mut titles: Vec<String> = body["jobs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|job| job["title"].as_str().unwrap().to_string())
        .collect();
    titles.sort();
    assert_eq!(titles, vec!["Backend Engineer", "Legacy Posting"]);
}

#[tokio::test]
async fn test_csv_exports() {
    let (app, _, token) = admin_app().await;
    let jane = app.add_user("Jane Doe", "jane@example.com").await;
    let job = app.add_job("Backend Engineer", None).await;
    app.add_application(&job, &jane, None).await;

    let resp = app.send(get_request("/api/admin/export/candidates", Some(&token))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "text/csv; charset=utf-8");
    assert_eq!(resp.headers()["content-disposition"], "attachment; filename=\"candidates.csv\"");
    let text = String::from_utf8(body_bytes(resp).await).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("fullname,email,phone,applicationCount,joinedDate"));
    let row = lines.next().unwrap();
    assert!(row.starts_with("Jane Doe,jane@example.com,N/A,1,"));

    let resp = app.send(get_request("/api/admin/export/applications", Some(&token))).await;
    let text = String::from_utf8(body_bytes(resp).await).unwrap();
    assert!(text.starts_with("candidateName,candidateEmail,candidatePhone,jobTitle,company,status"));
    assert!(text.contains("Jane Doe,jane@example.com,0555000000,Backend Engineer,Acme,pending,3 years,Rust,"));

    let resp = app.send(get_request("/api/admin/export/jobs", Some(&token))).await;
    assert_eq!(resp.headers()["content-disposition"], "attachment; filename=\"jobs.csv\"");
    let text = String::from_utf8(body_bytes(resp).await).unwrap();
    assert!(text.contains("Backend Engineer,Backend Engineer role,Acme,Remote,active,1,N/A,"));
}

#[tokio::test]
async fn test_admin_profile_update() {
    let (app, admin, token) = admin_app().await;

    let resp = app.send(get_request("/api/admin/profile", Some(&token))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["profile"]["email"], "admin@example.com");

    let wrong = json!({ "currentPassword": "nope", "newPassword": "Another123" });
    let resp = app.send(json_request("PUT", "/api/admin/profile", Some(&token), &wrong)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "Current password is incorrect");

    let body = multipart_body(
        &[("fullname", "Chief Admin"), ("currentPassword", PASSWORD), ("newPassword", "Another123")],
        &[("profileImage", "me.png", b"\x89PNG")],
    );
    let resp = app.send(multipart_request("PUT", "/api/admin/profile", Some(&token), body)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["message"], "Profile updated successfully");

    let stored = app.admins.items.lock().unwrap().iter().find(|a| a.id == admin.id).cloned().unwrap();
    assert_eq!(stored.fullname, "Chief Admin");
    assert!(PasswordUtilsImpl::verify_password("Another123", &stored.password).unwrap());
    let image = stored.profile_image.unwrap();
    assert!(image.starts_with("/uploads/profile_images/admin_"));
    assert!(image.ends_with(".png"));

    let resp = app.send(get_request("/api/admin/admins", Some(&token))).await;
    assert_eq!(body_json(resp).await.as_array().unwrap().len(), 1);
}
