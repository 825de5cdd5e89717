mod common;

use axum::http::StatusCode;
use common::{body_bytes, body_json, get_request, TestApp};
use std::io::Read;

fn put_resume(app: &TestApp, name: &str, bytes: &[u8]) {
    std::fs::write(app.storage.resume_path(name), bytes).unwrap();
}

#[tokio::test]
async fn test_download_local_resume() {
    let app = TestApp::new().await;
    let admin = app.add_admin("Site Admin", "admin@example.com").await;
    let user = app.add_user("Jane Doe", "jane@example.com").await;
    let job = app.add_job("Backend Engineer", None).await;
    put_resume(&app, "1700000000000-cv.pdf", b"%PDF-1.4");
    let application = app.add_application(&job, &user, Some("1700000000000-cv.pdf")).await;

    let uri = format!("/api/admin/resumes/{}/download", application.id.unwrap().to_hex());
    let resp = app.send(get_request(&uri, Some(&app.admin_token(&admin)))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "application/pdf");
    assert_eq!(resp.headers()["content-disposition"], "attachment; filename=\"Jane_Doe_resume.pdf\"");
    assert_eq!(body_bytes(resp).await, b"%PDF-1.4");
}

#[tokio::test]
async fn test_legacy_absolute_path_resolves_by_base_name() {
    let app = TestApp::new().await;
    let admin = app.add_admin("Site Admin", "admin@example.com").await;
    let user = app.add_user("Jane Doe", "jane@example.com").await;
    let job = app.add_job("Backend Engineer", None).await;
    put_resume(&app, "legacy.docx", b"docx");
    let application = app
        .add_application(&job, &user, Some(r"C:\Users\server\uploads\resumes\legacy.docx"))
        .await;

    let uri = format!("/api/admin/resumes/{}/download", application.id.unwrap().to_hex());
    let resp = app.send(get_request(&uri, Some(&app.admin_token(&admin)))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await, b"docx");
}

#[tokio::test]
async fn test_remote_resume_redirects() {
    let app = TestApp::new().await;
    let admin = app.add_admin("Site Admin", "admin@example.com").await;
    let user = app.add_user("Jane Doe", "jane@example.com").await;
    let job = app.add_job("Backend Engineer", None).await;
    let link = "https://files.example.com/jane.pdf";
    let application = app.add_application(&job, &user, Some(link)).await;
    let id = application.id.unwrap().to_hex();
    let token = app.admin_token(&admin);

    let resp = app.send(get_request(&format!("/api/admin/resumes/{}/download", id), Some(&token))).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers()["location"], link);

    let resp = app.send(get_request(&format!("/api/admin/resumes/{}/view", id), Some(&token))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["resumeUrl"], link);
    assert!(body["portfolioUrl"].is_null());
}

#[tokio::test]
async fn test_view_local_resume_url() {
    let app = TestApp::new().await;
    let admin = app.add_admin("Site Admin", "admin@example.com").await;
    let user = app.add_user("Jane Doe", "jane@example.com").await;
    let job = app.add_job("Backend Engineer", None).await;
    let application = app.add_application(&job, &user, Some("/var/old/resumes/cv.pdf")).await;

    let uri = format!("/api/admin/resumes/{}/view", application.id.unwrap().to_hex());
    let resp = app.send(get_request(&uri, Some(&app.admin_token(&admin)))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["resumeUrl"], "/uploads/resumes/cv.pdf");
}

#[tokio::test]
async fn test_download_not_found_cases() {
    let app = TestApp::new().await;
    let admin = app.add_admin("Site Admin", "admin@example.com").await;
    let token = app.admin_token(&admin);
    let user = app.add_user("Jane Doe", "jane@example.com").await;
    let omar = app.add_user("Omar Said", "omar@example.com").await;
    let job = app.add_job("Backend Engineer", None).await;
    let without = app.add_application(&job, &user, None).await;
    let vanished = app.add_application(&job, &omar, Some("gone.pdf")).await;

    let uri = format!("/api/admin/resumes/{}/download", without.id.unwrap().to_hex());
    let resp = app.send(get_request(&uri, Some(&token))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["error"], "No resume found for this application");

    let uri = format!("/api/admin/resumes/{}/download", vanished.id.unwrap().to_hex());
    let resp = app.send(get_request(&uri, Some(&token))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["error"], "Resume file not found");

    let uri = format!("/api/admin/resumes/{}/download", bson::oid::ObjectId::new().to_hex());
    let resp = app.send(get_request(&uri, Some(&token))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["error"], "Application not found");
}

#[tokio::test]
async fn test_download_all_dedupes_names() {
    let app = TestApp::new().await;
    let admin = app.add_admin("Site Admin", "admin@example.com").await;
    let user = app.add_user("Jane Doe", "jane@example.com").await;
    let backend = app.add_job("Backend Engineer", None).await;
    let designer = app.add_job("Designer", None).await;
    let remote = app.add_job("Remote Only", None).await;
    put_resume(&app, "a.pdf", b"first");
    put_resume(&app, "b.pdf", b"second");
    app.add_application(&backend, &user, Some("a.pdf")).await;
    app.add_application(&designer, &user, Some("b.pdf")).await;
    app.add_application(&remote, &user, Some("https://files.example.com/x.pdf")).await;

    let resp = app.send(get_request("/api/admin/resumes/downloadAll", Some(&app.admin_token(&admin)))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "application/zip");
    assert_eq!(resp.headers()["content-disposition"], "attachment; filename=\"all_resumes.zip\"");

    let bytes = body_bytes(resp).await;
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 2);
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(names, vec!["Jane_Doe_resume.pdf", "Jane_Doe_resume_1.pdf"]);

    let mut contents = Vec::new();
    for name in &names {
        let mut content = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut content).unwrap();
        contents.push(content);
    }
    contents.sort();
    assert_eq!(contents, vec!["first", "second"]);
}

#[tokio::test]
async fn test_download_all_without_resumes() {
    let app = TestApp::new().await;
    let admin = app.add_admin("Site Admin", "admin@example.com").await;
    let user = app.add_user("Jane Doe", "jane@example.com").await;
    let job = app.add_job("Backend Engineer", None).await;
    app.add_application(&job, &user, None).await;

    let resp = app.send(get_request("/api/admin/resumes/downloadAll", Some(&app.admin_token(&admin)))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["error"], "No resumes found to download");
}

#[tokio::test]
async fn test_resume_routes_require_admin() {
    let app = TestApp::new().await;
    let user = app.add_user("Jane Doe", "jane@example.com").await;
    let resp = app.send(get_request("/api/admin/resumes/downloadAll", Some(&app.user_token(&user)))).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
