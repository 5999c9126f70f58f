use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use server::{build_app, ServerConfig};
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use tower::ServiceExt;

fn write_resumes(dir: &Path) {
    fs::write(dir.join("Data_Science_0.txt"), "Data scientist, Python, machine learning, statistics.").unwrap();
    fs::write(dir.join("Sales_1.txt"), "Sales representative for retail customers.").unwrap();
    fs::write(dir.join("Java_2.txt"), "Java developer, Spring services and Python scripting.").unwrap();
}

fn app(dir: &Path) -> Router {
    build_app(ServerConfig { resumes_dir: dir.to_path_buf(), default_k: 10 }).unwrap()
}

async fn call(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let req = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => req
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn search_returns_ranked_results() {
    let dir = tempdir().unwrap();
    write_resumes(dir.path());
    let app = app(dir.path());

    let (status, json) = call(app, "POST", "/search", Some(json!({ "job_description": "python machine learning" }))).await;
    assert_eq!(status, StatusCode::OK);
    let arr = json["initial_results"].as_array().unwrap();
    assert_eq!(arr.len(), 3);
    assert_eq!(arr[0]["document_id"], "Data_Science_0.txt");
    assert_eq!(arr[0]["rank"], 1);
    assert_eq!(arr[2]["document_id"], "Sales_1.txt");
    assert!(json["refined_results"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn feedback_returns_initial_and_refined() {
    let dir = tempdir().unwrap();
    write_resumes(dir.path());
    let app = app(dir.path());

    let body = json!({ "job_description": "python", "feedback_resume": "Java_2.txt", "k": 2 });
    let (status, json) = call(app, "POST", "/search", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["feedback_resume"], "Java_2.txt");
    assert_eq!(json["initial_results"].as_array().unwrap().len(), 2);
    let refined = json["refined_results"].as_array().unwrap();
    assert_eq!(refined.len(), 2);
    assert_eq!(refined[0]["document_id"], "Java_2.txt");
}

#[tokio::test]
async fn unknown_feedback_is_ignored() {
    let dir = tempdir().unwrap();
    write_resumes(dir.path());
    let body = json!({ "job_description": "python", "feedback_resume": "nobody.txt" });
    let (status, json) = call(app(dir.path()), "POST", "/search", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["feedback_resume"].is_null());
    assert!(json["refined_results"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn empty_directory_reports_search_unavailable() {
    let dir = tempdir().unwrap();
    let (status, json) = call(app(dir.path()), "POST", "/search", Some(json!({ "job_description": "python" }))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"]["code"], "SEARCH_UNAVAILABLE");
}

#[tokio::test]
async fn blank_job_description_is_rejected() {
    let dir = tempdir().unwrap();
    write_resumes(dir.path());
    let (status, _) = call(app(dir.path()), "POST", "/search", Some(json!({ "job_description": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_rebuilds_the_corpus() {
    let dir = tempdir().unwrap();
    let app = app(dir.path());

    let upload = json!({ "documents": [
        { "filename": "../chef.txt", "text": "Pastry chef, bakery and desserts." },
        { "filename": "resume.pdf", "text": "binary" },
    ]});
    let (status, json) = call(app.clone(), "POST", "/documents", Some(upload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["accepted"], json!(["chef.txt"]));
    assert_eq!(json["rejected"], json!(["resume.pdf"]));
    assert_eq!(json["num_docs"], 1);
    assert!(dir.path().join("chef.txt").exists());

    let (status, json) = call(app.clone(), "GET", "/documents", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["documents"], json!(["chef.txt"]));

    let (status, json) = call(app, "POST", "/search", Some(json!({ "job_description": "pastry chef" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["initial_results"][0]["document_id"], "chef.txt");
}

#[tokio::test]
async fn upload_without_valid_files_is_rejected() {
    let dir = tempdir().unwrap();
    let upload = json!({ "documents": [{ "filename": "cv.docx", "text": "x" }] });
    let (status, json) = call(app(dir.path()), "POST", "/documents", Some(upload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "NO_VALID_FILES");
}

#[tokio::test]
async fn upload_rejects_names_colliding_after_sanitizing() {
    let dir = tempdir().unwrap();
    let upload = json!({ "documents": [
        { "filename": "a/cv.txt", "text": "Pastry chef." },
        { "filename": "b/cv.txt", "text": "Welder." },
    ]});
    let (status, json) = call(app(dir.path()), "POST", "/documents", Some(upload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["accepted"], json!(["cv.txt"]));
    assert_eq!(json["rejected"], json!(["b/cv.txt"]));
    assert_eq!(fs::read_to_string(dir.path().join("cv.txt")).unwrap(), "Pastry chef.");
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn unreadable_resume_does_not_block_startup_or_search() {
    let dir = tempdir().unwrap();
    write_resumes(dir.path());
    std::os::unix::fs::symlink("/proc/self/mem", dir.path().join("Broken_9.txt")).unwrap();
    let app = app(dir.path());

    let (status, json) = call(app, "POST", "/search", Some(json!({ "job_description": "python" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["initial_results"].as_array().unwrap().len(), 3);
}
