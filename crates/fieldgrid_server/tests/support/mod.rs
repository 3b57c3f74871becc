//! Shared integration-test server bootstrap helpers.

use axum_test::TestServer;
use fieldgrid_server::{create_app, AppState, Config, Database};
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;

pub(crate) fn test_config_for_db_path(db_path: &Path) -> Config {
    Config::for_db_path(db_path.to_str().expect("db path"))
}

pub(crate) fn test_server_for_config(config: Config) -> TestServer {
    let db = Database::new(config.db_path.as_str()).expect("open db");
    db.ensure_default_post_types().expect("default types");
    let state = AppState::new(config, db);
    let app = create_app(state, false);
    TestServer::new(app).expect("server")
}

pub(crate) fn setup_test_server() -> (TestServer, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let db_path = temp_dir.path().join("db");
    let config = test_config_for_db_path(&db_path);
    (test_server_for_config(config), temp_dir)
}

pub(crate) async fn create_post(server: &TestServer, body: Value) -> u64 {
    let response = server.post("/api/posts").json(&body).await;
    response.assert_status_ok();
    let post: Value = response.json();
    post["id"].as_u64().expect("post id")
}

pub(crate) async fn fetch_token(server: &TestServer) -> String {
    let response = server.get("/api/token").await;
    response.assert_status_ok();
    let body: Value = response.json();
    body["token"].as_str().expect("token").to_string()
}

pub(crate) async fn save(server: &TestServer, data: Value) -> axum_test::TestResponse {
    let token = fetch_token(server).await;
    server
        .post("/api/save")
        .json(&json!({ "token": token, "data": data }))
        .await
}
