use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use axum::response::Html;
use axum::routing::get;
use axum::Router;
use tempfile::TempDir;

fn scout_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("scout");
    path
}

fn setup_test_env(storefront: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/scout.sqlite"

[server]
bind = "127.0.0.1:7332"

[storefront]
base_url = "{}"

[fetch]
timeout_secs = 5

[export]
path = "{}/out/results.json"
"#,
        root.display(),
        storefront,
        root.display()
    );

    let config_path = config_dir.join("scout.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_scout(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = scout_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run scout binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

const LAPTOP_PAGE: &str = r#"<html><body>
<div data-component-type="s-search-result">
  <img class="s-image" src="https://img.test/a.jpg">
  <h2 class="a-size-mini"><a class="a-link-normal" href="/dp/A"><span>Budget Laptop</span></a></h2>
  <span class="a-icon-alt">4.5 out of 5 stars</span>
  <span class="a-price"><span class="a-offscreen">$400.00</span></span>
  <i class="a-icon-prime"></i>
</div>
<div data-component-type="s-search-result">
  <img class="s-image" src="https://img.test/b.jpg">
  <h2 class="a-size-mini"><a class="a-link-normal" href="/dp/B"><span>Midrange Laptop</span></a></h2>
  <span class="a-icon-alt">4.5 out of 5 stars</span>
  <span class="a-price"><span class="a-offscreen">$900.00</span></span>
  <i class="a-icon-prime"></i>
</div>
<div data-component-type="s-search-result">
  <img class="s-image" src="https://img.test/r.jpg">
  <h2 class="a-size-mini"><a class="a-link-normal" href="/dp/R"><span>Refurbished Laptop</span></a></h2>
  <span class="a-icon-alt">3.9 out of 5 stars</span>
  <span class="a-price"><span class="a-offscreen">$900.00</span></span>
  <i class="a-icon-prime"></i>
</div>
<div data-component-type="s-search-result">
  <img class="s-image" src="https://img.test/c.jpg">
  <h2 class="a-size-mini"><a class="a-link-normal" href="/dp/C"><span>Premium Laptop</span></a></h2>
  <span class="a-icon-alt">4.8 out of 5 stars</span>
  <span class="a-price"><span class="a-offscreen">$1,999.00</span></span>
</div>
</body></html>"#;

async fn spawn_storefront() -> String {
    let app = Router::new().route("/s", get(|| async { Html(LAPTOP_PAGE) }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[test]
fn test_init_creates_database() {
    let (tmp, config_path) = setup_test_env("http://127.0.0.1:9");

    let (stdout, stderr, success) = run_scout(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data/scout.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env("http://127.0.0.1:9");

    let (_, _, success1) = run_scout(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_scout(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_recent_empty() {
    let (_tmp, config_path) = setup_test_env("http://127.0.0.1:9");
    run_scout(&config_path, &["init"]);

    let (stdout, _, success) = run_scout(&config_path, &["recent"]);
    assert!(success);
    assert!(stdout.contains("No products captured yet."));
}

#[test]
fn test_get_missing_product() {
    let (_tmp, config_path) = setup_test_env("http://127.0.0.1:9");
    run_scout(&config_path, &["init"]);

    let (_, stderr, success) = run_scout(&config_path, &["get", "999"]);
    assert!(!success, "get with missing id should fail");
    assert!(
        stderr.contains("not found"),
        "Should report not found, got: {}",
        stderr
    );
}

#[test]
fn test_get_and_recent_without_init() {
    let (_tmp, config_path) = setup_test_env("http://127.0.0.1:9");

    let (stdout, stderr, success) = run_scout(&config_path, &["recent"]);
    assert!(success, "recent failed: {}", stderr);
    assert!(stdout.contains("No products captured yet."));

    let (_, stderr, success) = run_scout(&config_path, &["get", "1"]);
    assert!(!success);
    assert!(stderr.contains("Product not found"), "got: {}", stderr);
    assert!(!stderr.contains("no such table"), "got: {}", stderr);
}

#[test]
fn test_missing_config_fails() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, success) = run_scout(&tmp.path().join("nope.toml"), &["init"]);
    assert!(!success);
    assert!(stderr.contains("nope.toml"), "got: {}", stderr);
}

#[test]
fn test_completions_without_config() {
    let tmp = TempDir::new().unwrap();
    let (stdout, _, success) =
        run_scout(&tmp.path().join("absent.toml"), &["completions", "bash"]);
    assert!(success);
    assert!(stdout.contains("scout"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_search_get_recent_and_export() {
    let storefront = spawn_storefront().await;
    let (tmp, config_path) = setup_test_env(&storefront);

    let run = |args: Vec<&'static str>| {
        let config_path = config_path.clone();
        tokio::task::spawn_blocking(move || run_scout(&config_path, &args))
    };

    let (stdout, stderr, success) = run(vec![
        "search",
        "laptop",
        "--min-price",
        "500",
        "--max-price",
        "1500",
        "--min-rating",
        "4.0",
        "--prime",
    ])
    .await
    .unwrap();
    assert!(success, "search failed: {}", stderr);
    assert!(stdout.contains("Midrange Laptop"));
    assert!(!stdout.contains("Budget Laptop"));
    assert!(!stdout.contains("Refurbished Laptop"));
    assert!(stdout.contains("1 result(s)"));

    let exported = fs::read_to_string(tmp.path().join("out/results.json")).unwrap();
    let exported: serde_json::Value = serde_json::from_str(&exported).unwrap();
    assert_eq!(exported.as_array().unwrap().len(), 1);
    assert_eq!(exported[0]["price"], "900.00");

    let (stdout, _, success) = run(vec!["get", "1"]).await.unwrap();
    assert!(success);
    assert!(stdout.contains("Midrange Laptop"));
    assert!(stdout.contains("900.00"));

    let (stdout, _, success) = run(vec!["recent"]).await.unwrap();
    assert!(success);
    assert!(stdout.contains(" 1. Midrange Laptop"));
}
