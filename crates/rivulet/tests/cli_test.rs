//! Integration tests for the `rivulet` CLI binary.
//!
//! Bundles come from temporary directories or a wiremock server, so the
//! tests never touch the network or the user's configuration.
#![allow(clippy::unwrap_used)]

use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `rivulet` binary with env isolation.
///
/// Clears `RIVULET_*` variables and points config directories at a
/// nonexistent path.
fn rivulet_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("rivulet");
    cmd.env("HOME", "/tmp/rivulet-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/rivulet-cli-test-nonexistent")
        .env_remove("RUST_LOG")
        .env_remove("RIVULET_CONFIG")
        .env_remove("RIVULET_LOCALE__BASE_URI")
        .env_remove("RIVULET_LOCALE__NAMESPACES")
        .env_remove("RIVULET_LOCALE__DEFAULT_LANG")
        .env_remove("RIVULET_LOCALE__LANG")
        .env_remove("RIVULET_LOCALE__CACHING")
        .env_remove("RIVULET_LOCALE__TIMEOUT_SECS");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn write_json(path: &Path, body: &serde_json::Value) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, body.to_string()).unwrap();
}

fn locales() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write_json(&root.join("en/translation.json"), &json!({"GREETING": "Hello", "BYE": "Bye"}));
    write_json(&root.join("de/translation.json"), &json!({"GREETING": "Hallo"}));
    write_json(&root.join("en/errors.json"), &json!({"E1": "Broken"}));
    dir
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = rivulet_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_commands() {
    rivulet_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("translate")
            .and(predicate::str::contains("chain"))
            .and(predicate::str::contains("merge")),
    );
}

#[test]
fn test_version_flag() {
    rivulet_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rivulet"));
}

#[test]
fn test_completions_bash() {
    rivulet_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rivulet"));
}

// ── chain ───────────────────────────────────────────────────────────

#[test]
fn test_chain_plain() {
    rivulet_cmd()
        .args(["chain", "de_AT"])
        .assert()
        .success()
        .stdout("de_AT\nde\nen\n");
}

#[test]
fn test_chain_respects_default_lang_and_json() {
    rivulet_cmd()
        .args(["chain", "fr_CA", "--default-lang", "de", "-o", "json-compact"])
        .assert()
        .success()
        .stdout("[\"fr_CA\",\"fr\",\"de\"]\n");
}

#[test]
fn test_chain_for_default_language_is_deduplicated() {
    rivulet_cmd()
        .args(["chain", "en"])
        .assert()
        .success()
        .stdout("en\n");
}

// ── translate ───────────────────────────────────────────────────────

#[test]
fn test_translate_from_directory_with_fallback() {
    let dir = locales();
    rivulet_cmd()
        .arg("--base-uri")
        .arg(dir.path())
        .args(["translate", "GREETING", "BYE", "MISSING", "--lang", "de_AT"])
        .assert()
        .success()
        .stdout("Hallo\nBye\nMISSING\n");
}

#[test]
fn test_translate_json_output_keyed_by_key() {
    let dir = locales();
    let output = rivulet_cmd()
        .arg("--base-uri")
        .arg(dir.path())
        .args(["-n", "translation", "-n", "errors", "-o", "json"])
        .args(["translate", "E1", "--ns", "errors"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value, json!({"E1": "Broken"}));
}

#[test]
fn test_translate_unloaded_namespace_is_usage_error() {
    let dir = locales();
    rivulet_cmd()
        .arg("--base-uri")
        .arg(dir.path())
        .args(["translate", "E1", "--ns", "errors"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("errors"));
}

#[test]
fn test_translate_uses_config_file() {
    let dir = locales();
    let config = dir.path().join("rivulet.toml");
    fs::write(
        &config,
        format!(
            "[locale]\nbase_uri = {:?}\ndefault_lang = \"en\"\nlang = \"de\"\n",
            dir.path().display().to_string()
        ),
    )
    .unwrap();

    rivulet_cmd()
        .arg("--config")
        .arg(&config)
        .args(["translate", "GREETING"])
        .assert()
        .success()
        .stdout("Hallo\n");
}

#[test]
fn test_env_configures_locale() {
    let dir = locales();
    rivulet_cmd()
        .env("RIVULET_LOCALE__BASE_URI", dir.path())
        .env("RIVULET_LOCALE__LANG", "de")
        .args(["translate", "GREETING"])
        .assert()
        .success()
        .stdout("Hallo\n");
}

#[test]
fn test_missing_config_file_is_config_error() {
    rivulet_cmd()
        .args(["--config", "/tmp/rivulet-cli-test-nonexistent/absent.toml"])
        .args(["chain", "en"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_invalid_config_is_config_error() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("rivulet.toml");
    fs::write(&config, "[locale]\nnamespaces = []\n").unwrap();

    rivulet_cmd()
        .arg("--config")
        .arg(&config)
        .args(["chain", "en"])
        .assert()
        .code(3);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_translate_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/locales/en/translation.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"GREETING": "Hello"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/locales/fr/translation.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    rivulet_cmd()
        .args(["--base-uri", &format!("{}/locales/", server.uri())])
        .args(["translate", "GREETING", "--lang", "fr"])
        .assert()
        .success()
        .stdout("Hello\n");
}

// ── merge ───────────────────────────────────────────────────────────

#[test]
fn test_merge_is_shallow_and_right_biased() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.json");
    let b = dir.path().join("b.json");
    write_json(&a, &json!({"name": "a", "nested": {"x": 1, "y": 2}}));
    write_json(&b, &json!({"nested": {"y": 3}, "extra": true}));

    let output = rivulet_cmd().arg("merge").arg(&a).arg(&b).output().unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value, json!({"name": "a", "nested": {"y": 3}, "extra": true}));
}

#[test]
fn test_merge_deep_combines_nested_objects() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.json");
    let b = dir.path().join("b.json");
    write_json(&a, &json!({"nested": {"x": 1, "y": 2}}));
    write_json(&b, &json!({"nested": {"y": 3}}));

    rivulet_cmd()
        .args(["merge", "--deep", "-o", "json-compact"])
        .arg(&a)
        .arg(&b)
        .assert()
        .success()
        .stdout("{\"nested\":{\"x\":1,\"y\":3}}\n");
}

#[test]
fn test_merge_rejects_non_objects() {
    let dir = TempDir::new().unwrap();
    let list = dir.path().join("list.json");
    write_json(&list, &json!([1, 2, 3]));

    rivulet_cmd()
        .arg("merge")
        .arg(&list)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("object"));
}

#[test]
fn test_merge_missing_file_is_io_error() {
    rivulet_cmd()
        .args(["merge", "/tmp/rivulet-cli-test-nonexistent/none.json"])
        .assert()
        .code(4);
}

#[test]
fn test_quiet_suppresses_output() {
    rivulet_cmd()
        .args(["-q", "chain", "de"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
