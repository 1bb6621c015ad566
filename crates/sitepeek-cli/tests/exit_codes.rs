#![allow(missing_docs)]

mod common;

use common::sitepeek_cmd;
use predicates::prelude::*;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn invalid_url_is_usage_error() {
    sitepeek_cmd()
        .args(["analyze", "ftp://example.com/file"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not an http(s) URL"));
}

#[test]
fn unreachable_host_is_network_error() {
    sitepeek_cmd()
        .args(["analyze", "http://127.0.0.1:9/"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("could not reach"));
}

#[tokio::test]
async fn non_html_page_is_unsupported_content() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("{}", "application/json"),
        )
        .mount(&server)
        .await;

    sitepeek_cmd()
        .args(["analyze", &format!("{}/api", server.uri())])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("application/json"));
    Ok(())
}

#[test]
fn broken_config_file_is_usage_error() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "[bundle\nconcurrency = ")?;

    sitepeek_cmd()
        .args(["analyze", "example.com", "--config"])
        .arg(&config)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Configuration error"));
    Ok(())
}

#[test]
fn bad_env_override_is_usage_error() {
    sitepeek_cmd()
        .env("SITEPEEK_BUNDLE_CONCURRENCY", "lots")
        .args(["bundle", "example.com"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("SITEPEEK_BUNDLE_CONCURRENCY"));
}

#[test]
fn missing_subcommand_is_usage_error() {
    sitepeek_cmd().assert().code(2);
}
