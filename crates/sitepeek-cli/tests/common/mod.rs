#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[allow(dead_code)]
pub const CMD_TIMEOUT: Duration = Duration::from_secs(30);

#[allow(dead_code)]
fn config_home() -> &'static Path {
    static CONFIG_HOME: OnceLock<TempDir> = OnceLock::new();
    CONFIG_HOME
        .get_or_init(|| tempfile::tempdir().expect("failed to create config dir for tests"))
        .path()
}

/// Create a configured `sitepeek` command suitable for integration tests.
///
/// The platform config directory points at an empty temp dir so a
/// developer's own config file never leaks into assertions.
#[allow(dead_code)]
pub fn sitepeek_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("sitepeek"));
    cmd.timeout(CMD_TIMEOUT);
    cmd.env("XDG_CONFIG_HOME", config_home());
    cmd.env_remove("SITEPEEK_CONFIG");
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Serve `body` as HTML at `route`.
#[allow(dead_code)]
pub async fn mount_html(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// Serve `body` with `content_type` at `route`.
#[allow(dead_code)]
pub async fn mount_asset(server: &MockServer, route: &str, content_type: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body.to_vec(), content_type),
        )
        .mount(server)
        .await;
}
