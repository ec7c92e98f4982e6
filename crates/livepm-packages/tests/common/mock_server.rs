//! Mock registry helpers
//!
//! Registry lookups are served at `/package/{name}/latest/{release}` and
//! archives at `/files/{file}`.

use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Release id used by the installer tests
pub const TEST_RELEASE: &str = "gcc_64";

/// Download URL of an archive on the mock server
pub fn archive_url(server: &MockServer, file: &str) -> String {
    format!("{}/files/{}", server.uri(), file)
}

/// Serve registry metadata for a package
pub async fn mock_package(server: &MockServer, name: &str, metadata: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/package/{}/latest/{}", name, TEST_RELEASE)))
        .respond_with(ResponseTemplate::new(200).set_body_json(metadata))
        .mount(server)
        .await;
}

/// Answer a package lookup with an error status
pub async fn mock_missing_package(server: &MockServer, name: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("/package/{}/latest/{}", name, TEST_RELEASE)))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Serve an archive, expecting exactly `expected` downloads
pub async fn mock_archive(server: &MockServer, file: &str, content: Vec<u8>, expected: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/files/{}", file)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content))
        .expect(expected)
        .mount(server)
        .await;
}
