//! Integration tests for Cartwheel.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations
//! cargo run -p cartwheel-cli -- migrate
//!
//! # Create the administrator the tests authenticate as
//! cargo run -p cartwheel-cli -- admin create \
//!     -e admin@example.com -n "Test Admin" -p <password>
//!
//! # Start the API, then run the ignored tests
//! CARTWHEEL_TEST_ADMIN_EMAIL=admin@example.com \
//! CARTWHEEL_TEST_ADMIN_PASSWORD=<password> \
//!     cargo test -p cartwheel-integration-tests -- --ignored
//! ```
//!
//! Every test is `#[ignore]`d because it needs a running server and a
//! migrated database; nothing here runs in a plain `cargo test`.

#![cfg_attr(not(test), forbid(unsafe_code))]

/// Base URL of the API under test (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("CARTWHEEL_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Build a URL under the versioned API prefix.
#[must_use]
pub fn api_url(path: &str) -> String {
    format!("{}/api/v1{path}", base_url())
}

/// Log in as the test administrator and return a bearer token.
///
/// # Panics
///
/// Panics if the login request fails or the credentials are rejected -
/// the test environment is misconfigured in that case.
pub async fn admin_token(client: &reqwest::Client) -> String {
    let email = std::env::var("CARTWHEEL_TEST_ADMIN_EMAIL")
        .expect("CARTWHEEL_TEST_ADMIN_EMAIL not set");
    let password = std::env::var("CARTWHEEL_TEST_ADMIN_PASSWORD")
        .expect("CARTWHEEL_TEST_ADMIN_PASSWORD not set");

    let resp = client
        .post(api_url("/users/login"))
        .json(&serde_json::json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("login request failed");

    assert!(
        resp.status().is_success(),
        "admin login rejected: {}",
        resp.status()
    );

    let body: serde_json::Value = resp.json().await.expect("login response not JSON");
    body["token"]
        .as_str()
        .expect("login response missing token")
        .to_string()
}
