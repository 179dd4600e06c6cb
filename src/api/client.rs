//! HTTP client for the Steam community login and two-factor endpoints.
//!
//! This is a thin client: it submits the login form, classifies the
//! provider's response into `LoginError` kinds, and calls the
//! AddAuthenticator endpoint once the session is established. Challenge
//! state (email code pending, CAPTCHA gid) is carried between attempts
//! so the workflow only has to supply the operator's answers.

use std::time::Duration;

use rand::Rng;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::secrets::SecretBundle;

use super::{Authenticator, EnrollError, LoginError};

// ============================================================================
// Constants
// ============================================================================

/// Base URL for login endpoints (the community site handles login)
const LOGIN_BASE_URL: &str = "https://steamcommunity.com";

/// Base URL for the two-factor service endpoints
const TWOFACTOR_BASE_URL: &str = "https://api.steampowered.com";

/// HTTP request timeout in seconds.
/// 30s allows for slow responses while failing fast enough for an interactive tool.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Sentinel gid the login form expects when no CAPTCHA has been issued
const NO_CAPTCHA_GID: &str = "-1";

/// Enrollment status code for success
const ENROLL_STATUS_OK: i64 = 1;

/// Enrollment status code when the account already has an authenticator
const ENROLL_STATUS_DUPLICATE: i64 = 29;

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    emailauth_needed: bool,
    #[serde(default)]
    captcha_needed: bool,
    #[serde(default)]
    captcha_gid: Option<String>,
    #[serde(default)]
    oauth_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EnrollStatusResponse {
    response: EnrollStatus,
}

#[derive(Debug, Deserialize)]
struct EnrollStatus {
    #[serde(default)]
    status: i64,
}

#[derive(Debug, Deserialize)]
struct EnrollSecretsResponse {
    response: SecretBundle,
}

/// Credentials held between challenge retries within a single run.
/// The password is wiped when the client is dropped.
struct PendingLogin {
    username: String,
    password: Zeroizing<String>,
    captcha_gid: Option<String>,
}

// ============================================================================
// Client
// ============================================================================

/// Client for the login and enrollment endpoints.
///
/// The cookie store keeps the partially-established session alive across
/// challenge retries, matching how the provider expects the login
/// conversation to proceed.
pub struct AuthClient {
    client: Client,
    login_base: String,
    twofactor_base: String,
    pending: Option<PendingLogin>,
    token: Option<String>,
    device_id: String,
}

impl AuthClient {
    /// Create a new client against the production endpoints.
    /// `GUARDLINK_LOGIN_BASE` / `GUARDLINK_TWOFACTOR_BASE` override the
    /// endpoints, which keeps integration testing against a stub possible.
    pub fn new() -> anyhow::Result<Self> {
        let login_base = std::env::var("GUARDLINK_LOGIN_BASE")
            .unwrap_or_else(|_| LOGIN_BASE_URL.to_string());
        let twofactor_base = std::env::var("GUARDLINK_TWOFACTOR_BASE")
            .unwrap_or_else(|_| TWOFACTOR_BASE_URL.to_string());

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            login_base,
            twofactor_base,
            pending: None,
            token: None,
            device_id: generate_device_id(),
        })
    }

    /// Submit the login form with whatever challenge answers are available
    async fn submit_login(
        &mut self,
        email_code: &str,
        captcha_text: &str,
    ) -> Result<(), LoginError> {
        let pending = self
            .pending
            .as_ref()
            .ok_or_else(|| LoginError::Unexpected("no login in progress".to_string()))?;

        let url = format!("{}/login/dologin/", self.login_base);
        let captcha_gid = pending
            .captcha_gid
            .as_deref()
            .unwrap_or(NO_CAPTCHA_GID)
            .to_string();

        let form = [
            ("username", pending.username.as_str()),
            ("password", pending.password.as_str()),
            ("emailauth", email_code),
            ("captchagid", captcha_gid.as_str()),
            ("captcha_text", captcha_text),
        ];

        let response = self.client.post(&url).form(&form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LoginError::from_status(status, &body));
        }

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| LoginError::Unexpected(format!("Malformed login response: {}", e)))?;

        if login.success {
            debug!("login accepted by provider");
            self.token = login.oauth_token;
            return Ok(());
        }

        if login.captcha_needed {
            let gid = login.captcha_gid.unwrap_or_default();
            let challenge_url = format!("{}/login/rendercaptcha/?gid={}", self.login_base, gid);
            if let Some(ref mut p) = self.pending {
                p.captcha_gid = Some(gid);
            }
            return Err(LoginError::CaptchaRequired { challenge_url });
        }

        if login.emailauth_needed {
            return Err(LoginError::EmailCodeRequired);
        }

        // The provider reports bad credentials as an unsuccessful login with
        // a human-readable message; the message itself is not machine-stable
        // so it is only logged, not matched on.
        if let Some(msg) = login.message {
            debug!(message = %msg, "login rejected");
        }
        Err(LoginError::InvalidCredentials)
    }
}

impl Authenticator for AuthClient {
    async fn login(&mut self, username: &str, password: &str) -> Result<(), LoginError> {
        self.pending = Some(PendingLogin {
            username: username.to_string(),
            password: Zeroizing::new(password.to_string()),
            captcha_gid: None,
        });
        self.submit_login("", "").await
    }

    async fn login_with_email_code(&mut self, code: &str) -> Result<(), LoginError> {
        self.submit_login(code, "").await
    }

    async fn login_with_captcha(&mut self, solution: &str) -> Result<(), LoginError> {
        self.submit_login("", solution).await
    }

    async fn enable_two_factor(&mut self) -> Result<SecretBundle, EnrollError> {
        let token = self.token.clone().ok_or_else(|| {
            EnrollError::Provider("login did not produce an access token".to_string())
        })?;

        let url = format!(
            "{}/ITwoFactorService/AddAuthenticator/v1/",
            self.twofactor_base
        );

        let form = [
            ("access_token", token.as_str()),
            ("authenticator_type", "1"),
            ("device_identifier", self.device_id.as_str()),
            ("sms_phone_id", "1"),
        ];

        let response = self.client.post(&url).form(&form).send().await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(EnrollError::from_status(status, &body));
        }

        // Status is checked before the secrets are parsed: a rejection
        // carries the status code but none of the secret fields.
        let enroll: EnrollStatusResponse = serde_json::from_str(&body)
            .map_err(|e| EnrollError::Provider(format!("Malformed enrollment response: {}", e)))?;

        match enroll.response.status {
            ENROLL_STATUS_OK => {}
            ENROLL_STATUS_DUPLICATE => return Err(EnrollError::AlreadyEnabled),
            other => {
                warn!(status = other, "enrollment rejected");
                return Err(EnrollError::Provider(format!(
                    "enrollment failed with status {}",
                    other
                )));
            }
        }

        let secrets: EnrollSecretsResponse = serde_json::from_str(&body).map_err(|e| {
            EnrollError::Provider(format!("Enrollment succeeded but secrets are unreadable: {}", e))
        })?;

        Ok(secrets.response)
    }
}

/// Generate a per-run device identifier in the format the enrollment
/// endpoint expects (android-style UUID).
fn generate_device_id() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 16] = rng.gen();
    format!(
        "android:{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3],
        bytes[4], bytes[5],
        bytes[6], bytes[7],
        bytes[8], bytes[9],
        bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_device_id_format() {
        let id = generate_device_id();
        assert!(id.starts_with("android:"));
        // android: prefix plus 32 hex chars and 4 dashes
        assert_eq!(id.len(), "android:".len() + 36);
        assert_eq!(id.matches('-').count(), 4);
    }

    #[test]
    fn test_login_response_challenge_flags() {
        let json = r#"{"success": false, "captcha_needed": true, "captcha_gid": "12345"}"#;
        let resp: LoginResponse = serde_json::from_str(json).expect("parse login response");
        assert!(!resp.success);
        assert!(resp.captcha_needed);
        assert_eq!(resp.captcha_gid.as_deref(), Some("12345"));
        assert!(!resp.emailauth_needed);
    }

    #[test]
    fn test_enroll_status_parses_without_secrets() {
        let json = r#"{"response": {"status": 29}}"#;
        let resp: EnrollStatusResponse = serde_json::from_str(json).expect("parse enroll status");
        assert_eq!(resp.response.status, 29);
    }
}
