use thiserror::Error;

/// Errors produced by a login attempt.
///
/// The first three variants are recoverable: the workflow re-prompts the
/// operator and retries. `Network` and `Unexpected` outside a challenge
/// are fatal to the run.
#[derive(Error, Debug)]
pub enum LoginError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("A verification code has been sent to the account's email address")]
    EmailCodeRequired,

    #[error("CAPTCHA verification required")]
    CaptchaRequired { challenge_url: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Login failed: {0}")]
    Unexpected(String),
}

impl LoginError {
    /// Whether the workflow can recover by re-prompting the operator.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LoginError::InvalidCredentials
                | LoginError::EmailCodeRequired
                | LoginError::CaptchaRequired { .. }
        )
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            401 | 403 => LoginError::InvalidCredentials,
            _ => LoginError::Unexpected(format!("Status {}: {}", status, truncate_body(body))),
        }
    }
}

/// Errors produced by the authenticator enrollment call. All are terminal:
/// enrollment is attempted at most once per run and never retried.
#[derive(Error, Debug)]
pub enum EnrollError {
    #[error("A mobile authenticator is already attached to this account")]
    AlreadyEnabled,

    #[error("Enrollment rejected: {0}")]
    Provider(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl EnrollError {
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            409 => EnrollError::AlreadyEnabled,
            _ => EnrollError::Provider(format!("Status {}: {}", status, truncate_body(body))),
        }
    }
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Truncate a response body to avoid dumping excessive data on the operator
fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        body.to_string()
    } else {
        format!(
            "{}... (truncated, {} total bytes)",
            &body[..MAX_ERROR_BODY_LENGTH],
            body.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_error_recoverable_kinds() {
        assert!(LoginError::InvalidCredentials.is_recoverable());
        assert!(LoginError::EmailCodeRequired.is_recoverable());
        assert!(LoginError::CaptchaRequired {
            challenge_url: "https://example.com/captcha".to_string()
        }
        .is_recoverable());
        assert!(!LoginError::Unexpected("boom".to_string()).is_recoverable());
    }

    #[test]
    fn test_login_error_from_status() {
        assert!(matches!(
            LoginError::from_status(reqwest::StatusCode::UNAUTHORIZED, ""),
            LoginError::InvalidCredentials
        ));
        assert!(matches!(
            LoginError::from_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "oops"),
            LoginError::Unexpected(_)
        ));
    }

    #[test]
    fn test_enroll_error_from_status() {
        assert!(matches!(
            EnrollError::from_status(reqwest::StatusCode::CONFLICT, ""),
            EnrollError::AlreadyEnabled
        ));
        assert!(matches!(
            EnrollError::from_status(reqwest::StatusCode::BAD_GATEWAY, "bad"),
            EnrollError::Provider(_)
        ));
    }

    #[test]
    fn test_truncate_body_long() {
        let body = "x".repeat(600);
        let truncated = truncate_body(&body);
        assert!(truncated.contains("truncated, 600 total bytes"));
        assert!(truncated.len() < body.len());
    }
}
