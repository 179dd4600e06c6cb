//! The enrollment workflow.
//!
//! Drives the operator through login (with challenge handling), requests
//! authenticator enrollment exactly once, persists the returned secrets,
//! and prints the remaining manual step. The only local side effect of a
//! run is the secrets file; every failure before enrollment leaves the
//! filesystem untouched.

use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};
use zeroize::Zeroize;

use crate::api::{Authenticator, EnrollError, LoginError};
use crate::auth::{AuthState, Session};
use crate::config::Config;
use crate::prompt::Prompt;

/// Terminal outcome of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Enrolled,
    EnrollmentFailed,
    LoginAbandoned,
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Enrolled => 0,
            Outcome::LoginAbandoned => 2,
            Outcome::EnrollmentFailed => 3,
        }
    }
}

/// Run the full enrollment workflow.
///
/// Login failures are retried by re-prompting, bounded by the config's
/// attempt limit. Enrollment failures are terminal and write no file.
pub async fn run<A: Authenticator, P: Prompt>(
    auth: &mut A,
    prompt: &mut P,
    config: &mut Config,
) -> Result<Outcome> {
    let username = prompt_username(prompt, config.last_username.as_deref())?;
    let mut session = Session::new(username);
    let mut password = prompt.read_password("Password: ")?;

    let attempt_limit = config.login_attempt_limit();
    let mut attempts: u32 = 0;

    loop {
        let result = match &session.state {
            AuthState::Unauthenticated => {
                println!("\nAuthenticating...");
                auth.login(&session.username, &password).await
            }
            AuthState::ChallengeEmail => {
                let code = prompt.read_line("Email verification code: ")?;
                if code.is_empty() {
                    println!("No code entered.");
                    session.fail();
                    continue;
                }
                auth.login_with_email_code(&code).await
            }
            AuthState::ChallengeCaptcha { challenge_url } => {
                println!("Open this URL in a browser to view the CAPTCHA:");
                println!("  {}", challenge_url);
                let solution = prompt.read_line("CAPTCHA solution: ")?;
                if solution.is_empty() {
                    println!("No solution entered.");
                    session.fail();
                    continue;
                }
                auth.login_with_captcha(&solution).await
            }
            AuthState::Authenticated => break,
            AuthState::Failed => {
                password.zeroize();
                println!("Login failed. Check the account credentials and try again.");
                return Ok(Outcome::LoginAbandoned);
            }
        };

        match result {
            Ok(()) => {
                let elapsed = (Utc::now() - session.created_at).num_seconds();
                info!(username = %session.username, elapsed_secs = elapsed, "login successful");
                session.authenticated();
            }
            Err(err) => {
                println!("{}", err);
                if !err.is_recoverable() {
                    warn!(error = %err, "unrecoverable login error");
                }
                session.apply(&err);

                attempts += 1;
                if attempts >= attempt_limit && !session.is_authenticated() {
                    warn!(attempts, "login attempt limit reached");
                    session.fail();
                    continue;
                }

                if matches!(err, LoginError::InvalidCredentials) {
                    password.zeroize();
                    password = prompt.read_password("New password: ")?;
                }
            }
        }
    }
    password.zeroize();

    config.last_username = Some(session.username.clone());
    println!("Login successful!\n");

    // Enrollment is attempted at most once per run; failures are terminal.
    match auth.enable_two_factor().await {
        Ok(bundle) => {
            let path = config.secrets_path();
            bundle.save(&path)?;
            info!(path = %path.display(), "secret bundle written");

            println!("Authenticator secrets saved to {}.", path.display());
            println!("The file holds the shared secret and identity secret; keep it safe.");
            println!();
            println!("One manual step remains: open the Steam mobile app, go to");
            println!("Steam Guard > Add Authenticator, and confirm with the SMS code");
            println!("sent to the phone number on the account.");
            Ok(Outcome::Enrolled)
        }
        Err(err @ EnrollError::AlreadyEnabled) => {
            println!("Enrollment failed: {}", err);
            println!("Disable the existing authenticator on the account before retrying.");
            Ok(Outcome::EnrollmentFailed)
        }
        Err(err) => {
            println!("Enrollment failed: {}", err);
            Ok(Outcome::EnrollmentFailed)
        }
    }
}

/// Prompt for a username, offering the last used one as the default
fn prompt_username<P: Prompt>(prompt: &mut P, last: Option<&str>) -> Result<String> {
    loop {
        let label = match last {
            Some(last) => format!("Username [{}]: ", last),
            None => "Username: ".to_string(),
        };
        let value = prompt.read_line(&label)?;
        if !value.is_empty() {
            return Ok(value);
        }
        if let Some(last) = last {
            return Ok(last.to_string());
        }
        println!("A username is required.");
    }
}

// ============================================================================
// Tests
// ============================================================================
