use chrono::{DateTime, Utc};

use crate::api::LoginError;

/// Authentication state for the single login session of a run.
///
/// One explicit state machine replaces nested retry handling: every login
/// error maps to exactly one next state, and the workflow decides what to
/// prompt for by looking at the current state alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    ChallengeEmail,
    ChallengeCaptcha { challenge_url: String },
    Authenticated,
    Failed,
}

/// The login session. Lives for the duration of one run; the underlying
/// HTTP session is owned by the client, not by this struct.
pub struct Session {
    pub username: String,
    pub state: AuthState,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(username: String) -> Self {
        Self {
            username,
            state: AuthState::Unauthenticated,
            created_at: Utc::now(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == AuthState::Authenticated
    }

    /// Whether the session is waiting on an operator-solved challenge
    pub fn in_challenge(&self) -> bool {
        matches!(
            self.state,
            AuthState::ChallengeEmail | AuthState::ChallengeCaptcha { .. }
        )
    }

    pub fn authenticated(&mut self) {
        self.state = AuthState::Authenticated;
    }

    pub fn fail(&mut self) {
        self.state = AuthState::Failed;
    }

    /// Advance the state machine for a failed login attempt.
    ///
    /// Recoverable kinds move to the state whose prompt can answer them.
    /// Unrecoverable kinds inside a challenge keep the current state so the
    /// operator can retry the same answer; outside a challenge they are
    /// fatal and the session fails.
    pub fn apply(&mut self, err: &LoginError) {
        match err {
            LoginError::InvalidCredentials => {
                self.state = AuthState::Unauthenticated;
            }
            LoginError::EmailCodeRequired => {
                self.state = AuthState::ChallengeEmail;
            }
            LoginError::CaptchaRequired { challenge_url } => {
                self.state = AuthState::ChallengeCaptcha {
                    challenge_url: challenge_url.clone(),
                };
            }
            LoginError::Network(_) | LoginError::Unexpected(_) => {
                if !self.in_challenge() {
                    self.state = AuthState::Failed;
                }
            }
        }
    }
}
