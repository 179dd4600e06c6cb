//! Client module for the identity provider's login and enrollment endpoints.
//!
//! `AuthClient` performs the actual HTTP exchange; the `Authenticator`
//! trait is the seam the workflow drives, so tests can substitute a
//! scripted provider.

pub mod client;
pub mod error;

pub use client::AuthClient;
pub use error::{EnrollError, LoginError};

use crate::secrets::SecretBundle;

/// Operations the enrollment workflow needs from the identity provider.
///
/// `login` starts a fresh attempt with credentials; the `login_with_*`
/// variants answer a challenge raised by the previous attempt.
#[allow(async_fn_in_trait)]
pub trait Authenticator {
    async fn login(&mut self, username: &str, password: &str) -> Result<(), LoginError>;

    async fn login_with_email_code(&mut self, code: &str) -> Result<(), LoginError>;

    async fn login_with_captcha(&mut self, solution: &str) -> Result<(), LoginError>;

    /// Enroll a mobile authenticator on the authenticated account.
    /// Called at most once per run.
    async fn enable_two_factor(&mut self) -> Result<SecretBundle, EnrollError>;
}
