//! Login session state for a single enrollment run.
//!
//! This module provides:
//! - `AuthState`: explicit state machine over the login challenge kinds
//! - `Session`: per-run session owning the username and current state
//!
//! Nothing here is persisted; the session ends when the process exits.

pub mod session;

pub use session::{AuthState, Session};
