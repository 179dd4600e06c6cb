//! The secret bundle returned by authenticator enrollment and its
//! persistence to disk.
//!
//! The bundle is written exactly once per successful run. The write goes
//! through a temporary file in the destination directory followed by a
//! rename, so a crash mid-write never leaves a partial file behind. The
//! secret values themselves are never printed or logged; `Debug` redacts
//! them and the memory is wiped on drop.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Default output file name, written to the current directory
pub const DEFAULT_SECRETS_FILE: &str = "2FA-secrets.json";

/// Secrets returned by a successful authenticator enrollment.
///
/// `shared_secret` seeds code generation and `identity_secret` signs
/// confirmations; both are required. The remaining fields are kept as the
/// provider returns them, and unknown keys are preserved in `extra` so the
/// file round-trips the full enrollment response.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct SecretBundle {
    pub shared_secret: String,
    pub identity_secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revocation_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_gid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_time: Option<String>,
    #[serde(flatten)]
    #[zeroize(skip)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl SecretBundle {
    /// Serialize to pretty JSON and write atomically to `path`.
    /// An existing file at `path` is replaced without confirmation.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents =
            serde_json::to_string_pretty(self).context("Failed to serialize secret bundle")?;

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(DEFAULT_SECRETS_FILE);
        let tmp = dir.join(format!(".{}.tmp", file_name));

        std::fs::write(&tmp, contents)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("Failed to move secrets into place at {}", path.display()))?;

        Ok(())
    }
}

// Secret values must never reach the terminal or the log, so Debug only
// shows which fields are present.
impl fmt::Debug for SecretBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretBundle")
            .field("shared_secret", &"<redacted>")
            .field("identity_secret", &"<redacted>")
            .field("account_name", &self.account_name)
            .field("serial_number", &self.serial_number)
            .field("revocation_code", &"<redacted>")
            .field("secret_1", &"<redacted>")
            .field("token_gid", &self.token_gid)
            .field("uri", &"<redacted>")
            .field("server_time", &self.server_time)
            .field("extra_keys", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}
