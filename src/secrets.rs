//! Secrets file: model API key and login credentials.
//!
//! ```toml
//! api_key = "AIza..."
//! provider = "gemini"          # optional
//! model = "gemini-2.0-flash"   # optional
//!
//! [auth]
//! username = "analyst"
//! password = "correct horse battery staple"
//! ```
//!
//! Discovery order: an explicit path (must exist), then
//! `.pdfqa/secrets.toml`, then `.streamlit/secrets.toml` in the working
//! directory. No file at all is not an error — the API key can still come
//! from the environment and the login gate is simply not configured.

use crate::auth::Credentials;
use crate::error::DocQaError;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Secrets files probed, in order, when no explicit path is given.
pub const DEFAULT_SECRETS_PATHS: &[&str] = &[".pdfqa/secrets.toml", ".streamlit/secrets.toml"];

/// Parsed contents of a secrets file.
#[derive(Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    provider: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    auth: Option<AuthSection>,
    #[serde(skip)]
    source_path: Option<PathBuf>,
}

#[derive(Clone, Deserialize)]
struct AuthSection {
    username: Option<String>,
    password: Option<String>,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("auth", &self.auth.as_ref().map(|_| "<redacted>"))
            .field("source_path", &self.source_path)
            .finish()
    }
}

impl Secrets {
    /// Parse secrets from TOML text.
    pub fn from_toml(contents: &str, path: &Path) -> Result<Self, DocQaError> {
        let mut secrets: Secrets =
            toml::from_str(contents).map_err(|e| DocQaError::SecretsInvalid {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?;
        secrets.source_path = Some(path.to_path_buf());
        Ok(secrets)
    }

    /// Load secrets from a specific file.
    pub fn load(path: &Path) -> Result<Self, DocQaError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| DocQaError::SecretsUnreadable {
                path: path.to_path_buf(),
                source: e,
            })?;
        Self::from_toml(&contents, path)
    }

    /// Load from `explicit` if given, else from the first default location
    /// that exists. Returns empty secrets when nothing is found.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, DocQaError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        for candidate in DEFAULT_SECRETS_PATHS {
            let path = Path::new(candidate);
            if path.is_file() {
                debug!("Using secrets file {}", path.display());
                return Self::load(path);
            }
        }
        debug!("No secrets file found");
        Ok(Self::default())
    }

    /// The model API key, if set and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        non_blank(self.api_key.as_deref())
    }

    pub fn provider(&self) -> Option<&str> {
        non_blank(self.provider.as_deref())
    }

    pub fn model(&self) -> Option<&str> {
        non_blank(self.model.as_deref())
    }

    /// Login credentials, if both username and password are configured.
    pub fn credentials(&self) -> Option<Credentials> {
        let auth = self.auth.as_ref()?;
        let username = non_blank(auth.username.as_deref())?;
        let password = auth.password.as_deref().filter(|p| !p.is_empty())?;
        Some(Credentials::new(username, password))
    }

    /// File the secrets were read from.
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }
}

/// Environment variable the provider factory reads the API key from.
pub fn api_key_env_var(provider: &str) -> Option<&'static str> {
    match provider.to_ascii_lowercase().as_str() {
        "gemini" | "google" => Some("GEMINI_API_KEY"),
        "openai" => Some("OPENAI_API_KEY"),
        "anthropic" | "claude" => Some("ANTHROPIC_API_KEY"),
        "mistral" => Some("MISTRAL_API_KEY"),
        "openrouter" => Some("OPENROUTER_API_KEY"),
        "xai" => Some("XAI_API_KEY"),
        _ => None,
    }
}

fn non_blank(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FULL: &str = r#"
api_key = "key-123"
provider = "gemini"

[auth]
username = "ruthwik"
password = "s3cret"
"#;

    #[test]
    fn parses_full_file() {
        let s = Secrets::from_toml(FULL, Path::new("secrets.toml")).unwrap();
        assert_eq!(s.api_key(), Some("key-123"));
        assert_eq!(s.provider(), Some("gemini"));
        assert_eq!(s.model(), None);
        let creds = s.credentials().unwrap();
        assert!(creds.verify("ruthwik", "s3cret"));
    }

    #[test]
    fn blank_api_key_is_none() {
        let s = Secrets::from_toml("api_key = \"   \"", Path::new("s.toml")).unwrap();
        assert_eq!(s.api_key(), None);
    }

    #[test]
    fn incomplete_auth_table_has_no_credentials() {
        let s = Secrets::from_toml("[auth]\nusername = \"a\"", Path::new("s.toml")).unwrap();
        assert!(s.credentials().is_none());
    }

    #[test]
    fn invalid_toml_is_reported() {
        let err = Secrets::from_toml("api_key = ", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, DocQaError::SecretsInvalid { .. }));
    }

    #[test]
    fn load_from_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(FULL.as_bytes()).unwrap();
        let s = Secrets::load(tmp.path()).unwrap();
        assert_eq!(s.source_path(), Some(tmp.path()));
        assert!(s.credentials().is_some());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = Secrets::discover(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, DocQaError::SecretsUnreadable { .. }));
    }

    #[test]
    fn debug_redacts_values() {
        let s = Secrets::from_toml(FULL, Path::new("s.toml")).unwrap();
        let dbg = format!("{s:?}");
        assert!(!dbg.contains("key-123"));
        assert!(!dbg.contains("s3cret"));
    }

    #[test]
    fn env_var_names() {
        assert_eq!(api_key_env_var("Gemini"), Some("GEMINI_API_KEY"));
        assert_eq!(api_key_env_var("openai"), Some("OPENAI_API_KEY"));
        assert_eq!(api_key_env_var("ollama"), None);
    }
}
