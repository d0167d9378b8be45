//! Credential resolution for the LLM backend.
//!
//! The credential is looked up through an ordered list of sources; the
//! first source that yields a non-empty value wins. By default the
//! deployment secrets file is consulted first, then the process
//! environment. Absence of both is a fatal construction error: no query
//! can proceed without it.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::errors::RagError;

/// Environment variable / secrets key holding the OpenRouter API key.
pub const API_KEY_NAME: &str = "OPENROUTER_API_KEY";

/// Default secrets file consulted before the environment.
pub const DEFAULT_SECRETS_FILE: &str = "secrets.toml";

/// One place a credential may come from.
#[derive(Clone, Debug)]
pub enum CredentialSource {
    /// A TOML file with top-level `key = "value"` entries.
    SecretsFile { path: PathBuf, key: String },
    /// A process environment variable.
    Env { var: String },
}

/// The default source chain: secrets file, then environment.
pub fn default_sources() -> Vec<CredentialSource> {
    vec![
        CredentialSource::SecretsFile {
            path: PathBuf::from(DEFAULT_SECRETS_FILE),
            key: API_KEY_NAME.to_string(),
        },
        CredentialSource::Env {
            var: API_KEY_NAME.to_string(),
        },
    ]
}

/// Resolves a credential from the first source that yields a value.
///
/// # Errors
/// Returns [`RagError::MissingCredential`] when every source comes up empty.
pub fn resolve(sources: &[CredentialSource]) -> Result<String, RagError> {
    for source in sources {
        match source {
            CredentialSource::SecretsFile { path, key } => {
                let Ok(text) = std::fs::read_to_string(path) else {
                    debug!("secrets file not readable: {:?}", path);
                    continue;
                };
                let table: toml::Value = match toml::from_str(&text) {
                    Ok(v) => v,
                    Err(e) => {
                        warn!("ignoring malformed secrets file {:?}: {e}", path);
                        continue;
                    }
                };
                if let Some(value) = table.get(key).and_then(toml::Value::as_str) {
                    if !value.trim().is_empty() {
                        debug!("credential resolved from secrets file {:?}", path);
                        return Ok(value.trim().to_string());
                    }
                }
            }
            CredentialSource::Env { var } => {
                if let Ok(value) = std::env::var(var) {
                    if !value.trim().is_empty() {
                        debug!("credential resolved from ${var}");
                        return Ok(value.trim().to_string());
                    }
                }
            }
        }
    }
    Err(RagError::MissingCredential(API_KEY_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn secrets_file_wins_over_environment() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "OPENROUTER_API_KEY = \"sk-from-file\"").unwrap();

        let sources = vec![
            CredentialSource::SecretsFile {
                path: file.path().to_path_buf(),
                key: API_KEY_NAME.to_string(),
            },
            CredentialSource::Env {
                var: "JUSTIQ_TEST_KEY_UNSET".to_string(),
            },
        ];
        assert_eq!(resolve(&sources).unwrap(), "sk-from-file");
    }

    #[test]
    fn falls_through_missing_file_to_environment() {
        // SAFETY: test-local variable name, not read anywhere else.
        unsafe { std::env::set_var("JUSTIQ_TEST_FALLBACK_KEY", "sk-from-env") };

        let sources = vec![
            CredentialSource::SecretsFile {
                path: PathBuf::from("/nonexistent/secrets.toml"),
                key: API_KEY_NAME.to_string(),
            },
            CredentialSource::Env {
                var: "JUSTIQ_TEST_FALLBACK_KEY".to_string(),
            },
        ];
        assert_eq!(resolve(&sources).unwrap(), "sk-from-env");
    }

    #[test]
    fn all_sources_empty_is_an_error() {
        let sources = vec![
            CredentialSource::SecretsFile {
                path: PathBuf::from("/nonexistent/secrets.toml"),
                key: API_KEY_NAME.to_string(),
            },
            CredentialSource::Env {
                var: "JUSTIQ_TEST_KEY_NEVER_SET".to_string(),
            },
        ];
        assert!(matches!(
            resolve(&sources),
            Err(RagError::MissingCredential(_))
        ));
    }
}
