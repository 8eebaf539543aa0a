//! Relay configuration: credential, endpoint and send timeout.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::domain::ApiKey;

pub const DEFAULT_ENDPOINT: &str = "https://www.fast2sms.com/dev/bulkV2";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

pub const API_KEY_VAR: &str = "FAST2SMS_API_KEY";
pub const ENDPOINT_VAR: &str = "FAST2SMS_ENDPOINT";
pub const TIMEOUT_VAR: &str = "FAST2SMS_TIMEOUT_SECS";

#[derive(Debug, thiserror::Error)]
/// Configuration problems, all detected before any SMS is sent.
pub enum ConfigurationError {
    /// No API key was configured.
    #[error("SMS service not configured: FAST2SMS_API_KEY is not set")]
    MissingApiKey,

    #[error("invalid Fast2SMS endpoint {value:?}: {reason}")]
    InvalidEndpoint { value: String, reason: String },

    #[error("invalid send timeout {value:?}: expected a positive number of seconds")]
    InvalidTimeout { value: String },

    #[error("cannot load env file {}: {source}", .path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
}

#[derive(Debug, Clone)]
/// Explicit configuration handed to [`crate::GatewayClient`] and [`crate::SmsRelay`].
///
/// A missing API key is allowed here so that a relay can start unconfigured and
/// report [`ConfigurationError::MissingApiKey`] per request.
pub struct RelayConfig {
    pub api_key: Option<ApiKey>,
    pub endpoint: String,
    pub timeout: Duration,
    pub user_agent: Option<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_endpoint(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }
}

impl RelayConfig {
    /// Configuration with the given key and default endpoint/timeout.
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key: Some(api_key),
            ..Default::default()
        }
    }

    /// Read `FAST2SMS_API_KEY`, `FAST2SMS_ENDPOINT` and `FAST2SMS_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load `.env` from the working directory or its parents when one exists,
    /// then read the process environment. Variables already set win over the file.
    pub fn from_dotenv() -> Result<Self, ConfigurationError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded env file"),
            Err(err) if err.not_found() => debug!("no .env file found"),
            Err(source) => {
                return Err(ConfigurationError::EnvFile {
                    path: PathBuf::from(".env"),
                    source,
                });
            }
        }
        Self::from_env()
    }

    /// Read configuration from a dotenv-formatted file only, without touching the
    /// process environment.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let vars = dotenvy::from_path_iter(path)
            .and_then(|iter| iter.collect::<Result<HashMap<_, _>, _>>())
            .map_err(|source| ConfigurationError::EnvFile {
                path: path.to_owned(),
                source,
            })?;
        Self::from_lookup(|name| vars.get(name).cloned())
    }

    /// Same as [`RelayConfig::from_env`] but reading values from `lookup`.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let api_key = read(API_KEY_VAR).and_then(|value| ApiKey::new(value).ok());
        let endpoint = match read(ENDPOINT_VAR) {
            Some(value) => parse_endpoint(&value)?,
            None => default_endpoint(),
        };
        let timeout = match read(TIMEOUT_VAR) {
            Some(value) => parse_timeout(&value)?,
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            api_key,
            endpoint,
            timeout,
            user_agent: None,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn require_api_key(&self) -> Result<&ApiKey, ConfigurationError> {
        self.api_key.as_ref().ok_or(ConfigurationError::MissingApiKey)
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_owned()
}

fn parse_endpoint(value: &str) -> Result<String, ConfigurationError> {
    let url = Url::parse(value.trim()).map_err(|err| ConfigurationError::InvalidEndpoint {
        value: value.to_owned(),
        reason: err.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigurationError::InvalidEndpoint {
            value: value.to_owned(),
            reason: format!("unsupported scheme {}", url.scheme()),
        });
    }
    Ok(url.into())
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigurationError> {
    let invalid = || ConfigurationError::InvalidTimeout {
        value: value.to_owned(),
    };
    let secs: f64 = value.trim().parse().map_err(|_| invalid())?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(invalid());
    }
    Duration::try_from_secs_f64(secs).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn env_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "fast2sms-relay-{}-{name}.env",
            std::process::id()
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = RelayConfig::from_lookup(lookup(&[(API_KEY_VAR, " key ")])).unwrap();
        assert!(config.is_configured());
        assert_eq!(config.require_api_key().unwrap().as_str(), "key");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout, Duration::from_secs(15));
    }

    #[test]
    fn missing_or_blank_key_leaves_relay_unconfigured() {
        let config = RelayConfig::from_lookup(lookup(&[])).unwrap();
        assert!(!config.is_configured());
        assert!(matches!(
            config.require_api_key(),
            Err(ConfigurationError::MissingApiKey)
        ));

        let config = RelayConfig::from_lookup(lookup(&[(API_KEY_VAR, "   ")])).unwrap();
        assert!(!config.is_configured());
    }

    #[test]
    fn timeout_override_is_parsed() {
        let config = RelayConfig::from_lookup(lookup(&[(TIMEOUT_VAR, "2.5")])).unwrap();
        assert_eq!(config.timeout, Duration::from_millis(2500));

        for bad in ["0", "-1", "soon", "NaN"] {
            let err = RelayConfig::from_lookup(lookup(&[(TIMEOUT_VAR, bad)])).unwrap_err();
            assert!(
                matches!(err, ConfigurationError::InvalidTimeout { .. }),
                "{bad}: {err:?}"
            );
        }
    }

    #[test]
    fn endpoint_override_must_be_http_url() {
        let config =
            RelayConfig::from_lookup(lookup(&[(ENDPOINT_VAR, "http://127.0.0.1:9000/send")]))
                .unwrap();
        assert_eq!(config.endpoint, "http://127.0.0.1:9000/send");

        for bad in ["not a url", "ftp://example.com/send"] {
            let err = RelayConfig::from_lookup(lookup(&[(ENDPOINT_VAR, bad)])).unwrap_err();
            assert!(matches!(err, ConfigurationError::InvalidEndpoint { .. }));
        }
    }

    #[test]
    fn env_file_values_are_read() {
        let path = env_file(
            "values",
            "# relay credentials\nFAST2SMS_API_KEY=\"file-key\"\nFAST2SMS_TIMEOUT_SECS=3\n",
        );
        let config = RelayConfig::from_env_file(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.require_api_key().unwrap().as_str(), "file-key");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn env_file_without_key_is_unconfigured() {
        let path = env_file("empty-key", "FAST2SMS_API_KEY=\n");
        let config = RelayConfig::from_env_file(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert!(!config.is_configured());
    }

    #[test]
    fn missing_env_file_is_reported() {
        let path = std::env::temp_dir().join("fast2sms-relay-does-not-exist.env");
        let err = RelayConfig::from_env_file(&path).unwrap_err();
        assert!(
            matches!(&err, ConfigurationError::EnvFile { source, .. } if source.not_found()),
            "{err:?}"
        );
        assert!(err.to_string().starts_with("cannot load env file "));
    }
}
