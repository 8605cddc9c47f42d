use std::env;
use std::fmt;

const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Deployment profile, selected with `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Development,
    Production,
}

/// The HMAC secret used to sign bearer tokens.
///
/// `insecure` is set when no secret was configured and a random one was generated
/// for this process only.
#[derive(Clone)]
pub struct SigningSecret {
    value: String,
    insecure: bool,
}

impl SigningSecret {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            insecure: false,
        }
    }

    fn ephemeral() -> Self {
        let value = format!(
            "{}{}",
            uuid::Uuid::new_v4().simple(),
            uuid::Uuid::new_v4().simple()
        );
        Self {
            value,
            insecure: true,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.value.as_bytes()
    }

    pub fn is_insecure(&self) -> bool {
        self.insecure
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SigningSecret")
            .field("value", &"<redacted>")
            .field("insecure", &self.insecure)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Invalid { key: &'static str, value: String },
    MissingInProduction(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Invalid { key, value } => {
                write!(f, "invalid value for {}: {:?}", key, value)
            }
            ConfigError::MissingInProduction(key) => {
                write!(f, "{} must be set when APP_ENV=production", key)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub server_host: String,
    pub profile: Profile,
    pub jwt_secret: SigningSecret,
    pub token_ttl: chrono::Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup, so tests do not have
    /// to mutate the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let profile = match lookup("APP_ENV").as_deref() {
            None | Some("") | Some("development") | Some("dev") => Profile::Development,
            Some("production") | Some("prod") => Profile::Production,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "APP_ENV",
                    value: other.to_string(),
                })
            }
        };

        let server_port = match lookup("SERVER_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "SERVER_PORT",
                value: raw,
            })?,
            None => 8080,
        };

        let token_ttl = match lookup("JWT_TTL_HOURS") {
            Some(raw) => match raw
                .parse::<i64>()
                .ok()
                .filter(|hours| *hours > 0)
                .and_then(chrono::Duration::try_hours)
            {
                Some(ttl) => ttl,
                None => {
                    return Err(ConfigError::Invalid {
                        key: "JWT_TTL_HOURS",
                        value: raw,
                    })
                }
            },
            None => chrono::Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
        };

        let jwt_secret = match lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => SigningSecret::new(secret),
            None if profile == Profile::Production => {
                return Err(ConfigError::MissingInProduction("JWT_SECRET"))
            }
            None => SigningSecret::ephemeral(),
        };

        Ok(Self {
            server_port,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            profile,
            jwt_secret,
            token_ttl,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.server_port, 8080);
        assert_eq!(config.server_host, "127.0.0.1");
        assert_eq!(config.profile, Profile::Development);
        assert_eq!(config.token_ttl, chrono::Duration::hours(24));
        assert!(config.jwt_secret.is_insecure());
        assert_eq!(config.server_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_config_custom_values() {
        let config = Config::from_lookup(lookup_from(&[
            ("SERVER_PORT", "3000"),
            ("SERVER_HOST", "0.0.0.0"),
            ("JWT_SECRET", "s3cret"),
            ("JWT_TTL_HOURS", "2"),
            ("APP_ENV", "production"),
        ]))
        .unwrap();

        assert_eq!(config.server_port, 3000);
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.profile, Profile::Production);
        assert_eq!(config.jwt_secret.as_bytes(), b"s3cret");
        assert!(!config.jwt_secret.is_insecure());
        assert_eq!(config.token_ttl, chrono::Duration::hours(2));
    }

    #[test]
    fn test_production_requires_secret() {
        let err = Config::from_lookup(lookup_from(&[("APP_ENV", "production")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingInProduction("JWT_SECRET"));
    }

    #[test]
    fn test_ttl_must_be_positive_and_in_range() {
        for bad in ["0", "-3", "abc", "1.5", "9000000000000", "9223372036854775807"] {
            let result = Config::from_lookup(lookup_from(&[("JWT_TTL_HOURS", bad)]));
            assert!(result.is_err(), "JWT_TTL_HOURS={} should be rejected", bad);
        }
    }

    #[test]
    fn test_ephemeral_secrets_differ() {
        let a = Config::from_lookup(lookup_from(&[])).unwrap();
        let b = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_ne!(a.jwt_secret.as_bytes(), b.jwt_secret.as_bytes());
    }

    #[test]
    fn test_secret_is_redacted_in_debug() {
        let secret = SigningSecret::new("do-not-print");
        assert!(!format!("{:?}", secret).contains("do-not-print"));
    }
}
