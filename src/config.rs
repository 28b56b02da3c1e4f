use anyhow::{Context, Result, anyhow};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// One year.
pub const MAX_TOKEN_TTL: u64 = 365 * 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub server_addr: String,
    /// Lifetime of an issued bearer token, in seconds.
    pub token_ttl: u64,
    /// Lets `POST /auth/register` honor a requested `role_id`. When off,
    /// self-registration can only produce Employees.
    pub register_role_choice: bool,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_register_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    // Connection pool
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_connect_timeout: Duration,
    pub db_idle_timeout: Duration,
    pub db_max_lifetime: Duration,

    pub log_dir: String,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; `from_env` feeds it the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow!("{key} must be set"))
        };

        let jwt_secret = required("JWT_SECRET")?;
        if jwt_secret.len() < 16 {
            return Err(anyhow!("JWT_SECRET must be at least 16 characters long"));
        }

        let token_ttl: u64 = parse_or(&lookup, "TOKEN_TTL", 72 * 60 * 60)?; // default 72 hours
        if token_ttl == 0 || token_ttl > MAX_TOKEN_TTL {
            return Err(anyhow!("TOKEN_TTL must be between 1 and {MAX_TOKEN_TTL} seconds"));
        }

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret,
            jwt_issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "attendance-api".to_string()),
            token_ttl,
            register_role_choice: parse_or(&lookup, "REGISTER_ROLE_CHOICE", true)?,

            rate_login_per_min: parse_or(&lookup, "RATE_LOGIN_PER_MIN", 60)?,
            rate_register_per_min: parse_or(&lookup, "RATE_REGISTER_PER_MIN", 30)?,
            rate_protected_per_min: parse_or(&lookup, "RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: lookup("API_PREFIX").unwrap_or_else(|| "/api/v1".to_string()),

            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            db_min_connections: parse_or(&lookup, "DB_MIN_CONNECTIONS", 2)?,
            db_connect_timeout: Duration::from_secs(parse_or(&lookup, "DB_CONNECT_TIMEOUT_SECS", 5)?),
            db_idle_timeout: Duration::from_secs(parse_or(&lookup, "DB_IDLE_TIMEOUT_SECS", 30 * 60)?),
            db_max_lifetime: Duration::from_secs(parse_or(&lookup, "DB_MAX_LIFETIME_SECS", 60 * 60)?),

            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self::from_lookup(|key| match key {
            "SERVER_ADDR" => Some("127.0.0.1:0".into()),
            "DATABASE_URL" => Some("mysql://unused".into()),
            "JWT_SECRET" => Some("test-secret-that-is-long-enough".into()),
            _ => None,
        })
        .expect("test config is valid")
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
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("SERVER_ADDR", "0.0.0.0:8080"),
        ("DATABASE_URL", "mysql://root@localhost/attendance"),
        ("JWT_SECRET", "0123456789abcdef0123"),
    ];

    #[test]
    fn applies_defaults() {
        let config = Config::from_lookup(lookup_from(&REQUIRED)).unwrap();

        assert_eq!(config.token_ttl, 259_200);
        assert_eq!(config.api_prefix, "/api/v1");
        assert_eq!(config.db_max_connections, 10);
        assert_eq!(config.db_connect_timeout, Duration::from_secs(5));
        assert_eq!(config.jwt_issuer, "attendance-api");
        assert!(config.register_role_choice);
    }

    #[test]
    fn missing_secret_is_an_error() {
        let err = Config::from_lookup(lookup_from(&REQUIRED[..2])).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn unparsable_number_is_an_error() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("TOKEN_TTL", "three days"));

        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(err.to_string().contains("TOKEN_TTL"));
    }

    #[test]
    fn token_ttl_must_be_bounded() {
        for raw in ["0", "18446744073709551615", "31536001"] {
            let mut pairs = REQUIRED.to_vec();
            pairs.push(("TOKEN_TTL", raw));

            let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
            assert!(err.to_string().contains("TOKEN_TTL"), "{raw}: {err}");
        }
    }

    #[test]
    fn overrides_are_read() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("TOKEN_TTL", "3600"));
        pairs.push(("API_PREFIX", "/api"));
        pairs.push(("REGISTER_ROLE_CHOICE", "false"));

        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.token_ttl, 3600);
        assert_eq!(config.api_prefix, "/api");
        assert!(!config.register_role_choice);
    }
}
