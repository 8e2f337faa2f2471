use error_stack::{Report, ResultExt};
use std::str::FromStr;

const DEFAULT_PORT: u16 = 3001;

pub const PORT_VAR: &str = "PORT";
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const DATABASE_POOL_SIZE_VAR: &str = "DATABASE_POOL_SIZE";
pub const PUBLIC_ORIGIN_VAR: &str = "FEEDBACK_PUBLIC_ORIGIN";
pub const METRICS_VAR: &str = "FEEDBACK_METRICS";

#[derive(Debug, thiserror::Error)]
#[error("invalid configuration")]
pub struct ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    /// PostgreSQL is used when set, otherwise everything is kept in memory.
    pub database_url: Option<String>,
    pub pool_size: Option<usize>,
    pub public_origin: Option<String>,
    pub metrics_enabled: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, Report<ConfigError>> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Report<ConfigError>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Ok(Self {
            port: parse(PORT_VAR, get(PORT_VAR))?.unwrap_or(DEFAULT_PORT),
            database_url: get(DATABASE_URL_VAR),
            pool_size: parse(DATABASE_POOL_SIZE_VAR, get(DATABASE_POOL_SIZE_VAR))?,
            public_origin: get(PUBLIC_ORIGIN_VAR),
            metrics_enabled: parse_flag(METRICS_VAR, get(METRICS_VAR))?.unwrap_or(true),
        })
    }
}

fn parse<T>(key: &str, value: Option<String>) -> Result<Option<T>, Report<ConfigError>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .map(|v| {
            v.parse::<T>()
                .change_context(ConfigError)
                .attach_with(|| format!("{key} has an invalid value '{v}'"))
        })
        .transpose()
}

fn parse_flag(key: &str, value: Option<String>) -> Result<Option<bool>, Report<ConfigError>> {
    value
        .map(|v| match v.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(Report::new(ConfigError)
                .attach(format!("{key} must be true or false, got '{v}'"))),
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, Report<ConfigError>> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();

        assert_eq!(
            AppConfig {
                port: 3001,
                database_url: None,
                pool_size: None,
                public_origin: None,
                metrics_enabled: true,
            },
            config
        );
    }

    #[test]
    fn every_variable_is_read() {
        let config = config_from(&[
            (PORT_VAR, "8080"),
            (DATABASE_URL_VAR, "postgresql://u:p@localhost/feedback"),
            (DATABASE_POOL_SIZE_VAR, "4"),
            (PUBLIC_ORIGIN_VAR, "https://feedback.example.com"),
            (METRICS_VAR, "false"),
        ])
        .unwrap();

        assert_eq!(8080, config.port);
        assert_eq!(
            Some("postgresql://u:p@localhost/feedback"),
            config.database_url.as_deref()
        );
        assert_eq!(Some(4), config.pool_size);
        assert_eq!(
            Some("https://feedback.example.com"),
            config.public_origin.as_deref()
        );
        assert!(!config.metrics_enabled);
    }

    #[test]
    fn blank_values_are_unset() {
        let config = config_from(&[(DATABASE_URL_VAR, "  "), (PORT_VAR, "")]).unwrap();

        assert_eq!(None, config.database_url);
        assert_eq!(3001, config.port);
    }

    #[test]
    fn invalid_port_is_an_error() {
        assert!(config_from(&[(PORT_VAR, "eighty")]).is_err());
        assert!(config_from(&[(PORT_VAR, "70000")]).is_err());
    }

    #[test]
    fn invalid_metrics_flag_is_an_error() {
        assert!(config_from(&[(METRICS_VAR, "maybe")]).is_err());
    }
}
