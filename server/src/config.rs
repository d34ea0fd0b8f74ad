use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// The welcome page shipped with the crate, so `cargo run` works from any directory.
pub const DEFAULT_TEMPLATE_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/templates/tareas_bienvenida.html");

/// Errors raised while reading the environment at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Server configuration, read once in `main` and handed to the router.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind: SocketAddr,
    pub database_url: String,
    pub template_path: PathBuf,
    pub login_rate: LoginRateConfig,
    pub sentry_dsn: Option<String>,
}

/// Login throttling: `burst` attempts, one replenished every `period`.
#[derive(Debug, Clone, Copy)]
pub struct LoginRateConfig {
    pub burst: u32,
    pub period: Duration,
}

impl Default for LoginRateConfig {
    fn default() -> Self {
        // 5 attempts, refilled every 3 minutes (15 minutes for a full bucket).
        Self {
            burst: 5,
            period: Duration::from_secs(180),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 5555)),
            database_url: "sqlite://tareas.db".to_string(),
            template_path: PathBuf::from(DEFAULT_TEMPLATE_PATH),
            login_rate: LoginRateConfig::default(),
            sentry_dsn: None,
        }
    }
}

impl Config {
    /// Loads `.env` (if any) and then reads every setting from the environment.
    /// Unset variables fall back to `Config::default()`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as `from_env`, but reads from an arbitrary lookup so tests don't
    /// have to mutate the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host: IpAddr = parse_or(&lookup, "HOST", defaults.bind.ip())?;
        let port: u16 = parse_or(&lookup, "PORT", defaults.bind.port())?;

        let burst: u32 = parse_or(&lookup, "LOGIN_RATE_BURST", defaults.login_rate.burst)?;
        if burst == 0 {
            return Err(ConfigError::Zero("LOGIN_RATE_BURST"));
        }
        let period_secs: u64 = parse_or(
            &lookup,
            "LOGIN_RATE_PERIOD_SECS",
            defaults.login_rate.period.as_secs(),
        )?;
        if period_secs == 0 {
            return Err(ConfigError::Zero("LOGIN_RATE_PERIOD_SECS"));
        }

        Ok(Self {
            bind: SocketAddr::new(host, port),
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            template_path: lookup("TEMPLATE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.template_path),
            login_rate: LoginRateConfig {
                burst,
                period: Duration::from_secs(period_secs),
            },
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.trim().is_empty()),
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        None => Ok(default),
    }
}
