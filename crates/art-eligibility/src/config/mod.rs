use crate::calculations::pvls::{ConceptRef, EligibilityConfig, EncounterTypeRef, HivMetadata};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub eligibility: EligibilityConfig,
    pub metadata: HivMetadata,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let defaults = EligibilityConfig::default();
        let eligibility = EligibilityConfig {
            minimum_months_on_art: months_var("PVLS_MIN_ART_MONTHS", defaults.minimum_months_on_art)?,
            lookback_months: months_var("PVLS_LOOKBACK_MONTHS", defaults.lookback_months)?,
        };

        let metadata = HivMetadata {
            viral_load_concept: ConceptRef(string_var("PVLS_VIRAL_LOAD_CONCEPT", "856")),
            lab_encounter_type: EncounterTypeRef(string_var("PVLS_LAB_ENCOUNTER_TYPE", "13")),
            adult_followup_encounter_type: EncounterTypeRef(string_var(
                "PVLS_ADULT_FOLLOWUP_ENCOUNTER_TYPE",
                "6",
            )),
            child_followup_encounter_type: EncounterTypeRef(string_var(
                "PVLS_CHILD_FOLLOWUP_ENCOUNTER_TYPE",
                "9",
            )),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            eligibility,
            metadata,
        })
    }
}

fn string_var(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn months_var(name: &'static str, default: u32) -> Result<u32, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidMonths { variable: name, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidMonths { variable: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidMonths { variable, value } => write!(
                f,
                "{variable} must be a whole number of months (got '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidMonths { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
