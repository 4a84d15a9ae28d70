//! Front-end configuration read from the environment.

use crate::ai::openai::DEFAULT_BASE_URL;
use crate::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SIMULATION_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub credential_path: PathBuf,
    pub simulation_delay: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        load_dotenv(dotenvy::dotenv())?;

        let credential_path = match std::env::var("BRIEFING_CREDENTIAL_PATH") {
            Ok(path) => PathBuf::from(path),
            Err(_) => default_credential_path()?,
        };

        let simulation_delay = match std::env::var("BRIEFING_SIMULATION_DELAY_MS") {
            Ok(raw) => parse_delay_ms(&raw)?,
            Err(_) => DEFAULT_SIMULATION_DELAY,
        };

        Ok(Self {
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            credential_path,
            simulation_delay,
        })
    }
}

/// A missing `.env` is fine; an unreadable or malformed one is not.
fn load_dotenv(outcome: std::result::Result<PathBuf, dotenvy::Error>) -> Result<()> {
    match outcome {
        Ok(path) => {
            tracing::debug!("Loaded environment from {}", path.display());
            Ok(())
        }
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn default_credential_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| {
            dir.join("briefing-prompt-generator")
                .join("credentials.json")
        })
        .ok_or_else(|| {
            Error::Storage(
                "Could not find a config directory; set BRIEFING_CREDENTIAL_PATH".to_string(),
            )
        })
}

fn parse_delay_ms(raw: &str) -> Result<Duration> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| {
            Error::Validation(format!(
                "BRIEFING_SIMULATION_DELAY_MS must be a whole number of milliseconds, got '{}'",
                raw
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_delay_ms() {
        assert_eq!(parse_delay_ms("250").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_delay_ms(" 0 ").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_missing_dotenv_is_ignored() {
        let missing = dotenvy::Error::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(load_dotenv(Err(missing)).is_ok());
        assert!(load_dotenv(Ok(PathBuf::from(".env"))).is_ok());
    }

    #[test]
    fn test_malformed_dotenv_is_reported() {
        let malformed = dotenvy::Error::LineParse("KEY VALUE".to_string(), 3);
        let err = load_dotenv(Err(malformed)).unwrap_err();
        assert!(matches!(err, Error::EnvVar(_)));
    }

    #[test]
    fn test_parse_delay_ms_rejects_garbage() {
        let err = parse_delay_ms("soon").unwrap_err();
        assert!(err.to_string().contains("soon"));
    }
}
