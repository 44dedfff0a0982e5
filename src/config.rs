//! Startup configuration.
//!
//! Two environment variables are required, loaded once at process start;
//! missing either is a fatal startup error (spec §6).

use crate::error::CrawlError;

const DATASTORE_URL: &str = "DATASTORE_URL";
const DATASTORE_SERVICE_KEY: &str = "DATASTORE_SERVICE_KEY";

#[derive(Debug, Clone)]
pub struct Config {
    pub datastore_url: String,
    pub datastore_service_key: String,
}

impl Config {
    /// Loads a `.env` file if present (a convenience for local
    /// development; absence is not an error), then reads the two
    /// required variables from the process environment.
    pub fn from_env() -> Result<Self, CrawlError> {
        let _ = dotenvy::dotenv();

        let datastore_url = std::env::var(DATASTORE_URL)
            .map_err(|_| CrawlError::Config(format!("{DATASTORE_URL} is required")))?;
        let datastore_service_key = std::env::var(DATASTORE_SERVICE_KEY)
            .map_err(|_| CrawlError::Config(format!("{DATASTORE_SERVICE_KEY} is required")))?;

        if datastore_url.trim().is_empty() {
            return Err(CrawlError::Config(format!("{DATASTORE_URL} must not be empty")));
        }
        if datastore_service_key.trim().is_empty() {
            return Err(CrawlError::Config(format!(
                "{DATASTORE_SERVICE_KEY} must not be empty"
            )));
        }

        Ok(Self {
            datastore_url,
            datastore_service_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn missing_datastore_url_is_fatal() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var(DATASTORE_URL);
        std::env::remove_var(DATASTORE_SERVICE_KEY);
        std::env::set_var(DATASTORE_SERVICE_KEY, "key");
        assert!(Config::from_env().is_err());
        std::env::remove_var(DATASTORE_SERVICE_KEY);
    }

    #[test]
    fn both_present_succeeds() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var(DATASTORE_URL, "postgres://localhost/test");
        std::env::set_var(DATASTORE_SERVICE_KEY, "key");
        let config = Config::from_env().unwrap();
        assert_eq!(config.datastore_url, "postgres://localhost/test");
        std::env::remove_var(DATASTORE_URL);
        std::env::remove_var(DATASTORE_SERVICE_KEY);
    }
}
