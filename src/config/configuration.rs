use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::config::configerror::ConfigError;
use crate::holiday::holidayfetcher::{
    DEFAULT_ENDPOINT,
    DEFAULT_NUM_OF_ROWS
};
use crate::holiday::holidayqueryengine::FailurePolicy;

/// Environment variable that, when non-blank, overrides `service_key`.
pub const SERVICE_KEY_ENV: &str = "KOREAN_HOLIDAY_SERVICE_KEY";

/// How the portal issued the service key.
///
/// The portal hands out the same key twice: once plain ("Decoding") and once
/// already percent-encoded ("Encoding").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum ServiceKeyEncoding {
    #[default]
    Decoded,
    Encoded
}

/// Settings read from a JSON file. Every field is optional in the file.
///
/// ```json
/// {
///     "service_key": "...",
///     "service_key_encoding": "Decoded",
///     "timeout_secs": 10,
///     "failure_policy": "CacheEmpty"
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    service_key: Option<String>,
    #[serde(default)]
    service_key_encoding: ServiceKeyEncoding,
    #[serde(default = "default_endpoint")]
    endpoint: String,
    #[serde(default = "default_num_of_rows")]
    num_of_rows: u32,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
    #[serde(default)]
    failure_policy: FailurePolicy
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_owned()
}

fn default_num_of_rows() -> u32 {
    DEFAULT_NUM_OF_ROWS
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            service_key: None,
            service_key_encoding: ServiceKeyEncoding::default(),
            endpoint: default_endpoint(),
            num_of_rows: default_num_of_rows(),
            timeout_secs: default_timeout_secs(),
            failure_policy: FailurePolicy::default()
        }
    }
}

impl Configuration {
    pub fn from_file(path: &Path) -> Result<Configuration, ConfigError> {
        let file = File::open(path).map_err(|source| ConfigError::IOError {
            path: path.to_path_buf(),
            source
        })?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|source| ConfigError::JsonParseError {
            path: path.to_path_buf(),
            source
        })
    }

    /// Missing file → defaults. Unreadable or malformed file → defaults plus a warning.
    pub fn load_or_default(path: &Path) -> Configuration {
        if !path.exists() {
            log::info!("No configuration at {}, using defaults", path.display());
            return Configuration::default();
        }
        Configuration::from_file(path).unwrap_or_else(|error| {
            log::warn!("{}; using defaults", error);
            Configuration::default()
        })
    }

    pub fn with_env_overrides(self) -> Configuration {
        self.with_service_key_override(std::env::var(SERVICE_KEY_ENV).ok())
    }

    fn with_service_key_override(mut self, key: Option<String>) -> Configuration {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.service_key = Some(key);
        }
        self
    }

    pub fn with_service_key(mut self, key: Option<String>) -> Configuration {
        self.service_key = key;
        self
    }

    pub fn service_key(&self) -> Option<&str> {
        self.service_key.as_deref()
    }

    pub fn service_key_encoding(&self) -> ServiceKeyEncoding {
        self.service_key_encoding
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn num_of_rows(&self) -> u32 {
        self.num_of_rows
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }
}
