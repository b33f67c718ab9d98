use crate::config::configuration::Configuration;

/// Where the query engine reads the service key from, on every query.
///
/// Absence is an expected state. Blank keys are reported as absent.
pub trait CredentialProvider: Send + Sync {
    fn service_key(&self) -> Option<String>;
}

fn non_blank(key: Option<&str>) -> Option<String> {
    key.map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_owned)
}

impl CredentialProvider for Configuration {
    fn service_key(&self) -> Option<String> {
        non_blank(Configuration::service_key(self))
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticCredential(Option<String>);

impl StaticCredential {
    pub fn new(key: impl Into<String>) -> StaticCredential {
        StaticCredential(Some(key.into()))
    }

    pub fn missing() -> StaticCredential {
        StaticCredential(None)
    }
}

impl CredentialProvider for StaticCredential {
    fn service_key(&self) -> Option<String> {
        non_blank(self.0.as_deref())
    }
}
