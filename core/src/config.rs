//! Client configuration, either built in code or read from the environment.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::sites::{self, DEFAULT_SITE_ID};
use crate::transport::DEFAULT_API_URL;

pub const ENV_API_URL: &str = "MELI_API_URL";
pub const ENV_ACCESS_TOKEN: &str = "MELI_ACCESS_TOKEN";
pub const ENV_SITE_ID: &str = "MELI_SITE_ID";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_url: String,
    pub access_token: String,
    pub site_id: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            access_token: String::new(),
            site_id: DEFAULT_SITE_ID.to_string(),
        }
    }
}

impl ClientConfig {
    /// Read `MELI_API_URL`, `MELI_ACCESS_TOKEN` and `MELI_SITE_ID`.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` with a caller-supplied variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let defaults = Self::default();
        let config = Self {
            api_url: lookup(ENV_API_URL).unwrap_or(defaults.api_url),
            access_token: lookup(ENV_ACCESS_TOKEN).unwrap_or_default(),
            site_id: lookup(ENV_SITE_ID).unwrap_or(defaults.site_id),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.access_token.is_empty() {
            return Err(ApiError::Config(format!("{ENV_ACCESS_TOKEN} is not set")));
        }
        if self.api_url.is_empty() {
            return Err(ApiError::Config("api_url is empty".to_string()));
        }
        if sites::find(&self.site_id).is_none() {
            return Err(ApiError::UnknownSite(self.site_id.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn token_only_uses_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[(ENV_ACCESS_TOKEN, "APP_USR-1")])).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.site_id, "MLA");
        assert_eq!(config.access_token, "APP_USR-1");
    }

    #[test]
    fn every_variable_is_read() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_API_URL, "http://localhost:3000"),
            (ENV_ACCESS_TOKEN, "t"),
            (ENV_SITE_ID, "MLB"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "http://localhost:3000");
        assert_eq!(config.site_id, "MLB");
    }

    #[test]
    fn missing_token_is_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ApiError::Config(ref m) if m.contains(ENV_ACCESS_TOKEN)));
    }

    #[test]
    fn unknown_site_is_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[(ENV_ACCESS_TOKEN, "t"), (ENV_SITE_ID, "ZZZ")])).unwrap_err();
        assert!(matches!(err, ApiError::UnknownSite(ref id) if id == "ZZZ"));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: ClientConfig = serde_json::from_str(r#"{"access_token":"t"}"#).unwrap();
        assert_eq!(config.site_id, DEFAULT_SITE_ID);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.validate().is_ok());
    }
}
