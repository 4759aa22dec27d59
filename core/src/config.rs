//! Client configuration.
//!
//! A shop is addressed by its base URL (`https://{shop}.myshopify.com`). The
//! optional API version selects the versioned path prefix, and the optional
//! access token is sent on every request.

use serde::Deserialize;

use crate::error::ApiError;

pub const ENV_BASE_URL: &str = "SHOPIFY_BASE_URL";
pub const ENV_API_VERSION: &str = "SHOPIFY_API_VERSION";
pub const ENV_ACCESS_TOKEN: &str = "SHOPIFY_ACCESS_TOKEN";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_version: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_version: None,
            access_token: None,
        }
    }

    pub fn with_api_version(mut self, version: &str) -> Self {
        self.api_version = Some(version.to_string());
        self
    }

    pub fn with_access_token(mut self, token: &str) -> Self {
        self.access_token = Some(token.to_string());
        self
    }

    /// Read configuration from `SHOPIFY_BASE_URL`, `SHOPIFY_API_VERSION` and
    /// `SHOPIFY_ACCESS_TOKEN`. Only the base URL is required.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let base_url = non_empty(ENV_BASE_URL)
            .ok_or_else(|| ApiError::Config(format!("{ENV_BASE_URL} is not set")))?;
        Ok(Self {
            base_url,
            api_version: non_empty(ENV_API_VERSION),
            access_token: non_empty(ENV_ACCESS_TOKEN),
        })
    }

    /// `admin` for the unversioned API, `admin/api/{version}` otherwise.
    pub(crate) fn path_prefix(&self) -> String {
        match self.api_version.as_deref() {
            Some(version) => format!("admin/api/{version}"),
            None => "admin".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn from_lookup_requires_base_url() {
        let err = ClientConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn from_lookup_reads_all_variables() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_BASE_URL, "https://fooshop.myshopify.com"),
            (ENV_API_VERSION, "2024-01"),
            (ENV_ACCESS_TOKEN, "shpat_abc"),
        ]))
        .unwrap();
        assert_eq!(
            config,
            ClientConfig::new("https://fooshop.myshopify.com")
                .with_api_version("2024-01")
                .with_access_token("shpat_abc")
        );
    }

    #[test]
    fn blank_optional_variables_are_ignored() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_BASE_URL, "https://fooshop.myshopify.com"),
            (ENV_API_VERSION, ""),
        ]))
        .unwrap();
        assert!(config.api_version.is_none());
        assert_eq!(config.path_prefix(), "admin");
    }

    #[test]
    fn versioned_prefix() {
        let config = ClientConfig::new("http://x").with_api_version("2024-01");
        assert_eq!(config.path_prefix(), "admin/api/2024-01");
    }

    #[test]
    fn deserializes_with_optional_fields_missing() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url":"https://fooshop.myshopify.com"}"#).unwrap();
        assert_eq!(config, ClientConfig::new("https://fooshop.myshopify.com"));
    }
}
