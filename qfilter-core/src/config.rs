//! Client settings consumed by the transport layer.
//!
//! The filter core never reads these; they describe where rendered filters
//! are sent and feed the endpoint rotation used for failover.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::circular::CircularSequence;
use crate::error::{Error, Result};

/// Default service address.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:6333";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the vector-database service.
///
/// # Example
///
/// ```
/// use qfilter_core::ClientSettings;
///
/// let settings = ClientSettings::new("http://10.0.0.1:6333")
///     .with_endpoint("http://10.0.0.2:6333")
///     .with_api_key("secret")
///     .with_timeout_secs(5);
///
/// let mut rotation = settings.endpoint_rotation().unwrap();
/// assert_eq!(rotation.advance().unwrap(), "http://10.0.0.1:6333");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Service addresses, tried in order on failover.
    pub endpoints: Vec<String>,
    /// API key sent with every request.
    pub api_key: Option<String>,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoints: vec![DEFAULT_ENDPOINT.to_string()],
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientSettings {
    /// Creates settings for a single endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoints: vec![endpoint.into()],
            ..Default::default()
        }
    }

    /// Adds a failover endpoint. Chainable.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoints.push(endpoint.into());
        self
    }

    /// Sets the API key. Chainable.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the request timeout. Chainable.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    #[inline]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Loads settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("parse settings failed: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks that the settings can be used to reach the service.
    pub fn validate(&self) -> Result<()> {
        if self.endpoints.is_empty() {
            return Err(Error::Config("at least one endpoint is required".to_string()));
        }
        if let Some(i) = self.endpoints.iter().position(|e| e.trim().is_empty()) {
            return Err(Error::Config(format!("endpoint {} is blank", i)));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout must be positive".to_string()));
        }
        Ok(())
    }

    /// A round-robin rotation over the configured endpoints.
    pub fn endpoint_rotation(&self) -> Result<CircularSequence<String>> {
        self.validate()?;
        CircularSequence::new(self.endpoints.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ClientSettings::default();
        assert_eq!(settings.endpoints, vec![DEFAULT_ENDPOINT.to_string()]);
        assert_eq!(settings.timeout(), Duration::from_secs(30));
        assert!(settings.api_key.is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let settings = ClientSettings::from_json(r#"{"api_key": "k"}"#).unwrap();
        assert_eq!(settings.api_key.as_deref(), Some("k"));
        assert_eq!(settings.endpoints, vec![DEFAULT_ENDPOINT.to_string()]);
        assert_eq!(settings.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        assert!(matches!(
            ClientSettings::from_json("not json").unwrap_err(),
            Error::Config(_)
        ));
        assert!(matches!(
            ClientSettings::from_json(r#"{"endpoints": []}"#).unwrap_err(),
            Error::Config(_)
        ));
        assert!(matches!(
            ClientSettings::from_json(r#"{"endpoints": ["  "]}"#).unwrap_err(),
            Error::Config(_)
        ));
        assert!(matches!(
            ClientSettings::from_json(r#"{"timeout_secs": 0}"#).unwrap_err(),
            Error::Config(_)
        ));
    }

    #[test]
    fn test_endpoint_rotation_follows_configured_order() {
        let settings = ClientSettings::new("http://a:6333").with_endpoint("http://b:6333");
        let mut rotation = settings.endpoint_rotation().unwrap();

        assert_eq!(rotation.len(), 2);
        assert_eq!(rotation.advance().unwrap(), "http://a:6333");
        assert_eq!(rotation.advance().unwrap(), "http://b:6333");
        assert_eq!(rotation.advance().unwrap(), "http://a:6333");
    }

    #[test]
    fn test_serialization_roundtrip() {
        let settings = ClientSettings::new("http://a:6333").with_api_key("k");
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(ClientSettings::from_json(&json).unwrap(), settings);
    }
}
