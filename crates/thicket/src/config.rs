//! Router configuration.

use serde::Deserialize;

use crate::error::Result;

/// Settings that change how the router serves requests.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use thicket::RouterConfig;
///
/// let config = RouterConfig::from_json(r#"{"log_requests": true}"#).unwrap();
/// assert!(config.log_requests);
/// assert_eq!(config.version_header, "Accept");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Emit a log record for every dispatched request.
    pub log_requests: bool,
    /// Header carrying a caller-provided request id, echoed on the response.
    pub request_id_header: Option<String>,
    /// Header holding `application/vnd.<app>.<version>`.
    pub version_header: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            log_requests: false,
            request_id_header: None,
            version_header: "Accept".to_string(),
        }
    }
}

impl RouterConfig {
    /// Parses a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RouterError;

    #[test]
    fn test_defaults() {
        let config = RouterConfig::from_json("{}").unwrap();
        assert_eq!(config, RouterConfig::default());
        assert!(!config.log_requests);
        assert_eq!(config.request_id_header, None);
    }

    #[test]
    fn test_full() {
        let config = RouterConfig::from_json(
            r#"{"log_requests": true, "request_id_header": "X-Request-Id", "version_header": "X-Api"}"#,
        )
        .unwrap();
        assert!(config.log_requests);
        assert_eq!(config.request_id_header.as_deref(), Some("X-Request-Id"));
        assert_eq!(config.version_header, "X-Api");
    }

    #[test]
    fn test_invalid() {
        let err = RouterConfig::from_json(r#"{"log_requests": "yes"}"#).unwrap_err();
        assert!(matches!(err, RouterError::InvalidConfig(_)));
    }
}
