//! Client configuration.

use std::time::Duration;

/// Default storage API location.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Where the storage API lives and who is signed in.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the storage server (without `/api`).
    pub api_url: String,
    /// External id of the signed-in user.
    pub user_id: Option<String>,
    /// Bearer token for that user.
    pub token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user_id: None,
            token: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    /// Read `CANVASBOARD_API_URL`, `CANVASBOARD_USER_ID` and `CANVASBOARD_TOKEN`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            api_url: non_empty("CANVASBOARD_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            user_id: non_empty("CANVASBOARD_USER_ID"),
            token: non_empty("CANVASBOARD_TOKEN"),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_unset() {
        let config = ClientConfig::from_lookup(|_| None);
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.api_url, "http://localhost:5000");
    }

    #[test]
    fn test_reads_values_and_ignores_blanks() {
        let vars: HashMap<&str, &str> = [
            ("CANVASBOARD_API_URL", "https://boards.example.com"),
            ("CANVASBOARD_USER_ID", "user_42"),
            ("CANVASBOARD_TOKEN", "  "),
        ]
        .into_iter()
        .collect();
        let config = ClientConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.api_url, "https://boards.example.com");
        assert_eq!(config.user_id.as_deref(), Some("user_42"));
        assert_eq!(config.token, None);
    }
}
