//! Configuration loaded from the process environment
//!
//! An optional `.env` file is loaded first, then individual variables are
//! read. The chat credential is optional at startup: when absent, the
//! chat endpoint reports the missing credential at call time while the
//! interpretability endpoints keep working.

use crate::chat::{ChatClient, DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Environment variable holding the hosted chat API credential
pub const CHAT_API_KEY_VAR: &str = "NEBIUS_API_KEY";

/// Environment variable holding the application secret key
pub const SECRET_KEY_VAR: &str = "SECRET_KEY";

/// Fallback secret for development setups without an environment
const DEV_SECRET_KEY: &str = "some_random_secret";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Hosted chat API credential, if configured
    pub chat_api_key: Option<String>,
    /// Application secret key
    pub secret_key: String,
    /// Hosted chat API base URL
    pub chat_base_url: String,
    /// Hosted chat model identifier
    pub chat_model: String,
}

impl Config {
    /// Load configuration from the environment, reading `.env` if present
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            chat_api_key: std::env::var(CHAT_API_KEY_VAR).ok(),
            secret_key: std::env::var(SECRET_KEY_VAR).unwrap_or_else(|_| DEV_SECRET_KEY.to_string()),
            chat_base_url: std::env::var("ENTENDER_CHAT_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            chat_model: std::env::var("ENTENDER_CHAT_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        }
    }

    /// Build a chat client when a credential is configured
    #[must_use]
    pub fn chat_client(&self) -> Option<ChatClient> {
        self.chat_api_key.as_ref().map(|key| {
            ChatClient::new(
                self.chat_base_url.clone(),
                key.clone(),
                self.chat_model.clone(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_client_requires_credential() {
        let config = Config {
            chat_api_key: None,
            secret_key: DEV_SECRET_KEY.to_string(),
            chat_base_url: DEFAULT_BASE_URL.to_string(),
            chat_model: DEFAULT_MODEL.to_string(),
        };
        assert!(config.chat_client().is_none());
    }

    #[test]
    fn test_chat_client_built_with_credential() {
        let config = Config {
            chat_api_key: Some("key".to_string()),
            secret_key: DEV_SECRET_KEY.to_string(),
            chat_base_url: DEFAULT_BASE_URL.to_string(),
            chat_model: DEFAULT_MODEL.to_string(),
        };
        let client = config.chat_client().unwrap();
        assert_eq!(client.model(), DEFAULT_MODEL);
    }
}
