use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Tokens returned by `/token/`, passed explicitly to whatever talks to the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
    pub username: String,
}

impl Session {
    pub fn new(access: String, refresh: Option<String>) -> Self {
        let username = username_from_token(&access);
        Self {
            access,
            refresh,
            username,
        }
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access)
    }

    pub fn with_access(&self, access: String) -> Self {
        Self::new(access, self.refresh.clone())
    }
}

/// Reads the `username` claim without verifying the signature; the API does that.
pub fn username_from_token(token: &str) -> String {
    let Some(payload) = token.split('.').nth(1) else {
        return "User".to_string();
    };

    let claims = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()
        .and_then(|bytes| serde_json::from_slice::<serde_json::Value>(&bytes).ok());

    match claims {
        Some(claims) => claims
            .get("username")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("admin")
            .to_string(),
        None => "User".to_string(),
    }
}
