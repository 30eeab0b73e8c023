//! Auth Token Models

use serde::{Deserialize, Serialize};

// == Token Pair ==
/// The current access/refresh token pair.
///
/// Both fields populated means authenticated; access absent with refresh
/// present means mid-refresh; both absent means logged out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl TokenPair {
    /// Creates a fully populated pair.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
        }
    }

    /// True when an access token is available for outgoing requests.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// True when both tokens are absent.
    pub fn is_logged_out(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}
