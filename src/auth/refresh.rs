//! Token Refresh Coordinator
//!
//! Guarantees that when N concurrent requests discover an expired access
//! token simultaneously, exactly one network refresh call is issued and all
//! N callers resolve with its result (or all reject with its error).
//!
//! No retry or backoff lives here; retry policy (e.g. forced logout after
//! repeated failures) belongs to the caller.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::auth::SingleFlight;
use crate::error::Result;
use crate::models::TokenPair;

// == Token Refresher Trait ==
/// The underlying refresh call (external collaborator making the actual
/// network request).
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Exchanges the current refresh token for a fresh token pair.
    async fn refresh(&self) -> Result<TokenPair>;
}

// == Token Refresh Coordinator ==
/// Single-flight wrapper around a [`TokenRefresher`].
pub struct TokenRefreshCoordinator {
    refresher: Arc<dyn TokenRefresher>,
    flight: SingleFlight<TokenPair>,
}

impl TokenRefreshCoordinator {
    // == Constructor ==
    /// Creates a coordinator over the given refresher.
    pub fn new(refresher: Arc<dyn TokenRefresher>) -> Self {
        Self {
            refresher,
            flight: SingleFlight::new(),
        }
    }

    // == Refresh Access Token ==
    /// Performs one refresh, or joins the refresh already in flight.
    /// Every coalesced caller receives the identical result.
    pub async fn refresh_access_token(&self) -> Result<TokenPair> {
        let refresher = Arc::clone(&self.refresher);
        let result = self
            .flight
            .run(move || async move {
                debug!("starting token refresh");
                refresher.refresh().await
            })
            .await;

        match &result {
            Ok(_) => debug!("token refresh settled successfully"),
            Err(err) => warn!(error = %err, "token refresh failed"),
        }
        result
    }

    // == Reset Refresh State ==
    /// Forcibly clears the in-flight refresh without waiting for settlement.
    /// Test/debug hook, not part of normal operation.
    pub async fn reset_refresh_state(&self) {
        self.flight.reset().await;
    }

    // == Is Refreshing ==
    /// True while a refresh is recorded as in flight.
    pub async fn is_refreshing(&self) -> bool {
        self.flight.is_inflight().await
    }
}
