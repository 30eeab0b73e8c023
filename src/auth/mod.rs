//! Auth Module
//!
//! Token caching and refresh coordination: an in-memory token cache with
//! lazy fill from durable storage, and a single-flight coordinator that
//! collapses concurrent refresh attempts into one network call.

mod refresh;
mod single_flight;
mod token_cache;

pub use refresh::{TokenRefreshCoordinator, TokenRefresher};
pub use single_flight::SingleFlight;
pub use token_cache::{InvalidationHandle, TokenCache, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
