//! Udhaar lending backends.
//!
//! [`LendingBackend`] is the platform API as the client sees it. Two
//! implementations share it:
//!
//! - [`HttpBackend`] talks to the REST server with the stored bearer token,
//! - [`FixtureBackend`] answers from an in-memory demo dataset.
//!
//! [`connect`] picks one from a [`ClientConfig`] once, at startup.

pub mod api;
pub mod backend;
pub mod config;
pub mod envelope;
pub mod error;
pub mod fixture;
pub mod fixture_data;
pub mod http;

pub use backend::{AckResult, ApiResult, BackendKind, LendingBackend};
pub use config::{BackendMode, ClientConfig};
pub use envelope::{Ack, Envelope};
pub use error::ClientError;
pub use fixture::{demo_login, demo_registration, FixtureBackend, Latency};
pub use fixture_data::{demo_user, is_demo_account, FixtureData};
pub use http::{HttpBackend, BACKEND_OFFLINE};

use std::sync::Arc;
use udhaar_storage::{is_demo_session, ClientStorage};
use udhaar_types::Clock;

/// Build the backend the configuration asks for.
///
/// In [`BackendMode::Auto`] a stored demo session selects the fixture and
/// anything else selects the REST server.
pub fn connect(
    config: &ClientConfig,
    storage: Arc<dyn ClientStorage>,
    clock: Arc<dyn Clock>,
) -> Result<Arc<dyn LendingBackend>, ClientError> {
    let demo = match config.mode {
        BackendMode::Demo => true,
        BackendMode::Live => false,
        BackendMode::Auto => is_demo_session(storage.as_ref())?,
    };
    let backend: Arc<dyn LendingBackend> = if demo {
        Arc::new(
            FixtureBackend::new(storage, clock)
                .with_latency(config.demo_latency())
                .with_policy(config.loan_policy.clone()),
        )
    } else {
        Arc::new(HttpBackend::with_timeout(
            config.api_url.clone(),
            storage,
            config.request_timeout(),
        ))
    };
    tracing::debug!(kind = %backend.kind(), mode = %config.mode, "backend selected");
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use udhaar_nullables::{NullClock, NullStorage};
    use udhaar_storage::{TOKEN_KEY, DEMO_TOKEN};

    fn clock() -> Arc<dyn Clock> {
        Arc::new(NullClock::new(1_750_000_000))
    }

    #[test]
    fn auto_mode_follows_stored_token() {
        let config = ClientConfig::default();

        let fresh = connect(&config, Arc::new(NullStorage::new()), clock()).unwrap();
        assert_eq!(fresh.kind(), BackendKind::Live);

        let demo = Arc::new(NullStorage::new().with(TOKEN_KEY, DEMO_TOKEN));
        let backend = connect(&config, demo, clock()).unwrap();
        assert_eq!(backend.kind(), BackendKind::Demo);
    }

    #[test]
    fn explicit_mode_wins() {
        let demo = Arc::new(NullStorage::new().with(TOKEN_KEY, DEMO_TOKEN));
        let config = ClientConfig {
            mode: BackendMode::Live,
            ..ClientConfig::default()
        };
        assert_eq!(connect(&config, demo, clock()).unwrap().kind(), BackendKind::Live);

        let config = ClientConfig {
            mode: BackendMode::Demo,
            ..ClientConfig::default()
        };
        let backend = connect(&config, Arc::new(NullStorage::new()), clock()).unwrap();
        assert_eq!(backend.kind(), BackendKind::Demo);
    }
}
