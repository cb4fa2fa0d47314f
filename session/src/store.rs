//! The single owner of auth state.

use crate::SessionError;
use std::sync::Arc;
use tokio::sync::watch;
use udhaar_access::AuthSnapshot;
use udhaar_client::api::{AuthPayload, LoginRequest, RegisterRequest};
use udhaar_client::{demo_login, demo_registration, ClientError, LendingBackend};
use udhaar_storage::{clear_session, load_session, save_session, save_user, ClientStorage};
use udhaar_types::{Clock, Role, User};

/// Holds who is signed in and publishes every change.
///
/// Starts in the loading state until [`SessionStore::hydrate`] has looked at
/// durable storage. Readers either take a [`snapshot`](Self::snapshot) or
/// [`subscribe`](Self::subscribe) to be woken on change. Storage is written
/// before each snapshot is published, so a subscriber never sees a state
/// that would be lost on restart.
pub struct SessionStore {
    backend: Arc<dyn LendingBackend>,
    storage: Arc<dyn ClientStorage>,
    clock: Arc<dyn Clock>,
    tx: watch::Sender<AuthSnapshot>,
}

impl SessionStore {
    pub fn new(
        backend: Arc<dyn LendingBackend>,
        storage: Arc<dyn ClientStorage>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (tx, _) = watch::channel(AuthSnapshot::loading());
        Self {
            backend,
            storage,
            clock,
            tx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        self.tx.borrow().clone()
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<User> {
        self.tx.borrow().user.clone()
    }

    pub fn backend(&self) -> &Arc<dyn LendingBackend> {
        &self.backend
    }

    fn publish(&self, snapshot: AuthSnapshot) {
        tracing::debug!(
            authenticated = snapshot.authenticated,
            role = ?snapshot.role(),
            "session changed"
        );
        self.tx.send_replace(snapshot);
    }

    fn sign_in(&self, payload: AuthPayload) -> Result<User, SessionError> {
        save_session(self.storage.as_ref(), &payload.token, &payload.user)?;
        self.publish(AuthSnapshot::signed_in(payload.user.clone()));
        Ok(payload.user)
    }

    /// Restore the session at startup.
    ///
    /// With a stored token the profile is re-fetched. A rejected token clears
    /// storage; an unreachable server falls back to the stored user.
    pub async fn hydrate(&self) -> Result<AuthSnapshot, SessionError> {
        let stored = load_session(self.storage.as_ref())?;
        if stored.token.is_none() {
            self.publish(AuthSnapshot::anonymous());
            return Ok(self.snapshot());
        }

        let snapshot = match self.backend.profile().await {
            Ok(envelope) if envelope.success => {
                let user = envelope.data.or(stored.user);
                if let Some(user) = &user {
                    save_user(self.storage.as_ref(), user)?;
                }
                AuthSnapshot {
                    loading: false,
                    authenticated: true,
                    user,
                }
            }
            Err(e) if e.is_network() => {
                tracing::warn!("profile unavailable, using stored user: {e}");
                AuthSnapshot {
                    loading: false,
                    authenticated: true,
                    user: stored.user,
                }
            }
            Ok(envelope) => {
                tracing::warn!(message = ?envelope.message, "profile refused, signing out");
                clear_session(self.storage.as_ref())?;
                AuthSnapshot::anonymous()
            }
            Err(e) => {
                tracing::warn!("profile failed, signing out: {e}");
                clear_session(self.storage.as_ref())?;
                AuthSnapshot::anonymous()
            }
        };
        self.publish(snapshot);
        Ok(self.snapshot())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, SessionError> {
        let payload = self
            .backend
            .login(LoginRequest {
                email: email.trim().to_string(),
                password: password.to_string(),
            })
            .await?
            .into_data()?;
        self.sign_in(payload)
    }

    /// Register a new account.
    ///
    /// When the server cannot be reached the account is created locally as a
    /// demo session so the platform can still be explored.
    pub async fn register(&self, request: RegisterRequest) -> Result<User, SessionError> {
        let payload = match self.backend.register(request.clone()).await {
            Ok(envelope) => envelope.into_data()?,
            Err(e) if e.is_network() => {
                tracing::warn!("backend unreachable, registering in demo mode: {e}");
                demo_registration(&request, self.clock.now())
            }
            Err(e) => return Err(e.into()),
        };
        self.sign_in(payload)
    }

    /// Sign in as one of the seeded demo accounts.
    ///
    /// The stored demo token selects the fixture backend the next time the
    /// client connects.
    pub fn login_demo(&self, role: Role) -> Result<User, SessionError> {
        self.sign_in(demo_login(role))
    }

    pub fn logout(&self) -> Result<(), SessionError> {
        clear_session(self.storage.as_ref())?;
        self.publish(AuthSnapshot::anonymous());
        Ok(())
    }

    /// Replace the signed-in user with a locally updated copy.
    pub fn update_user(&self, user: User) -> Result<(), SessionError> {
        if !self.tx.borrow().authenticated {
            return Err(SessionError::NotSignedIn);
        }
        save_user(self.storage.as_ref(), &user)?;
        self.publish(AuthSnapshot::signed_in(user));
        Ok(())
    }

    /// Re-fetch the profile and store it.
    pub async fn refresh_user(&self) -> Result<User, SessionError> {
        let result = self.backend.profile().await;
        let user = self.reconcile(result)?.into_data()?;
        self.update_user(user.clone())?;
        Ok(user)
    }

    /// Pass a backend result through, signing out locally if it says the
    /// token expired.
    ///
    /// The HTTP backend has already cleared storage by then; this only
    /// brings the published state in line.
    pub fn reconcile<T>(&self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        if let Err(ClientError::AuthExpired) = &result {
            if self.tx.borrow().authenticated {
                tracing::warn!("session expired");
                self.publish(AuthSnapshot::anonymous());
            }
        }
        result
    }
}
