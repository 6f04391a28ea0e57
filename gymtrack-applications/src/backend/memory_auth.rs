//! In-process authentication provider
//!
//! Email/password accounts held in memory. Produces the same `auth/*` codes as
//! the hosted provider and pushes session changes to every subscriber.

use async_trait::async_trait;
use futures::channel::mpsc;
use futures::StreamExt;
use gymtrack_core::{
    AuthProvider, AuthStateEvent, AuthStateStream, AuthUser, ProviderError, EMAIL_PATTERN,
};
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use tracing::{debug, info};

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LENGTH: usize = 6;

struct Account {
    uid: String,
    email: String,
    password: String,
}

#[derive(Default)]
struct ProviderState {
    /// Keyed by lowercased email
    accounts: HashMap<String, Account>,
    current: Option<AuthUser>,
    subscribers: Vec<mpsc::UnboundedSender<AuthStateEvent>>,
}

impl ProviderState {
    fn publish(&mut self, event: AuthStateEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.unbounded_send(event.clone()).is_ok());
    }

    fn sign_in(&mut self, user: AuthUser) {
        self.current = Some(user.clone());
        self.publish(AuthStateEvent::Changed(Some(user)));
    }
}

/// In-memory auth provider
#[derive(Default)]
pub struct MemoryAuthProvider {
    state: Mutex<ProviderState>,
    fail_next: Mutex<Option<ProviderError>>,
}

fn provider_error(code: &str) -> ProviderError {
    ProviderError::new(code, format!("Error ({}).", code))
}

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX
        .get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
        .is_match(email)
}

impl MemoryAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ProviderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn take_failure(&self) -> Result<(), ProviderError> {
        let injected = self
            .fail_next
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match injected {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Make the next provider call fail with `code`
    pub fn fail_next(&self, code: &str) {
        *self.fail_next.lock().unwrap_or_else(PoisonError::into_inner) = Some(provider_error(code));
    }

    /// Push an error notification to every subscriber
    pub fn emit_error(&self, code: &str) {
        self.state().publish(AuthStateEvent::Error(provider_error(code)));
    }

    /// Drop the current session from the provider side (token revoked, account disabled)
    pub fn invalidate_session(&self) {
        let mut state = self.state();
        if state.current.take().is_some() {
            info!("Provider invalidated the current session");
            state.publish(AuthStateEvent::Changed(None));
        }
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.state().current.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        let mut state = self.state();
        state.subscribers.retain(|subscriber| !subscriber.is_closed());
        state.subscribers.len()
    }
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    async fn register_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, ProviderError> {
        self.take_failure()?;

        if !is_valid_email(email) {
            return Err(provider_error("auth/invalid-email"));
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(provider_error("auth/weak-password"));
        }

        let key = email.to_lowercase();
        let mut state = self.state();
        if state.accounts.contains_key(&key) {
            return Err(provider_error("auth/email-already-in-use"));
        }

        let account = Account {
            uid: uuid::Uuid::new_v4().simple().to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let user = AuthUser::new(account.uid.clone(), account.email.clone());
        state.accounts.insert(key, account);
        debug!(uid = %user.uid, "Registered account");

        state.sign_in(user.clone());
        Ok(user)
    }

    async fn login_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, ProviderError> {
        self.take_failure()?;

        if !is_valid_email(email) {
            return Err(provider_error("auth/invalid-email"));
        }

        let mut state = self.state();
        let user = match state.accounts.get(&email.to_lowercase()) {
            None => return Err(provider_error("auth/user-not-found")),
            Some(account) if account.password != password => {
                return Err(provider_error("auth/wrong-password"))
            }
            Some(account) => AuthUser::new(account.uid.clone(), account.email.clone()),
        };

        state.sign_in(user.clone());
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.take_failure()?;

        let mut state = self.state();
        state.current = None;
        state.publish(AuthStateEvent::Changed(None));
        Ok(())
    }

    fn subscribe(&self) -> AuthStateStream {
        let (sender, receiver) = mpsc::unbounded();
        let mut state = self.state();
        // New subscribers learn the current state first
        if sender
            .unbounded_send(AuthStateEvent::Changed(state.current.clone()))
            .is_ok()
        {
            state.subscribers.push(sender);
        }
        receiver.boxed()
    }
}
