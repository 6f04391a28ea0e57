//! Session Manager - mirrors the auth provider's session
//!
//! The manager never decides who is signed in. It subscribes to the provider's
//! change stream, copies each pushed identity into its snapshot and then
//! republishes it as a [`SessionEvent`]. Register, login and logout only report
//! whether the provider call itself succeeded.

use super::messages::message_for_code;
use super::{AuthResult, SessionEvent, SessionSnapshot};
use futures::StreamExt;
use gymtrack_core::{AuthProvider, AuthStateEvent, AuthUser, GymTrackError, ProviderError};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{broadcast, watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Session state container backed by an [`AuthProvider`]
pub struct SessionManager {
    provider: Arc<dyn AuthProvider>,
    state: Arc<RwLock<SessionSnapshot>>,
    events: broadcast::Sender<SessionEvent>,
    /// Raised once the first callback arrives or the listener stops
    ready: Arc<watch::Sender<bool>>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl SessionManager {
    /// Create a manager without subscribing to the provider yet
    pub fn new(provider: Arc<dyn AuthProvider>, event_buffer: usize) -> Self {
        let (events, _) = broadcast::channel(event_buffer.max(1));
        let (ready, _) = watch::channel(false);
        Self {
            provider,
            state: Arc::new(RwLock::new(SessionSnapshot::default())),
            events,
            ready: Arc::new(ready),
            listener: Mutex::new(None),
        }
    }

    /// Create a manager and start listening. Must be called inside a tokio runtime.
    pub fn start(provider: Arc<dyn AuthProvider>, event_buffer: usize) -> Arc<Self> {
        let manager = Arc::new(Self::new(provider, event_buffer));
        manager.start_listener();
        manager
    }

    /// Subscribe to the provider's change stream. Calling it again while the
    /// listener is running does nothing.
    pub fn start_listener(&self) {
        let mut listener = self.listener.lock().unwrap_or_else(PoisonError::into_inner);
        if listener.as_ref().is_some_and(|handle| !handle.is_finished()) {
            debug!("Session listener already running");
            return;
        }

        info!("Setting up auth state listener");
        let mut stream = self.provider.subscribe();
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let ready = Arc::clone(&self.ready);

        *listener = Some(tokio::spawn(async move {
            while let Some(event) = stream.next().await {
                match event {
                    AuthStateEvent::Changed(user) => {
                        info!(
                            email = user.as_ref().and_then(|u| u.email.as_deref()).unwrap_or("none"),
                            "Auth state changed"
                        );
                        {
                            let mut state = state.write().await;
                            state.user = user.clone();
                            state.loading = false;
                        }
                        ready.send_replace(true);
                        // Receivers may all be gone; the snapshot is already updated
                        let _ = events.send(SessionEvent::from_user(user));
                    }
                    AuthStateEvent::Error(err) => {
                        warn!(code = %err.code, error = %err.message, "Auth state error");
                        state.write().await.loading = false;
                        ready.send_replace(true);
                        let _ = events.send(SessionEvent::ListenerError(err.message));
                    }
                }
            }

            debug!("Auth state stream ended");
            state.write().await.loading = false;
            ready.send_replace(true);
        }));
    }

    /// Tear down the provider subscription
    pub fn shutdown(&self) {
        let handle = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
            info!("Session listener stopped");
        }
        self.ready.send_replace(true);
    }

    pub fn is_listening(&self) -> bool {
        self.listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Receive every session change published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.read().await.clone()
    }

    pub async fn current_user(&self) -> Option<AuthUser> {
        self.state.read().await.user.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    pub async fn set_error(&self, error: Option<String>) {
        self.state.write().await.error = error;
    }

    /// Wait for the provider's first callback. Returns at once when no
    /// listener is running, since nothing would end the wait.
    pub async fn wait_until_ready(&self) {
        let mut ready = self.ready.subscribe();
        if !self.is_loading().await || !self.is_listening() {
            return;
        }
        // The sender lives as long as `self`
        let _ = ready.wait_for(|ready| *ready).await;
    }

    pub async fn register(&self, email: &str, password: &str) -> AuthResult {
        debug!(email = email, "Registering user");
        self.call_provider(
            "register",
            true,
            self.provider.register_with_password(email, password),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> AuthResult {
        debug!(email = email, "Logging in user");
        self.call_provider(
            "login",
            true,
            self.provider.login_with_password(email, password),
        )
        .await
    }

    pub async fn logout(&self) -> AuthResult {
        debug!("Logging out");
        self.call_provider("logout", false, self.provider.sign_out())
            .await
    }

    /// Run a provider call, translating its failure into a user-facing message.
    /// Local user state is left to the listener.
    async fn call_provider<F, T>(&self, operation: &str, authenticating: bool, call: F) -> AuthResult
    where
        F: Future<Output = Result<T, ProviderError>>,
    {
        {
            let mut state = self.state.write().await;
            state.error = None;
            state.authenticating = authenticating;
        }

        let outcome = call.await;

        let mut state = self.state.write().await;
        state.authenticating = false;
        match outcome {
            Ok(_) => {
                info!(operation = operation, "Auth call succeeded");
                AuthResult::ok()
            }
            Err(err) => {
                let message = message_for_code(&err.code);
                let error = GymTrackError::from(err);
                error.log();
                if let Some(delay_ms) = error.retry_delay_ms() {
                    debug!(operation = operation, retry_after_ms = delay_ms, "Auth failure is transient");
                }
                state.error = Some(message.to_string());
                AuthResult::failed(message)
            }
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        if let Some(handle) = self
            .listener
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}
