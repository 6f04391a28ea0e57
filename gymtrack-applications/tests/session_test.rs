//! Session manager behavior against the in-process auth provider

use async_trait::async_trait;
use futures::StreamExt;
use gymtrack_applications::{AuthResult, MemoryAuthProvider, SessionEvent, SessionManager};
use gymtrack_core::{AuthProvider, AuthStateEvent, AuthStateStream, AuthUser, ProviderError, SessionStatus};
use std::sync::Arc;
use std::time::Duration;

macro_rules! wait_until {
    ($cond:expr) => {{
        let mut reached = false;
        for _ in 0..200 {
            if $cond {
                reached = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(reached, "condition not reached: {}", stringify!($cond));
    }};
}

fn started() -> (Arc<MemoryAuthProvider>, Arc<SessionManager>) {
    let provider = Arc::new(MemoryAuthProvider::new());
    let session = SessionManager::start(provider.clone(), 16);
    (provider, session)
}

#[tokio::test]
async fn test_first_callback_ends_loading() {
    let (_provider, session) = started();
    session.wait_until_ready().await;

    let snapshot = session.snapshot().await;
    assert!(!snapshot.loading);
    assert_eq!(snapshot.user, None);
    assert_eq!(snapshot.status(), SessionStatus::Unauthenticated);
}

#[tokio::test]
async fn test_register_user_arrives_through_listener() {
    let (_provider, session) = started();
    session.wait_until_ready().await;
    let mut events = session.subscribe();

    let result = session.register("lifter@example.com", "secret1").await;
    assert_eq!(result, AuthResult::ok());

    match events.recv().await.unwrap() {
        SessionEvent::SignedIn(user) => {
            assert_eq!(user.email.as_deref(), Some("lifter@example.com"));
            // The snapshot is updated before the event goes out
            assert_eq!(session.current_user().await, Some(user));
        }
        other => panic!("unexpected event: {:?}", other),
    }
    assert_eq!(session.snapshot().await.status(), SessionStatus::Authenticated);
}

#[tokio::test]
async fn test_wrong_password_keeps_user_unchanged() {
    let (provider, session) = started();
    session.register("lifter@example.com", "secret1").await;
    wait_until!(session.is_authenticated().await);
    let signed_in = session.current_user().await;

    provider.fail_next("auth/wrong-password");
    let result = session.login("lifter@example.com", "nope").await;

    assert_eq!(result, AuthResult::failed("Incorrect password"));
    assert_eq!(session.error().await.as_deref(), Some("Incorrect password"));
    assert_eq!(session.current_user().await, signed_in);
}

#[tokio::test]
async fn test_login_error_messages() {
    let (_provider, session) = started();
    session.wait_until_ready().await;

    let result = session.login("ghost@example.com", "secret1").await;
    assert_eq!(result.error.as_deref(), Some("No account found with this email"));

    let result = session.register("bad-email", "secret1").await;
    assert_eq!(result.error.as_deref(), Some("Invalid email address"));

    let result = session.register("lifter@example.com", "123").await;
    assert_eq!(
        result.error.as_deref(),
        Some("Password should be at least 6 characters")
    );
    assert!(!session.is_authenticated().await);
}

#[tokio::test]
async fn test_successful_call_clears_previous_error() {
    let (_provider, session) = started();
    session.login("ghost@example.com", "secret1").await;
    assert!(session.error().await.is_some());

    session.register("ghost@example.com", "secret1").await;
    assert_eq!(session.error().await, None);
}

#[tokio::test]
async fn test_logout_and_provider_invalidation() {
    let (provider, session) = started();
    session.register("lifter@example.com", "secret1").await;
    wait_until!(session.is_authenticated().await);

    assert_eq!(session.logout().await, AuthResult::ok());
    wait_until!(!session.is_authenticated().await);

    session.login("lifter@example.com", "secret1").await;
    wait_until!(session.is_authenticated().await);

    provider.invalidate_session();
    wait_until!(!session.is_authenticated().await);
}

#[tokio::test]
async fn test_failed_logout_reports_network_error() {
    let (provider, session) = started();
    session.register("lifter@example.com", "secret1").await;
    wait_until!(session.is_authenticated().await);

    provider.fail_next("auth/network-request-failed");
    let result = session.logout().await;
    assert_eq!(
        result.error.as_deref(),
        Some("Network error. Please check your connection")
    );
    assert!(session.is_authenticated().await);
}

#[tokio::test]
async fn test_shutdown_releases_provider_subscription() {
    let (provider, session) = started();
    session.wait_until_ready().await;
    assert!(session.is_listening());
    assert_eq!(provider.subscriber_count(), 1);

    session.shutdown();
    assert!(!session.is_listening());
    wait_until!(provider.subscriber_count() == 0);
}

/// Provider whose change stream only ever reports an error
struct BrokenStreamProvider;

#[async_trait]
impl AuthProvider for BrokenStreamProvider {
    async fn register_with_password(&self, _email: &str, _password: &str) -> Result<AuthUser, ProviderError> {
        Err(ProviderError::new("auth/internal-error", "internal"))
    }

    async fn login_with_password(&self, _email: &str, _password: &str) -> Result<AuthUser, ProviderError> {
        Err(ProviderError::new("auth/internal-error", "internal"))
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    fn subscribe(&self) -> AuthStateStream {
        futures::stream::iter(vec![AuthStateEvent::Error(ProviderError::new(
            "auth/network-request-failed",
            "listener failed",
        ))])
        .chain(futures::stream::pending())
        .boxed()
    }
}

#[tokio::test]
async fn test_listener_error_only_stops_loading() {
    let session = SessionManager::start(Arc::new(BrokenStreamProvider), 16);
    session.wait_until_ready().await;

    let snapshot = session.snapshot().await;
    assert!(!snapshot.loading);
    assert_eq!(snapshot.user, None);
    assert!(session.is_listening());

    let result = session.login("a@b.co", "secret1").await;
    assert_eq!(result.error.as_deref(), Some("An error occurred. Please try again"));
}

#[tokio::test]
async fn test_provider_error_event_keeps_session() {
    let (provider, session) = started();
    session.register("lifter@example.com", "secret1").await;
    wait_until!(session.is_authenticated().await);
    let mut events = session.subscribe();

    provider.emit_error("auth/network-request-failed");
    assert!(matches!(
        events.recv().await.unwrap(),
        SessionEvent::ListenerError(_)
    ));
    assert!(session.is_authenticated().await);

    session.set_error(Some("stale".to_string())).await;
    session.set_error(None).await;
    assert_eq!(session.error().await, None);
}

struct SilentStreamProvider;

#[async_trait]
impl AuthProvider for SilentStreamProvider {
    async fn register_with_password(&self, _email: &str, _password: &str) -> Result<AuthUser, ProviderError> {
        Err(ProviderError::new("auth/internal-error", "internal"))
    }

    async fn login_with_password(&self, _email: &str, _password: &str) -> Result<AuthUser, ProviderError> {
        Err(ProviderError::new("auth/internal-error", "internal"))
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    /// Ends after a short delay without reporting any state
    fn subscribe(&self) -> AuthStateStream {
        futures::stream::once(tokio::time::sleep(Duration::from_millis(50)))
            .filter_map(|_| async { None::<AuthStateEvent> })
            .boxed()
    }
}

#[tokio::test]
async fn test_ready_after_stream_ends_without_events() {
    let session = SessionManager::start(Arc::new(SilentStreamProvider), 16);

    tokio::time::timeout(Duration::from_secs(2), session.wait_until_ready())
        .await
        .expect("wait_until_ready should return once the stream ends");
    assert!(!session.is_loading().await);
    assert_eq!(session.current_user().await, None);
}

#[tokio::test]
async fn test_ready_when_listener_never_started() {
    let session = SessionManager::new(Arc::new(SilentStreamProvider), 16);

    tokio::time::timeout(Duration::from_secs(2), session.wait_until_ready())
        .await
        .expect("wait_until_ready should not wait without a listener");
}

#[tokio::test]
async fn test_ready_after_shutdown_before_first_callback() {
    let provider = Arc::new(MemoryAuthProvider::new());
    let session = Arc::new(SessionManager::new(provider, 16));
    session.start_listener();

    let waiter = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.wait_until_ready().await }
    });
    session.shutdown();

    tokio::time::timeout(Duration::from_secs(2), waiter)
        .await
        .expect("wait_until_ready should return after shutdown")
        .unwrap();
}

#[tokio::test]
async fn test_provider_accepts_any_email_matching_shared_pattern() {
    let (_provider, session) = started();
    session.wait_until_ready().await;
    let pattern = regex::Regex::new(gymtrack_core::EMAIL_PATTERN).unwrap();

    for email in ["a@.b.c", "lifter+1@gym.example.com"] {
        assert!(pattern.is_match(email));
        assert_eq!(session.register(email, "secret1").await, AuthResult::ok());
    }
    let result = session.register("lifter@example", "secret1").await;
    assert!(!pattern.is_match("lifter@example"));
    assert_eq!(result.error.as_deref(), Some("Invalid email address"));
}
