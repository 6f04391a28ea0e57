//! Backend wiring
//!
//! The auth provider and document store are process-wide resources. They are
//! created once through [`Backend::acquire_or_reuse`]; later callers get the
//! instance that already exists instead of an initialization error.

pub mod memory_auth;
pub mod memory_store;

pub use memory_auth::MemoryAuthProvider;
pub use memory_store::MemoryDocumentStore;

use gymtrack_core::{AuthProvider, DocumentStore};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

static SHARED_BACKEND: OnceLock<Backend> = OnceLock::new();

/// Handles to the remote collaborators
#[derive(Clone)]
pub struct Backend {
    pub auth: Arc<dyn AuthProvider>,
    pub store: Arc<dyn DocumentStore>,
}

impl Backend {
    pub fn new(auth: Arc<dyn AuthProvider>, store: Arc<dyn DocumentStore>) -> Self {
        Self { auth, store }
    }

    /// Fresh in-process backend, not registered as the shared instance
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryAuthProvider::new()),
            Arc::new(MemoryDocumentStore::new()),
        )
    }

    /// Initialize the shared backend with `init`, or return the existing one.
    ///
    /// `init` runs at most once per process.
    pub fn acquire_or_reuse<F>(init: F) -> &'static Backend
    where
        F: FnOnce() -> Backend,
    {
        let mut created = false;
        let backend = SHARED_BACKEND.get_or_init(|| {
            created = true;
            init()
        });

        if created {
            info!("Shared backend initialized");
        } else {
            debug!("Shared backend already initialized, reusing it");
        }
        backend
    }

    /// Shared backend, defaulting to the in-process implementation
    pub fn shared() -> &'static Backend {
        Self::acquire_or_reuse(Self::in_memory)
    }

    pub fn is_initialized() -> bool {
        SHARED_BACKEND.get().is_some()
    }
}
