use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::auth::SessionManager;

/// Everything a request handler may touch, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionManager,
    /// Key the payment provider sends with its webhooks
    pub polka_key: String,
    pub request_count: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(sessions: SessionManager, polka_key: impl Into<String>) -> Self {
        Self {
            sessions,
            polka_key: polka_key.into(),
            request_count: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn requests_served(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    pub fn reset_requests(&self) {
        self.request_count.store(0, Ordering::Relaxed);
    }
}
