//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the per-wizard editing sessions.

use crate::config::Config;
use chrono::{DateTime, Duration, Utc};
use course_wizard_core::ports::CoursePublisher;
use course_wizard_core::wizard::CourseWizard;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub publisher: Arc<dyn CoursePublisher>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(config: Arc<Config>, publisher: Arc<dyn CoursePublisher>) -> Self {
        Self {
            config,
            publisher,
            sessions: Arc::new(SessionStore::default()),
        }
    }
}

//=========================================================================================
// WizardSession (Specific to One Authoring Session)
//=========================================================================================

/// One in-memory course authoring session.
pub struct WizardSession {
    pub id: Uuid,
    pub wizard: CourseWizard,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
}

impl WizardSession {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            wizard: CourseWizard::new(),
            created_at: now,
            last_accessed_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.last_accessed_at = Utc::now();
    }
}

pub type SharedSession = Arc<Mutex<WizardSession>>;

//=========================================================================================
// SessionStore
//=========================================================================================

/// Registry of live wizard sessions keyed by id.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SharedSession>>,
}

impl SessionStore {
    /// Starts a new empty wizard session.
    pub async fn create(&self) -> (Uuid, SharedSession) {
        let session = WizardSession::new();
        let id = session.id;
        let shared = Arc::new(Mutex::new(session));
        self.sessions.write().await.insert(id, shared.clone());
        (id, shared)
    }

    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Discards a session. Returns whether it existed.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops sessions idle for longer than `ttl`, skipping any that are busy or
    /// have a publish in flight. Returns how many were dropped.
    pub async fn prune_idle(&self, ttl: Duration) -> usize {
        let cutoff = Utc::now() - ttl;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| match session.try_lock() {
            Ok(s) => s.last_accessed_at > cutoff || s.wizard.is_publishing(),
            Err(_) => true,
        });
        let pruned = before - sessions.len();
        if pruned > 0 {
            info!("Pruned {} idle wizard sessions", pruned);
        }
        pruned
    }
}
