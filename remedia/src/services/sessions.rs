use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;
use nanoid::nanoid;
use tokio::sync::Mutex as AsyncMutex;

use crate::error::{RemediaError, Result};
use crate::models::ConversationState;
use crate::services::session::Session;

pub type SessionHandle = Arc<AsyncMutex<Session>>;

/// Bounded registry of live sessions, evicting the least recently used.
///
/// Each session sits behind its own async mutex, so requests on one session
/// run one at a time while other sessions proceed independently.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<LruCache<String, SessionHandle>>>,
}

impl SessionRegistry {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            sessions: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, LruCache<String, SessionHandle>>> {
        self.sessions
            .lock()
            .map_err(|e| RemediaError::Internal(format!("Session registry lock poisoned: {e}")))
    }

    pub fn create(&self, conversation: ConversationState) -> Result<(String, SessionHandle)> {
        let id = nanoid!();
        let handle = Arc::new(AsyncMutex::new(Session::new(id.clone(), conversation)));

        let mut sessions = self.lock()?;
        if let Some((evicted, _)) = sessions.push(id.clone(), Arc::clone(&handle)) {
            if evicted != id {
                tracing::info!(session_id = %evicted, "Session evicted from registry");
            }
        }

        tracing::debug!(session_id = %id, sessions = sessions.len(), "Session created");
        Ok((id, handle))
    }

    pub fn get(&self, id: &str) -> Result<SessionHandle> {
        self.lock()?
            .get(id)
            .cloned()
            .ok_or_else(|| RemediaError::NotFound(format!("Session {id} not found")))
    }

    pub fn remove(&self, id: &str) -> Result<bool> {
        let removed = self.lock()?.pop(id).is_some();
        if removed {
            tracing::debug!(session_id = %id, "Session removed");
        }
        Ok(removed)
    }

    pub fn len(&self) -> usize {
        self.lock().map(|sessions| sessions.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
