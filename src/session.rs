//! # Session Store Module
//!
//! This module keeps the conversation session of every user in memory.
//! Each session sits behind its own lock so that updates from one user are
//! applied one at a time while different users proceed independently.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::SessionConfig;
use crate::dialogue::Session;

/// Telegram user id the session belongs to
pub type SessionId = u64;

/// Shared, lockable session. Hold the lock for the whole read-modify-write.
pub type SessionHandle = Arc<tokio::sync::Mutex<Session>>;

/// Repository of conversation sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Return the session for `id`, creating a fresh one at the main menu
    /// on first contact. Creation is atomic: concurrent callers for the same
    /// id receive the same handle.
    async fn get_or_create(&self, id: SessionId) -> SessionHandle;

    /// Snapshot of an existing session without creating one
    async fn get(&self, id: SessionId) -> Option<Session>;

    /// Number of live sessions
    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

struct Slot {
    session: SessionHandle,
    last_seen: Instant,
}

impl Slot {
    /// A handle is still held outside the store, e.g. by an update in flight
    fn in_use(&self) -> bool {
        Arc::strong_count(&self.session) > 1
    }
}

/// In-memory session store with idle expiry and a capacity bound
///
/// # Retention
///
/// - Sessions idle for longer than `SessionConfig::ttl` are dropped lazily,
///   whenever a new session is created or an expired one is accessed
/// - When `SessionConfig::capacity` is reached, the least recently used
///   session is evicted to make room
/// - A session whose handle is still held elsewhere is never dropped, so an
///   update in flight cannot write into a session the store has forgotten
///
/// # Thread Safety
///
/// The slot map is guarded by a `std::sync::Mutex` that is never held across
/// an `.await`. Session contents are guarded by per-session
/// `tokio::sync::Mutex`es handed out as [`SessionHandle`]s.
pub struct InMemorySessionStore {
    slots: Mutex<HashMap<SessionId, Slot>>,
    config: SessionConfig,
}

impl InMemorySessionStore {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Not idle for longer than the TTL, or still held by someone
    fn is_live(&self, slot: &Slot, now: Instant) -> bool {
        now.duration_since(slot.last_seen) < self.config.ttl || slot.in_use()
    }

    /// Evict the least recently used session nobody holds a handle to
    ///
    /// Returns `false` when every session is in use.
    fn evict_least_recently_used(slots: &mut HashMap<SessionId, Slot>) -> bool {
        let oldest = slots
            .iter()
            .filter(|(_, slot)| !slot.in_use())
            .min_by_key(|(_, slot)| slot.last_seen)
            .map(|(id, _)| *id);
        match oldest {
            Some(id) => {
                slots.remove(&id);
                debug!(user_id = id, "Evicted least recently used session");
                true
            }
            None => false,
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_or_create(&self, id: SessionId) -> SessionHandle {
        let now = Instant::now();
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(slot) = slots.get_mut(&id) {
            if self.is_live(slot, now) {
                slot.last_seen = now;
                return Arc::clone(&slot.session);
            }
            debug!(user_id = id, "Session expired, starting over");
            slots.remove(&id);
        }

        let before = slots.len();
        slots.retain(|_, slot| self.is_live(slot, now));
        if slots.len() < before {
            debug!(expired = before - slots.len(), "Pruned idle sessions");
        }

        while !slots.is_empty() && slots.len() >= self.config.capacity {
            if !Self::evict_least_recently_used(&mut slots) {
                warn!(sessions = slots.len(), "All sessions in use, exceeding capacity");
                break;
            }
        }

        let session: SessionHandle = Arc::default();
        slots.insert(
            id,
            Slot {
                session: Arc::clone(&session),
                last_seen: now,
            },
        );
        debug!(user_id = id, sessions = slots.len(), "Created session");

        session
    }

    async fn get(&self, id: SessionId) -> Option<Session> {
        let handle = {
            let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            let slot = slots.get(&id)?;
            if !self.is_live(slot, Instant::now()) {
                return None;
            }
            Arc::clone(&slot.session)
        };

        let session = handle.lock().await;
        Some(session.clone())
    }

    async fn len(&self) -> usize {
        let now = Instant::now();
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .values()
            .filter(|slot| self.is_live(slot, now))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::DialogueState;
    use std::time::Duration;

    fn store(ttl_secs: u64, capacity: usize) -> InMemorySessionStore {
        InMemorySessionStore::new(SessionConfig {
            ttl: Duration::from_secs(ttl_secs),
            capacity,
        })
    }

    #[tokio::test]
    async fn test_get_or_create_returns_same_session() {
        let store = InMemorySessionStore::default();

        let first = store.get_or_create(7).await;
        first.lock().await.state = DialogueState::InfoTopic;

        let second = store.get_or_create(7).await;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.lock().await.state, DialogueState::InfoTopic);
    }

    #[tokio::test]
    async fn test_get_does_not_create() {
        let store = InMemorySessionStore::default();
        assert!(store.get(1).await.is_none());
        assert!(store.is_empty().await);

        store.get_or_create(1).await;
        assert_eq!(store.get(1).await.map(|s| s.state), Some(DialogueState::Menu));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sessions_expire() {
        let store = store(60, 100);
        {
            let handle = store.get_or_create(1).await;
            handle.lock().await.state = DialogueState::OrderColor;
        }

        tokio::time::advance(Duration::from_secs(61)).await;

        assert!(store.get(1).await.is_none());
        let fresh = store.get_or_create(1).await;
        assert_eq!(fresh.lock().await.state, DialogueState::Menu);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_evicts_least_recently_used() {
        let store = store(3600, 2);
        store.get_or_create(1).await;
        tokio::time::advance(Duration::from_secs(1)).await;
        store.get_or_create(2).await;
        tokio::time::advance(Duration::from_secs(1)).await;
        // Touch 1 so that 2 becomes the oldest
        store.get_or_create(1).await;
        tokio::time::advance(Duration::from_secs(1)).await;

        store.get_or_create(3).await;

        assert_eq!(store.len().await, 2);
        assert!(store.get(1).await.is_some());
        assert!(store.get(2).await.is_none());
        assert!(store.get(3).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_held_session_survives_expiry() {
        let store = store(60, 100);
        let held = store.get_or_create(1).await;
        let mut session = held.lock().await;

        tokio::time::advance(Duration::from_secs(61)).await;
        store.get_or_create(2).await;

        // The update holding the lock still writes into the stored session
        session.state = DialogueState::OrderPayment;
        let again = store.get_or_create(1).await;
        assert!(Arc::ptr_eq(&held, &again));
        drop(session);
        assert_eq!(again.lock().await.state, DialogueState::OrderPayment);
    }

    #[tokio::test]
    async fn test_capacity_skips_sessions_in_use() {
        let store = store(3600, 1);
        let held = store.get_or_create(1).await;
        let guard = held.lock().await;

        store.get_or_create(2).await;

        assert_eq!(store.len().await, 2);
        drop(guard);
        drop(held);

        // Nothing is held any more, so the oldest session goes
        store.get_or_create(3).await;
        assert_eq!(store.len().await, 1);
        assert!(store.get(3).await.is_some());
    }

    #[tokio::test]
    async fn test_same_key_updates_are_not_lost() {
        let store = Arc::new(InMemorySessionStore::default());

        let tasks: Vec<_> = (0..50)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let handle = store.get_or_create(42).await;
                    let mut session = handle.lock().await;
                    let mut options = session.draft.options.clone();
                    tokio::task::yield_now().await;
                    options.insert(i.to_string());
                    session.draft.options = options;
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap();
        }

        let session = store.get(42).await.unwrap();
        assert_eq!(session.draft.options.len(), 50);
    }
}
