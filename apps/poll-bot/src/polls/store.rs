use dashmap::DashMap;
use serenity::all::{ChannelId, MessageId, UserId};
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use super::{PollRecord, EDIT_TTL};

struct Stamped<V> {
    value: V,
    created_at: Instant,
}

impl<V> Stamped<V> {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.created_at) > ttl
    }
}

/// A concurrent map whose entries disappear `ttl` after they were last written.
///
/// Expiry is enforced on read, so an entry older than `ttl` is never
/// returned even if [`ExpiringMap::sweep`] has not run yet. Sweeping only
/// reclaims memory.
pub struct ExpiringMap<K, V> {
    entries: DashMap<K, Stamped<V>>,
    ttl: Duration,
}

impl<K, V> ExpiringMap<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Insert or replace the value under `key`, restarting its lifetime.
    pub fn put(&self, key: K, value: V) {
        self.put_at(key, value, Instant::now());
    }

    pub fn put_at(&self, key: K, value: V, now: Instant) {
        self.entries.insert(
            key,
            Stamped {
                value,
                created_at: now,
            },
        );
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    pub fn get_at(&self, key: &K, now: Instant) -> Option<V> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired(now, self.ttl))
            .map(|entry| entry.value.clone())
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|(_, entry)| entry.value)
    }

    /// Drop every entry older than the TTL at `now`. Returns how many were dropped.
    pub fn sweep(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now, self.ttl));
        before.saturating_sub(self.entries.len())
    }

    /// Number of stored entries, expired ones included until the next sweep.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An edit form the user has opened but not yet submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditSession {
    pub message_id: MessageId,
    pub channel_id: ChannelId,
}

/// In-memory state for polls that can still be edited.
///
/// Records are keyed by the poll message. Edit sessions are keyed by user,
/// so each user has at most one edit in flight: opening a second form
/// replaces the first.
pub struct PollStore {
    records: ExpiringMap<MessageId, PollRecord>,
    sessions: ExpiringMap<UserId, EditSession>,
}

impl PollStore {
    pub fn new() -> Self {
        Self::with_ttl(EDIT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            records: ExpiringMap::new(ttl),
            sessions: ExpiringMap::new(ttl),
        }
    }

    pub fn records(&self) -> &ExpiringMap<MessageId, PollRecord> {
        &self.records
    }

    /// Store `record` under its message, replacing any previous version.
    pub fn put(&self, record: PollRecord) {
        self.records.put(record.message_id, record);
    }

    pub fn get(&self, message_id: MessageId) -> Option<PollRecord> {
        self.records.get(&message_id)
    }

    pub fn remove(&self, message_id: MessageId) -> Option<PollRecord> {
        self.records.remove(&message_id)
    }

    pub fn open_session(&self, user: UserId, session: EditSession) {
        if self.sessions.get(&user).is_some() {
            debug!(user_id = %user, "Replacing open edit session");
        }
        self.sessions.put(user, session);
    }

    pub fn session(&self, user: UserId) -> Option<EditSession> {
        self.sessions.get(&user)
    }

    pub fn close_session(&self, user: UserId) -> Option<EditSession> {
        self.sessions.remove(&user)
    }

    /// Evict expired records and sessions. Returns the number evicted.
    pub fn sweep(&self, now: Instant) -> usize {
        self.records.sweep(now) + self.sessions.sweep(now)
    }

    /// Run [`PollStore::sweep`] every `every` until the task is aborted.
    pub fn spawn_sweeper(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            // The first tick completes immediately.
            interval.tick().await;

            loop {
                interval.tick().await;
                let evicted = self.sweep(Instant::now());
                if evicted > 0 {
                    info!(evicted, remaining = self.records.len(), "Swept expired poll records");
                }
            }
        })
    }
}

impl Default for PollStore {
    fn default() -> Self {
        Self::new()
    }
}
