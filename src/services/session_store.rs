// src/services/session_store.rs

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::models::session::QuizSession;

#[derive(Debug)]
struct SessionEntry {
    session: QuizSession,
    last_seen: DateTime<Utc>,
}

/// Server-side quiz sessions keyed by the id carried in the session cookie.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<Uuid, SessionEntry>>,
    ttl: TimeDelta,
}

impl SessionStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl: i64::try_from(ttl_secs)
                .ok()
                .and_then(TimeDelta::try_seconds)
                .unwrap_or(TimeDelta::MAX),
        }
    }

    /// Runs `f` against the session for `id`, creating an empty one if needed.
    ///
    /// The entry stays locked while `f` runs, so `f` must not block.
    pub fn with_session<R>(&self, id: Uuid, f: impl FnOnce(&mut QuizSession) -> R) -> R {
        let mut entry = self.sessions.entry(id).or_insert_with(|| SessionEntry {
            session: QuizSession::new(),
            last_seen: Utc::now(),
        });
        entry.last_seen = Utc::now();
        f(&mut entry.session)
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drops sessions idle for longer than the ttl. Returns how many went.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let Some(threshold) = now.checked_sub_signed(self.ttl) else {
            // ttl reaches before the earliest representable time
            return 0;
        };
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| entry.last_seen > threshold);
        before - self.sessions.len()
    }

    pub fn spawn_cleanup(&self, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        let mut interval = tokio::time::interval(every);

        tokio::spawn(async move {
            loop {
                interval.tick().await;
                let removed = store.purge_expired(Utc::now());
                if removed > 0 {
                    tracing::debug!("Purged {} expired quiz sessions", removed);
                }
            }
        })
    }
}
