//! Everything one signed-in client is working with.
//!
//! A session is opened when a client signs in or signs up and is torn down
//! on sign-out. Workflow operations receive it explicitly; there is no
//! process-wide "current user".

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::identity::AuthStateChange;
use crate::ledger::cache::LedgerCache;
use crate::models::job::Job;
use crate::models::user::Identity;

pub mod extract;

pub use extract::CurrentSession;

pub struct Session {
    pub token: Uuid,
    pub identity: Identity,
    jobs: RwLock<Vec<Job>>,
    selected_job: RwLock<Option<Job>>,
    pub(crate) ledger: Mutex<LedgerCache>,
    busy: AtomicBool,
    last_active: Mutex<Instant>,
}

impl Session {
    pub fn new(identity: Identity) -> Self {
        Self {
            token: Uuid::new_v4(),
            identity,
            jobs: RwLock::new(Vec::new()),
            selected_job: RwLock::new(None),
            ledger: Mutex::new(LedgerCache::default()),
            busy: AtomicBool::new(false),
            last_active: Mutex::new(Instant::now()),
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.identity.user_id
    }

    pub async fn jobs(&self) -> Vec<Job> {
        self.jobs.read().await.clone()
    }

    pub(crate) async fn replace_jobs(&self, jobs: Vec<Job>) {
        *self.jobs.write().await = jobs;
    }

    pub async fn selected_job(&self) -> Option<Job> {
        self.selected_job.read().await.clone()
    }

    /// Switching jobs drops the cached ledgers of every other job.
    pub(crate) async fn select(&self, job: Job) {
        self.ledger.lock().await.retain_only(job.id);
        *self.selected_job.write().await = Some(job);
    }

    async fn touch(&self) {
        *self.last_active.lock().await = Instant::now();
    }

    async fn idle_for(&self) -> Duration {
        self.last_active.lock().await.elapsed()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Marks the session busy until the returned guard is dropped.
    /// Returns `None` when a guarded operation is already running.
    pub fn try_begin_busy(&self) -> Option<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard { flag: &self.busy })
    }
}

pub struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Bearer token → session.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Arc<Session>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn open(&self, identity: Identity) -> Arc<Session> {
        let session = Arc::new(Session::new(identity));
        self.sessions
            .write()
            .await
            .insert(session.token, Arc::clone(&session));
        debug!(user_id = %session.user_id(), "Session opened");
        session
    }

    /// Looks up a session and marks it active.
    pub async fn get(&self, token: Uuid) -> Option<Arc<Session>> {
        let session = self.sessions.read().await.get(&token).cloned()?;
        session.touch().await;
        Some(session)
    }

    pub async fn close(&self, token: Uuid) -> bool {
        self.sessions.write().await.remove(&token).is_some()
    }

    /// Closes every session belonging to `user_id`; returns how many were open.
    pub async fn close_user(&self, user_id: Uuid) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.user_id() != user_id);
        before - sessions.len()
    }

    /// Closes sessions that have not been used for `max_idle`. A session with
    /// a match in flight is kept. Returns how many were closed.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut idle = Vec::new();
        for (token, session) in self.sessions.read().await.iter() {
            if !session.is_busy() && session.idle_for().await >= max_idle {
                idle.push(*token);
            }
        }
        if idle.is_empty() {
            return 0;
        }
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        for token in &idle {
            sessions.remove(token);
        }
        before - sessions.len()
    }

    /// Runs `evict_idle` every `every` for the life of the process.
    pub async fn expire_idle(self: Arc<Self>, max_idle: Duration, every: Duration) {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let closed = self.evict_idle(max_idle).await;
            if closed > 0 {
                info!(closed, "Idle sessions expired");
            }
        }
    }

    /// Follows the identity provider's auth-state stream until it closes,
    /// tearing down sessions of users that sign out.
    pub async fn follow(self: Arc<Self>, mut events: broadcast::Receiver<AuthStateChange>) {
        loop {
            match events.recv().await {
                Ok(AuthStateChange::SignedOut(user_id)) => {
                    let closed = self.close_user(user_id).await;
                    info!(user_id = %user_id, closed, "Sessions torn down after sign-out");
                }
                Ok(AuthStateChange::SignedIn(identity)) => {
                    debug!(user_id = %identity.user_id, "Auth state: signed in");
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Auth state subscription lagged; {skipped} events skipped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}
