//! # Session Store
//!
//! One [`SessionContext`] per logged-in user, holding the session flags
//! (role, admin flag, wallet state) and the entity collections the user
//! works from.
//!
//! Lifecycle:
//!
//! - [`SessionStore::start`] at login. A non-admin user gets their last
//!   snapshot back if one exists; otherwise the collections are loaded from
//!   the [`DataService`]. Admin sessions always start from system data.
//! - [`SessionStore::mark_dirty`] after a change. The sync runs once the
//!   debounce window passes without a newer change.
//! - [`SessionStore::end`] at logout flushes the snapshot and drops the context.
//!
//! Admin sessions are never written to `session_snapshots`. Snapshot writes
//! are last-write-wins.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use lib_chain::WalletState;
use lib_core::model::store::SessionRepository;
use lib_core::model::Role;
use lib_core::{AppError, DataSource, Dataset, DbPool, Scope};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::ctx::Ctx;
use crate::services::data::DataService;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionContext {
    pub user_id: i64,
    pub role: Role,
    pub is_admin: bool,
    pub wallet: WalletState,
    pub collections: Dataset,
    pub source: DataSource,
    pub restored: bool,
    pub last_synced: DateTime<Utc>,
}

impl SessionContext {
    fn scope(&self) -> Scope {
        if self.is_admin {
            Scope::System
        } else {
            Scope::User(self.user_id)
        }
    }
}

/// What a non-admin snapshot stores.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotPayload {
    wallet: WalletState,
    collections: Dataset,
}

struct SessionEntry {
    context: SessionContext,
    generation: u64,
}

pub struct SessionStore {
    db: DbPool,
    data: Arc<DataService>,
    debounce: Duration,
    sessions: RwLock<HashMap<i64, SessionEntry>>,
    syncs: AtomicU64,
}

impl SessionStore {
    pub fn new(db: DbPool, data: Arc<DataService>, debounce: Duration) -> Self {
        Self {
            db,
            data,
            debounce,
            sessions: RwLock::new(HashMap::new()),
            syncs: AtomicU64::new(0),
        }
    }

    // region: --- Lifecycle

    pub async fn start(&self, ctx: &Ctx) -> Result<SessionContext, AppError> {
        let restored = if ctx.is_admin {
            None
        } else {
            self.restore(ctx.user_id).await
        };

        let context = match restored {
            Some(payload) => {
                info!("[SESSION] restored snapshot for user {}", ctx.user_id);
                SessionContext {
                    user_id: ctx.user_id,
                    role: ctx.role,
                    is_admin: false,
                    wallet: payload.wallet,
                    source: payload.collections.source,
                    collections: payload.collections,
                    restored: true,
                    last_synced: Utc::now(),
                }
            }
            None => {
                let collections = self.data.dataset(ctx.scope()).await?;
                SessionContext {
                    user_id: ctx.user_id,
                    role: ctx.role,
                    is_admin: ctx.is_admin,
                    wallet: WalletState::default(),
                    source: collections.source,
                    collections,
                    restored: false,
                    last_synced: Utc::now(),
                }
            }
        };

        let mut sessions = self.sessions.write().await;
        sessions.insert(
            ctx.user_id,
            SessionEntry {
                context: context.clone(),
                generation: 0,
            },
        );
        info!("[SESSION] started for user {} ({} active)", ctx.user_id, sessions.len());

        Ok(context)
    }

    /// The user's context, starting a session when none is active
    /// (for example after a server restart with a still-valid token).
    pub async fn get_or_start(&self, ctx: &Ctx) -> Result<SessionContext, AppError> {
        match self.get(ctx.user_id).await {
            Some(context) => Ok(context),
            None => self.start(ctx).await,
        }
    }

    pub async fn get(&self, user_id: i64) -> Option<SessionContext> {
        let sessions = self.sessions.read().await;
        sessions.get(&user_id).map(|entry| entry.context.clone())
    }

    /// Teardown: flush the snapshot (non-admin only) and forget the context.
    pub async fn end(&self, user_id: i64) -> Result<bool, AppError> {
        let entry = self.sessions.write().await.remove(&user_id);
        let Some(entry) = entry else {
            return Ok(false);
        };

        if !entry.context.is_admin {
            self.persist(&entry.context).await?;
        }
        info!("[SESSION] ended for user {}", user_id);
        Ok(true)
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub fn sync_count(&self) -> u64 {
        self.syncs.load(Ordering::Relaxed)
    }

    // endregion: --- Lifecycle

    // region: --- Sync

    /// Schedule a debounced sync. Only the most recent request inside the
    /// window runs.
    pub async fn mark_dirty(self: &Arc<Self>, user_id: i64) {
        let generation = {
            let mut sessions = self.sessions.write().await;
            let Some(entry) = sessions.get_mut(&user_id) else {
                return;
            };
            entry.generation += 1;
            entry.generation
        };

        let store = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(store.debounce).await;

            let current = {
                let sessions = store.sessions.read().await;
                sessions.get(&user_id).map(|entry| entry.generation)
            };
            if current != Some(generation) {
                debug!("[SESSION] sync for user {} superseded", user_id);
                return;
            }

            if let Err(e) = store.sync_now(user_id).await {
                warn!("[SESSION] debounced sync for user {} failed: {}", user_id, e);
            }
        });
    }

    /// Reload the collections and, for non-admin users, write the snapshot.
    pub async fn sync_now(&self, user_id: i64) -> Result<Option<SessionContext>, AppError> {
        let Some(context) = self.get(user_id).await else {
            return Ok(None);
        };

        let collections = self.data.dataset(context.scope()).await?;

        let context = {
            let mut sessions = self.sessions.write().await;
            let Some(entry) = sessions.get_mut(&user_id) else {
                return Ok(None);
            };
            entry.context.source = collections.source;
            entry.context.collections = collections;
            entry.context.last_synced = Utc::now();
            entry.context.clone()
        };

        if !context.is_admin {
            self.persist(&context).await?;
        }

        self.syncs.fetch_add(1, Ordering::Relaxed);
        debug!("[SESSION] synced user {}", user_id);
        Ok(Some(context))
    }

    async fn persist(&self, context: &SessionContext) -> Result<(), AppError> {
        let payload = serde_json::to_value(SnapshotPayload {
            wallet: context.wallet.clone(),
            collections: context.collections.clone(),
        })?;
        SessionRepository::upsert(&self.db, context.user_id, &payload).await?;
        Ok(())
    }

    async fn restore(&self, user_id: i64) -> Option<SnapshotPayload> {
        let snapshot = match SessionRepository::get(&self.db, user_id).await {
            Ok(snapshot) => snapshot?,
            Err(e) => {
                warn!("[SESSION] could not read snapshot for user {}: {}", user_id, e);
                return None;
            }
        };

        match serde_json::from_value(snapshot.payload.0) {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!("[SESSION] discarding unreadable snapshot for user {}: {}", user_id, e);
                None
            }
        }
    }

    // endregion: --- Sync

    // region: --- Wallet

    pub async fn wallet(&self, user_id: i64) -> Option<WalletState> {
        self.get(user_id).await.map(|context| context.wallet)
    }

    /// Replace the session's wallet state and schedule a sync.
    pub async fn set_wallet(self: &Arc<Self>, user_id: i64, wallet: WalletState) -> bool {
        {
            let mut sessions = self.sessions.write().await;
            let Some(entry) = sessions.get_mut(&user_id) else {
                return false;
            };
            entry.context.wallet = wallet;
        }
        self.mark_dirty(user_id).await;
        true
    }

    // endregion: --- Wallet
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_core::memory_pool;

    fn user(id: i64) -> Ctx {
        Ctx { user_id: id, name: format!("user{}", id), role: Role::Distributor, is_admin: false }
    }

    fn admin() -> Ctx {
        Ctx { user_id: 1, name: "Ada".into(), role: Role::Admin, is_admin: true }
    }

    async fn store(debounce: Duration) -> (Arc<SessionStore>, DbPool) {
        let pool = memory_pool().await.unwrap();
        let data = Arc::new(DataService::new(pool.clone(), Duration::from_secs(300)));
        (Arc::new(SessionStore::new(pool.clone(), data, debounce)), pool)
    }

    #[tokio::test]
    async fn test_debounce_coalesces_syncs() {
        let (store, pool) = store(Duration::from_millis(50)).await;
        store.start(&user(3)).await.unwrap();

        for _ in 0..5 {
            store.mark_dirty(3).await;
        }
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(store.sync_count(), 1);
        assert!(SessionRepository::get(&pool, 3).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_admin_sessions_never_persist() {
        let (store, pool) = store(Duration::from_millis(10)).await;
        let context = store.start(&admin()).await.unwrap();
        assert!(context.is_admin);

        store.mark_dirty(1).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        store.sync_now(1).await.unwrap();
        assert!(store.end(1).await.unwrap());

        assert_eq!(SessionRepository::count(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_end_flushes_and_next_start_restores() {
        let (store, _) = store(Duration::from_secs(60)).await;
        store.start(&user(4)).await.unwrap();

        let wallet = WalletState {
            address: Some("0xabc0000000000000000000000000000000000001".into()),
            manually_disconnected: false,
            connected_at: Some(Utc::now()),
        };
        assert!(store.set_wallet(4, wallet.clone()).await);
        assert!(store.end(4).await.unwrap());
        assert_eq!(store.active_count().await, 0);

        let restored = store.start(&user(4)).await.unwrap();
        assert!(restored.restored);
        assert_eq!(restored.wallet, wallet);
    }

    #[tokio::test]
    async fn test_sync_unknown_user_is_noop() {
        let (store, _) = store(Duration::from_millis(10)).await;
        assert!(store.sync_now(42).await.unwrap().is_none());
        assert!(!store.end(42).await.unwrap());
        assert!(!store.set_wallet(42, WalletState::default()).await);
    }

    #[tokio::test]
    async fn test_get_or_start() {
        let (store, _) = store(Duration::from_secs(60)).await;
        let first = store.get_or_start(&user(8)).await.unwrap();
        assert!(!first.restored);
        assert_eq!(store.active_count().await, 1);

        let again = store.get_or_start(&user(8)).await.unwrap();
        assert_eq!(again.last_synced, first.last_synced);
    }
}
