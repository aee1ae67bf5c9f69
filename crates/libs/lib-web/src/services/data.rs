//! # Data Service
//!
//! Single entry point for the four entity collections a dashboard needs.
//!
//! Results are cached per [`Scope`] for a fixed TTL. Any mutation clears the
//! whole cache, since a part or transaction written by one user also shows up
//! in the system scope. A load that overlaps an invalidation is returned to
//! its caller but never cached. When the stored collections look unusable the bundled
//! demo dataset is returned instead, tagged `source = "demo"`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use lib_core::model::store::{PartRepository, ShipmentRepository, TransactionRepository, VendorRepository};
use lib_core::{demo, AppError, Dataset, DbPool, Scope};
use tokio::sync::RwLock;
use tracing::{debug, info};

struct CachedDataset {
    dataset: Dataset,
    stored_at: Instant,
}

pub struct DataService {
    db: DbPool,
    ttl: Duration,
    cache: RwLock<HashMap<Scope, CachedDataset>>,
    /// Bumped by every invalidation.
    generation: AtomicU64,
}

impl DataService {
    pub fn new(db: DbPool, ttl: Duration) -> Self {
        Self {
            db,
            ttl,
            cache: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Collections visible in `scope`, from cache when still fresh.
    pub async fn dataset(&self, scope: Scope) -> Result<Dataset, AppError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.get(&scope) {
                if cached.stored_at.elapsed() < self.ttl {
                    debug!("[DATA] cache hit for {}", scope);
                    return Ok(cached.dataset.clone());
                }
                debug!("[DATA] cache expired for {}", scope);
            }
        }

        let generation = self.generation.load(Ordering::Acquire);
        let dataset = self.load(scope).await?;
        self.store(scope, generation, &dataset).await;

        Ok(dataset)
    }

    /// Drop every cached dataset.
    pub async fn invalidate_all(&self) {
        let mut cache = self.cache.write().await;
        self.generation.fetch_add(1, Ordering::AcqRel);
        if !cache.is_empty() {
            debug!("[DATA] invalidating {} cached datasets", cache.len());
        }
        cache.clear();
    }

    pub async fn cached_scopes(&self) -> usize {
        self.cache.read().await.len()
    }

    /// Cache `dataset` unless an invalidation ran since `generation` was read.
    async fn store(&self, scope: Scope, generation: u64, dataset: &Dataset) {
        let mut cache = self.cache.write().await;
        if self.generation.load(Ordering::Acquire) != generation {
            debug!("[DATA] discarding {} load that raced an invalidation", scope);
            return;
        }
        cache.insert(
            scope,
            CachedDataset {
                dataset: dataset.clone(),
                stored_at: Instant::now(),
            },
        );
    }

    async fn load(&self, scope: Scope) -> Result<Dataset, AppError> {
        let parts = PartRepository::list(&self.db, scope).await?;
        let transactions = TransactionRepository::list(&self.db, scope).await?;
        let shipments = ShipmentRepository::list(&self.db, scope).await?;
        let vendors = VendorRepository::list(&self.db).await?;

        let dataset = Dataset::live(parts, transactions, shipments, vendors);
        if dataset.needs_demo_fallback() {
            info!(
                "[DATA] {} has {} parts and {} vendors, serving demo dataset",
                scope,
                dataset.parts.len(),
                dataset.vendors.len()
            );
            return Ok(demo::dataset());
        }

        Ok(dataset)
    }
}
