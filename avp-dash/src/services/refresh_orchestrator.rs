//! Refresh orchestration
//!
//! Owns the dashboard snapshot (analytics + canonical image list) and
//! refreshes it from the backend.
//!
//! **Algorithm:**
//! 1. Fetch analytics and images concurrently; both settle, neither aborts the other
//! 2. Images: stable sort by effective timestamp (descending), then reconcile
//! 3. A failed fetch is logged, reported on the event bus, and leaves that
//!    slot at its previous value
//! 4. Publish the merged snapshot under a single write lock
//!
//! The post-upload refresh is a one-shot spawned task holding only a weak
//! reference, so it never keeps a dropped orchestrator alive.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use avp_common::api::ListImagesQuery;
use avp_common::events::{DashboardEvent, EventBus, FetchResource, RefreshTrigger};
use avp_common::models::{Analytics, ImageRecord};
use avp_common::reconcile::{reconcile_with_stats, sort_by_recency};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::api_client::DashboardClient;
use crate::error::FetchError;

/// Last known dashboard data
#[derive(Debug, Clone, Default)]
pub struct DashboardSnapshot {
    /// `None` until analytics have loaded once
    pub analytics: Option<Analytics>,
    /// Canonical records, most recent first
    pub images: Vec<ImageRecord>,
    /// When a refresh cycle last settled
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Result of one refresh cycle
#[derive(Debug)]
pub struct RefreshReport {
    pub trigger: RefreshTrigger,
    /// Snapshot as published at the end of the cycle
    pub snapshot: DashboardSnapshot,
    /// Fetches that failed this cycle
    pub errors: Vec<FetchError>,
}

impl RefreshReport {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Fetches and publishes dashboard data
pub struct RefreshOrchestrator {
    client: DashboardClient,
    events: EventBus,
    image_query: ListImagesQuery,
    snapshot: RwLock<DashboardSnapshot>,
    cycles: AtomicU64,
}

impl RefreshOrchestrator {
    pub fn new(client: DashboardClient, events: EventBus) -> Self {
        Self {
            client,
            events,
            image_query: ListImagesQuery::default(),
            snapshot: RwLock::new(DashboardSnapshot::default()),
            cycles: AtomicU64::new(0),
        }
    }

    /// Query used for the images fetch (limit, status filter)
    pub fn with_image_query(mut self, query: ListImagesQuery) -> Self {
        self.image_query = query;
        self
    }

    /// Copy of the current snapshot
    pub async fn snapshot(&self) -> DashboardSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Number of refresh cycles that have settled
    pub fn completed_cycles(&self) -> u64 {
        self.cycles.load(Ordering::SeqCst)
    }

    /// Run one refresh cycle
    pub async fn refresh_all(&self, trigger: RefreshTrigger) -> RefreshReport {
        debug!(%trigger, "Refresh started");
        self.events.emit_lossy(DashboardEvent::RefreshStarted {
            trigger,
            timestamp: Utc::now(),
        });

        let (analytics, images) = tokio::join!(self.fetch_analytics(), self.fetch_images());

        let mut errors = Vec::new();
        let snapshot = {
            let mut current = self.snapshot.write().await;
            match analytics {
                Ok(a) => current.analytics = Some(a),
                Err(e) => errors.push(e),
            }
            match images {
                Ok(records) => current.images = records,
                Err(e) => errors.push(e),
            }
            current.refreshed_at = Some(Utc::now());
            current.clone()
        };

        for error in &errors {
            warn!(resource = %error.resource, error = %error.source, "Fetch failed, keeping previous data");
            self.events.emit_lossy(DashboardEvent::FetchFailed {
                resource: error.resource,
                message: error.to_string(),
                timestamp: Utc::now(),
            });
        }

        self.cycles.fetch_add(1, Ordering::SeqCst);
        info!(
            %trigger,
            images = snapshot.images.len(),
            analytics = snapshot.analytics.is_some(),
            failures = errors.len(),
            "Refresh completed"
        );
        self.events.emit_lossy(DashboardEvent::RefreshCompleted {
            trigger,
            image_count: snapshot.images.len(),
            analytics_loaded: snapshot.analytics.is_some(),
            timestamp: Utc::now(),
        });

        RefreshReport {
            trigger,
            snapshot,
            errors,
        }
    }

    /// Fetch analytics
    pub async fn fetch_analytics(&self) -> Result<Analytics, FetchError> {
        self.client
            .get_analytics()
            .await
            .map_err(|source| FetchError {
                resource: FetchResource::Analytics,
                source,
            })
    }

    /// Fetch images, pre-sort by recency, and reconcile
    pub async fn fetch_images(&self) -> Result<Vec<ImageRecord>, FetchError> {
        let list = self
            .client
            .list_images(&self.image_query)
            .await
            .map_err(|source| FetchError {
                resource: FetchResource::Images,
                source,
            })?;

        let mut raw = list.images;
        sort_by_recency(&mut raw);
        let (records, stats) = reconcile_with_stats(raw);
        debug!(
            input = stats.input,
            dropped = stats.dropped_empty_key,
            merged = stats.merged_duplicates,
            output = stats.output,
            "Reconciled image records"
        );
        Ok(records)
    }

    /// Schedule a one-shot post-upload refresh after `delay`
    ///
    /// Resolves to `None` if the orchestrator was dropped before the timer
    /// fired. Later manual refreshes do not cancel it.
    pub fn schedule_refresh(self: &Arc<Self>, delay: Duration) -> JoinHandle<Option<RefreshReport>> {
        let orchestrator = Arc::downgrade(self);
        debug!(delay_ms = delay.as_millis() as u64, "Scheduled post-upload refresh");

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match orchestrator.upgrade() {
                Some(orchestrator) => Some(orchestrator.refresh_all(RefreshTrigger::PostUpload).await),
                None => {
                    debug!("Orchestrator dropped before scheduled refresh");
                    None
                }
            }
        })
    }
}
