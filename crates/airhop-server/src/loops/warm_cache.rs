//! Startup warm-up of the neighbor cache.
//!
//! Route searches on a cold cache issue one radius query per expanded
//! airport. Warming resolves every airport's neighbor list up front, in
//! fixed-size concurrent batches, skipping lists that are already cached.

use std::sync::Arc;

use anyhow::Result;
use futures::future::join_all;

use crate::state::AppState;

const PROGRESS_EVERY: usize = 100;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WarmStats {
    pub total: usize,
    pub cached: usize,
    pub skipped: usize,
    pub failed: usize,
}

enum Outcome {
    Cached,
    Skipped,
    Failed,
}

pub async fn warm_neighbor_cache(state: Arc<AppState>, batch_size: usize) -> Result<WarmStats> {
    let airports = state.airports().find_all().await?;
    let batch_size = batch_size.max(1);
    let mut stats = WarmStats {
        total: airports.len(),
        ..Default::default()
    };

    tracing::info!(
        "Warming neighbor cache for {} airports in batches of {}",
        stats.total,
        batch_size
    );

    let resolver = state.neighbors();
    let mut processed = 0;
    for batch in airports.chunks(batch_size) {
        let work = batch.iter().map(|airport| async move {
            if resolver.cached(airport.id).await.is_some() {
                return Outcome::Skipped;
            }
            match resolver.neighbors(airport.id).await {
                Ok(_) => Outcome::Cached,
                Err(err) => {
                    tracing::warn!("Failed to warm neighbors for airport {}: {}", airport.id, err);
                    Outcome::Failed
                }
            }
        });

        for outcome in join_all(work).await {
            match outcome {
                Outcome::Cached => stats.cached += 1,
                Outcome::Skipped => stats.skipped += 1,
                Outcome::Failed => stats.failed += 1,
            }
        }

        let before = processed;
        processed += batch.len();
        if processed / PROGRESS_EVERY > before / PROGRESS_EVERY || processed == stats.total {
            tracing::info!(
                "Warm-up progress: {}/{} airports ({} cached, {} skipped)",
                processed,
                stats.total,
                stats.cached,
                stats.skipped
            );
        }
    }

    tracing::info!(
        "Neighbor cache warm-up complete: {} cached, {} skipped, {} failed",
        stats.cached,
        stats.skipped,
        stats.failed
    );
    Ok(stats)
}
