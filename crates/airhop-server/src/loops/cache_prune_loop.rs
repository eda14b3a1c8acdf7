//! Periodic cache pruning.
//!
//! Drops expired entries and trims the in-process cache back to its
//! configured capacity, oldest entries first.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

use crate::state::AppState;

/// Start the cache pruning loop.
pub async fn run_cache_prune_loop(state: Arc<AppState>, every: Duration) {
    let mut ticker = interval(every);

    loop {
        ticker.tick().await;
        prune_once(&state);
    }
}

fn prune_once(state: &AppState) -> usize {
    let removed = state.cache().prune();
    if removed > 0 {
        tracing::debug!(
            "Pruned {} cache entries ({} remain)",
            removed,
            state.cache().len()
        );
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::config::Config;
    use crate::test_support::FakeStore;

    #[tokio::test]
    async fn prune_trims_to_capacity() {
        let config = Config {
            cache_max_entries: 2,
            ..Config::default()
        };
        let state = AppState::new(&config, Arc::new(FakeStore::new(Vec::new())));
        for key in ["a", "b", "c", "d"] {
            state
                .cache()
                .set_with_ttl(key, b"1".to_vec(), Duration::from_secs(60))
                .await;
            tokio::time::sleep(Duration::from_millis(2)).await;
        }

        assert_eq!(prune_once(&state), 2);
        assert_eq!(state.cache().len(), 2);
        assert_eq!(prune_once(&state), 0);
    }
}
