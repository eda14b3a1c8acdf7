//! Background tasks that run alongside the HTTP server.

pub mod cache_prune_loop;
pub mod warm_cache;
