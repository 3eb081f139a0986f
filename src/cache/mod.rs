pub mod price_cache;
pub mod ttl_cache;
pub mod vibe_cache;
