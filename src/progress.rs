use std::sync::Arc;

/// Receives encoder progress in [0, 1].
pub type ProgressCallback = Arc<dyn Fn(f32) + Send + Sync>;

/// Receives human-readable status lines ("rendering frames", "encoding").
pub type StatusCallback = Arc<dyn Fn(&str) + Send + Sync>;
