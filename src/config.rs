//! Configuration for tablekv
//!
//! Centralized configuration with sensible defaults.

/// Main configuration for a tablekv engine and its dispatcher
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Dispatcher Configuration
    // -------------------------------------------------------------------------
    /// Number of worker threads executing submitted commands
    pub dispatch_workers: usize,

    /// Max commands queued before `submit` blocks
    pub dispatch_queue_depth: usize,

    // -------------------------------------------------------------------------
    // Counter Configuration
    // -------------------------------------------------------------------------
    /// Whether `increment` accepts a negative delta
    pub allow_negative_delta: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dispatch_workers: 4,
            dispatch_queue_depth: 1024,
            allow_negative_delta: true,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the number of dispatcher worker threads (at least 1)
    pub fn dispatch_workers(mut self, count: usize) -> Self {
        self.config.dispatch_workers = count.max(1);
        self
    }

    /// Set the dispatcher queue depth (at least 1)
    pub fn dispatch_queue_depth(mut self, depth: usize) -> Self {
        self.config.dispatch_queue_depth = depth.max(1);
        self
    }

    /// Allow or reject negative counter deltas
    pub fn allow_negative_delta(mut self, allow: bool) -> Self {
        self.config.allow_negative_delta = allow;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
