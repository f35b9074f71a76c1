/// Configuration for a [`Pool`][super::Pool].
#[derive(Debug, Clone)]
pub struct PoolOptions {
    pub(crate) max_connections: u32,
    pub(crate) test_before_acquire: bool,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl PoolOptions {
    pub fn new() -> Self {
        Self {
            max_connections: 10,
            test_before_acquire: false,
        }
    }

    /// Set the maximum number of connections that this pool should maintain.
    ///
    /// # Panics
    /// Panics if `max` is 0.
    pub fn max_connections(mut self, max: u32) -> Self {
        assert!(max > 0, "max_connections must be greater than 0");
        self.max_connections = max;
        self
    }

    pub fn get_max_connections(&self) -> u32 {
        self.max_connections
    }

    /// If true, idle connections are pinged before being handed out, and discarded if the
    /// ping fails.
    pub fn test_before_acquire(mut self, test: bool) -> Self {
        self.test_before_acquire = test;
        self
    }

    pub fn get_test_before_acquire(&self) -> bool {
        self.test_before_acquire
    }
}
