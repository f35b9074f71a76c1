use super::SharedPool;
use crate::driver::Driver;
use crate::error::Error;
use std::fmt::{self, Debug, Formatter};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// A connection managed by a [`Pool`][super::Pool].
///
/// Hand it back with [`release`][PoolConnection::release]; the release result reports a
/// connection that could not be reset for reuse.
pub struct PoolConnection<D: Driver> {
    live: Option<D::Connection>,
    pool: Arc<SharedPool<D>>,
}

const EXPECT_MSG: &str = "BUG: inner connection already taken!";

impl<D: Driver> PoolConnection<D> {
    pub(super) fn new(live: D::Connection, pool: Arc<SharedPool<D>>) -> Self {
        Self {
            live: Some(live),
            pool,
        }
    }

    /// Return the connection to the pool.
    pub async fn release(mut self) -> Result<(), Error> {
        match self.live.take() {
            Some(live) => self.pool.release(live).await,
            None => Ok(()),
        }
    }
}

impl<D: Driver> Deref for PoolConnection<D> {
    type Target = D::Connection;

    fn deref(&self) -> &Self::Target {
        self.live.as_ref().expect(EXPECT_MSG)
    }
}

impl<D: Driver> DerefMut for PoolConnection<D> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.live.as_mut().expect(EXPECT_MSG)
    }
}

impl<D: Driver> Debug for PoolConnection<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolConnection")
            .field("live", &self.live.is_some())
            .finish()
    }
}

/// Returns the connection to the [`Pool`][super::Pool] it was checked-out from.
impl<D: Driver> Drop for PoolConnection<D> {
    fn drop(&mut self) {
        if let Some(live) = self.live.take() {
            self.pool.release_on_drop(live);
        }
    }
}
