//! Provides the connection pool shared by every statement a connector executes.
//!
//! Each [`Pool::acquire`] hands out exactly one connection, wrapped in a [`PoolConnection`]
//! guard. Returning it through [`PoolConnection::release`] consumes the guard, so a connection
//! can be given back at most once; dropping the guard instead puts the connection back
//! without the reset step.
//!
//! Limiting how many connections are open at once is done with a fair semaphore. There is no
//! acquire timeout and no background reaper.

use crate::driver::{Driver, DriverConnection};
use crate::error::Error;
use crossbeam_queue::ArrayQueue;
use futures_intrusive::sync::Semaphore;
use std::fmt::{self, Debug, Formatter};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

mod connection;
mod options;

pub use self::connection::PoolConnection;
pub use self::options::PoolOptions;

/// A pool of DB2 connections, cheap to clone and shared between clones.
pub struct Pool<D: Driver>(pub(crate) Arc<SharedPool<D>>);

pub(crate) struct SharedPool<D: Driver> {
    driver: D,
    connection_string: Arc<str>,
    idle: ArrayQueue<D::Connection>,
    semaphore: Semaphore,
    size: AtomicU32,
    is_closed: AtomicBool,
    options: PoolOptions,
}

impl<D: Driver> Pool<D> {
    /// Creates a pool; no connection is opened until the first [`acquire`][Pool::acquire].
    pub fn new(driver: D, connection_string: impl Into<Arc<str>>, options: PoolOptions) -> Self {
        let capacity = options.max_connections as usize;

        Pool(Arc::new(SharedPool {
            driver,
            connection_string: connection_string.into(),
            idle: ArrayQueue::new(capacity),
            semaphore: Semaphore::new(true, capacity),
            size: AtomicU32::new(0),
            is_closed: AtomicBool::new(false),
            options,
        }))
    }

    /// Retrieves a connection from the pool, opening a new one when none is idle.
    ///
    /// Waits for at most `max_connections` connections to be out at once. A failure to
    /// open surfaces as [`Error::Connect`].
    pub async fn acquire(&self) -> Result<PoolConnection<D>, Error> {
        let shared = &self.0;

        if shared.is_closed() {
            return Err(Error::PoolClosed);
        }

        let mut permit = shared.semaphore.acquire(1).await;

        if shared.is_closed() {
            return Err(Error::PoolClosed);
        }

        while let Some(mut conn) = shared.idle.pop() {
            if shared.options.test_before_acquire {
                if let Err(error) = conn.ping().await {
                    log::info!("ping on idle connection returned error: {}", error);
                    shared.size.fetch_sub(1, Ordering::AcqRel);
                    if let Err(error) = conn.close().await {
                        log::warn!("error closing a broken connection: {}", error);
                    }
                    continue;
                }
            }

            permit.disarm();
            return Ok(PoolConnection::new(conn, Arc::clone(shared)));
        }

        let conn = shared
            .driver
            .open(&shared.connection_string)
            .await
            .map_err(Error::connect)?;

        shared.size.fetch_add(1, Ordering::AcqRel);
        permit.disarm();
        Ok(PoolConnection::new(conn, Arc::clone(shared)))
    }

    /// Shut down the pool, closing every idle connection.
    ///
    /// Connections still checked out are closed when they are released.
    pub async fn close(&self) {
        self.0.is_closed.store(true, Ordering::Release);

        while let Some(conn) = self.0.idle.pop() {
            self.0.size.fetch_sub(1, Ordering::AcqRel);
            if let Err(error) = conn.close().await {
                log::warn!("error closing an idle connection: {}", error);
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.0.is_closed()
    }

    /// The number of connections currently open, idle or checked out.
    pub fn size(&self) -> u32 {
        self.0.size.load(Ordering::Acquire)
    }

    pub fn num_idle(&self) -> usize {
        self.0.idle.len()
    }

    pub fn options(&self) -> &PoolOptions {
        &self.0.options
    }

    pub fn connection_string(&self) -> &str {
        &self.0.connection_string
    }
}

impl<D: Driver> SharedPool<D> {
    fn is_closed(&self) -> bool {
        self.is_closed.load(Ordering::Acquire)
    }

    /// Gives a checked out connection back, freeing its permit on every path.
    pub(super) async fn release(&self, mut conn: D::Connection) -> Result<(), Error> {
        let result = if self.is_closed() {
            self.size.fetch_sub(1, Ordering::AcqRel);
            conn.close().await.map_err(Error::release)
        } else {
            match conn.reset().await {
                Ok(()) => {
                    if let Err(conn) = self.idle.push(conn) {
                        self.size.fetch_sub(1, Ordering::AcqRel);
                        if let Err(error) = conn.close().await {
                            log::warn!("error closing a surplus connection: {}", error);
                        }
                    }
                    Ok(())
                }
                Err(error) => {
                    self.size.fetch_sub(1, Ordering::AcqRel);
                    if let Err(close_error) = conn.close().await {
                        log::warn!(
                            "error closing a connection that failed to reset: {}",
                            close_error
                        );
                    }
                    Err(Error::release(error))
                }
            }
        };

        self.semaphore.release(1);
        result
    }

    /// Returns a connection whose guard was dropped without an explicit release.
    pub(super) fn release_on_drop(&self, conn: D::Connection) {
        if self.is_closed() || self.idle.push(conn).is_err() {
            self.size.fetch_sub(1, Ordering::AcqRel);
        }
        self.semaphore.release(1);
    }
}

impl<D: Driver> Clone for Pool<D> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<D: Driver> Debug for Pool<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("size", &self.size())
            .field("num_idle", &self.num_idle())
            .field("is_closed", &self.is_closed())
            .field("options", &self.0.options)
            .finish()
    }
}
