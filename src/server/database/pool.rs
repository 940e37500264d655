use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::{error, info, warn};
use tokio::sync::Notify;
use tokio::task::JoinSet;
use tokio::time;
use tokio_postgres::{Client, NoTls};

use crate::server::database::connection::Connection;
use crate::server::database::pool_config::PoolConfig;
use crate::server::database::StoreError;

pub(crate) struct CommonPool<C> {
    /// pool name
    name: String,
    /// idle clients, handed out in FIFO order
    connections: Mutex<VecDeque<C>>,
    available: Notify,
}

/// Shared handle to a FIFO client pool.
pub(crate) struct Pool<C: Send + 'static = Client>(Arc<CommonPool<C>>);

impl<C: Send + 'static> Clone for Pool<C> {
    fn clone(&self) -> Self {
        Pool(self.0.clone())
    }
}

impl<C: Send + 'static> Pool<C> {
    /// Create an empty pool.
    pub fn new(name: impl Into<String>) -> Self {
        Pool(Arc::new(CommonPool {
            name: name.into(),
            connections: Mutex::new(VecDeque::new()),
            available: Notify::new(),
        }))
    }

    fn idle_clients(&self) -> MutexGuard<'_, VecDeque<C>> {
        // a poisoned queue still holds usable clients
        self.0
            .connections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn idle(&self) -> usize {
        self.idle_clients().len()
    }

    /// Wait up to `timeout` for an idle client.
    pub async fn acquire(&self, timeout: Duration) -> Option<Connection<C>> {
        let wait = async {
            loop {
                let notified = self.0.available.notified();
                if let Some(client) = self.idle_clients().pop_front() {
                    return Connection::new(client, self.clone());
                }
                notified.await;
            }
        };
        match time::timeout(timeout, wait).await {
            Ok(conn) => Some(conn),
            Err(_) => {
                error!(
                    "timed out to acquire a connection from pool {} after {} ms",
                    self.0.name,
                    timeout.as_millis()
                );
                None
            }
        }
    }

    /// Put a client back and wake one waiter.
    pub fn release(&self, client: C) {
        self.idle_clients().push_back(client);
        self.0.available.notify_one();
    }
}

impl Pool<Client> {
    /// Open `config.size` connections concurrently. Fails only when none could be opened.
    pub async fn init(&self, config: &PoolConfig) -> Result<(), StoreError> {
        let mut set = JoinSet::new();
        for _ in 0..config.size {
            let conn_str = config.conn_str.clone();
            set.spawn(async move { connect(&conn_str).await });
        }
        let mut opened = 0;
        let mut last_error = None;
        while let Some(res) = set.join_next().await {
            match res {
                Ok(Ok(client)) => {
                    opened += 1;
                    self.release(client);
                }
                Ok(Err(e)) => {
                    warn!("pool {} failed to open a connection, {}", self.0.name, e);
                    last_error = Some(e.to_string());
                }
                Err(e) => error!("join_next failed when joining, {}", e),
            }
        }
        if opened == 0 {
            return Err(StoreError::Backend {
                message: last_error.unwrap_or_else(|| format!("pool {} is empty", self.0.name)),
            });
        }
        info!("pool {} ready with {} connections", self.0.name, opened);
        Ok(())
    }
}

async fn connect(conn_str: &str) -> Result<Client, tokio_postgres::Error> {
    let (client, conn) = tokio_postgres::connect(conn_str, NoTls).await?;
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            error!("connection returned error and aborted, {}", e);
        }
    });
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_millis(20);

    #[tokio::test]
    async fn empty_pool_times_out() {
        let pool = Pool::<u32>::new("test");
        assert!(pool.acquire(TIMEOUT).await.is_none());
    }

    #[tokio::test]
    async fn test_acquire_and_release() {
        let pool = Pool::<u32>::new("test");
        pool.release(7);
        {
            let conn = pool.acquire(TIMEOUT).await.expect("should get some");
            assert_eq!(*conn, 7);
            assert!(pool.acquire(TIMEOUT).await.is_none());
        } // conn drops here and goes back to the pool

        assert_eq!(pool.idle(), 1);
        assert!(pool.acquire(TIMEOUT).await.is_some());
    }

    #[tokio::test]
    async fn waiter_is_woken_by_release() {
        let pool = Pool::<u32>::new("test");
        let releaser = pool.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(5)).await;
            releaser.release(1);
        });
        assert!(pool.acquire(Duration::from_secs(1)).await.is_some());
    }

    #[tokio::test]
    async fn clients_are_handed_out_fifo() {
        let pool = Pool::<u32>::new("test");
        pool.release(1);
        pool.release(2);
        let first = pool.acquire(TIMEOUT).await.unwrap();
        assert_eq!(*first, 1);
    }
}
