use std::ops::Deref;

use tokio_postgres::Client;

use crate::server::database::pool::Pool;

/// A client checked out of a [`Pool`]; goes back to the pool on drop.
pub(crate) struct Connection<C: Send + 'static = Client> {
    client: Option<C>,
    pool: Pool<C>,
}

impl<C: Send + 'static> Connection<C> {
    pub fn new(client: C, pool: Pool<C>) -> Self {
        Self {
            client: Some(client),
            pool,
        }
    }
}

impl<C: Send + 'static> Deref for Connection<C> {
    type Target = C;

    fn deref(&self) -> &C {
        // only taken in drop
        self.client.as_ref().expect("connection already released")
    }
}

impl<C: Send + 'static> Drop for Connection<C> {
    fn drop(&mut self) {
        if let Some(client) = self.client.take() {
            self.pool.release(client);
        }
    }
}
