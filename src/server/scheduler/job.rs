use std::time::Duration;

use log::{error, info};
use tokio::{pin, select, time};
use tokio_util::sync::CancellationToken;
use tokio_util::task::task_tracker;

use crate::server::service::auth::AuthService;
use crate::server::service::billing::BillingService;
use crate::server::util::time::helper;

/// Mark unpaid invoices past their due date as overdue; returns how many changed.
async fn sweep_once(billing: &BillingService) -> usize {
    match billing.sweep_overdue(helper::today()).await {
        Ok(ids) if ids.is_empty() => 0,
        Ok(ids) => {
            info!("marked invoices {:?} as overdue", ids);
            ids.len()
        }
        Err(e) => {
            error!("failed to sweep overdue invoices, {}", e);
            0
        }
    }
}

/// Forget expired sessions and stale sign-in failures.
fn prune_auth(auth: &AuthService) -> (usize, usize) {
    let (sessions, failures) = auth.prune();
    if sessions + failures > 0 {
        info!("pruned {} expired sessions and {} stale failure records", sessions, failures);
    }
    (sessions, failures)
}

async fn worker(billing: BillingService, auth: AuthService, cancel_token: CancellationToken) {
    let interval = time::interval(Duration::from_secs(60)); // run once every minute
    pin!(interval);
    loop {
        select! {
            _ = interval.tick() => {},
            _ = cancel_token.cancelled() => {
                info!("received cancel signal, returning gracefully");
                return;
            }
        }
        sweep_once(&billing).await;
        prune_auth(&auth);
    }
}

pub async fn maintenance(billing: BillingService, auth: AuthService, cancel_token: CancellationToken) {
    let tracker = task_tracker::TaskTracker::new();
    tracker.spawn(worker(billing, auth, cancel_token));
    if tracker.close() {
        tracker.wait().await;
    }
}
