//! # Order Poller
//!
//! Keeps the order board in sync with the backend. Every tick the poller fetches the
//! orders for its [`OrderScope`], reconciles them into the Order actor and publishes the
//! resulting [`OrderView`] on a watch channel.
//!
//! A failed poll never clears the board: the previous orders stay published and the
//! error is attached as `last_error` until the next successful poll. There is no
//! backoff; the next attempt happens on the next tick.

use crate::backend::{Backend, BackendError};
use crate::clients::OrderClient;
use crate::model::Order;
use crate::order_actor::OrderError;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Whose orders to poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderScope {
    /// A customer's own unserved orders.
    Customer { user_id: u64 },
    /// Everything a restaurant's kitchen still has to serve.
    Restaurant { document_id: String },
}

/// What the poller last published.
#[derive(Debug, Clone, Default)]
pub struct OrderView {
    /// Active orders, oldest first.
    pub orders: Vec<Order>,
    /// Error of the most recent poll, cleared by the next successful one.
    pub last_error: Option<String>,
    /// Time of the last successful poll.
    pub polled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Error)]
pub enum PollError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Orders(#[from] OrderError),
}

/// Fetches the orders for `scope` and reconciles them into the board at `now`.
pub async fn poll_once(
    backend: &dyn Backend,
    orders: &OrderClient,
    scope: &OrderScope,
    now: DateTime<Utc>,
) -> Result<Vec<Order>, PollError> {
    let snapshots = match scope {
        OrderScope::Customer { user_id } => backend.fetch_customer_orders(*user_id).await?,
        OrderScope::Restaurant { document_id } => {
            backend.fetch_restaurant_orders(document_id).await?
        }
    };
    Ok(orders.reconcile(snapshots, now).await?)
}

/// Handle to a running poll task. Dropping it stops the task.
pub struct OrderPoller {
    view: watch::Receiver<OrderView>,
    trigger: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl OrderPoller {
    /// Starts polling immediately, then every `interval`.
    pub fn spawn(
        backend: Arc<dyn Backend>,
        orders: OrderClient,
        scope: OrderScope,
        interval: Duration,
    ) -> Self {
        let (view_tx, view) = watch::channel(OrderView::default());
        // one pending trigger is enough; extra requests coalesce into it
        let (trigger, mut triggers) = mpsc::channel::<()>(1);

        let handle = tokio::spawn(async move {
            info!(?scope, ?interval, "Order poller started");
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    msg = triggers.recv() => {
                        if msg.is_none() {
                            break;
                        }
                        debug!("Poll requested");
                        ticker.reset();
                    }
                }

                let now = Utc::now();
                match poll_once(backend.as_ref(), &orders, &scope, now).await {
                    Ok(active) => {
                        debug!(count = active.len(), "Poll ok");
                        view_tx.send_modify(|view| {
                            view.orders = active;
                            view.last_error = None;
                            view.polled_at = Some(now);
                        });
                    }
                    Err(e) => {
                        warn!(error = %e, "Order poll failed");
                        view_tx.send_modify(|view| view.last_error = Some(e.to_string()));
                    }
                }
            }
            info!("Order poller stopped");
        });

        Self {
            view,
            trigger,
            handle,
        }
    }

    /// Latest published view.
    pub fn view(&self) -> OrderView {
        self.view.borrow().clone()
    }

    /// A receiver that is notified after every poll, successful or not.
    pub fn subscribe(&self) -> watch::Receiver<OrderView> {
        self.view.clone()
    }

    /// Polls now instead of waiting for the next tick.
    pub fn refresh_now(&self) {
        // Full means a poll is already queued.
        let _ = self.trigger.try_send(());
    }

    /// Cancels the poll task. The last view stays readable.
    pub fn stop(&self) {
        self.handle.abort();
    }

    pub fn is_stopped(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for OrderPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
