//! # Order Client
//!
//! High-level API for the Order actor: reconciling server snapshots into the local board
//! and re-evaluating display status between polls.

use crate::framework::{ActorClient, FrameworkError, ResourceClient};
use crate::model::{Order, OrderId, OrderReconcile, OrderSnapshot, OrderStatus, TrackOrder};
use crate::order_actor::{OrderAction, OrderError};
use crate::status::Projection;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{debug, info, instrument};

/// Client for interacting with the Order actor.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self { inner }
    }

    /// Starts tracking a single order.
    #[instrument(skip(self, snapshot), fields(id = %snapshot.id))]
    pub async fn track(&self, snapshot: OrderSnapshot, now: DateTime<Utc>) -> Result<OrderId, OrderError> {
        Ok(self.inner.create(TrackOrder { snapshot, now }).await?)
    }

    async fn upsert(&self, snapshot: OrderSnapshot, tracked: bool, now: DateTime<Utc>) -> Result<(), OrderError> {
        let id = snapshot.id;
        if tracked {
            self.inner.update(id, OrderReconcile { snapshot, now }).await?;
            return Ok(());
        }
        match self.inner.create(TrackOrder { snapshot: snapshot.clone(), now }).await {
            Ok(_) => Ok(()),
            // tracked by a concurrent reconcile since we listed
            Err(FrameworkError::AlreadyExists(_)) => {
                self.inner.update(id, OrderReconcile { snapshot, now }).await?;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Applies a fresh server response to the board and returns the active view.
    ///
    /// Server data overwrites each tracked order. Orders the server reports as served,
    /// or no longer reports at all, leave the board.
    #[instrument(skip(self, snapshots), fields(count = snapshots.len()))]
    pub async fn reconcile(
        &self,
        snapshots: Vec<OrderSnapshot>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Order>, OrderError> {
        let tracked: HashSet<OrderId> = self.list().await?.into_iter().map(|o| o.id).collect();
        let mut seen = HashSet::with_capacity(snapshots.len());

        for snapshot in snapshots {
            let id = snapshot.id;
            seen.insert(id);
            if snapshot.status == OrderStatus::Served {
                if tracked.contains(&id) {
                    info!(%id, "Order served");
                    self.delete(id).await?;
                }
                continue;
            }
            self.upsert(snapshot, tracked.contains(&id), now).await?;
        }

        for id in tracked.difference(&seen) {
            debug!(%id, "Order no longer reported");
            self.delete(*id).await?;
        }

        self.active_orders().await
    }

    /// Re-evaluates one order at `now`.
    #[instrument(skip(self))]
    pub async fn refresh(&self, id: OrderId, now: DateTime<Utc>) -> Result<Projection, OrderError> {
        Ok(self.inner.perform_action(id, OrderAction::Refresh { now }).await?)
    }

    /// Re-evaluates every tracked order at `now` and returns the active view.
    #[instrument(skip(self))]
    pub async fn refresh_all(&self, now: DateTime<Utc>) -> Result<Vec<Order>, OrderError> {
        for order in self.list().await? {
            match self.refresh(order.id, now).await {
                Ok(_) | Err(OrderError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        self.active_orders().await
    }

    /// Tracked orders, oldest first.
    pub async fn active_orders(&self) -> Result<Vec<Order>, OrderError> {
        let mut orders = self.list().await?;
        orders.sort_by_key(|o| (o.created_at, o.id));
        Ok(orders)
    }
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        e.into()
    }
}
