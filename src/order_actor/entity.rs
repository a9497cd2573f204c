//! [`ActorEntity`] implementation for [`Order`].
//!
//! Identity comes from the backend: the create payload carries the order's id, so a
//! poll that sees the same order twice updates it instead of tracking a copy.

use super::actions::OrderAction;
use super::error::OrderError;
use crate::framework::ActorEntity;
use crate::model::{Order, OrderId, OrderReconcile, TrackOrder};
use crate::status::{Projection, StatusPolicy};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

impl Order {
    /// Folds the server status and the time-based projection at `now` into the
    /// displayed status. Neither status nor progress ever goes backwards.
    fn evaluate(&mut self, policy: &StatusPolicy, now: DateTime<Utc>) -> Projection {
        let current = self.status.max(self.server_status);
        let projection = policy.advance(current, self.created_at, &self.items, now);
        if projection.status != self.status {
            debug!(id = %self.id, from = %self.status, to = %projection.status, "Status advanced");
        }
        self.status = projection.status;
        self.progress_percent = self.progress_percent.max(projection.progress_percent);
        if now > self.observed_at {
            self.observed_at = now;
        }
        Projection {
            progress_percent: self.progress_percent,
            ..projection
        }
    }
}

#[async_trait]
impl ActorEntity for Order {
    type Id = OrderId;
    type Create = TrackOrder;
    type Update = OrderReconcile;
    type Action = OrderAction;
    type ActionResult = Projection;
    type Context = StatusPolicy;
    type Error = OrderError;

    fn assigned_id(params: &TrackOrder) -> Option<OrderId> {
        Some(params.snapshot.id)
    }

    fn from_create_params(id: OrderId, params: TrackOrder) -> Result<Self, OrderError> {
        if id != params.snapshot.id {
            return Err(OrderError::SnapshotMismatch {
                expected: id,
                got: params.snapshot.id,
            });
        }
        Ok(Order::from_snapshot(params.snapshot, params.now))
    }

    async fn on_create(&mut self, policy: &StatusPolicy) -> Result<(), OrderError> {
        let now = self.observed_at;
        self.evaluate(policy, now);
        Ok(())
    }

    /// Server data overwrites the local copy, then the reducer runs again.
    async fn on_update(&mut self, update: OrderReconcile, policy: &StatusPolicy) -> Result<(), OrderError> {
        if update.snapshot.id != self.id {
            return Err(OrderError::SnapshotMismatch {
                expected: self.id,
                got: update.snapshot.id,
            });
        }
        self.overwrite(update.snapshot, update.now);
        self.evaluate(policy, update.now);
        Ok(())
    }

    async fn handle_action(&mut self, action: OrderAction, policy: &StatusPolicy) -> Result<Projection, OrderError> {
        match action {
            OrderAction::Refresh { now } => Ok(self.evaluate(policy, now)),
        }
    }
}
