//! # Order Status Reducer
//!
//! Projects an order's display status from how long ago it was placed:
//!
//! ```text
//! elapsed <  grace                 -> processing
//! elapsed <  grace + max prep time -> preparing
//! otherwise                        -> prepared
//! progress = min(100, elapsed / (grace + max prep time) * 100)
//! ```
//!
//! The projection is advisory. [`StatusPolicy::advance`] folds it into the current
//! status so repeated evaluation never moves an order backwards, and `served` only
//! ever comes from the backend.

use crate::model::{OrderItem, OrderStatus, DEFAULT_PREP_MINUTES};
use chrono::{DateTime, Utc};

/// Minutes an order stays `processing` before the kitchen is assumed to start.
pub const DEFAULT_GRACE_MINUTES: u32 = 2;

/// Thresholds used to project status from elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPolicy {
    pub grace_minutes: u32,
    /// Prep time used for items that do not declare one.
    pub default_prep_minutes: u32,
}

impl Default for StatusPolicy {
    fn default() -> Self {
        Self {
            grace_minutes: DEFAULT_GRACE_MINUTES,
            default_prep_minutes: DEFAULT_PREP_MINUTES,
        }
    }
}

/// Result of evaluating an order at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    pub status: OrderStatus,
    pub progress_percent: u8,
    pub elapsed_minutes: i64,
}

impl StatusPolicy {
    /// Longest prep time among `items`; an order without items counts as one default item.
    pub fn max_prep_minutes(&self, items: &[OrderItem]) -> u32 {
        items
            .iter()
            .map(|i| {
                i.prep_time_minutes
                    .filter(|m| *m > 0)
                    .unwrap_or(self.default_prep_minutes)
            })
            .max()
            .unwrap_or(self.default_prep_minutes)
    }

    /// Pure time-based projection, ignoring any status already reached.
    pub fn project(
        &self,
        created_at: DateTime<Utc>,
        max_prep_minutes: u32,
        now: DateTime<Utc>,
    ) -> Projection {
        let elapsed = (now - created_at).num_minutes().max(0);
        let grace = i64::from(self.grace_minutes);
        let countdown = grace + i64::from(max_prep_minutes);

        let status = if elapsed < grace {
            OrderStatus::Processing
        } else if elapsed < countdown {
            OrderStatus::Preparing
        } else {
            OrderStatus::Prepared
        };

        let progress = if countdown <= 0 {
            100
        } else {
            (elapsed * 100 / countdown).min(100)
        };

        Projection {
            status,
            // clamped to 0..=100 above
            progress_percent: progress as u8,
            elapsed_minutes: elapsed,
        }
    }

    /// Projects `items` at `now` and keeps whichever of `current` and the projection is
    /// further along.
    pub fn advance(
        &self,
        current: OrderStatus,
        created_at: DateTime<Utc>,
        items: &[OrderItem],
        now: DateTime<Utc>,
    ) -> Projection {
        let mut projection = self.project(created_at, self.max_prep_minutes(items), now);
        if current >= OrderStatus::Served {
            projection.progress_percent = 100;
        }
        projection.status = projection.status.max(current);
        projection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn item(prep: Option<u32>) -> OrderItem {
        OrderItem {
            menu_ref: None,
            name: None,
            quantity: 1,
            prep_time_minutes: prep,
        }
    }

    fn at(created: DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
        created + Duration::minutes(minutes)
    }

    #[test]
    fn status_follows_grace_then_prep_time() {
        let policy = StatusPolicy::default();
        let created = Utc::now();

        let p = policy.project(created, 10, at(created, 1));
        assert_eq!(p.status, OrderStatus::Processing);

        let p = policy.project(created, 10, at(created, 2));
        assert_eq!(p.status, OrderStatus::Preparing);

        let p = policy.project(created, 10, at(created, 11));
        assert_eq!(p.status, OrderStatus::Preparing);

        let p = policy.project(created, 10, at(created, 12));
        assert_eq!(p.status, OrderStatus::Prepared);
        assert_eq!(p.progress_percent, 100);
    }

    #[test]
    fn progress_is_floored_and_capped() {
        let policy = StatusPolicy::default();
        let created = Utc::now();

        // 5 of 12 minutes -> 41.6%
        assert_eq!(policy.project(created, 10, at(created, 5)).progress_percent, 41);
        assert_eq!(policy.project(created, 10, at(created, 90)).progress_percent, 100);
        // clock skew: order timestamp in the future
        let p = policy.project(created, 10, at(created, -3));
        assert_eq!(p.elapsed_minutes, 0);
        assert_eq!(p.progress_percent, 0);
    }

    #[test]
    fn max_prep_uses_longest_item_and_defaults() {
        let policy = StatusPolicy::default();
        assert_eq!(policy.max_prep_minutes(&[item(Some(5)), item(Some(12))]), 12);
        assert_eq!(policy.max_prep_minutes(&[item(Some(5)), item(None)]), 30);
        assert_eq!(policy.max_prep_minutes(&[item(Some(0))]), 30);
        assert_eq!(policy.max_prep_minutes(&[]), 30);
    }

    #[test]
    fn advance_never_regresses() {
        let policy = StatusPolicy::default();
        let created = Utc::now();
        let items = [item(Some(5))];

        let mut status = OrderStatus::Processing;
        let mut seen = Vec::new();
        // evaluations arrive out of order, as late poll responses can
        for minute in [0, 3, 8, 1, 20, 4, 0] {
            status = policy.advance(status, created, &items, at(created, minute)).status;
            seen.push(status);
        }
        assert!(seen.windows(2).all(|w| w[0] <= w[1]), "{seen:?}");
        assert_eq!(status, OrderStatus::Prepared);
    }

    #[test]
    fn served_is_terminal() {
        let policy = StatusPolicy::default();
        let created = Utc::now();
        let p = policy.advance(OrderStatus::Served, created, &[item(Some(30))], created);
        assert_eq!(p.status, OrderStatus::Served);
        assert_eq!(p.progress_percent, 100);
    }
}
