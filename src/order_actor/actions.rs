//! Custom actions for the Order actor.

use chrono::{DateTime, Utc};

/// Order operations beyond plain CRUD.
#[derive(Debug, Clone, Copy)]
pub enum OrderAction {
    /// Re-applies the status reducer at `now` without new server data.
    ///
    /// Answers with the resulting [`Projection`](crate::status::Projection).
    Refresh { now: DateTime<Utc> },
}
