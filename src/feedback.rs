//! # Feedback Prompt
//!
//! After an order is served the customer is asked once for a rating. The prompt is
//! suppressed when the order already has feedback or when it was shown before on this
//! device (`feedback_shown_<documentId>`).

use crate::backend::{Backend, BackendError, ServedOrder};
use crate::model::Feedback;
use crate::storage::{Session, StorageError};
use thiserror::Error;
use tracing::{debug, info, instrument};

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("Order {0} has no restaurant to attach feedback to")]
    MissingRestaurant(String),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The served order to ask about, if any.
#[instrument(skip(backend, session))]
pub async fn pending_feedback(
    backend: &dyn Backend,
    session: &Session,
    user_id: u64,
) -> Result<Option<ServedOrder>, FeedbackError> {
    let Some(order) = backend.latest_served_order(user_id).await? else {
        return Ok(None);
    };
    if order.feedback_count > 0 {
        debug!(order = %order.document_id, "Order already has feedback");
        return Ok(None);
    }
    if session.feedback_shown(&order.document_id).await? {
        debug!(order = %order.document_id, "Feedback prompt already shown");
        return Ok(None);
    }
    Ok(Some(order))
}

/// Posts the customer's rating and marks the prompt as shown.
#[instrument(skip(backend, session, order, comment), fields(order = %order.document_id))]
pub async fn submit_feedback(
    backend: &dyn Backend,
    session: &Session,
    user_id: u64,
    order: &ServedOrder,
    rating: u8,
    comment: &str,
) -> Result<(), FeedbackError> {
    if !(1..=5).contains(&rating) {
        return Err(FeedbackError::InvalidRating(rating));
    }
    let restaurant = order
        .restaurant
        .as_ref()
        .ok_or_else(|| FeedbackError::MissingRestaurant(order.document_id.clone()))?;

    let feedback = Feedback {
        rating,
        comment: comment.trim().to_string(),
        order_document_id: order.document_id.clone(),
        restaurant_document_id: restaurant.document_id.clone(),
    };
    backend.submit_feedback(user_id, &feedback).await?;
    session.mark_feedback_shown(&order.document_id).await?;
    info!(rating, "Feedback submitted");
    Ok(())
}

/// Closes the prompt without rating; it will not be shown again for this order.
pub async fn dismiss(session: &Session, order_document_id: &str) -> Result<(), FeedbackError> {
    session.mark_feedback_shown(order_document_id).await?;
    Ok(())
}
