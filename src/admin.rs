//! Restaurant-side operations: maintaining the menu and tables, serving orders.

use crate::backend::{Backend, BackendError};
use crate::clients::OrderClient;
use crate::framework::ActorClient;
use crate::model::{DiningTable, MenuItem, MenuItemDraft, ValidationError};
use crate::order_actor::OrderError;
use crate::qr::table_menu_link;
use thiserror::Error;
use tracing::{debug, info, instrument};

#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Orders(#[from] OrderError),

    /// The restaurant has no `number_of_tables` set, or it is zero.
    #[error("Failed to retrieve the number of tables.")]
    MissingTableCount,
}

/// Tables of a restaurant after [`provision_tables`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionedTables {
    /// Ordered by table number.
    pub tables: Vec<DiningTable>,
    /// False when the existing tables already matched the configured count.
    pub regenerated: bool,
}

/// Validates the form and creates the item, or updates `existing_document_id`.
///
/// Nothing is sent when validation fails.
#[instrument(skip(backend, draft))]
pub async fn save_menu_item(
    backend: &dyn Backend,
    restaurant_document_id: &str,
    existing_document_id: Option<&str>,
    draft: &MenuItemDraft,
) -> Result<MenuItem, AdminError> {
    let item = draft.validate()?;
    let saved = match existing_document_id {
        Some(document_id) => backend.update_menu_item(document_id, &item).await?,
        None => backend.create_menu_item(restaurant_document_id, &item).await?,
    };
    info!(id = saved.id, name = %saved.name, "Menu item saved");
    Ok(saved)
}

#[instrument(skip(backend))]
pub async fn delete_menu_item(backend: &dyn Backend, document_id: &str) -> Result<(), AdminError> {
    backend.delete_menu_item(document_id).await?;
    info!("Menu item deleted");
    Ok(())
}

/// Makes the restaurant's tables match its `number_of_tables`.
///
/// Existing tables are kept when their count already matches. Otherwise all of them
/// are deleted and tables `1..=N` are created, each with the menu link for its QR code
/// rooted at `link_base`.
#[instrument(skip(backend))]
pub async fn provision_tables(
    backend: &dyn Backend,
    link_base: &str,
    restaurant_document_id: &str,
) -> Result<ProvisionedTables, AdminError> {
    let count = backend
        .fetch_table_count(restaurant_document_id)
        .await?
        .filter(|n| *n > 0)
        .ok_or(AdminError::MissingTableCount)?;

    let existing = backend.fetch_tables(restaurant_document_id).await?;
    if existing.len() == count as usize {
        debug!(count, "Tables already provisioned");
        return Ok(ProvisionedTables {
            tables: by_number(existing),
            regenerated: false,
        });
    }

    for table in &existing {
        backend.delete_table(&table.document_id).await?;
    }
    for number in 1..=count {
        let url = table_menu_link(link_base, restaurant_document_id, number);
        backend
            .create_table(restaurant_document_id, number, &url)
            .await?;
    }
    let tables = by_number(backend.fetch_tables(restaurant_document_id).await?);
    info!(removed = existing.len(), created = count, "Tables regenerated");
    Ok(ProvisionedTables {
        tables,
        regenerated: true,
    })
}

fn by_number(mut tables: Vec<DiningTable>) -> Vec<DiningTable> {
    tables.sort_by_key(|t| t.table_number);
    tables
}

/// Marks an order served on the backend and takes it off the local board.
#[instrument(skip(backend, orders))]
pub async fn serve_order(
    backend: &dyn Backend,
    orders: &OrderClient,
    document_id: &str,
) -> Result<(), AdminError> {
    backend.mark_order_served(document_id).await?;
    let tracked = orders
        .active_orders()
        .await?
        .into_iter()
        .find(|o| o.document_id == document_id);
    if let Some(order) = tracked {
        match orders.delete(order.id).await {
            Ok(()) | Err(OrderError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }
    info!("Order served");
    Ok(())
}
