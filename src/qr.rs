//! Scanned table QR codes.
//!
//! A table's code encodes the backend URL of its restaurant's menu. Customers who are
//! not signed in get the link stashed under `pendingMenuURL`, to be opened after login
//! via [`Session::take_pending_menu_url`].
//!
//! Links are built by [`table_menu_link`] and carry the restaurant's document id plus
//! `table=<number>`, which [`remember_location`] turns back into a dining location.

use crate::backend::{Backend, BackendError};
use crate::storage::{Session, StorageError};
use reqwest::Url;
use thiserror::Error;
use tracing::{debug, info};

const RESTAURANT_FILTER: &str = "filters[restaurant][documentId][$eq]";

/// What to do with a scanned code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QrOutcome {
    /// Show the menu behind this link.
    OpenMenu(String),
    /// The link was stored; the user must sign in as a customer first.
    LoginRequired,
}

#[derive(Debug, Error)]
pub enum QrError {
    #[error("The scanned QR code is not valid: {0:?}")]
    Invalid(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Restaurant and table read back from a menu link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuLink {
    pub restaurant_document_id: String,
    pub table_number: Option<u32>,
}

/// The menu link printed on table `table_number`'s QR code.
pub fn table_menu_link(base_url: &str, restaurant_document_id: &str, table_number: u32) -> String {
    format!(
        "{}/api/menu-items?{RESTAURANT_FILTER}={restaurant_document_id}&table={table_number}",
        base_url.trim_end_matches('/')
    )
}

/// Reads the restaurant filter and table number out of a menu link.
pub fn parse_menu_link(data: &str) -> Option<MenuLink> {
    let url = Url::parse(data.trim()).ok()?;
    let mut restaurant = None;
    let mut table_number = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            RESTAURANT_FILTER if !value.is_empty() => restaurant = Some(value.into_owned()),
            "table" => table_number = value.parse().ok(),
            _ => {}
        }
    }
    Some(MenuLink {
        restaurant_document_id: restaurant?,
        table_number,
    })
}

/// Whether scanned data looks like a backend menu link.
pub fn is_menu_link(data: &str) -> bool {
    data.contains("http") && data.contains("/api/")
}

pub async fn handle_scan(session: &Session, data: &str) -> Result<QrOutcome, QrError> {
    let data = data.trim();
    if !is_menu_link(data) {
        return Err(QrError::Invalid(data.to_string()));
    }

    let signed_in = session.token().await?.is_some();
    let is_customer = session.user().await?.is_some_and(|u| u.is_customer());
    if signed_in && is_customer {
        return Ok(QrOutcome::OpenMenu(data.to_string()));
    }

    session.set_pending_menu_url(data).await?;
    info!("Menu link stored until login");
    Ok(QrOutcome::LoginRequired)
}

/// Stores the restaurant and table a scanned link points at.
///
/// The link carries the table's number; its document id is looked up among the
/// restaurant's tables. Returns the stored `(restaurant, table)` document ids, or
/// `None` when the link names no table or the table does not exist.
pub async fn remember_location(
    backend: &dyn Backend,
    session: &Session,
    data: &str,
) -> Result<Option<(String, String)>, QrError> {
    let Some(MenuLink {
        restaurant_document_id,
        table_number: Some(number),
    }) = parse_menu_link(data)
    else {
        return Ok(None);
    };
    let table = backend
        .fetch_tables(&restaurant_document_id)
        .await?
        .into_iter()
        .find(|t| t.table_number == number);
    let Some(table) = table else {
        debug!(restaurant = %restaurant_document_id, number, "Scanned table is unknown");
        return Ok(None);
    };
    session
        .set_dining_location(&restaurant_document_id, &table.document_id)
        .await?;
    info!(restaurant = %restaurant_document_id, table = number, "Dining location set");
    Ok(Some((restaurant_document_id, table.document_id)))
}
