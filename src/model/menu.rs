//! Menu items and the admin-side menu item form.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest prep time the menu form accepts, in minutes.
pub const MAX_PREP_MINUTES: u32 = 240;

/// A dish on a restaurant's menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: u64,
    /// Backend document id, used when linking order items to the menu.
    pub document_id: Option<String>,
    pub name: String,
    pub price: f64,
    pub category: Option<String>,
    pub description: Option<String>,
    pub prep_time_minutes: Option<u32>,
}

/// Raw text fields of the menu item form, as typed by the admin.
#[derive(Debug, Clone, Default)]
pub struct MenuItemDraft {
    pub name: String,
    pub price: String,
    pub category: String,
    pub description: String,
    pub prep_time: String,
}

/// A draft that passed validation and can be sent to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidMenuItem {
    pub name: String,
    pub price: f64,
    pub category: Option<String>,
    pub description: Option<String>,
    pub prep_time_minutes: Option<u32>,
}

/// Reasons a menu item form is rejected before any request is made.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("Please enter at least name and price")]
    MissingRequired,

    #[error("Price must be a positive number, got {0:?}")]
    InvalidPrice(String),

    #[error("Preparation time must be between 1 and {MAX_PREP_MINUTES} minutes, got {0:?}")]
    InvalidPrepTime(String),
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

impl MenuItemDraft {
    pub fn validate(&self) -> Result<ValidMenuItem, ValidationError> {
        let name = non_empty(&self.name).ok_or(ValidationError::MissingRequired)?;
        let raw_price = non_empty(&self.price).ok_or(ValidationError::MissingRequired)?;

        let price = raw_price
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite() && *p > 0.0)
            .ok_or_else(|| ValidationError::InvalidPrice(raw_price.clone()))?;

        let prep_time_minutes = match non_empty(&self.prep_time) {
            None => None,
            Some(raw) => Some(
                raw.parse::<u32>()
                    .ok()
                    .filter(|m| (1..=MAX_PREP_MINUTES).contains(m))
                    .ok_or(ValidationError::InvalidPrepTime(raw))?,
            ),
        };

        Ok(ValidMenuItem {
            name,
            price,
            category: non_empty(&self.category),
            description: non_empty(&self.description),
            prep_time_minutes,
        })
    }
}
