use serde::{Deserialize, Serialize};

/// The signed-in user, as cached under `userData`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Role name, e.g. `customer` or `admin`.
    #[serde(default)]
    pub role: Option<String>,
}

impl UserProfile {
    pub fn is_customer(&self) -> bool {
        self.role
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case("customer"))
    }
}

/// The admin's restaurant, as cached under `restaurantData`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantProfile {
    #[serde(default)]
    pub id: Option<u64>,
    pub document_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Feedback left by a customer on a served order.
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    /// 1 to 5 stars.
    pub rating: u8,
    pub comment: String,
    pub order_document_id: String,
    pub restaurant_document_id: String,
}

/// A table of a restaurant and the menu link printed on its QR code.
#[derive(Debug, Clone, PartialEq)]
pub struct DiningTable {
    pub id: u64,
    pub document_id: String,
    /// Numbered from 1.
    pub table_number: u32,
    pub qr_code_url: Option<String>,
}
