//! Wire shapes of the content backend.
//!
//! Records arrive flat (`id`, `documentId`, attributes, populated relations) inside a
//! `{ "data": ... }` envelope. Decimal and integer attributes are accepted either as
//! JSON numbers or as numeric strings, since both show up depending on field type.

use crate::model::{
    DiningTable, MenuItem, OrderId, OrderItem, OrderSnapshot, OrderStatus, RestaurantProfile,
    ValidMenuItem,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use tracing::warn;

/// `{ "data": T }`
#[derive(Debug, Deserialize, Serialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// `{ "error": { "message": .. } }` body of a failed request.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub message: Option<String>,
}

fn lenient_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.as_ref().and_then(lenient_number))
}

fn lenient_u32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value
        .as_ref()
        .and_then(lenient_number)
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n as u32))
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMenuItem {
    pub id: u64,
    #[serde(rename = "documentId", default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub time_for_preparation: Option<u32>,
}

impl From<RawMenuItem> for MenuItem {
    fn from(raw: RawMenuItem) -> Self {
        MenuItem {
            id: raw.id,
            document_id: raw.document_id,
            name: raw.name.unwrap_or_default(),
            price: raw.price.unwrap_or_default(),
            category: raw.category.filter(|c| !c.is_empty()),
            description: raw.description.as_ref().and_then(flatten_rich_text),
            prep_time_minutes: raw.time_for_preparation,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawOrderItem {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub quantity: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub time_for_preparation: Option<u32>,
    #[serde(default)]
    pub menu_item: Option<RawMenuItem>,
}

impl From<RawOrderItem> for OrderItem {
    fn from(raw: RawOrderItem) -> Self {
        let menu = raw.menu_item;
        OrderItem {
            menu_ref: menu.as_ref().and_then(|m| m.document_id.clone()),
            name: menu.as_ref().and_then(|m| m.name.clone()),
            quantity: raw.quantity.unwrap_or(1),
            prep_time_minutes: raw
                .time_for_preparation
                .or_else(|| menu.as_ref().and_then(|m| m.time_for_preparation)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRestaurant {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(rename = "documentId")]
    pub document_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub number_of_tables: Option<u32>,
}

impl From<RawRestaurant> for RestaurantProfile {
    fn from(raw: RawRestaurant) -> Self {
        RestaurantProfile {
            id: raw.id,
            document_id: raw.document_id,
            name: raw.name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTable {
    pub id: u64,
    #[serde(rename = "documentId")]
    pub document_id: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub table_number: Option<u32>,
    #[serde(default)]
    pub qr_code_url: Option<String>,
}

impl From<RawTable> for DiningTable {
    fn from(raw: RawTable) -> Self {
        DiningTable {
            id: raw.id,
            document_id: raw.document_id,
            table_number: raw.table_number.unwrap_or_default(),
            qr_code_url: raw.qr_code_url.filter(|u| !u.is_empty()),
        }
    }
}

/// Any record, when only its identity is needed.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDocument {
    #[serde(rename = "documentId")]
    pub document_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawOrder {
    pub id: u64,
    #[serde(rename = "documentId")]
    pub document_id: String,
    #[serde(default)]
    pub order_status: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_price: Option<f64>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub order_items: Vec<RawOrderItem>,
    #[serde(default)]
    pub feedbacks: Option<Vec<Value>>,
    #[serde(default)]
    pub restaurant: Option<RawRestaurant>,
}

impl From<RawOrder> for OrderSnapshot {
    fn from(raw: RawOrder) -> Self {
        let status = match raw.order_status.as_deref() {
            None | Some("") => OrderStatus::Processing,
            Some(s) => s.parse().unwrap_or_else(|e: String| {
                warn!(id = raw.id, error = %e, "Treating unknown status as processing");
                OrderStatus::Processing
            }),
        };
        OrderSnapshot {
            id: OrderId(raw.id),
            document_id: raw.document_id,
            status,
            total_price: raw.total_price.unwrap_or_default(),
            created_at: raw.created_at,
            items: raw.order_items.into_iter().map(OrderItem::from).collect(),
        }
    }
}

/// Response of the login endpoint.
#[derive(Debug, Deserialize)]
pub struct RawLogin {
    pub jwt: String,
    pub user: crate::model::UserProfile,
    #[serde(default)]
    pub restaurant: Option<RawRestaurant>,
}

/// Flattens a rich-text block list into plain text, one paragraph per line.
///
/// A plain string is returned as is.
pub fn flatten_rich_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Array(blocks) => blocks
            .iter()
            .map(|block| {
                block["children"]
                    .as_array()
                    .map(|children| {
                        children
                            .iter()
                            .filter_map(|c| c["text"].as_str())
                            .collect::<String>()
                    })
                    .unwrap_or_default()
            })
            .collect::<Vec<_>>()
            .join("\n"),
        _ => return None,
    };
    let text = text.trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// Plain text as a single-paragraph rich-text block list.
pub fn rich_text_blocks(text: &str) -> Value {
    json!([{ "type": "paragraph", "children": [{ "type": "text", "text": text }] }])
}

/// `{ "connect": [{ "documentId": .. }] }` relation payload.
pub fn connect(document_id: &str) -> Value {
    json!({ "connect": [{ "documentId": document_id }] })
}

/// Body for creating or updating a menu item.
pub fn menu_item_body(item: &ValidMenuItem, restaurant_document_id: Option<&str>) -> Value {
    let mut data = json!({
        "name": item.name,
        "price": item.price,
        "category": item.category,
        "description": item.description.as_deref().map(rich_text_blocks),
    });
    if let Some(prep) = item.prep_time_minutes {
        data["time_for_preparation"] = json!(prep);
    }
    if let Some(restaurant) = restaurant_document_id {
        data["restaurant"] = connect(restaurant);
    }
    json!({ "data": data })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_parses_with_string_decimals_and_populated_items() {
        let raw: RawOrder = serde_json::from_value(json!({
            "id": 4,
            "documentId": "ord4",
            "order_status": "preparing",
            "total_price": "25.50",
            "createdAt": "2025-06-01T12:00:00.000Z",
            "order_items": [
                { "quantity": 2, "time_for_preparation": null,
                  "menu_item": { "id": 1, "documentId": "m1", "name": "Soup",
                                 "price": 10, "time_for_preparation": "12" } },
                { "quantity": "1" }
            ]
        }))
        .unwrap();

        let snapshot = OrderSnapshot::from(raw);
        assert_eq!(snapshot.id, OrderId(4));
        assert_eq!(snapshot.status, OrderStatus::Preparing);
        assert_eq!(snapshot.total_price, 25.5);
        assert_eq!(snapshot.items[0].prep_time_minutes, Some(12));
        assert_eq!(snapshot.items[0].menu_ref.as_deref(), Some("m1"));
        assert_eq!(snapshot.items[1].quantity, 1);
        assert_eq!(snapshot.items[1].prep_time_minutes, None);
    }

    #[test]
    fn missing_or_unknown_status_reads_as_processing() {
        let raw: RawOrder = serde_json::from_value(json!({
            "id": 1, "documentId": "d", "createdAt": "2025-06-01T12:00:00Z",
            "order_status": "cancelled"
        }))
        .unwrap();
        assert_eq!(OrderSnapshot::from(raw).status, OrderStatus::Processing);
    }

    #[test]
    fn table_count_accepts_numeric_strings() {
        let raw: RawRestaurant = serde_json::from_value(json!({
            "id": 2, "documentId": "r1", "name": "Forkcast", "number_of_tables": "6"
        }))
        .unwrap();
        assert_eq!(raw.number_of_tables, Some(6));

        let raw: RawRestaurant =
            serde_json::from_value(json!({ "documentId": "r1", "number_of_tables": null })).unwrap();
        assert_eq!(raw.number_of_tables, None);
    }

    #[test]
    fn rich_text_flattens_to_lines() {
        let blocks = json!([
            { "type": "paragraph", "children": [{ "type": "text", "text": "Hot " },
                                                 { "type": "text", "text": "soup" }] },
            { "type": "paragraph", "children": [{ "type": "text", "text": "Vegan" }] }
        ]);
        assert_eq!(flatten_rich_text(&blocks).as_deref(), Some("Hot soup\nVegan"));
        assert_eq!(flatten_rich_text(&json!("plain")).as_deref(), Some("plain"));
        assert_eq!(flatten_rich_text(&json!([])), None);
        assert_eq!(flatten_rich_text(&rich_text_blocks("x")).as_deref(), Some("x"));
    }

    #[test]
    fn menu_item_body_links_restaurant() {
        let item = ValidMenuItem {
            name: "Soup".into(),
            price: 4.5,
            category: None,
            description: Some("Hot".into()),
            prep_time_minutes: Some(15),
        };
        let body = menu_item_body(&item, Some("rest1"));
        assert_eq!(body["data"]["restaurant"]["connect"][0]["documentId"], "rest1");
        assert_eq!(body["data"]["time_for_preparation"], 15);
        assert_eq!(body["data"]["description"][0]["children"][0]["text"], "Hot");
    }
}
