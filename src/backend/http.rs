use super::dto::{
    connect, menu_item_body, Envelope, ErrorBody, RawDocument, RawLogin, RawMenuItem, RawOrder,
    RawRestaurant, RawTable,
};
use super::{
    customer_view, restaurant_view, Backend, BackendError, LoginSession, OrderDraft,
    OrderItemDraft, Registration, ServedOrder,
};
use crate::model::{DiningTable, Feedback, MenuItem, OrderSnapshot, OrderStatus, ValidMenuItem};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, instrument, warn};

const POPULATE_ITEMS: (&str, &str) = ("populate[order_items][populate]", "menu_item");

/// [`Backend`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
            token: None,
        }
    }

    /// Sends `Authorization: Bearer <token>` with every request.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, BackendError> {
        let response = self.authorized(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = match response.json::<ErrorBody>().await {
            Ok(ErrorBody {
                error: Some(detail),
            }) => detail.message,
            _ => None,
        }
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
        warn!(status = status.as_u16(), %message, "Backend request failed");
        Err(BackendError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn read_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        let bytes = self.send(request).await?.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| BackendError::Malformed(e.to_string()))
    }

    async fn fetch_orders(&self, filter: (&str, String)) -> Result<Vec<OrderSnapshot>, BackendError> {
        let request = self
            .http
            .get(self.url("/api/orders"))
            .query(&[(filter.0, filter.1.as_str()), POPULATE_ITEMS]);
        let body: Envelope<Vec<RawOrder>> = self.read_json(request).await?;
        Ok(body.data.into_iter().map(OrderSnapshot::from).collect())
    }
}

#[async_trait]
impl Backend for HttpBackend {
    #[instrument(skip(self, password))]
    async fn login(&self, identifier: &str, password: &str) -> Result<LoginSession, BackendError> {
        let request = self
            .http
            .post(self.url("/api/auth/local/custom-login"))
            .json(&json!({ "identifier": identifier, "password": password }));
        let body: RawLogin = self.read_json(request).await?;
        Ok(LoginSession {
            token: body.jwt,
            user: body.user,
            restaurant: body.restaurant.map(Into::into),
        })
    }

    #[instrument(skip(self, registration), fields(username = %registration.username, role = %registration.role))]
    async fn register(&self, registration: &Registration) -> Result<(), BackendError> {
        let request = self
            .http
            .post(self.url("/api/auth/custom-register"))
            .json(&json!({
                "username": registration.username,
                "email": registration.email,
                "password": registration.password,
                "role": registration.role,
            }));
        self.send(request).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn fetch_customer_orders(&self, user_id: u64) -> Result<Vec<OrderSnapshot>, BackendError> {
        let orders = self
            .fetch_orders(("filters[user][id][$eq]", user_id.to_string()))
            .await?;
        debug!(count = orders.len(), "Fetched customer orders");
        Ok(customer_view(orders))
    }

    #[instrument(skip(self))]
    async fn fetch_restaurant_orders(
        &self,
        restaurant_document_id: &str,
    ) -> Result<Vec<OrderSnapshot>, BackendError> {
        let orders = self
            .fetch_orders((
                "filters[restaurant][documentId][$eq]",
                restaurant_document_id.to_string(),
            ))
            .await?;
        debug!(count = orders.len(), "Fetched restaurant orders");
        Ok(restaurant_view(orders))
    }

    #[instrument(skip(self))]
    async fn mark_order_served(&self, document_id: &str) -> Result<(), BackendError> {
        let request = self
            .http
            .put(self.url(&format!("/api/orders/{document_id}")))
            .json(&json!({ "data": { "order_status": OrderStatus::Served } }));
        self.send(request).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn create_order(&self, draft: &OrderDraft) -> Result<String, BackendError> {
        let request = self.http.post(self.url("/api/orders")).json(&json!({
            "data": {
                "user": draft.user_id,
                "restaurant": connect(&draft.restaurant_document_id),
                "table": connect(&draft.table_document_id),
                "total_price": draft.total_price,
                "stripe_payment_id": draft.payment_reference,
                "order_status": OrderStatus::Processing,
                "payment_status": "paid",
            }
        }));
        let body: Envelope<RawDocument> = self.read_json(request).await?;
        Ok(body.data.document_id)
    }

    #[instrument(skip(self))]
    async fn create_order_item(&self, draft: &OrderItemDraft) -> Result<(), BackendError> {
        let request = self.http.post(self.url("/api/order-items")).json(&json!({
            "data": {
                "quantity": draft.quantity,
                "unit_price": draft.unit_price,
                "time_for_preparation": draft.prep_time_minutes,
                "menu_item": connect(&draft.menu_document_id),
                "order": connect(&draft.order_document_id),
            }
        }));
        self.send(request).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn fetch_menu(&self, restaurant_document_id: &str) -> Result<Vec<MenuItem>, BackendError> {
        let request = self
            .http
            .get(self.url("/api/menu-items"))
            .query(&[("filters[restaurant][documentId][$eq]", restaurant_document_id)]);
        let body: Envelope<Vec<RawMenuItem>> = self.read_json(request).await?;
        Ok(body.data.into_iter().map(MenuItem::from).collect())
    }

    #[instrument(skip(self))]
    async fn fetch_menu_from_link(&self, url: &str) -> Result<Vec<MenuItem>, BackendError> {
        let body: Envelope<Vec<RawMenuItem>> = self.read_json(self.http.get(url)).await?;
        Ok(body.data.into_iter().map(MenuItem::from).collect())
    }

    #[instrument(skip(self, item), fields(name = %item.name))]
    async fn create_menu_item(
        &self,
        restaurant_document_id: &str,
        item: &ValidMenuItem,
    ) -> Result<MenuItem, BackendError> {
        let request = self
            .http
            .post(self.url("/api/menu-items"))
            .json(&menu_item_body(item, Some(restaurant_document_id)));
        let body: Envelope<RawMenuItem> = self.read_json(request).await?;
        Ok(body.data.into())
    }

    #[instrument(skip(self, item), fields(name = %item.name))]
    async fn update_menu_item(
        &self,
        document_id: &str,
        item: &ValidMenuItem,
    ) -> Result<MenuItem, BackendError> {
        let request = self
            .http
            .put(self.url(&format!("/api/menu-items/{document_id}")))
            .json(&menu_item_body(item, None));
        let body: Envelope<RawMenuItem> = self.read_json(request).await?;
        Ok(body.data.into())
    }

    #[instrument(skip(self))]
    async fn delete_menu_item(&self, document_id: &str) -> Result<(), BackendError> {
        let request = self
            .http
            .delete(self.url(&format!("/api/menu-items/{document_id}")));
        self.send(request).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn latest_served_order(&self, user_id: u64) -> Result<Option<ServedOrder>, BackendError> {
        let user_id = user_id.to_string();
        let request = self.http.get(self.url("/api/orders")).query(&[
            ("filters[user][id][$eq]", user_id.as_str()),
            ("filters[order_status][$eq]", OrderStatus::Served.as_str()),
            ("sort", "createdAt:desc"),
            ("populate", "feedbacks"),
        ]);
        let body: Envelope<Vec<RawOrder>> = self.read_json(request).await?;
        let Some(latest) = body.data.into_iter().next() else {
            return Ok(None);
        };

        let request = self
            .http
            .get(self.url(&format!("/api/orders/{}", latest.document_id)))
            .query(&[("populate", "restaurant")]);
        let detail: Envelope<RawOrder> = self.read_json(request).await?;

        Ok(Some(ServedOrder {
            document_id: latest.document_id,
            feedback_count: latest.feedbacks.map(|f| f.len()).unwrap_or(0),
            restaurant: detail.data.restaurant.map(Into::into),
        }))
    }

    #[instrument(skip(self, feedback), fields(order = %feedback.order_document_id))]
    async fn submit_feedback(&self, user_id: u64, feedback: &Feedback) -> Result<(), BackendError> {
        let request = self.http.post(self.url("/api/feedbacks")).json(&json!({
            "data": {
                "rating": feedback.rating,
                "comment": feedback.comment,
                "user": user_id,
                "restaurant": connect(&feedback.restaurant_document_id),
                "order": connect(&feedback.order_document_id),
            }
        }));
        self.send(request).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn fetch_table_count(&self, restaurant_document_id: &str) -> Result<Option<u32>, BackendError> {
        let request = self
            .http
            .get(self.url("/api/restaurants"))
            .query(&[("filters[documentId][$eq]", restaurant_document_id)]);
        let body: Envelope<Vec<RawRestaurant>> = self.read_json(request).await?;
        Ok(body.data.into_iter().next().and_then(|r| r.number_of_tables))
    }

    #[instrument(skip(self))]
    async fn fetch_tables(&self, restaurant_document_id: &str) -> Result<Vec<DiningTable>, BackendError> {
        let request = self
            .http
            .get(self.url("/api/tables"))
            .query(&[("filters[restaurant][documentId][$eq]", restaurant_document_id)]);
        let body: Envelope<Vec<RawTable>> = self.read_json(request).await?;
        Ok(body.data.into_iter().map(DiningTable::from).collect())
    }

    #[instrument(skip(self, qr_code_url))]
    async fn create_table(
        &self,
        restaurant_document_id: &str,
        table_number: u32,
        qr_code_url: &str,
    ) -> Result<DiningTable, BackendError> {
        let request = self.http.post(self.url("/api/tables")).json(&json!({
            "data": {
                "table_number": table_number,
                "qr_code_url": qr_code_url,
                "restaurant": connect(restaurant_document_id),
            }
        }));
        let body: Envelope<RawTable> = self.read_json(request).await?;
        Ok(body.data.into())
    }

    #[instrument(skip(self))]
    async fn delete_table(&self, document_id: &str) -> Result<(), BackendError> {
        let request = self.http.delete(self.url(&format!("/api/tables/{document_id}")));
        self.send(request).await?;
        Ok(())
    }
}
