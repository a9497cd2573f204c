use super::{
    customer_view, restaurant_view, Backend, BackendError, LoginSession, OrderDraft,
    OrderItemDraft, Registration, ServedOrder,
};
use crate::model::{
    DiningTable, Feedback, MenuItem, OrderId, OrderItem, OrderSnapshot, OrderStatus,
    RestaurantProfile, UserProfile, ValidMenuItem,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// An order held by [`MemoryBackend`] with the relations the queries filter on.
#[derive(Debug, Clone)]
pub struct StoredOrder {
    pub snapshot: OrderSnapshot,
    pub user_id: u64,
    pub restaurant_document_id: String,
    pub table_document_id: Option<String>,
    pub payment_reference: Option<String>,
}

#[derive(Debug, Default)]
struct State {
    orders: Vec<StoredOrder>,
    order_items: Vec<OrderItemDraft>,
    menu: Vec<(String, MenuItem)>,
    restaurants: HashMap<String, RestaurantProfile>,
    feedback: Vec<(u64, Feedback)>,
    accounts: HashMap<String, (String, LoginSession)>,
    table_counts: HashMap<String, u32>,
    tables: Vec<(String, DiningTable)>,
    fail_next: Vec<(u16, String)>,
    next_id: u64,
    requests: usize,
}

/// In-process [`Backend`] with the same filtering rules as the HTTP backend.
///
/// Failures can be queued with [`MemoryBackend::fail_next`]; each queued failure is
/// returned by exactly one subsequent call.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Counts the request and pops a queued failure, if any.
    fn begin(&self) -> Result<MutexGuard<'_, State>, BackendError> {
        let mut state = self.lock();
        state.requests += 1;
        if !state.fail_next.is_empty() {
            let (status, message) = state.fail_next.remove(0);
            return Err(BackendError::Status { status, message });
        }
        Ok(state)
    }

    fn next_id(state: &mut State) -> u64 {
        state.next_id += 1;
        state.next_id
    }

    pub fn insert_order(
        &self,
        user_id: u64,
        restaurant_document_id: impl Into<String>,
        snapshot: OrderSnapshot,
    ) {
        let mut state = self.lock();
        state.next_id = state.next_id.max(snapshot.id.0);
        state.orders.push(StoredOrder {
            snapshot,
            user_id,
            restaurant_document_id: restaurant_document_id.into(),
            table_document_id: None,
            payment_reference: None,
        });
    }

    /// Changes an order's status as a kitchen would.
    pub fn set_status(&self, document_id: &str, status: OrderStatus) {
        let mut state = self.lock();
        if let Some(order) = state
            .orders
            .iter_mut()
            .find(|o| o.snapshot.document_id == document_id)
        {
            order.snapshot.status = status;
        }
    }

    pub fn remove_order(&self, document_id: &str) {
        self.lock()
            .orders
            .retain(|o| o.snapshot.document_id != document_id);
    }

    pub fn add_restaurant(&self, restaurant: RestaurantProfile) {
        self.lock()
            .restaurants
            .insert(restaurant.document_id.clone(), restaurant);
    }

    pub fn add_menu_item(&self, restaurant_document_id: impl Into<String>, item: MenuItem) {
        self.lock().menu.push((restaurant_document_id.into(), item));
    }

    pub fn add_account(&self, identifier: &str, password: &str, session: LoginSession) {
        self.lock()
            .accounts
            .insert(identifier.to_string(), (password.to_string(), session));
    }

    /// Sets the restaurant's `number_of_tables`.
    pub fn set_table_count(&self, restaurant_document_id: impl Into<String>, count: u32) {
        self.lock()
            .table_counts
            .insert(restaurant_document_id.into(), count);
    }

    pub fn tables(&self) -> Vec<DiningTable> {
        self.lock().tables.iter().map(|(_, t)| t.clone()).collect()
    }

    /// Makes the next call fail with a 503 carrying `message`.
    pub fn fail_next(&self, message: impl Into<String>) {
        self.lock().fail_next.push((503, message.into()));
    }

    pub fn orders(&self) -> Vec<StoredOrder> {
        self.lock().orders.clone()
    }

    pub fn order_items(&self) -> Vec<OrderItemDraft> {
        self.lock().order_items.clone()
    }

    pub fn feedback(&self) -> Vec<Feedback> {
        self.lock().feedback.iter().map(|(_, f)| f.clone()).collect()
    }

    pub fn menu(&self) -> Vec<MenuItem> {
        self.lock().menu.iter().map(|(_, m)| m.clone()).collect()
    }

    /// Number of calls made through the [`Backend`] trait.
    pub fn request_count(&self) -> usize {
        self.lock().requests
    }
}

fn not_found(what: &str) -> BackendError {
    BackendError::Status {
        status: 404,
        message: format!("{what} not found"),
    }
}

fn menu_item(id: u64, document_id: String, item: &ValidMenuItem) -> MenuItem {
    MenuItem {
        id,
        document_id: Some(document_id),
        name: item.name.clone(),
        price: item.price,
        category: item.category.clone(),
        description: item.description.clone(),
        prep_time_minutes: item.prep_time_minutes,
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn login(&self, identifier: &str, password: &str) -> Result<LoginSession, BackendError> {
        let state = self.begin()?;
        match state.accounts.get(identifier) {
            Some((expected, session)) if expected == password => Ok(session.clone()),
            _ => Err(BackendError::Status {
                status: 400,
                message: "Invalid identifier or password".into(),
            }),
        }
    }

    /// Registered accounts can log in with their email or username.
    async fn register(&self, registration: &Registration) -> Result<(), BackendError> {
        let mut state = self.begin()?;
        let taken = [&registration.email, &registration.username]
            .iter()
            .any(|identifier| state.accounts.contains_key(identifier.as_str()));
        if taken {
            return Err(BackendError::Status {
                status: 400,
                message: "Email or Username are already taken".into(),
            });
        }
        let id = Self::next_id(&mut state);
        let session = LoginSession {
            token: format!("jwt-{id}"),
            user: UserProfile {
                id,
                username: Some(registration.username.clone()),
                email: Some(registration.email.clone()),
                role: Some(registration.role.clone()),
            },
            restaurant: None,
        };
        for identifier in [&registration.email, &registration.username] {
            state.accounts.insert(
                identifier.clone(),
                (registration.password.clone(), session.clone()),
            );
        }
        Ok(())
    }

    async fn fetch_customer_orders(&self, user_id: u64) -> Result<Vec<OrderSnapshot>, BackendError> {
        let state = self.begin()?;
        Ok(customer_view(
            state
                .orders
                .iter()
                .filter(|o| o.user_id == user_id)
                .map(|o| o.snapshot.clone())
                .collect(),
        ))
    }

    async fn fetch_restaurant_orders(
        &self,
        restaurant_document_id: &str,
    ) -> Result<Vec<OrderSnapshot>, BackendError> {
        let state = self.begin()?;
        Ok(restaurant_view(
            state
                .orders
                .iter()
                .filter(|o| o.restaurant_document_id == restaurant_document_id)
                .map(|o| o.snapshot.clone())
                .collect(),
        ))
    }

    async fn mark_order_served(&self, document_id: &str) -> Result<(), BackendError> {
        let mut state = self.begin()?;
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.snapshot.document_id == document_id)
            .ok_or_else(|| not_found("Order"))?;
        order.snapshot.status = OrderStatus::Served;
        Ok(())
    }

    async fn create_order(&self, draft: &OrderDraft) -> Result<String, BackendError> {
        let mut state = self.begin()?;
        let id = Self::next_id(&mut state);
        let document_id = format!("order-doc-{id}");
        state.orders.push(StoredOrder {
            snapshot: OrderSnapshot {
                id: OrderId(id),
                document_id: document_id.clone(),
                status: OrderStatus::Processing,
                total_price: draft.total_price,
                created_at: Utc::now(),
                items: Vec::new(),
            },
            user_id: draft.user_id,
            restaurant_document_id: draft.restaurant_document_id.clone(),
            table_document_id: Some(draft.table_document_id.clone()),
            payment_reference: Some(draft.payment_reference.clone()),
        });
        Ok(document_id)
    }

    async fn create_order_item(&self, draft: &OrderItemDraft) -> Result<(), BackendError> {
        let mut state = self.begin()?;
        let name = state
            .menu
            .iter()
            .find(|(_, m)| m.document_id.as_deref() == Some(draft.menu_document_id.as_str()))
            .map(|(_, m)| m.name.clone());
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.snapshot.document_id == draft.order_document_id)
            .ok_or_else(|| not_found("Order"))?;
        order.snapshot.items.push(OrderItem {
            menu_ref: Some(draft.menu_document_id.clone()),
            name,
            quantity: draft.quantity,
            prep_time_minutes: Some(draft.prep_time_minutes),
        });
        state.order_items.push(draft.clone());
        Ok(())
    }

    async fn fetch_menu(&self, restaurant_document_id: &str) -> Result<Vec<MenuItem>, BackendError> {
        let state = self.begin()?;
        Ok(state
            .menu
            .iter()
            .filter(|(r, _)| r == restaurant_document_id)
            .map(|(_, m)| m.clone())
            .collect())
    }

    /// Returns the menu of every restaurant whose document id appears in the link.
    async fn fetch_menu_from_link(&self, url: &str) -> Result<Vec<MenuItem>, BackendError> {
        let state = self.begin()?;
        Ok(state
            .menu
            .iter()
            .filter(|(r, _)| url.contains(r.as_str()))
            .map(|(_, m)| m.clone())
            .collect())
    }

    async fn create_menu_item(
        &self,
        restaurant_document_id: &str,
        item: &ValidMenuItem,
    ) -> Result<MenuItem, BackendError> {
        let mut state = self.begin()?;
        let id = Self::next_id(&mut state);
        let created = menu_item(id, format!("menu-doc-{id}"), item);
        state
            .menu
            .push((restaurant_document_id.to_string(), created.clone()));
        Ok(created)
    }

    async fn update_menu_item(
        &self,
        document_id: &str,
        item: &ValidMenuItem,
    ) -> Result<MenuItem, BackendError> {
        let mut state = self.begin()?;
        let (_, existing) = state
            .menu
            .iter_mut()
            .find(|(_, m)| m.document_id.as_deref() == Some(document_id))
            .ok_or_else(|| not_found("Menu item"))?;
        *existing = menu_item(existing.id, document_id.to_string(), item);
        Ok(existing.clone())
    }

    async fn delete_menu_item(&self, document_id: &str) -> Result<(), BackendError> {
        let mut state = self.begin()?;
        let before = state.menu.len();
        state
            .menu
            .retain(|(_, m)| m.document_id.as_deref() != Some(document_id));
        if state.menu.len() == before {
            return Err(not_found("Menu item"));
        }
        Ok(())
    }

    async fn latest_served_order(&self, user_id: u64) -> Result<Option<ServedOrder>, BackendError> {
        let state = self.begin()?;
        let latest = state
            .orders
            .iter()
            .filter(|o| o.user_id == user_id && o.snapshot.status == OrderStatus::Served)
            .max_by_key(|o| o.snapshot.created_at);
        Ok(latest.map(|o| ServedOrder {
            document_id: o.snapshot.document_id.clone(),
            feedback_count: state
                .feedback
                .iter()
                .filter(|(_, f)| f.order_document_id == o.snapshot.document_id)
                .count(),
            restaurant: Some(
                state
                    .restaurants
                    .get(&o.restaurant_document_id)
                    .cloned()
                    .unwrap_or_else(|| RestaurantProfile {
                        id: None,
                        document_id: o.restaurant_document_id.clone(),
                        name: None,
                    }),
            ),
        }))
    }

    async fn submit_feedback(&self, user_id: u64, feedback: &Feedback) -> Result<(), BackendError> {
        let mut state = self.begin()?;
        state.feedback.push((user_id, feedback.clone()));
        Ok(())
    }

    async fn fetch_table_count(&self, restaurant_document_id: &str) -> Result<Option<u32>, BackendError> {
        let state = self.begin()?;
        Ok(state.table_counts.get(restaurant_document_id).copied())
    }

    async fn fetch_tables(&self, restaurant_document_id: &str) -> Result<Vec<DiningTable>, BackendError> {
        let state = self.begin()?;
        Ok(state
            .tables
            .iter()
            .filter(|(r, _)| r == restaurant_document_id)
            .map(|(_, t)| t.clone())
            .collect())
    }

    async fn create_table(
        &self,
        restaurant_document_id: &str,
        table_number: u32,
        qr_code_url: &str,
    ) -> Result<DiningTable, BackendError> {
        let mut state = self.begin()?;
        let id = Self::next_id(&mut state);
        let table = DiningTable {
            id,
            document_id: format!("table-doc-{id}"),
            table_number,
            qr_code_url: Some(qr_code_url.to_string()),
        };
        state
            .tables
            .push((restaurant_document_id.to_string(), table.clone()));
        Ok(table)
    }

    async fn delete_table(&self, document_id: &str) -> Result<(), BackendError> {
        let mut state = self.begin()?;
        let before = state.tables.len();
        state.tables.retain(|(_, t)| t.document_id != document_id);
        if state.tables.len() == before {
            return Err(not_found("Table"));
        }
        Ok(())
    }
}
