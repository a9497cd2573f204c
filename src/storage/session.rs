use super::{keys, LocalStore, StorageError};
use crate::model::{RestaurantProfile, UserProfile};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::warn;

/// Typed view over the session keys kept in a [`LocalStore`].
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn LocalStore>,
}

impl Session {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn LocalStore> {
        &self.store
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key, error = %e, "Ignoring malformed stored value");
                Ok(None)
            }
        }
    }

    pub async fn token(&self) -> Result<Option<String>, StorageError> {
        self.store.get(keys::AUTH_TOKEN).await
    }

    pub async fn user(&self) -> Result<Option<UserProfile>, StorageError> {
        self.get_json(keys::USER_PROFILE).await
    }

    pub async fn restaurant(&self) -> Result<Option<RestaurantProfile>, StorageError> {
        self.get_json(keys::RESTAURANT_PROFILE).await
    }

    /// Stores the token and profile returned by a successful login.
    pub async fn sign_in(&self, token: String, user: &UserProfile) -> Result<(), StorageError> {
        self.store.set(keys::AUTH_TOKEN, token).await?;
        self.store
            .set(keys::USER_PROFILE, serde_json::to_string(user)?)
            .await
    }

    pub async fn sign_out(&self) -> Result<(), StorageError> {
        for key in [
            keys::AUTH_TOKEN,
            keys::USER_PROFILE,
            keys::RESTAURANT_PROFILE,
        ] {
            self.store.remove(key).await?;
        }
        Ok(())
    }

    pub async fn set_restaurant(&self, restaurant: &RestaurantProfile) -> Result<(), StorageError> {
        self.store
            .set(keys::RESTAURANT_PROFILE, serde_json::to_string(restaurant)?)
            .await
    }

    pub async fn clear_restaurant(&self) -> Result<(), StorageError> {
        self.store.remove(keys::RESTAURANT_PROFILE).await
    }

    /// Restaurant and table the customer is ordering from.
    pub async fn dining_location(&self) -> Result<(Option<String>, Option<String>), StorageError> {
        let restaurant = self.store.get(keys::RESTAURANT_DOCUMENT_ID).await?;
        let table = self.store.get(keys::TABLE_DOCUMENT_ID).await?;
        Ok((restaurant, table))
    }

    pub async fn set_dining_location(
        &self,
        restaurant_document_id: &str,
        table_document_id: &str,
    ) -> Result<(), StorageError> {
        self.store
            .set(keys::RESTAURANT_DOCUMENT_ID, restaurant_document_id.to_string())
            .await?;
        self.store
            .set(keys::TABLE_DOCUMENT_ID, table_document_id.to_string())
            .await
    }

    pub async fn pending_menu_url(&self) -> Result<Option<String>, StorageError> {
        self.store.get(keys::PENDING_MENU_URL).await
    }

    pub async fn set_pending_menu_url(&self, url: &str) -> Result<(), StorageError> {
        self.store.set(keys::PENDING_MENU_URL, url.to_string()).await
    }

    /// Returns and forgets the menu link stashed before login.
    pub async fn take_pending_menu_url(&self) -> Result<Option<String>, StorageError> {
        let url = self.pending_menu_url().await?;
        if url.is_some() {
            self.store.remove(keys::PENDING_MENU_URL).await?;
        }
        Ok(url)
    }

    pub async fn feedback_shown(&self, order_document_id: &str) -> Result<bool, StorageError> {
        Ok(self
            .store
            .get(&keys::feedback_shown(order_document_id))
            .await?
            .is_some())
    }

    pub async fn mark_feedback_shown(&self, order_document_id: &str) -> Result<(), StorageError> {
        self.store
            .set(&keys::feedback_shown(order_document_id), "true".to_string())
            .await
    }
}
