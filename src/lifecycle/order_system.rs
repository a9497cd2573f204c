use crate::cart_actor;
use crate::clients::{CartClient, OrderClient};
use crate::order_actor;
use crate::status::StatusPolicy;
use crate::storage::LocalStore;
use std::sync::Arc;
use tracing::{error, info};

/// Runtime orchestrator for the cart and order actors.
///
/// # Architecture
///
/// - **Cart actor**: owns open carts; context is the [`LocalStore`] snapshots go to
/// - **Order actor**: owns the order board; context is the [`StatusPolicy`]
///
/// Neither actor depends on the other, so shutdown is plain channel closure.
///
/// # Example
///
/// ```ignore
/// let system = OrderSystem::new(store, StatusPolicy::default());
/// let cart = system.cart_client.open(CartCreate::default()).await?;
/// system.cart_client.add_to_cart(&cart, item).await?;
/// system.shutdown().await?;
/// ```
pub struct OrderSystem {
    pub cart_client: CartClient,
    pub order_client: OrderClient,
    /// Task handles for all running actors (used for graceful shutdown)
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl OrderSystem {
    /// Creates both actors and spawns them with their context injected.
    pub fn new(store: Arc<dyn LocalStore>, policy: StatusPolicy) -> Self {
        let (cart_actor, cart_inner) = cart_actor::new();
        let (order_actor, order_inner) = order_actor::new();

        let cart_handle = tokio::spawn(cart_actor.run(store));
        let order_handle = tokio::spawn(order_actor.run(policy));

        Self {
            cart_client: CartClient::new(cart_inner),
            order_client: OrderClient::new(order_inner),
            handles: vec![cart_handle, order_handle],
        }
    }

    /// Drops the clients and waits for both actors to drain and exit.
    ///
    /// Clones handed out earlier (for instance to an
    /// [`OrderPoller`](crate::lifecycle::OrderPoller)) keep their actor alive, so stop
    /// those first.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        drop(self.cart_client);
        drop(self.order_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
