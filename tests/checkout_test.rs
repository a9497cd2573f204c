use chrono::Utc;
use qr_order::backend::MemoryBackend;
use qr_order::checkout::{checkout, CheckoutError};
use qr_order::feedback::{self, FeedbackError};
use qr_order::lifecycle::{poll_once, OrderScope, OrderSystem};
use qr_order::model::{
    CartCreate, CartId, MenuItem, OrderId, OrderItem, OrderSnapshot, OrderStatus,
    RestaurantProfile, UserProfile, CART_STORAGE_KEY,
};
use qr_order::status::StatusPolicy;
use qr_order::storage::{keys, LocalStore, MemoryStore, Session};
use std::sync::Arc;

const USER: u64 = 7;

struct Fixture {
    backend: MemoryBackend,
    store: Arc<MemoryStore>,
    session: Session,
    system: OrderSystem,
    cart: CartId,
}

fn customer() -> UserProfile {
    UserProfile {
        id: USER,
        username: Some("ana".into()),
        email: Some("ana@example.com".into()),
        role: Some("customer".into()),
    }
}

fn dish(id: u64, price: f64, prep: Option<u32>) -> MenuItem {
    MenuItem {
        id,
        document_id: Some(format!("menu-{id}")),
        name: format!("Dish {id}"),
        price,
        category: None,
        description: None,
        prep_time_minutes: prep,
    }
}

async fn seated_customer() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let session = Session::new(store.clone());
    session.sign_in("token".into(), &customer()).await.unwrap();
    session.set_dining_location("rest-1", "table-4").await.unwrap();

    let system = OrderSystem::new(store.clone(), StatusPolicy::default());
    let cart = system.cart_client.open(CartCreate::default()).await.unwrap();
    Fixture {
        backend: MemoryBackend::new(),
        store,
        session,
        system,
        cart,
    }
}

#[tokio::test]
async fn checkout_places_order_and_clears_cart() {
    let f = seated_customer().await;
    let carts = &f.system.cart_client;
    carts.add_to_cart(&f.cart, dish(1, 12.5, Some(15))).await.unwrap();
    carts.add_to_cart(&f.cart, dish(1, 12.5, Some(15))).await.unwrap();
    carts.add_to_cart(&f.cart, dish(2, 4.0, None)).await.unwrap();

    let receipt = checkout(&f.backend, carts, &f.cart, &f.session, "pi_123")
        .await
        .unwrap();
    assert_eq!(receipt.total_price, 29.0);
    assert_eq!(receipt.items_created, 2);
    assert!(receipt.skipped_item_ids.is_empty());

    let stored = f.backend.orders();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].snapshot.document_id, receipt.order_document_id);
    assert_eq!(stored[0].user_id, USER);
    assert_eq!(stored[0].restaurant_document_id, "rest-1");
    assert_eq!(stored[0].table_document_id.as_deref(), Some("table-4"));
    assert_eq!(stored[0].payment_reference.as_deref(), Some("pi_123"));

    let items = f.backend.order_items();
    assert_eq!(items[0].menu_document_id, "menu-1");
    assert_eq!(items[0].quantity, 2);
    assert_eq!(items[0].prep_time_minutes, 15);
    assert_eq!(items[1].prep_time_minutes, 30);

    assert!(carts.cart(&f.cart).await.unwrap().is_empty());
    assert_eq!(f.store.get(CART_STORAGE_KEY).await.unwrap(), None);

    // the new order shows up on the customer's board
    let board = poll_once(
        &f.backend,
        &f.system.order_client,
        &OrderScope::Customer { user_id: USER },
        Utc::now(),
    )
    .await
    .unwrap();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].status, OrderStatus::Processing);
    assert_eq!(board[0].items.len(), 2);

    f.system.shutdown().await.unwrap();
}

#[tokio::test]
async fn empty_cart_makes_no_request() {
    let f = seated_customer().await;

    let err = checkout(&f.backend, &f.system.cart_client, &f.cart, &f.session, "pi_1")
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::EmptyCart));
    assert_eq!(f.backend.request_count(), 0);
}

#[tokio::test]
async fn missing_table_keeps_the_cart() {
    let f = seated_customer().await;
    let carts = &f.system.cart_client;
    carts.add_to_cart(&f.cart, dish(1, 10.0, None)).await.unwrap();
    f.store.remove(keys::TABLE_DOCUMENT_ID).await.unwrap();

    let err = checkout(&f.backend, carts, &f.cart, &f.session, "pi_1")
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::MissingData("table")), "{err}");
    assert_eq!(f.backend.request_count(), 0);
    assert_eq!(carts.cart(&f.cart).await.unwrap().item_count(), 1);
}

#[tokio::test]
async fn signed_out_customer_cannot_check_out() {
    let f = seated_customer().await;
    let carts = &f.system.cart_client;
    carts.add_to_cart(&f.cart, dish(1, 10.0, None)).await.unwrap();
    f.session.sign_out().await.unwrap();

    let err = checkout(&f.backend, carts, &f.cart, &f.session, "pi_1")
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::MissingData("user")));
}

#[tokio::test]
async fn lines_without_menu_reference_are_skipped() {
    let f = seated_customer().await;
    let carts = &f.system.cart_client;
    carts.add_to_cart(&f.cart, dish(1, 10.0, None)).await.unwrap();
    let mut unlinked = dish(2, 3.0, None);
    unlinked.document_id = None;
    carts.add_to_cart(&f.cart, unlinked).await.unwrap();

    let receipt = checkout(&f.backend, carts, &f.cart, &f.session, "pi_1")
        .await
        .unwrap();
    assert_eq!(receipt.items_created, 1);
    assert_eq!(receipt.skipped_item_ids, vec![2]);
    // the total still covers what was paid for
    assert_eq!(receipt.total_price, 13.0);
}

#[tokio::test]
async fn backend_failure_leaves_the_cart_intact() {
    let f = seated_customer().await;
    let carts = &f.system.cart_client;
    carts.add_to_cart(&f.cart, dish(1, 10.0, None)).await.unwrap();
    f.backend.fail_next("database locked");

    let err = checkout(&f.backend, carts, &f.cart, &f.session, "pi_1")
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::Backend(_)));
    assert!(err.to_string().contains("database locked"));
    assert!(f.backend.orders().is_empty());
    assert_eq!(carts.cart(&f.cart).await.unwrap().item_count(), 1);
    assert!(f.store.get(CART_STORAGE_KEY).await.unwrap().is_some());
}

fn served_order(id: u64) -> OrderSnapshot {
    OrderSnapshot {
        id: OrderId(id),
        document_id: format!("doc-{id}"),
        status: OrderStatus::Served,
        total_price: 10.0,
        created_at: Utc::now(),
        items: vec![OrderItem {
            menu_ref: Some("menu-1".into()),
            name: Some("Dish 1".into()),
            quantity: 1,
            prep_time_minutes: Some(10),
        }],
    }
}

#[tokio::test]
async fn feedback_is_asked_once_per_served_order() {
    let f = seated_customer().await;
    f.backend.add_restaurant(RestaurantProfile {
        id: Some(1),
        document_id: "rest-1".into(),
        name: Some("Noodle Bar".into()),
    });
    f.backend.insert_order(USER, "rest-1", served_order(1));

    let order = feedback::pending_feedback(&f.backend, &f.session, USER)
        .await
        .unwrap()
        .expect("served order should prompt for feedback");
    assert_eq!(order.document_id, "doc-1");

    let err = feedback::submit_feedback(&f.backend, &f.session, USER, &order, 6, "")
        .await
        .unwrap_err();
    assert!(matches!(err, FeedbackError::InvalidRating(6)));
    assert!(f.backend.feedback().is_empty());

    feedback::submit_feedback(&f.backend, &f.session, USER, &order, 5, "  Great broth ")
        .await
        .unwrap();
    let sent = f.backend.feedback();
    assert_eq!(sent[0].rating, 5);
    assert_eq!(sent[0].comment, "Great broth");
    assert_eq!(sent[0].restaurant_document_id, "rest-1");
    assert!(f.session.feedback_shown("doc-1").await.unwrap());

    let again = feedback::pending_feedback(&f.backend, &f.session, USER)
        .await
        .unwrap();
    assert_eq!(again, None);
}

#[tokio::test]
async fn dismissed_prompt_stays_dismissed() {
    let f = seated_customer().await;
    f.backend.insert_order(USER, "rest-1", served_order(3));

    let order = feedback::pending_feedback(&f.backend, &f.session, USER)
        .await
        .unwrap()
        .unwrap();
    feedback::dismiss(&f.session, &order.document_id).await.unwrap();

    assert_eq!(
        feedback::pending_feedback(&f.backend, &f.session, USER)
            .await
            .unwrap(),
        None
    );
    assert!(f.backend.feedback().is_empty());
}
