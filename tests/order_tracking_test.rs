use chrono::{DateTime, Duration, Utc};
use qr_order::backend::{Backend, MemoryBackend};
use qr_order::clients::OrderClient;
use qr_order::framework::ActorClient;
use qr_order::lifecycle::{poll_once, OrderPoller, OrderScope, OrderView};
use qr_order::model::{OrderId, OrderItem, OrderSnapshot, OrderStatus};
use qr_order::order_actor;
use qr_order::status::StatusPolicy;
use std::sync::Arc;
use tokio::sync::watch;

const USER: u64 = 7;
const RESTAURANT: &str = "rest-1";

fn snapshot(id: u64, prep: u32, created_at: DateTime<Utc>) -> OrderSnapshot {
    OrderSnapshot {
        id: OrderId(id),
        document_id: format!("doc-{id}"),
        status: OrderStatus::Processing,
        total_price: 18.0,
        created_at,
        items: vec![OrderItem {
            menu_ref: Some("menu-1".into()),
            name: Some("Curry".into()),
            quantity: 2,
            prep_time_minutes: Some(prep),
        }],
    }
}

fn start_orders() -> OrderClient {
    let (actor, inner) = order_actor::new();
    tokio::spawn(actor.run(StatusPolicy::default()));
    OrderClient::new(inner)
}

async fn next_view(updates: &mut watch::Receiver<OrderView>) -> OrderView {
    tokio::time::timeout(std::time::Duration::from_secs(5), updates.changed())
        .await
        .expect("poller published nothing")
        .unwrap();
    updates.borrow_and_update().clone()
}

#[tokio::test]
async fn reconcile_projects_and_drops_finished_orders() {
    let orders = start_orders();
    let now = Utc::now();

    let fresh = snapshot(1, 10, now - Duration::minutes(1));
    let cooking = snapshot(2, 10, now - Duration::minutes(5));
    let done = snapshot(3, 10, now - Duration::minutes(30));
    let view = orders
        .reconcile(vec![done.clone(), cooking.clone(), fresh.clone()], now)
        .await
        .unwrap();

    let statuses: Vec<(u64, OrderStatus)> = view.iter().map(|o| (o.id.0, o.status)).collect();
    assert_eq!(
        statuses,
        vec![
            (3, OrderStatus::Prepared),
            (2, OrderStatus::Preparing),
            (1, OrderStatus::Processing),
        ]
    );
    assert_eq!(view[0].progress_percent, 100);
    assert_eq!(view[1].progress_percent, 41);

    // next poll: order 2 served, order 3 gone from the response
    let mut served = cooking.clone();
    served.status = OrderStatus::Served;
    let view = orders.reconcile(vec![fresh, served], now).await.unwrap();
    let ids: Vec<u64> = view.iter().map(|o| o.id.0).collect();
    assert_eq!(ids, vec![1]);
    assert_eq!(orders.get(OrderId(2)).await.unwrap(), None);
}

#[tokio::test]
async fn status_never_regresses_under_repeated_polling() {
    let backend = MemoryBackend::new();
    let orders = start_orders();
    let created = Utc::now() - Duration::minutes(20);
    backend.insert_order(USER, RESTAURANT, snapshot(1, 15, created));
    let scope = OrderScope::Customer { user_id: USER };

    let mut last = OrderStatus::Processing;
    // clock readings as late responses would apply them
    for minutes in [0, 3, 10, 1, 18, 2, 30, 0] {
        let now = created + Duration::minutes(minutes);
        let view = poll_once(&backend, &orders, &scope, now).await.unwrap();
        let status = view[0].status;
        assert!(status >= last, "{last} -> {status} at +{minutes}min");
        last = status;
    }
    assert_eq!(last, OrderStatus::Prepared);
}

#[tokio::test]
async fn server_status_overrides_projection_when_ahead() {
    let backend = MemoryBackend::new();
    let orders = start_orders();
    let now = Utc::now();
    backend.insert_order(USER, RESTAURANT, snapshot(1, 30, now));
    let scope = OrderScope::Customer { user_id: USER };

    let view = poll_once(&backend, &orders, &scope, now).await.unwrap();
    assert_eq!(view[0].status, OrderStatus::Processing);

    backend.set_status("doc-1", OrderStatus::Prepared);
    let view = poll_once(&backend, &orders, &scope, now).await.unwrap();
    assert_eq!(view[0].status, OrderStatus::Prepared);
    assert_eq!(view[0].server_status, OrderStatus::Prepared);
}

#[tokio::test]
async fn refresh_all_advances_without_new_data() {
    let orders = start_orders();
    let created = Utc::now();
    orders.track(snapshot(1, 10, created), created).await.unwrap();

    let view = orders
        .refresh_all(created + Duration::minutes(4))
        .await
        .unwrap();
    assert_eq!(view[0].status, OrderStatus::Preparing);

    let projection = orders
        .refresh(OrderId(1), created + Duration::minutes(12))
        .await
        .unwrap();
    assert_eq!(projection.status, OrderStatus::Prepared);
    assert_eq!(projection.progress_percent, 100);
}

#[tokio::test]
async fn restaurant_scope_hides_empty_orders() {
    let backend = MemoryBackend::new();
    let orders = start_orders();
    let now = Utc::now();
    backend.insert_order(1, RESTAURANT, snapshot(1, 10, now));
    let mut empty = snapshot(2, 10, now);
    empty.items.clear();
    backend.insert_order(2, RESTAURANT, empty);
    backend.insert_order(3, "other", snapshot(3, 10, now));

    let scope = OrderScope::Restaurant {
        document_id: RESTAURANT.into(),
    };
    let view = poll_once(&backend, &orders, &scope, now).await.unwrap();
    let ids: Vec<u64> = view.iter().map(|o| o.id.0).collect();
    assert_eq!(ids, vec![1]);
}

#[tokio::test]
async fn poller_keeps_last_view_when_a_poll_fails() {
    let backend = Arc::new(MemoryBackend::new());
    backend.insert_order(USER, RESTAURANT, snapshot(1, 10, Utc::now()));
    let orders = start_orders();

    let poller = OrderPoller::spawn(
        backend.clone(),
        orders.clone(),
        OrderScope::Customer { user_id: USER },
        std::time::Duration::from_secs(3600),
    );
    let mut updates = poller.subscribe();

    // first tick fires immediately
    let view = next_view(&mut updates).await;
    assert_eq!(view.orders.len(), 1);
    assert!(view.last_error.is_none());
    let first_poll = view.polled_at;

    backend.fail_next("backend down");
    poller.refresh_now();
    let view = next_view(&mut updates).await;
    assert_eq!(view.orders.len(), 1, "failed poll must not clear the board");
    assert!(view.last_error.as_deref().unwrap().contains("backend down"));
    assert_eq!(view.polled_at, first_poll);

    backend.set_status("doc-1", OrderStatus::Served);
    poller.refresh_now();
    let view = next_view(&mut updates).await;
    assert!(view.orders.is_empty());
    assert!(view.last_error.is_none());
    assert_eq!(poller.view().orders.len(), 0);

    poller.stop();
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(poller.is_stopped());
    let requests = backend.request_count();
    poller.refresh_now();
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(backend.request_count(), requests);
}

#[tokio::test]
async fn dropping_the_poller_releases_the_order_actor() {
    let backend = Arc::new(MemoryBackend::new());
    let (actor, inner) = order_actor::new();
    let handle = tokio::spawn(actor.run(StatusPolicy::default()));
    let orders = OrderClient::new(inner);

    let poller = OrderPoller::spawn(
        backend.clone() as Arc<dyn Backend>,
        orders.clone(),
        OrderScope::Customer { user_id: USER },
        std::time::Duration::from_millis(10),
    );
    tokio::time::sleep(std::time::Duration::from_millis(30)).await;
    drop(poller);
    drop(orders);

    tokio::time::timeout(std::time::Duration::from_secs(5), handle)
        .await
        .expect("order actor kept running")
        .unwrap();
}
