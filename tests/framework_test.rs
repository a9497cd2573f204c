use async_trait::async_trait;
use qr_order::framework::{ActorEntity, FrameworkError, ResourceActor};

// --- Test Entity ---

/// A dining table; tables printed with a number keep it as their id.
#[derive(Clone, Debug, PartialEq)]
struct Table {
    id: u32,
    seats: u32,
    occupied: bool,
}

#[derive(Debug)]
struct TableCreate {
    number: Option<u32>,
    seats: u32,
}

#[derive(Debug)]
struct TableUpdate {
    seats: u32,
}

#[derive(Debug)]
enum TableAction {
    Seat,
    Free,
}

#[derive(Debug, PartialEq, thiserror::Error)]
enum TableError {
    #[error("Table is already occupied")]
    Occupied,
    #[error("A table needs at least one seat")]
    NoSeats,
}

#[async_trait]
impl ActorEntity for Table {
    type Id = u32;
    type Create = TableCreate;
    type Update = TableUpdate;
    type Action = TableAction;
    type ActionResult = bool;
    type Context = ();
    type Error = TableError;

    fn assigned_id(params: &TableCreate) -> Option<u32> {
        params.number
    }

    fn from_create_params(id: u32, params: TableCreate) -> Result<Self, TableError> {
        if params.seats == 0 {
            return Err(TableError::NoSeats);
        }
        Ok(Self {
            id,
            seats: params.seats,
            occupied: false,
        })
    }

    async fn on_update(&mut self, update: TableUpdate, _ctx: &()) -> Result<(), TableError> {
        if update.seats == 0 {
            return Err(TableError::NoSeats);
        }
        self.seats = update.seats;
        Ok(())
    }

    async fn handle_action(&mut self, action: TableAction, _ctx: &()) -> Result<bool, TableError> {
        match action {
            TableAction::Seat if self.occupied => Err(TableError::Occupied),
            TableAction::Seat => {
                self.occupied = true;
                Ok(true)
            }
            TableAction::Free => {
                let was = self.occupied;
                self.occupied = false;
                Ok(was)
            }
        }
    }
}

fn entity_error(e: FrameworkError) -> TableError {
    match e {
        FrameworkError::EntityError(inner) => *inner.downcast::<TableError>().unwrap(),
        other => panic!("expected entity error, got {other:?}"),
    }
}

// --- Tests ---

#[tokio::test]
async fn full_lifecycle() {
    let (actor, client) = ResourceActor::<Table>::new(10);
    let handle = tokio::spawn(actor.run(()));

    let id = client
        .create(TableCreate { number: None, seats: 4 })
        .await
        .unwrap();
    assert_eq!(id, 1);

    assert!(client.perform_action(id, TableAction::Seat).await.unwrap());
    let err = client.perform_action(id, TableAction::Seat).await.unwrap_err();
    assert_eq!(entity_error(err), TableError::Occupied);

    let table = client.update(id, TableUpdate { seats: 6 }).await.unwrap();
    assert_eq!(table.seats, 6);
    assert!(table.occupied);

    let err = client.update(id, TableUpdate { seats: 0 }).await.unwrap_err();
    assert_eq!(entity_error(err), TableError::NoSeats);
    assert_eq!(client.get(id).await.unwrap().unwrap().seats, 6);

    client.delete(id).await.unwrap();
    assert_eq!(client.get(id).await.unwrap(), None);
    assert!(matches!(
        client.delete(id).await,
        Err(FrameworkError::NotFound(_))
    ));

    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn assigned_ids_are_unique() {
    let (actor, client) = ResourceActor::<Table>::new(10);
    tokio::spawn(actor.run(()));

    let printed = client
        .create(TableCreate { number: Some(12), seats: 2 })
        .await
        .unwrap();
    assert_eq!(printed, 12);

    let err = client
        .create(TableCreate { number: Some(12), seats: 8 })
        .await
        .unwrap_err();
    assert!(matches!(err, FrameworkError::AlreadyExists(id) if id == "12"));

    // the counter is independent of assigned ids
    let counted = client
        .create(TableCreate { number: None, seats: 2 })
        .await
        .unwrap();
    assert_eq!(counted, 1);

    let mut ids: Vec<u32> = client.list().await.unwrap().into_iter().map(|t| t.id).collect();
    ids.sort();
    assert_eq!(ids, vec![1, 12]);
}

#[tokio::test]
async fn failed_create_stores_nothing() {
    let (actor, client) = ResourceActor::<Table>::new(10);
    tokio::spawn(actor.run(()));

    let err = client
        .create(TableCreate { number: Some(3), seats: 0 })
        .await
        .unwrap_err();
    assert_eq!(entity_error(err), TableError::NoSeats);
    assert!(client.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn requests_after_shutdown_fail() {
    let (actor, client) = ResourceActor::<Table>::new(10);
    let handle = tokio::spawn(actor.run(()));
    handle.abort();
    let _ = handle.await;

    assert!(matches!(
        client.list().await,
        Err(FrameworkError::ActorClosed)
    ));
}
