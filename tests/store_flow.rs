use chrono::Utc;
use kanban_board_core::{
    domain::{CardRecord, ColumnRecord},
    gateway::memory::Fault,
    BoardStore, CardForm, CardId, ColumnId, Command, MemoryGateway, Outcome, StoreConfig,
};
use std::sync::Arc;

fn column_record(id: &str, title: &str, sort_order: f64) -> ColumnRecord {
    ColumnRecord {
        id: ColumnId::new(id),
        title: title.to_string(),
        sort_order,
        created_at: Utc::now(),
    }
}

fn card_record(id: &str, list_id: &str, sort_order: f64) -> CardRecord {
    CardRecord {
        id: CardId::new(id),
        title: id.to_uppercase(),
        sort_order,
        list_id: ColumnId::new(list_id),
        created_at: Utc::now(),
    }
}

/// Columns x = [a, b, c] and y = [d]
async fn seeded_store() -> (Arc<MemoryGateway>, BoardStore<MemoryGateway>) {
    let gateway = Arc::new(MemoryGateway::with_records(
        vec![column_record("y", "Done", 2000.0), column_record("x", "To Do", 1000.0)],
        vec![
            card_record("c", "x", 3000.0),
            card_record("a", "x", 1000.0),
            card_record("d", "y", 1000.0),
            card_record("b", "x", 2000.0),
        ],
    ));
    let mut store = BoardStore::new(Arc::clone(&gateway), StoreConfig::default());
    store.bootstrap().await.unwrap();
    (gateway, store)
}

fn ids(store: &BoardStore<MemoryGateway>, column_id: &str) -> Vec<String> {
    store
        .board()
        .column(&ColumnId::new(column_id))
        .unwrap()
        .cards
        .iter()
        .map(|c| c.id.to_string())
        .collect()
}

#[tokio::test]
async fn test_bootstrap_orders_existing_board() {
    let (gateway, store) = seeded_store().await;

    let columns: Vec<&str> = store.board().columns.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(columns, vec!["x", "y"]);
    assert_eq!(ids(&store, "x"), vec!["a", "b", "c"]);
    assert_eq!(gateway.columns().len(), 2);
}

#[tokio::test]
async fn test_create_reconciles_server_id() {
    let (gateway, mut store) = seeded_store().await;

    store.create_card(ColumnId::new("y"), CardForm::new("Fresh")).await;

    let column = store.board().column(&ColumnId::new("y")).unwrap();
    assert_eq!(column.cards.len(), 2);
    let created = &column.cards[1];
    assert!(!created.id.is_temporary());
    assert_eq!(created.title, "Fresh");
    assert_eq!(created.sort_order, 2000.0);
    assert!(store.state().pending.is_empty());

    let stored = gateway.cards().into_iter().find(|c| c.id == created.id).unwrap();
    assert_eq!(stored.list_id.as_str(), "y");
}

#[tokio::test]
async fn test_failed_create_rolls_back() {
    let (gateway, mut store) = seeded_store().await;
    let before = store.state().clone();
    gateway.fail_next(1);

    store.create_card(ColumnId::new("x"), CardForm::new("Doomed")).await;

    assert_eq!(store.state(), &before);
}

#[tokio::test]
async fn test_empty_create_response_rolls_back() {
    let (gateway, mut store) = seeded_store().await;
    gateway.push_fault(Fault::Empty);

    store.create_card(ColumnId::new("x"), CardForm::new("Ghost")).await;

    assert_eq!(ids(&store, "x"), vec!["a", "b", "c"]);
    assert!(store.state().pending.is_empty());
}

#[tokio::test]
async fn test_move_within_column_persists_new_position() {
    let (gateway, mut store) = seeded_store().await;

    store.move_card(ColumnId::new("x"), ColumnId::new("x"), 2, 0).await;

    assert_eq!(ids(&store, "x"), vec!["c", "a", "b"]);
    let stored = gateway.cards().into_iter().find(|c| c.id.as_str() == "c").unwrap();
    assert_eq!(stored.sort_order, 0.0);
    assert!(!store.is_pending(&CardId::new("c")));
}

#[tokio::test]
async fn test_move_across_columns_persists_column() {
    let (gateway, mut store) = seeded_store().await;

    store.move_card(ColumnId::new("x"), ColumnId::new("y"), 0, 1).await;

    assert_eq!(ids(&store, "x"), vec!["b", "c"]);
    assert_eq!(ids(&store, "y"), vec!["d", "a"]);
    let stored = gateway.cards().into_iter().find(|c| c.id.as_str() == "a").unwrap();
    assert_eq!(stored.list_id.as_str(), "y");
    assert_eq!(stored.sort_order, 2000.0);
}

#[tokio::test]
async fn test_failed_edit_keeps_optimistic_title() {
    let (gateway, mut store) = seeded_store().await;
    gateway.fail_next(1);

    store
        .edit_card(ColumnId::new("x"), CardId::new("b"), CardForm::new("Local only"))
        .await;

    assert_eq!(store.board().card(&CardId::new("b")).unwrap().title, "Local only");
    assert!(!store.is_pending(&CardId::new("b")));
    let stored = gateway.cards().into_iter().find(|c| c.id.as_str() == "b").unwrap();
    assert_eq!(stored.title, "B");
}

#[tokio::test]
async fn test_failed_delete_is_not_rolled_back() {
    let (gateway, mut store) = seeded_store().await;
    gateway.fail_next(1);

    store.delete_card(ColumnId::new("y"), CardId::new("d")).await;

    assert!(ids(&store, "y").is_empty());
    assert_eq!(gateway.cards().len(), 4);
    assert!(store.state().pending.is_empty());
}

#[tokio::test]
async fn test_out_of_order_completions() {
    let (gateway, mut store) = seeded_store().await;

    let mut calls = Vec::new();
    calls.extend(store.dispatch(Command::create_card(ColumnId::new("x"), CardForm::new("New"))));
    calls.extend(store.dispatch(Command::EditCard {
        column_id: ColumnId::new("x"),
        card_id: CardId::new("a"),
        form: CardForm::new("Edited"),
    }));
    calls.extend(store.dispatch(Command::MoveCard {
        source_column_id: ColumnId::new("x"),
        destination_column_id: ColumnId::new("y"),
        source_index: 0,
        destination_index: 0,
    }));
    assert_eq!(calls.len(), 3);
    assert_eq!(store.state().pending.outstanding(&CardId::new("a")), 2);

    let mut outcomes = Vec::new();
    for call in calls {
        outcomes.push(call.execute(gateway.as_ref()).await);
    }

    // Deliver newest first
    for outcome in outcomes.into_iter().rev() {
        assert!(outcome.is_success());
        store.settle(outcome);
    }

    assert!(store.state().pending.is_empty());
    assert_eq!(ids(&store, "y"), vec!["a", "d"]);
    assert_eq!(store.board().card(&CardId::new("a")).unwrap().title, "Edited");

    let x = store.board().column(&ColumnId::new("x")).unwrap();
    assert_eq!(x.cards.len(), 3);
    assert!(x.cards.iter().all(|c| !c.id.is_temporary()));
    assert_eq!(x.cards[2].title, "New");
}

#[tokio::test]
async fn test_completion_after_delete_is_harmless() {
    let (gateway, mut store) = seeded_store().await;

    let edit_calls = store.dispatch(Command::EditCard {
        column_id: ColumnId::new("x"),
        card_id: CardId::new("a"),
        form: CardForm::new("Edited"),
    });
    store.delete_card(ColumnId::new("x"), CardId::new("a")).await;
    assert!(store.is_pending(&CardId::new("a")));

    for call in edit_calls {
        let outcome = call.execute(gateway.as_ref()).await;
        assert!(matches!(outcome, Outcome::UpdateFailed { .. }));
        store.settle(outcome);
    }

    assert!(store.board().card(&CardId::new("a")).is_none());
    assert!(store.state().pending.is_empty());
}

#[tokio::test]
async fn test_delete_unknown_card_leaves_board_unchanged() {
    let (_, mut store) = seeded_store().await;
    let before = store.state().clone();

    let calls = store.dispatch(Command::DeleteCard {
        column_id: ColumnId::new("x"),
        card_id: CardId::new("missing"),
    });

    assert!(calls.is_empty());
    assert_eq!(store.state(), &before);
}
