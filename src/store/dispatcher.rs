use crate::{
    config::StoreConfig,
    domain::{Board, CardForm, CardId, ColumnId, ColumnRecord},
    error::Result,
    gateway::Gateway,
    store::{
        call::{Outcome, PersistenceCall},
        command::Command,
        reducer::{apply_command, apply_outcome, BoardState},
    },
};
use futures::{future::join_all, stream::FuturesUnordered, StreamExt};
use std::sync::Arc;
use tokio::sync::watch;

/// Owner of the board state
///
/// The application root creates one store and hands it (or subscriptions
/// to it) to the presentation layer. All writes to the board go through
/// [`BoardStore::dispatch`] and [`BoardStore::settle`]; every change is
/// published to subscribers.
pub struct BoardStore<G: Gateway + ?Sized> {
    gateway: Arc<G>,
    config: StoreConfig,
    state: BoardState,
    loaded: bool,
    publisher: watch::Sender<BoardState>,
}

impl<G: Gateway + ?Sized> BoardStore<G> {
    pub fn new(gateway: Arc<G>, config: StoreConfig) -> Self {
        let (publisher, _) = watch::channel(BoardState::default());
        Self {
            gateway,
            config,
            state: BoardState::default(),
            loaded: false,
            publisher,
        }
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    pub fn board(&self) -> &Board {
        &self.state.board
    }

    pub fn is_pending(&self, id: &CardId) -> bool {
        self.state.is_pending(id)
    }

    /// True once [`BoardStore::bootstrap`] has completed
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Receives a fresh [`BoardState`] after every change
    pub fn subscribe(&self) -> watch::Receiver<BoardState> {
        self.publisher.subscribe()
    }

    /// Loads the board, seeding the default columns if the backend has none
    ///
    /// Commands dispatched before this completes are ignored.
    pub async fn bootstrap(&mut self) -> Result<()> {
        let (columns, cards) =
            tokio::try_join!(self.gateway.load_columns(), self.gateway.load_cards())?;

        let mut board = Board::from_records(columns, cards);
        if board.columns.is_empty() {
            board = Board::from_records(self.create_default_columns().await, Vec::new());
        }

        tracing::info!(
            columns = board.columns.len(),
            cards = board.card_count(),
            "Board loaded"
        );

        self.state = BoardState::new(board);
        self.loaded = true;
        self.publish();
        Ok(())
    }

    async fn create_default_columns(&self) -> Vec<ColumnRecord> {
        let seeds: Vec<_> = self
            .config
            .default_columns
            .iter()
            .map(|seed| seed.to_new_column())
            .collect();
        let results = join_all(seeds.iter().map(|seed| self.gateway.create_column(seed))).await;

        seeds
            .iter()
            .zip(results)
            .filter_map(|(seed, result)| match result {
                Ok(Some(record)) => Some(record),
                Ok(None) => {
                    tracing::warn!(
                        title = %seed.title,
                        "Default column was not returned by the gateway"
                    );
                    None
                }
                Err(err) => {
                    tracing::warn!(
                        title = %seed.title,
                        error = %err,
                        "Failed to create default column"
                    );
                    None
                }
            })
            .collect()
    }

    /// Applies a command and returns the persistence calls to issue
    ///
    /// The caller runs each call with [`PersistenceCall::execute`] and hands
    /// the result back through [`BoardStore::settle`], in any order.
    pub fn dispatch(&mut self, command: Command) -> Vec<PersistenceCall> {
        if !self.loaded {
            tracing::warn!(command = command.name(), "Board not loaded yet, ignoring command");
            return Vec::new();
        }

        let transition = apply_command(&self.state, command, &self.config.ordering);
        self.state = transition.state;
        self.publish();
        transition.calls
    }

    /// Reconciles the board with a completed persistence call
    pub fn settle(&mut self, outcome: Outcome) {
        self.state = apply_outcome(&self.state, &outcome);
        self.publish();
    }

    /// Dispatches a command, runs its calls concurrently and settles each
    /// one as it completes
    pub async fn run(&mut self, command: Command) {
        let calls = self.dispatch(command);
        if calls.is_empty() {
            return;
        }

        let gateway = Arc::clone(&self.gateway);
        let mut in_flight: FuturesUnordered<_> = calls
            .into_iter()
            .map(|call| call.execute(gateway.as_ref()))
            .collect();

        while let Some(outcome) = in_flight.next().await {
            self.settle(outcome);
        }
    }

    pub async fn create_card(&mut self, column_id: ColumnId, form: CardForm) {
        self.run(Command::create_card(column_id, form)).await;
    }

    pub async fn edit_card(&mut self, column_id: ColumnId, card_id: CardId, form: CardForm) {
        self.run(Command::EditCard {
            column_id,
            card_id,
            form,
        })
        .await;
    }

    pub async fn delete_card(&mut self, column_id: ColumnId, card_id: CardId) {
        self.run(Command::DeleteCard { column_id, card_id }).await;
    }

    pub async fn move_card(
        &mut self,
        source_column_id: ColumnId,
        destination_column_id: ColumnId,
        source_index: usize,
        destination_index: usize,
    ) {
        self.run(Command::MoveCard {
            source_column_id,
            destination_column_id,
            source_index,
            destination_index,
        })
        .await;
    }

    fn publish(&self) {
        self.publisher.send_replace(self.state.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{memory::Fault, MemoryGateway};

    #[tokio::test]
    async fn test_bootstrap_seeds_default_columns() {
        let gateway = Arc::new(MemoryGateway::new());
        let mut store = BoardStore::new(Arc::clone(&gateway), StoreConfig::default());

        store.bootstrap().await.unwrap();

        let titles: Vec<&str> = store
            .board()
            .columns
            .iter()
            .map(|c| c.title.as_str())
            .collect();
        assert_eq!(titles, vec!["To Do", "In Progress", "Done"]);
        assert_eq!(gateway.columns().len(), 3);
        assert!(store.is_loaded());
    }

    #[tokio::test]
    async fn test_bootstrap_drops_default_columns_that_were_not_created() {
        let gateway = Arc::new(MemoryGateway::new());
        // Both loads come back empty; "To Do" gets no row and "In Progress" fails
        gateway.push_fault(Fault::Empty);
        gateway.push_fault(Fault::Empty);
        gateway.push_fault(Fault::Empty);
        gateway.push_fault(Fault::Error);
        let mut store = BoardStore::new(Arc::clone(&gateway), StoreConfig::default());

        store.bootstrap().await.unwrap();

        assert!(store.is_loaded());
        assert_eq!(store.board().columns.len(), 1);
        assert_eq!(store.board().columns[0].title, "Done");
        assert_eq!(gateway.columns().len(), 1);
    }

    #[tokio::test]
    async fn test_commands_before_bootstrap_are_ignored() {
        let gateway = Arc::new(MemoryGateway::new());
        let mut store = BoardStore::new(gateway, StoreConfig::default());

        let calls = store.dispatch(Command::create_card(ColumnId::new("x"), CardForm::new("t")));

        assert!(calls.is_empty());
        assert_eq!(store.board().card_count(), 0);
    }

    #[tokio::test]
    async fn test_bootstrap_failure_leaves_store_unloaded() {
        let gateway = Arc::new(MemoryGateway::new());
        gateway.fail_next(1);
        let mut store = BoardStore::new(gateway, StoreConfig::default());

        assert!(store.bootstrap().await.is_err());
        assert!(!store.is_loaded());
    }

    #[tokio::test]
    async fn test_subscribers_see_pending_then_settled() {
        let gateway = Arc::new(MemoryGateway::new());
        let mut store = BoardStore::new(gateway, StoreConfig::default());
        store.bootstrap().await.unwrap();
        let mut updates = store.subscribe();
        let todo = store.board().columns[0].id.clone();

        let calls = store.dispatch(Command::create_card(todo.clone(), CardForm::new("t")));
        assert!(updates.has_changed().unwrap());
        let optimistic = updates.borrow_and_update().clone();
        let temp_id = calls[0].card_id().clone();
        assert!(optimistic.is_pending(&temp_id));

        for call in calls {
            let outcome = call.execute(store.gateway.as_ref()).await;
            store.settle(outcome);
        }

        let settled = updates.borrow_and_update().clone();
        assert!(settled.pending.is_empty());
        let column = settled.board.column(&todo).unwrap();
        assert_eq!(column.cards.len(), 1);
        assert!(!column.cards[0].id.is_temporary());
    }
}
