//! Pure board transitions
//!
//! Every function here takes the current state and returns the next one
//! along with the persistence calls it wants issued. Nothing here talks to
//! the gateway.

use crate::{
    domain::{Board, Card, CardId, CardPatch, ColumnId, NewCard, OrderingConfig, PendingMap},
    error::{KanbanError, Result},
    store::{
        call::{Correlation, Outcome, PersistenceCall},
        command::Command,
    },
};
use serde::Serialize;

/// Everything the presentation layer renders from
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoardState {
    pub board: Board,
    pub pending: PendingMap,
}

impl BoardState {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            pending: PendingMap::new(),
        }
    }

    pub fn is_pending(&self, id: &CardId) -> bool {
        self.pending.is_pending(id)
    }
}

/// Result of applying a command
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: BoardState,
    pub calls: Vec<PersistenceCall>,
}

/// Applies a user command optimistically
///
/// Commands that reference a column or card the board does not hold leave
/// the state unchanged and issue nothing.
pub fn apply_command(
    state: &BoardState,
    command: Command,
    ordering: &OrderingConfig,
) -> Transition {
    let name = command.name();
    let mut next = state.clone();

    match plan(&mut next.board, command, ordering) {
        Ok(calls) => {
            for call in &calls {
                next.pending.begin(call.card_id());
            }
            Transition { state: next, calls }
        }
        Err(err) => {
            tracing::debug!(command = name, error = %err, "Ignoring command");
            Transition {
                state: state.clone(),
                calls: Vec::new(),
            }
        }
    }
}

fn plan(
    board: &mut Board,
    command: Command,
    ordering: &OrderingConfig,
) -> Result<Vec<PersistenceCall>> {
    match command {
        Command::CreateCard {
            column_id,
            form,
            temp_id,
        } => {
            ensure_fresh_placeholder(board, &temp_id)?;
            let column = board
                .column(&column_id)
                .ok_or_else(|| KanbanError::ColumnNotFound(column_id.to_string()))?;
            let sort_order = ordering.order_after_last(&column.cards);
            let card = Card::new(temp_id.clone(), form.title.clone(), sort_order);
            board.append_card(&column_id, card)?;

            Ok(vec![PersistenceCall::CreateCard {
                correlation: Correlation::new(temp_id, column_id),
                card: NewCard {
                    title: form.title,
                    sort_order,
                },
            }])
        }
        Command::EditCard {
            column_id,
            card_id,
            form,
        } => {
            ensure_saved(&card_id)?;
            board.edit_card(&column_id, &card_id, &form)?;

            Ok(vec![PersistenceCall::UpdateCard {
                correlation: Correlation::new(card_id, column_id),
                patch: CardPatch::title(form.title),
            }])
        }
        Command::DeleteCard { column_id, card_id } => {
            ensure_saved(&card_id)?;
            board.remove_card(&column_id, &card_id)?;

            Ok(vec![PersistenceCall::DeleteCard {
                correlation: Correlation::new(card_id, column_id),
            }])
        }
        Command::MoveCard {
            source_column_id,
            destination_column_id,
            source_index,
            destination_index,
        } => {
            let card = board
                .card_at(&source_column_id, source_index)
                .ok_or_else(|| {
                    KanbanError::CardNotFound(format!("{}[{}]", source_column_id, source_index))
                })?;
            ensure_saved(&card.id)?;

            let moved = board.move_card(
                &source_column_id,
                &destination_column_id,
                source_index,
                destination_index,
                ordering,
            )?;

            Ok(moved
                .into_iter()
                .map(|moved| PersistenceCall::UpdateCard {
                    correlation: Correlation::new(moved.card_id, moved.column_id.clone()),
                    patch: CardPatch::position(moved.column_id, moved.sort_order),
                })
                .collect())
        }
    }
}

/// A new card's placeholder id must look temporary and be unused, so that
/// reconciliation can find exactly that card later.
fn ensure_fresh_placeholder(board: &Board, temp_id: &CardId) -> Result<()> {
    if !temp_id.is_temporary() || board.card(temp_id).is_some() {
        return Err(KanbanError::InvalidPlaceholder(temp_id.to_string()));
    }
    Ok(())
}

/// Cards still waiting for their server id cannot be edited, moved or
/// deleted; the server has nothing to address yet.
fn ensure_saved(card_id: &CardId) -> Result<()> {
    if card_id.is_temporary() {
        return Err(KanbanError::CardNotSaved(card_id.to_string()));
    }
    Ok(())
}

/// Reconciles the board with the completion of a persistence call
///
/// The pending entry for the call's card is cleared whatever the outcome.
/// Failed creates remove the placeholder card; failed edits, moves and
/// deletes keep the optimistic state.
pub fn apply_outcome(state: &BoardState, outcome: &Outcome) -> BoardState {
    let mut next = state.clone();
    next.pending.settle(outcome.card_id());

    let reconciled = match outcome {
        Outcome::CreateSucceeded {
            temp_id,
            column_id,
            record,
        } => {
            tracing::info!(temp_id = %temp_id, card_id = %record.id, "Card saved");
            next.board.replace_card(column_id, temp_id, record.to_card())
        }
        Outcome::CreateFailed {
            temp_id,
            column_id,
            error,
        } => {
            tracing::warn!(
                temp_id = %temp_id,
                error = %error,
                "Card creation failed, removing it"
            );
            remove_placeholder(&mut next.board, column_id, temp_id)
        }
        Outcome::UpdateSucceeded {
            card_id,
            patch,
            record,
        } => next.board.merge_confirmed(card_id, patch, record),
        Outcome::UpdateFailed { card_id, error } => {
            tracing::warn!(card_id = %card_id, error = %error, "Card update failed");
            Ok(())
        }
        Outcome::DeleteSucceeded { .. } => Ok(()),
        Outcome::DeleteFailed { card_id, error } => {
            tracing::warn!(card_id = %card_id, error = %error, "Card deletion failed");
            Ok(())
        }
    };

    if let Err(err) = reconciled {
        tracing::debug!(card_id = %outcome.card_id(), error = %err, "Nothing to reconcile");
    }

    next
}

fn remove_placeholder(
    board: &mut Board,
    column_id: &ColumnId,
    temp_id: &CardId,
) -> Result<()> {
    board
        .remove_card(column_id, temp_id)
        .or_else(|_| board.remove_card_anywhere(temp_id))
        .map(|_| ())
}
