use crate::{
    domain::{CardId, CardPatch, CardRecord, ColumnId, NewCard},
    error::KanbanError,
    gateway::Gateway,
};

/// Identifies what an outstanding call is about, so that its completion can
/// be applied to whatever the board looks like by then
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correlation {
    /// Card id at issue time; a temporary id for creates
    pub card_id: CardId,
    /// Column the card was in (or headed to) at issue time
    pub column_id: ColumnId,
}

impl Correlation {
    pub fn new(card_id: CardId, column_id: ColumnId) -> Self {
        Self { card_id, column_id }
    }
}

/// A persistence call issued by a board transition
#[derive(Debug, Clone, PartialEq)]
pub enum PersistenceCall {
    CreateCard {
        correlation: Correlation,
        card: NewCard,
    },
    UpdateCard {
        correlation: Correlation,
        patch: CardPatch,
    },
    DeleteCard {
        correlation: Correlation,
    },
}

impl PersistenceCall {
    pub fn correlation(&self) -> &Correlation {
        match self {
            Self::CreateCard { correlation, .. }
            | Self::UpdateCard { correlation, .. }
            | Self::DeleteCard { correlation } => correlation,
        }
    }

    pub fn card_id(&self) -> &CardId {
        &self.correlation().card_id
    }

    /// Runs the call against the gateway and reports how it went
    pub async fn execute<G: Gateway + ?Sized>(self, gateway: &G) -> Outcome {
        match self {
            Self::CreateCard { correlation, card } => {
                let Correlation { card_id, column_id } = correlation;
                match gateway.create_card(&card, &column_id).await {
                    Ok(Some(record)) => Outcome::CreateSucceeded {
                        temp_id: card_id,
                        column_id,
                        record,
                    },
                    Ok(None) => Outcome::CreateFailed {
                        temp_id: card_id,
                        column_id,
                        error: KanbanError::EmptyResponse {
                            operation: "create_card",
                        },
                    },
                    Err(error) => Outcome::CreateFailed {
                        temp_id: card_id,
                        column_id,
                        error,
                    },
                }
            }
            Self::UpdateCard { correlation, patch } => {
                let card_id = correlation.card_id;
                match gateway.update_card(&card_id, &patch).await {
                    Ok(Some(record)) => Outcome::UpdateSucceeded {
                        card_id,
                        patch,
                        record,
                    },
                    Ok(None) => Outcome::UpdateFailed {
                        card_id,
                        error: KanbanError::EmptyResponse {
                            operation: "update_card",
                        },
                    },
                    Err(error) => Outcome::UpdateFailed { card_id, error },
                }
            }
            Self::DeleteCard { correlation } => {
                let card_id = correlation.card_id;
                match gateway.delete_card(&card_id).await {
                    Ok(()) => Outcome::DeleteSucceeded { card_id },
                    Err(error) => Outcome::DeleteFailed { card_id, error },
                }
            }
        }
    }
}

/// Completion of a persistence call, fed back into the store
#[derive(Debug)]
pub enum Outcome {
    CreateSucceeded {
        temp_id: CardId,
        column_id: ColumnId,
        record: CardRecord,
    },
    CreateFailed {
        temp_id: CardId,
        column_id: ColumnId,
        error: KanbanError,
    },
    UpdateSucceeded {
        card_id: CardId,
        patch: CardPatch,
        record: CardRecord,
    },
    UpdateFailed {
        card_id: CardId,
        error: KanbanError,
    },
    DeleteSucceeded {
        card_id: CardId,
    },
    DeleteFailed {
        card_id: CardId,
        error: KanbanError,
    },
}

impl Outcome {
    /// The id the originating call was issued for
    pub fn card_id(&self) -> &CardId {
        match self {
            Self::CreateSucceeded { temp_id, .. } | Self::CreateFailed { temp_id, .. } => temp_id,
            Self::UpdateSucceeded { card_id, .. }
            | Self::UpdateFailed { card_id, .. }
            | Self::DeleteSucceeded { card_id }
            | Self::DeleteFailed { card_id, .. } => card_id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Self::CreateSucceeded { .. }
                | Self::UpdateSucceeded { .. }
                | Self::DeleteSucceeded { .. }
        )
    }
}
