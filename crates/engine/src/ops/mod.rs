use sea_orm::DatabaseConnection;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{ResultEngine, SessionContext};

mod categories;
mod expenses;
mod settings;
mod users;

pub(crate) use expenses::fetch_expenses;

/// Default capacity of the expense change channel.
const EXPENSE_EVENTS_CAPACITY: usize = 64;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// A write to some user's expense collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ExpenseChange {
    pub(crate) user_id: Uuid,
}

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    expense_events: broadcast::Sender<ExpenseChange>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    fn publish_expense_change(&self, user_id: Uuid) {
        // No receivers is fine: nobody is subscribed right now.
        let _ = self.expense_events.send(ExpenseChange { user_id });
    }
}

/// Resolve the caller, logging the skipped operation when anonymous.
fn session_user(ctx: &SessionContext, operation: &str) -> Option<Uuid> {
    match ctx.session() {
        Some(session) => Some(session.user_id),
        None => {
            tracing::debug!(operation, "no authenticated user, skipping");
            None
        }
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    event_capacity: Option<usize>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Buffer size of the expense change channel; slow subscribers beyond it
    /// refetch instead of replaying every change.
    pub fn event_capacity(mut self, capacity: usize) -> EngineBuilder {
        self.event_capacity = Some(capacity);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let capacity = self
            .event_capacity
            .unwrap_or(EXPENSE_EVENTS_CAPACITY)
            .max(1);
        let (expense_events, _) = broadcast::channel(capacity);
        Ok(Engine {
            database: self.database,
            expense_events,
        })
    }
}
