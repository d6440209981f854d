//! Push-style expense reads.

use sea_orm::DatabaseConnection;
use tokio::{
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
};
use uuid::Uuid;

use crate::{Expense, ops::ExpenseChange, ops::fetch_expenses};

/// Stream of expense snapshots for one user.
///
/// Created by [`Engine::expense_updates`](crate::Engine::expense_updates).
/// Each item is the complete, current list; changes of other users are
/// ignored.
#[derive(Debug)]
pub struct ExpenseSubscription {
    database: DatabaseConnection,
    user_id: Uuid,
    events: broadcast::Receiver<ExpenseChange>,
    primed: bool,
}

impl ExpenseSubscription {
    pub(crate) fn new(
        database: DatabaseConnection,
        user_id: Uuid,
        events: broadcast::Receiver<ExpenseChange>,
    ) -> Self {
        Self {
            database,
            user_id,
            events,
            primed: false,
        }
    }

    /// Wait for the next snapshot.
    ///
    /// The first call returns immediately with the current list. Returns
    /// `None` once the engine is gone.
    pub async fn next(&mut self) -> Option<Vec<Expense>> {
        loop {
            if self.primed {
                match self.events.recv().await {
                    Ok(change) if change.user_id != self.user_id => continue,
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "expense subscription lagged, refetching");
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
            self.primed = true;

            match fetch_expenses(&self.database, self.user_id).await {
                Ok(expenses) => return Some(expenses),
                // Keep listening; the next change triggers another fetch.
                Err(err) => tracing::warn!("failed to load expense snapshot: {err}"),
            }
        }
    }

    /// Drive the subscription on a tokio task, handing every snapshot to
    /// `callback`.
    pub fn spawn<F>(mut self, mut callback: F) -> JoinHandle<()>
    where
        F: FnMut(Vec<Expense>) + Send + 'static,
    {
        tokio::spawn(async move {
            while let Some(expenses) = self.next().await {
                callback(expenses);
            }
            tracing::debug!("expense subscription closed");
        })
    }
}
