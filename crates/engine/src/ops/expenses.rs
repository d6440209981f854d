use sea_orm::{QueryFilter, QueryOrder, prelude::*, sea_query::Expr};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::{
    EngineError, Expense, ExpenseSubscription, MoneyCents, NewExpense, ResultEngine,
    SessionContext, expenses,
};

use super::{Engine, session_user};

fn ensure_non_negative(amount: MoneyCents) -> ResultEngine<()> {
    if amount.is_negative() {
        return Err(EngineError::InvalidAmount(
            "amount must not be negative".to_string(),
        ));
    }
    Ok(())
}

/// Load every expense of `user_id`, newest first; undated expenses last.
pub(crate) async fn fetch_expenses(
    database: &DatabaseConnection,
    user_id: Uuid,
) -> ResultEngine<Vec<Expense>> {
    expenses::Entity::find()
        .filter(expenses::Column::UserId.eq(user_id.to_string()))
        .order_by_desc(expenses::Column::OccurredAt)
        .all(database)
        .await?
        .into_iter()
        .map(Expense::try_from)
        .collect()
}

impl Engine {
    /// Record a new expense for the caller.
    pub async fn add_expense(
        &self,
        ctx: &SessionContext,
        new: NewExpense,
    ) -> ResultEngine<Option<Expense>> {
        ensure_non_negative(new.amount)?;
        let Some(user_id) = session_user(ctx, "add_expense") else {
            return Ok(None);
        };

        let expense = new.into_expense();
        expense.active_model(user_id).insert(&self.database).await?;
        tracing::debug!(expense_id = %expense.id, amount = %expense.amount, "expense created");
        self.publish_expense_change(user_id);
        Ok(Some(expense))
    }

    /// One-shot read of the caller's expenses.
    pub async fn list_expenses(&self, ctx: &SessionContext) -> ResultEngine<Vec<Expense>> {
        let Some(user_id) = session_user(ctx, "list_expenses") else {
            return Ok(Vec::new());
        };
        fetch_expenses(&self.database, user_id).await
    }

    pub async fn expense(
        &self,
        ctx: &SessionContext,
        expense_id: Uuid,
    ) -> ResultEngine<Option<Expense>> {
        let Some(user_id) = session_user(ctx, "expense") else {
            return Ok(None);
        };

        expenses::Entity::find_by_id(expense_id.to_string())
            .filter(expenses::Column::UserId.eq(user_id.to_string()))
            .one(&self.database)
            .await?
            .map(Expense::try_from)
            .transpose()
    }

    /// Overwrite every field of an existing expense.
    pub async fn update_expense(
        &self,
        ctx: &SessionContext,
        expense: Expense,
    ) -> ResultEngine<Option<Expense>> {
        ensure_non_negative(expense.amount)?;
        let Some(user_id) = session_user(ctx, "update_expense") else {
            return Ok(None);
        };

        let result = expenses::Entity::update_many()
            .col_expr(
                expenses::Column::AmountMinor,
                Expr::value(expense.amount.cents()),
            )
            .col_expr(
                expenses::Column::Category,
                Expr::value(expense.category.clone()),
            )
            .col_expr(expenses::Column::OccurredAt, Expr::value(expense.date))
            .col_expr(expenses::Column::Note, Expr::value(expense.note.clone()))
            .filter(expenses::Column::Id.eq(expense.id.to_string()))
            .filter(expenses::Column::UserId.eq(user_id.to_string()))
            .exec(&self.database)
            .await?;

        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("expense not exists".to_string()));
        }
        self.publish_expense_change(user_id);
        Ok(Some(expense))
    }

    /// Delete an expense. Deleting an unknown id is not an error.
    pub async fn delete_expense(&self, ctx: &SessionContext, expense_id: Uuid) -> ResultEngine<()> {
        let Some(user_id) = session_user(ctx, "delete_expense") else {
            return Ok(());
        };

        let result = expenses::Entity::delete_many()
            .filter(expenses::Column::Id.eq(expense_id.to_string()))
            .filter(expenses::Column::UserId.eq(user_id.to_string()))
            .exec(&self.database)
            .await?;
        if result.rows_affected > 0 {
            self.publish_expense_change(user_id);
        }
        Ok(())
    }

    /// Live view of the caller's expenses.
    ///
    /// The subscription yields the current list first, then a fresh list after
    /// every write to the caller's expenses. `None` when anonymous.
    pub fn expense_updates(&self, ctx: &SessionContext) -> Option<ExpenseSubscription> {
        let user_id = session_user(ctx, "expense_updates")?;
        Some(ExpenseSubscription::new(
            self.database.clone(),
            user_id,
            self.expense_events.subscribe(),
        ))
    }

    /// Push every expense snapshot of the caller into `callback`, from a
    /// background task. Abort the returned handle to stop listening.
    pub fn subscribe_expenses<F>(&self, ctx: &SessionContext, callback: F) -> Option<JoinHandle<()>>
    where
        F: FnMut(Vec<Expense>) + Send + 'static,
    {
        self.expense_updates(ctx)
            .map(|subscription| subscription.spawn(callback))
    }
}
