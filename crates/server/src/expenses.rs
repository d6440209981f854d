//! Expense API endpoints

use api_types::expense::{ExpenseForm, ExpenseListResponse, ExpenseView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{EngineError, Expense, ExpenseDraft, NewExpense, Session, SessionContext};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

pub(crate) fn expense_view(expense: Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        amount_minor: expense.amount.cents(),
        category: expense.category,
        occurred_at: expense.date,
        note: expense.note,
    }
}

fn parse_form(form: &ExpenseForm) -> Result<NewExpense, ServerError> {
    let draft = ExpenseDraft {
        amount: &form.amount,
        category: &form.category,
        date: form.occurred_at.map(|date| date.with_timezone(&Utc)),
        note: &form.note,
    };
    Ok(draft.parse()?)
}

pub async fn list(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<Json<ExpenseListResponse>, ServerError> {
    let ctx = SessionContext::from(session);
    let expenses = state.engine.list_expenses(&ctx).await?;

    Ok(Json(ExpenseListResponse {
        expenses: expenses.into_iter().map(expense_view).collect(),
    }))
}

pub async fn create(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseForm>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let ctx = SessionContext::from(session);
    let new = parse_form(&payload)?;
    let expense = state
        .engine
        .add_expense(&ctx, new)
        .await?
        .ok_or(EngineError::Unauthenticated)?;

    Ok((StatusCode::CREATED, Json(expense_view(expense))))
}

pub async fn update(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ExpenseForm>,
) -> Result<Json<ExpenseView>, ServerError> {
    let ctx = SessionContext::from(session);
    let new = parse_form(&payload)?;
    let expense = Expense {
        id,
        amount: new.amount,
        category: new.category,
        date: new.date,
        note: new.note,
    };
    let expense = state
        .engine
        .update_expense(&ctx, expense)
        .await?
        .ok_or(EngineError::Unauthenticated)?;

    Ok(Json(expense_view(expense)))
}

pub async fn delete(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let ctx = SessionContext::from(session);
    state.engine.delete_expense(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
