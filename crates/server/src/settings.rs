//! Budget settings endpoints

use api_types::settings::{BudgetSettingsUpdate, BudgetSettingsView};
use axum::{Extension, Json, extract::State};
use engine::{BudgetSettings, Session, SessionContext, parse_budget};

use crate::{ServerError, server::ServerState};

fn view(settings: BudgetSettings) -> BudgetSettingsView {
    BudgetSettingsView {
        budget_minor: settings.budget.cents(),
        notify_on_exceed: settings.notify_on_exceed,
        last_updated: settings.last_updated,
    }
}

pub async fn get(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Json<BudgetSettingsView> {
    let ctx = SessionContext::from(session);
    Json(view(state.engine.load_budget_settings(&ctx).await))
}

pub async fn update(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetSettingsUpdate>,
) -> Result<Json<BudgetSettingsView>, ServerError> {
    let ctx = SessionContext::from(session);
    let budget = parse_budget(&payload.budget)?;
    let settings = state
        .engine
        .save_budget_settings(&ctx, budget, payload.notify_on_exceed)
        .await?;

    Ok(Json(view(settings)))
}
