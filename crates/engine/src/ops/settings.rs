use chrono::Utc;
use sea_orm::{ActiveValue, TransactionTrait, prelude::*};

use crate::{BudgetSettings, EngineError, MoneyCents, ResultEngine, SessionContext, settings};

use super::{Engine, session_user, with_tx};

impl Engine {
    /// Budget settings of the caller.
    ///
    /// Never fails: anonymous callers, missing rows and read errors all yield
    /// the defaults (no budget, notifications off).
    pub async fn load_budget_settings(&self, ctx: &SessionContext) -> BudgetSettings {
        let Some(user_id) = session_user(ctx, "load_budget_settings") else {
            return BudgetSettings::default();
        };

        match settings::Entity::find_by_id(user_id.to_string())
            .one(&self.database)
            .await
        {
            Ok(Some(model)) => model.into(),
            Ok(None) => BudgetSettings::default(),
            Err(err) => {
                tracing::warn!("failed to load budget settings, using defaults: {err}");
                BudgetSettings::default()
            }
        }
    }

    /// Create or overwrite the caller's budget settings.
    pub async fn save_budget_settings(
        &self,
        ctx: &SessionContext,
        budget: MoneyCents,
        notify_on_exceed: bool,
    ) -> ResultEngine<BudgetSettings> {
        if budget.is_negative() {
            return Err(EngineError::InvalidAmount(
                "budget must not be negative".to_string(),
            ));
        }
        let session = ctx.session().ok_or(EngineError::Unauthenticated)?;

        let last_updated = Utc::now();
        let model = settings::ActiveModel {
            user_id: ActiveValue::Set(session.user_id.to_string()),
            budget_minor: ActiveValue::Set(budget.cents()),
            notify_on_exceed: ActiveValue::Set(notify_on_exceed),
            last_updated: ActiveValue::Set(last_updated),
        };
        // Upsert: one row per user.
        with_tx!(self, |db_tx| {
            match settings::Entity::find_by_id(session.user_id.to_string())
                .one(&db_tx)
                .await?
            {
                Some(_) => {
                    model.update(&db_tx).await?;
                }
                None => {
                    model.insert(&db_tx).await?;
                }
            }
            Ok::<_, EngineError>(())
        })?;

        tracing::debug!(budget = %budget, notify_on_exceed, "budget settings saved");
        Ok(BudgetSettings {
            budget,
            notify_on_exceed,
            last_updated: Some(last_updated),
        })
    }
}
