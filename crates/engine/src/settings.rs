//! Per-user budget settings (a single row per user).

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{MoneyCents, ResultEngine};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetSettings {
    /// Monthly ceiling; zero means "no budget".
    pub budget: MoneyCents,
    pub notify_on_exceed: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

impl BudgetSettings {
    #[must_use]
    pub fn new(budget: MoneyCents, notify_on_exceed: bool) -> Self {
        Self {
            budget,
            notify_on_exceed,
            last_updated: None,
        }
    }

    /// `true` once a positive budget is configured.
    #[must_use]
    pub fn has_budget(&self) -> bool {
        self.budget.is_positive()
    }
}

/// Parse the budget field of the settings form.
///
/// An empty field clears the budget.
pub fn parse_budget(input: &str) -> ResultEngine<MoneyCents> {
    if input.trim().is_empty() {
        return Ok(MoneyCents::ZERO);
    }
    MoneyCents::parse_non_negative(input, "budget")
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "user_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub budget_minor: i64,
    pub notify_on_exceed: bool,
    pub last_updated: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for BudgetSettings {
    fn from(model: Model) -> Self {
        Self {
            budget: MoneyCents::new(model.budget_minor),
            notify_on_exceed: model.notify_on_exceed,
            last_updated: Some(model.last_updated),
        }
    }
}
