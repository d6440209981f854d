//! Expense records.
//!
//! An `Expense` belongs to exactly one user. Its `category` is a free name,
//! not a reference to a row in `categories`.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub amount: MoneyCents,
    pub category: String,
    pub date: Option<DateTime<Utc>>,
    pub note: String,
}

/// Input for a new expense; the store assigns the id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewExpense {
    pub amount: MoneyCents,
    pub category: String,
    pub date: Option<DateTime<Utc>>,
    pub note: String,
}

impl NewExpense {
    #[must_use]
    pub fn new(amount: MoneyCents, category: impl Into<String>) -> Self {
        Self {
            amount,
            category: category.into(),
            date: None,
            note: String::new(),
        }
    }

    #[must_use]
    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub(crate) fn into_expense(self) -> Expense {
        Expense {
            id: Uuid::new_v4(),
            amount: self.amount,
            category: self.category,
            date: self.date,
            note: self.note,
        }
    }
}

/// Raw add/edit form input, validated before anything reaches the store.
#[derive(Clone, Debug, Default)]
pub struct ExpenseDraft<'a> {
    pub amount: &'a str,
    pub category: &'a str,
    pub date: Option<DateTime<Utc>>,
    pub note: &'a str,
}

impl ExpenseDraft<'_> {
    /// Validate the form: the amount must parse and not be negative, a
    /// category must be picked and a date must be set.
    pub fn parse(&self) -> ResultEngine<NewExpense> {
        let amount = MoneyCents::parse_non_negative(self.amount, "amount")?;
        let category = self.category.trim();
        if category.is_empty() {
            return Err(EngineError::InvalidName(
                "please select a category".to_string(),
            ));
        }
        let date = self
            .date
            .ok_or_else(|| EngineError::InvalidDate("please select a date".to_string()))?;
        Ok(NewExpense::new(amount, category)
            .date(date)
            .note(self.note.trim()))
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub amount_minor: i64,
    pub category: String,
    pub occurred_at: Option<DateTimeUtc>,
    pub note: String,
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

impl Expense {
    pub(crate) fn active_model(&self, user_id: Uuid) -> ActiveModel {
        ActiveModel {
            id: ActiveValue::Set(self.id.to_string()),
            user_id: ActiveValue::Set(user_id.to_string()),
            amount_minor: ActiveValue::Set(self.amount.cents()),
            category: ActiveValue::Set(self.category.clone()),
            occurred_at: ActiveValue::Set(self.date),
            note: ActiveValue::Set(self.note.clone()),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "expense")?,
            amount: MoneyCents::new(model.amount_minor),
            category: model.category,
            date: model.occurred_at,
            note: model.note,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn draft_parses_valid_form() {
        let date = Utc.with_ymd_and_hms(2024, 2, 10, 12, 0, 0).unwrap();
        let expense = ExpenseDraft {
            amount: "20,5",
            category: " Food ",
            date: Some(date),
            note: " lunch ",
        }
        .parse()
        .unwrap();

        assert_eq!(expense.amount, MoneyCents::new(2050));
        assert_eq!(expense.category, "Food");
        assert_eq!(expense.date, Some(date));
        assert_eq!(expense.note, "lunch");
    }

    #[test]
    fn draft_rejects_missing_fields() {
        let date = Utc.with_ymd_and_hms(2024, 2, 10, 12, 0, 0).unwrap();
        let base = ExpenseDraft {
            amount: "10",
            category: "Food",
            date: Some(date),
            note: "",
        };

        let bad_amount = ExpenseDraft {
            amount: "ten",
            ..base.clone()
        };
        assert!(matches!(
            bad_amount.parse(),
            Err(EngineError::InvalidAmount(_))
        ));

        let negative = ExpenseDraft {
            amount: "-3",
            ..base.clone()
        };
        assert!(matches!(negative.parse(), Err(EngineError::InvalidAmount(_))));

        let no_category = ExpenseDraft {
            category: "  ",
            ..base.clone()
        };
        assert!(matches!(
            no_category.parse(),
            Err(EngineError::InvalidName(_))
        ));

        let no_date = ExpenseDraft { date: None, ..base };
        assert_eq!(
            no_date.parse(),
            Err(EngineError::InvalidDate("please select a date".to_string()))
        );
    }
}
