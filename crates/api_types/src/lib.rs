use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SignUp {
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SignedUp {
        pub user_id: Uuid,
        pub email: String,
    }

    /// Request body for `POST /password`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PasswordChange {
        pub current_password: String,
        pub new_password: String,
        pub confirm_password: String,
    }
}

pub mod category {
    use super::*;

    /// Request body for creating or overwriting a category.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        pub description: Option<String>,
        pub image_url: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub image_url: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryListResponse {
        pub categories: Vec<CategoryView>,
    }
}

pub mod expense {
    use super::*;

    /// Add/edit form of an expense, as the user typed it.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseForm {
        /// Decimal amount, `.` or `,` as separator (`"12,50"`).
        pub amount: String,
        pub category: String,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub occurred_at: Option<DateTime<FixedOffset>>,
        #[serde(default)]
        pub note: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub amount_minor: i64,
        pub category: String,
        pub occurred_at: Option<DateTime<Utc>>,
        pub note: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseListResponse {
        pub expenses: Vec<ExpenseView>,
    }
}

pub mod settings {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetSettingsView {
        pub budget_minor: i64,
        pub notify_on_exceed: bool,
        pub last_updated: Option<DateTime<Utc>>,
    }

    /// Request body for `PUT /settings`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetSettingsUpdate {
        /// Decimal amount; an empty string clears the budget.
        #[serde(default)]
        pub budget: String,
        pub notify_on_exceed: bool,
    }
}

pub mod report {
    use super::*;
    use crate::expense::ExpenseView;

    /// Time window of a query.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(tag = "kind", rename_all = "snake_case")]
    pub enum TimeFilter {
        #[default]
        All,
        Monthly,
        Weekly,
        /// Inclusive; a missing bound is open.
        Range {
            start: Option<DateTime<FixedOffset>>,
            end: Option<DateTime<FixedOffset>>,
        },
    }

    /// Request body shared by `POST /home` and `POST /report`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseQuery {
        #[serde(default)]
        pub time: TimeFilter,
        /// Exact category name; absent or empty means every category.
        pub category: Option<String>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum BudgetLevel {
        Unset,
        Ok,
        Warning,
        Exceeded,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetStatusView {
        pub total_minor: i64,
        pub budget_minor: i64,
        pub percent: f64,
        pub level: BudgetLevel,
        pub over_by_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HomeResponse {
        pub expenses: Vec<ExpenseView>,
        pub total_minor: i64,
        pub budget: BudgetStatusView,
        /// `true` when this request fired the budget-exceeded notification.
        pub alert_sent: bool,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum BucketKind {
        Day,
        Week,
        Month,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BucketView {
        pub label: String,
        pub total_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategorySliceView {
        pub category: String,
        pub total_minor: i64,
        pub share_percent: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReportResponse {
        pub expenses: Vec<ExpenseView>,
        pub total_minor: i64,
        pub bucket_kind: BucketKind,
        pub time_series: Vec<BucketView>,
        pub category_series: Vec<CategorySliceView>,
    }
}
