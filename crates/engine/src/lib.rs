pub use alerts::{
    AlertState, BudgetAlert, BudgetExceeded, BudgetLevel, BudgetStatus, ChannelNotifier,
    Importance, Notification, NotificationChannel, NotificationDispatcher, Notifier,
    TracingNotifier,
};
pub use categories::Category;
pub use error::EngineError;
pub use expenses::{Expense, ExpenseDraft, NewExpense};
pub use identity::{AuthStatus, INITIALIZATION_FAILED, IdentityGateway, IdentityProvider, LocalIdentity};
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder};
pub use password::{MIN_PASSWORD_LENGTH, validate_password};
pub use report::{
    Bucket, BucketKind, CategorySlice, ExpenseFilter, FilteredExpenses, Report, TimeFilter,
    category_series, time_series,
};
pub use session::{Session, SessionContext};
pub use settings::{BudgetSettings, parse_budget};
pub use subscription::ExpenseSubscription;

mod alerts;
mod categories;
mod error;
mod expenses;
mod identity;
mod money;
mod ops;
mod password;
mod report;
mod session;
mod settings;
mod subscription;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
