//! Home screen and report endpoints.
//!
//! Both filter the caller's expenses in the server's time zone. `/home`
//! also feeds the filtered total to the caller's budget alert.

use api_types::report::{
    BucketKind as BucketKindView, BucketView, BudgetLevel as BudgetLevelView, BudgetStatusView,
    CategorySliceView, ExpenseQuery, HomeResponse, ReportResponse, TimeFilter as TimeFilterView,
};
use axum::{Extension, Json, extract::State};
use chrono::Utc;
use engine::{
    BucketKind, BudgetLevel, BudgetStatus, ExpenseFilter, Report, Session, SessionContext,
    TimeFilter,
};

use crate::{ServerError, expenses::expense_view, server::ServerState};

fn time_filter(filter: TimeFilterView) -> TimeFilter {
    match filter {
        TimeFilterView::All => TimeFilter::All,
        TimeFilterView::Monthly => TimeFilter::Monthly,
        TimeFilterView::Weekly => TimeFilter::Weekly,
        TimeFilterView::Range { start, end } => TimeFilter::Range {
            start: start.map(|date| date.with_timezone(&Utc)),
            end: end.map(|date| date.with_timezone(&Utc)),
        },
    }
}

fn expense_filter(query: ExpenseQuery) -> ExpenseFilter {
    let filter = ExpenseFilter::new(time_filter(query.time));
    match query.category {
        Some(category) => filter.category(category),
        None => filter,
    }
}

fn budget_view(status: BudgetStatus) -> BudgetStatusView {
    BudgetStatusView {
        total_minor: status.total.cents(),
        budget_minor: status.budget.cents(),
        percent: status.percent,
        level: match status.level {
            BudgetLevel::Unset => BudgetLevelView::Unset,
            BudgetLevel::Ok => BudgetLevelView::Ok,
            BudgetLevel::Warning => BudgetLevelView::Warning,
            BudgetLevel::Exceeded => BudgetLevelView::Exceeded,
        },
        over_by_minor: status.over_by.cents(),
    }
}

/// Handle requests for the home screen: filtered list, total and budget card.
pub async fn home(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Json(query): Json<ExpenseQuery>,
) -> Result<Json<HomeResponse>, ServerError> {
    let user_id = session.user_id;
    let ctx = SessionContext::from(session);
    let expenses = state.engine.list_expenses(&ctx).await?;
    let settings = state.engine.load_budget_settings(&ctx).await;

    let now = Utc::now().with_timezone(&state.timezone);
    let filtered = expense_filter(query).apply(&expenses, &now);

    let alert_sent = state
        .dispatcher(user_id)
        .await
        .observe_total(filtered.total, &settings);

    Ok(Json(HomeResponse {
        total_minor: filtered.total.cents(),
        budget: budget_view(BudgetStatus::new(filtered.total, settings.budget)),
        expenses: filtered.expenses.into_iter().map(expense_view).collect(),
        alert_sent,
    }))
}

/// Handle requests for the report screen: filtered list plus chart series.
pub async fn report(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Json(query): Json<ExpenseQuery>,
) -> Result<Json<ReportResponse>, ServerError> {
    let ctx = SessionContext::from(session);
    let expenses = state.engine.list_expenses(&ctx).await?;

    let now = Utc::now().with_timezone(&state.timezone);
    let report = Report::build(&expenses, &expense_filter(query), &now);

    let total = report.total;
    Ok(Json(ReportResponse {
        expenses: report.expenses.into_iter().map(expense_view).collect(),
        total_minor: total.cents(),
        bucket_kind: match report.bucket_kind.unwrap_or(BucketKind::Day) {
            BucketKind::Day => BucketKindView::Day,
            BucketKind::Week => BucketKindView::Week,
            BucketKind::Month => BucketKindView::Month,
        },
        time_series: report
            .time_series
            .into_iter()
            .map(|bucket| BucketView {
                label: bucket.label,
                total_minor: bucket.total.cents(),
            })
            .collect(),
        category_series: report
            .category_series
            .into_iter()
            .map(|slice| CategorySliceView {
                share_percent: slice.share_percent(total),
                category: slice.category,
                total_minor: slice.total.cents(),
            })
            .collect(),
    }))
}
