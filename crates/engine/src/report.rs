//! In-memory filtering and aggregation of expenses.
//!
//! Everything here is pure: callers pass the full expense list, the filter
//! selection and the current instant. Calendar fields (month, ISO week, day)
//! are evaluated in the time zone of `now`.
//!
//! Expenses without a date never pass a filter, `TimeFilter::All` included,
//! because every chart series needs a date to bucket on.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::{Expense, MoneyCents};

/// Time window of a filter selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimeFilter {
    #[default]
    All,
    /// Same calendar month and year as now.
    Monthly,
    /// Same ISO week and ISO week-year as now.
    Weekly,
    /// Inclusive range; a missing bound is open.
    Range {
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    },
}

impl TimeFilter {
    fn matches<Tz: TimeZone>(&self, date: &DateTime<Tz>, now: &DateTime<Tz>) -> bool {
        match self {
            Self::All => true,
            Self::Monthly => date.year() == now.year() && date.month() == now.month(),
            Self::Weekly => date.iso_week() == now.iso_week(),
            Self::Range { start, end } => {
                let instant = date.with_timezone(&Utc);
                start.is_none_or(|start| instant >= start) && end.is_none_or(|end| instant <= end)
            }
        }
    }

    /// Granularity of the time series for this window.
    #[must_use]
    pub fn bucket_kind(&self) -> BucketKind {
        match self {
            Self::All | Self::Range { .. } => BucketKind::Day,
            Self::Weekly => BucketKind::Week,
            Self::Monthly => BucketKind::Month,
        }
    }
}

/// A time window combined with an optional category name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpenseFilter {
    pub time: TimeFilter,
    /// Exact category name; `None` or blank disables the category filter.
    pub category: Option<String>,
}

impl ExpenseFilter {
    #[must_use]
    pub fn new(time: TimeFilter) -> Self {
        Self {
            time,
            category: None,
        }
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    fn category_matches(&self, expense: &Expense) -> bool {
        match self.category.as_deref() {
            Some(category) if !category.trim().is_empty() => expense.category == category,
            _ => true,
        }
    }

    /// Filter `expenses`, newest first, and sum what is left.
    pub fn apply<Tz: TimeZone>(&self, expenses: &[Expense], now: &DateTime<Tz>) -> FilteredExpenses {
        let tz = now.timezone();
        let mut selected: Vec<Expense> = expenses
            .iter()
            .filter(|expense| {
                expense.date.is_some_and(|date| {
                    self.time.matches(&date.with_timezone(&tz), now)
                }) && self.category_matches(expense)
            })
            .cloned()
            .collect();
        selected.sort_by(|a, b| b.date.cmp(&a.date));

        let total = selected.iter().map(|expense| expense.amount).sum();
        FilteredExpenses {
            expenses: selected,
            total,
        }
    }
}

/// Output of [`ExpenseFilter::apply`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilteredExpenses {
    pub expenses: Vec<Expense>,
    pub total: MoneyCents,
}

/// Time series granularity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketKind {
    /// `05 Jan`
    Day,
    /// ISO week number, `07`
    Week,
    /// `Feb`
    Month,
}

impl BucketKind {
    fn label<Tz: TimeZone>(self, date: &DateTime<Tz>) -> String
    where
        Tz::Offset: fmt::Display,
    {
        let pattern = match self {
            Self::Day => "%d %b",
            Self::Week => "%V",
            Self::Month => "%b",
        };
        date.format(pattern).to_string()
    }

    /// Chronological order of a label. The year is not part of any label, so
    /// it does not take part in the ordering either.
    fn sort_key<Tz: TimeZone>(self, date: &DateTime<Tz>) -> u32 {
        match self {
            Self::Day => date.month() * 100 + date.day(),
            Self::Week => date.iso_week().week(),
            Self::Month => date.month(),
        }
    }
}

/// One bar of the time series.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub label: String,
    pub total: MoneyCents,
}

/// One slice of the category series.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySlice {
    pub category: String,
    pub total: MoneyCents,
}

impl CategorySlice {
    /// Share of this slice in `grand_total`, in percent.
    #[must_use]
    pub fn share_percent(&self, grand_total: MoneyCents) -> f64 {
        self.total.percent_of(grand_total)
    }
}

/// Filtered expenses plus the two chart series derived from them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    pub expenses: Vec<Expense>,
    pub total: MoneyCents,
    pub bucket_kind: Option<BucketKind>,
    pub time_series: Vec<Bucket>,
    pub category_series: Vec<CategorySlice>,
}

impl Report {
    pub fn build<Tz: TimeZone>(
        expenses: &[Expense],
        filter: &ExpenseFilter,
        now: &DateTime<Tz>,
    ) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        let filtered = filter.apply(expenses, now);
        let kind = filter.time.bucket_kind();
        let time_series = time_series(&filtered.expenses, kind, &now.timezone());
        let category_series = category_series(&filtered.expenses);

        Self {
            expenses: filtered.expenses,
            total: filtered.total,
            bucket_kind: Some(kind),
            time_series,
            category_series,
        }
    }
}

/// Sum amounts per time bucket, in chronological bucket order.
pub fn time_series<Tz: TimeZone>(expenses: &[Expense], kind: BucketKind, tz: &Tz) -> Vec<Bucket>
where
    Tz::Offset: fmt::Display,
{
    let mut buckets: BTreeMap<u32, Bucket> = BTreeMap::new();
    for expense in expenses {
        let Some(date) = expense.date else {
            continue;
        };
        let local = date.with_timezone(tz);
        buckets
            .entry(kind.sort_key(&local))
            .or_insert_with(|| Bucket {
                label: kind.label(&local),
                total: MoneyCents::ZERO,
            })
            .total += expense.amount;
    }
    buckets.into_values().collect()
}

/// Sum amounts per category name, in order of first appearance.
pub fn category_series(expenses: &[Expense]) -> Vec<CategorySlice> {
    let mut slices: Vec<CategorySlice> = Vec::new();
    for expense in expenses {
        match slices
            .iter_mut()
            .find(|slice| slice.category == expense.category)
        {
            Some(slice) => slice.total += expense.amount,
            None => slices.push(CategorySlice {
                category: expense.category.clone(),
                total: expense.amount,
            }),
        }
    }
    slices
}

#[cfg(test)]
mod tests {
    use chrono_tz::Europe::Rome;
    use uuid::Uuid;

    use super::*;

    fn expense(cents: i64, category: &str, date: Option<DateTime<Utc>>) -> Expense {
        Expense {
            id: Uuid::new_v4(),
            amount: MoneyCents::new(cents),
            category: category.to_string(),
            date,
            note: String::new(),
        }
    }

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn sample() -> Vec<Expense> {
        vec![
            expense(1000, "Food", Some(utc(2024, 1, 5))),
            expense(2000, "Food", Some(utc(2024, 2, 10))),
            expense(500, "Fuel", Some(utc(2024, 2, 12))),
        ]
    }

    #[test]
    fn monthly_with_category_keeps_the_intersection() {
        let now = utc(2024, 2, 20);
        let result = ExpenseFilter::new(TimeFilter::Monthly)
            .category("Food")
            .apply(&sample(), &now);

        assert_eq!(result.expenses.len(), 1);
        assert_eq!(result.expenses[0].amount, MoneyCents::new(2000));
        assert_eq!(result.total, MoneyCents::new(2000));
        assert_eq!(result.total.to_string(), "20.00€");
    }

    #[test]
    fn monthly_is_sorted_newest_first() {
        let now = utc(2024, 2, 20);
        let result = ExpenseFilter::new(TimeFilter::Monthly).apply(&sample(), &now);

        let dates: Vec<_> = result.expenses.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![Some(utc(2024, 2, 12)), Some(utc(2024, 2, 10))]);
        assert_eq!(result.total, MoneyCents::new(2500));
    }

    #[test]
    fn monthly_ignores_same_month_of_another_year() {
        let mut expenses = sample();
        expenses.push(expense(700, "Food", Some(utc(2023, 2, 11))));
        let result = ExpenseFilter::new(TimeFilter::Monthly).apply(&expenses, &utc(2024, 2, 20));
        assert_eq!(result.total, MoneyCents::new(2500));
    }

    #[test]
    fn weekly_uses_iso_weeks() {
        // 2024-02-14 is a Wednesday in ISO week 7.
        let now = utc(2024, 2, 14);
        let expenses = vec![
            expense(100, "Food", Some(utc(2024, 2, 12))),
            expense(200, "Food", Some(utc(2024, 2, 18))),
            expense(400, "Food", Some(utc(2024, 2, 11))),
            expense(800, "Food", Some(utc(2023, 2, 14))),
        ];
        let result = ExpenseFilter::new(TimeFilter::Weekly).apply(&expenses, &now);
        assert_eq!(result.total, MoneyCents::new(300));
    }

    #[test]
    fn range_is_inclusive_and_bounds_are_optional() {
        let start = Utc.with_ymd_and_hms(2024, 1, 5, 12, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 2, 10, 12, 0, 0).unwrap();
        let now = utc(2024, 3, 1);

        let closed = ExpenseFilter::new(TimeFilter::Range {
            start: Some(start),
            end: Some(end),
        })
        .apply(&sample(), &now);
        assert_eq!(closed.total, MoneyCents::new(3000));

        let open_start = ExpenseFilter::new(TimeFilter::Range {
            start: None,
            end: Some(end),
        })
        .apply(&sample(), &now);
        assert_eq!(open_start.total, MoneyCents::new(3000));

        let open_end = ExpenseFilter::new(TimeFilter::Range {
            start: Some(end),
            end: None,
        })
        .apply(&sample(), &now);
        assert_eq!(open_end.total, MoneyCents::new(2500));

        let unbounded = ExpenseFilter::new(TimeFilter::Range {
            start: None,
            end: None,
        })
        .apply(&sample(), &now);
        assert_eq!(unbounded.total, MoneyCents::new(3500));
    }

    #[test]
    fn undated_expenses_are_always_excluded() {
        let mut expenses = sample();
        expenses.push(expense(9900, "Food", None));
        let now = utc(2024, 2, 20);

        let all = ExpenseFilter::default().apply(&expenses, &now);
        assert_eq!(all.expenses.len(), 3);
        assert_eq!(all.total, MoneyCents::new(3500));
    }

    #[test]
    fn blank_category_disables_the_category_filter() {
        let now = utc(2024, 2, 20);
        let result = ExpenseFilter::default().category("  ").apply(&sample(), &now);
        assert_eq!(result.expenses.len(), 3);
    }

    #[test]
    fn calendar_fields_follow_the_time_zone_of_now() {
        // 23:30 UTC on Feb 29th is already March 1st in Rome.
        let late = Utc.with_ymd_and_hms(2024, 2, 29, 23, 30, 0).unwrap();
        let expenses = vec![expense(100, "Food", Some(late))];

        let now_rome = Rome.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        let rome = ExpenseFilter::new(TimeFilter::Monthly).apply(&expenses, &now_rome);
        assert_eq!(rome.total, MoneyCents::new(100));

        let now_utc = utc(2024, 3, 15);
        let in_utc = ExpenseFilter::new(TimeFilter::Monthly).apply(&expenses, &now_utc);
        assert!(in_utc.expenses.is_empty());
    }

    #[test]
    fn daily_series_is_chronological() {
        let expenses = vec![
            expense(500, "Fuel", Some(utc(2024, 2, 12))),
            expense(1000, "Food", Some(utc(2024, 1, 5))),
            expense(2000, "Food", Some(utc(2024, 2, 10))),
            expense(300, "Fuel", Some(utc(2024, 2, 10))),
        ];
        let report = Report::build(&expenses, &ExpenseFilter::default(), &utc(2024, 2, 20));

        let labels: Vec<_> = report.time_series.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["05 Jan", "10 Feb", "12 Feb"]);
        let totals: Vec<_> = report.time_series.iter().map(|b| b.total.cents()).collect();
        assert_eq!(totals, vec![1000, 2300, 500]);
        assert_eq!(report.bucket_kind, Some(BucketKind::Day));
    }

    #[test]
    fn weekly_and_monthly_series_labels() {
        let now = utc(2024, 2, 14);
        let weekly = Report::build(&sample(), &ExpenseFilter::new(TimeFilter::Weekly), &now);
        assert_eq!(
            weekly.time_series,
            vec![Bucket {
                label: "07".to_string(),
                total: MoneyCents::new(500),
            }]
        );

        let monthly = Report::build(&sample(), &ExpenseFilter::new(TimeFilter::Monthly), &now);
        assert_eq!(
            monthly.time_series,
            vec![Bucket {
                label: "Feb".to_string(),
                total: MoneyCents::new(2500),
            }]
        );
    }

    #[test]
    fn category_series_sums_per_name() {
        let report = Report::build(&sample(), &ExpenseFilter::default(), &utc(2024, 2, 20));

        assert_eq!(
            report.category_series,
            vec![
                CategorySlice {
                    category: "Fuel".to_string(),
                    total: MoneyCents::new(500),
                },
                CategorySlice {
                    category: "Food".to_string(),
                    total: MoneyCents::new(3000),
                },
            ]
        );
        assert_eq!(report.total, MoneyCents::new(3500));
        let shares: f64 = report
            .category_series
            .iter()
            .map(|slice| slice.share_percent(report.total))
            .sum();
        assert!((shares - 100.0).abs() < 1e-9);
    }

    #[test]
    fn empty_input_gives_empty_report() {
        let report = Report::build(&[], &ExpenseFilter::default(), &utc(2024, 2, 20));
        assert!(report.expenses.is_empty());
        assert!(report.time_series.is_empty());
        assert!(report.category_series.is_empty());
        assert_eq!(report.total, MoneyCents::ZERO);
    }

    #[test]
    fn huge_amounts_saturate_every_total() {
        let expenses = vec![
            expense(i64::MAX, "Food", Some(utc(2024, 2, 10))),
            expense(1, "Food", Some(utc(2024, 2, 10))),
        ];
        let report = Report::build(&expenses, &ExpenseFilter::default(), &utc(2024, 2, 20));

        assert_eq!(report.total, MoneyCents::new(i64::MAX));
        assert_eq!(report.time_series[0].total, MoneyCents::new(i64::MAX));
        assert_eq!(report.category_series[0].total, MoneyCents::new(i64::MAX));
    }
}
