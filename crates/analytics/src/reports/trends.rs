//! Time-ordered reports: running totals, monthly rollups and daily census.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use warehouse_core::{AnalyticsError, AnalyticsResult, IssueId, ItemCode, LpoNumber};
use warehouse_inventory::{Delivery, Issuance};

use crate::aggregate::{aggregate, Group, OnAbsent, Reducer};
use crate::date_series::date_series;
use crate::join::{join, JoinMode};
use crate::window::{window, Frame, WindowExpr};

/// Issuance with its chronological running totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunningTotalRow {
    pub issue_id: IssueId,
    pub lpo_number: Option<LpoNumber>,
    pub item_code: ItemCode,
    pub issue_date: NaiveDate,
    pub issued_quantity: i64,
    pub total_cost: f64,
    pub cumulative_quantity: i64,
    pub cumulative_cost: f64,
    /// Mean quantity over this row and up to `moving_average_rows - 1` before it.
    pub moving_avg_quantity: f64,
}

/// Issuances by date with cumulative quantity/cost and a trailing moving
/// average of quantity. Same-day issuances keep input order.
pub fn issuance_running_totals(
    issuances: &[Issuance],
    moving_average_rows: usize,
) -> AnalyticsResult<Vec<RunningTotalRow>> {
    let Some(preceding) = moving_average_rows.checked_sub(1) else {
        return Err(AnalyticsError::invalid_parameter(
            "moving average needs at least one row",
        ));
    };

    let windowed = window(
        issuances.to_vec(),
        |_| (),
        |i: &Issuance| i.issue_date,
        &[
            WindowExpr::sum_int(|i: &Issuance| i.issued_quantity, Frame::UnboundedPreceding),
            WindowExpr::sum(|i: &Issuance| i.total_cost, Frame::UnboundedPreceding),
            WindowExpr::avg(|i: &Issuance| i.issued_quantity as f64, Frame::Preceding(preceding)),
        ],
    )?;

    Ok(windowed
        .into_iter()
        .map(|w| RunningTotalRow {
            cumulative_quantity: w.integer(0),
            cumulative_cost: w.number(1),
            moving_avg_quantity: w.number(2),
            issue_id: w.row.issue_id,
            lpo_number: w.row.lpo_number,
            item_code: w.row.item_code,
            issue_date: w.row.issue_date,
            issued_quantity: w.row.issued_quantity,
            total_cost: w.row.total_cost,
        })
        .collect())
}

/// Calendar month, ordered chronologically and rendered as `YYYY-MM`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl core::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let parsed = raw
            .rsplit_once('-')
            .and_then(|(y, m)| Some((y.parse::<i32>().ok()?, m.parse::<u32>().ok()?)))
            .filter(|(_, m)| (1..=12).contains(m));
        match parsed {
            Some((year, month)) => Ok(Self { year, month }),
            None => Err(serde::de::Error::custom(format!(
                "expected YYYY-MM, got {raw:?}"
            ))),
        }
    }
}

/// Monthly delivered value per category with its running total since the
/// first month on record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCategoryRow {
    pub month: YearMonth,
    pub category: String,
    pub total_value: f64,
    pub running_value: f64,
}

/// Group deliveries by `(month, category)`, accumulate per category in
/// month order, then list newest month first and larger values first.
pub fn monthly_category_summary(
    deliveries: &[Delivery],
) -> AnalyticsResult<Vec<MonthlyCategoryRow>> {
    let groups = aggregate(
        deliveries,
        |d: &Delivery| (YearMonth::of(d.receipt_date), d.level1_category.clone()),
        &[Reducer::sum(|d: &Delivery| Some(d.total_sales), OnAbsent::Zero)],
    )?;

    let windowed = window(
        groups,
        |g: &Group<(YearMonth, String)>| g.key.1.clone(),
        |g: &Group<(YearMonth, String)>| g.key.0,
        &[WindowExpr::sum(
            |g: &Group<(YearMonth, String)>| g.value(0),
            Frame::UnboundedPreceding,
        )],
    )?;

    let mut rows: Vec<MonthlyCategoryRow> = windowed
        .into_iter()
        .map(|w| {
            let running_value = w.number(0);
            let total_value = w.row.value(0);
            let (month, category) = w.row.key;
            MonthlyCategoryRow {
                month,
                category,
                total_value,
                running_value,
            }
        })
        .collect();
    rows.sort_by(|a, b| {
        b.month
            .cmp(&a.month)
            .then_with(|| b.total_value.total_cmp(&a.total_value))
    });
    Ok(rows)
}

/// Activity counts for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyActivityRow {
    pub date: NaiveDate,
    /// Distinct purchase orders received that day.
    pub deliveries: u64,
    /// Distinct issuance events that day.
    pub issuances: u64,
}

/// One row per day from `today - days` through `today`, including days with
/// no activity.
pub fn daily_activity_census(
    deliveries: &[Delivery],
    issuances: &[Issuance],
    today: NaiveDate,
    days: u32,
) -> AnalyticsResult<Vec<DailyActivityRow>> {
    let start = today.checked_sub_days(Days::new(days.into())).ok_or_else(|| {
        AnalyticsError::invalid_parameter(format!("{days} days before {today} is out of range"))
    })?;
    let series: Vec<NaiveDate> = date_series(start, today)?.collect();

    let received = aggregate(
        deliveries,
        |d: &Delivery| d.receipt_date,
        &[Reducer::count_distinct(|d: &Delivery| {
            d.lpo_number.as_ref().map(LpoNumber::to_string)
        })],
    )?;
    let issued = aggregate(
        issuances,
        |i: &Issuance| i.issue_date,
        &[Reducer::count_distinct(|i: &Issuance| {
            Some(i.issue_id.to_string())
        })],
    )?;

    // Group keys are unique dates, so each left-outer join yields exactly one
    // row per series date, in series order.
    let day_key = |d: &NaiveDate| Some(*d);
    let group_key = |g: &Group<NaiveDate>| Some(g.key);
    let by_receipt = join(&series, &received, day_key, group_key, JoinMode::LeftOuter);
    let by_issue = join(&series, &issued, day_key, group_key, JoinMode::LeftOuter);

    Ok(by_receipt
        .into_iter()
        .zip(by_issue)
        .map(|(r, i)| DailyActivityRow {
            date: *r.left,
            deliveries: r.right.map_or(0, |g| g.int(0).unsigned_abs()),
            issuances: i.right.map_or(0, |g| g.int(0).unsigned_abs()),
        })
        .collect())
}
