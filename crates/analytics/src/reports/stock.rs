//! Stock velocity and expiry exposure.

use std::cmp::Reverse;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use warehouse_core::{AnalyticsError, AnalyticsResult, ItemCode, LpoNumber};
use warehouse_inventory::{Delivery, Issuance};

use crate::aggregate::{aggregate, Group, OnAbsent, Reducer};
use crate::join::{join, JoinMode, Joined};
use crate::window::FloatKey;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Issued-to-held ratio for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnoverRow {
    pub category: String,
    pub total_stock: i64,
    pub total_issued: i64,
    /// `total_issued / total_stock`, or 0 when nothing is held.
    pub turnover_rate: f64,
}

/// Turnover per `level1_category`, fastest moving first.
///
/// `total_stock` counts each delivery line once. `total_issued` sums every
/// joined (delivery, issuance) pair, so an issuance is counted once per
/// delivery line sharing its order number.
pub fn turnover(
    deliveries: &[Delivery],
    issuances: &[Issuance],
) -> AnalyticsResult<Vec<TurnoverRow>> {
    let held = aggregate(
        deliveries,
        |d: &Delivery| d.level1_category.clone(),
        &[Reducer::sum_int(
            |d: &Delivery| Some(d.qty_on_hand),
            OnAbsent::Zero,
        )],
    )?;

    let pairs = join(
        deliveries,
        issuances,
        |d: &Delivery| d.lpo_number.clone(),
        |i: &Issuance| i.lpo_number.clone(),
        JoinMode::LeftOuter,
    );
    let issued = aggregate(
        &pairs,
        |p: &Joined<'_, Delivery, Issuance>| p.left.level1_category.clone(),
        &[Reducer::sum_int(
            |p: &Joined<'_, Delivery, Issuance>| p.right.map(|i| i.issued_quantity),
            OnAbsent::Zero,
        )],
    )?;

    let category = |g: &Group<String>| Some(g.key.clone());
    let mut rows: Vec<TurnoverRow> = join(&held, &issued, category, category, JoinMode::LeftOuter)
        .into_iter()
        .map(|j| {
            let total_stock = j.left.int(0);
            let total_issued = j.right.map_or(0, |g| g.int(0));
            let turnover_rate = if total_stock > 0 {
                total_issued as f64 / total_stock as f64
            } else {
                0.0
            };
            TurnoverRow {
                category: j.left.key.clone(),
                total_stock,
                total_issued,
                turnover_rate,
            }
        })
        .collect();
    rows.sort_by_key(|r| Reverse(FloatKey(r.turnover_rate)));
    Ok(rows)
}

/// Delivery line expiring within the horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpiryRiskRow {
    pub lpo_number: Option<LpoNumber>,
    pub item_code: ItemCode,
    pub batch_no: Option<String>,
    pub supplier_name: String,
    pub expiry_date: NaiveDate,
    pub qty_on_hand: i64,
    pub unit_cost: f64,
    pub stock_value: f64,
    /// Fractional days from `now` to midnight UTC at the start of
    /// `expiry_date`. A line expiring today is negative once the day has
    /// begun (-0.5 at noon).
    pub days_to_expiry: f64,
}

/// Deliveries expiring between today and `today + horizon_days` inclusive,
/// soonest first, then by stock value descending.
///
/// Lines without an expiry date are excluded.
pub fn expiry_risk(
    deliveries: &[Delivery],
    now: DateTime<Utc>,
    horizon_days: u32,
) -> AnalyticsResult<Vec<ExpiryRiskRow>> {
    let today = now.date_naive();
    let until = today.checked_add_days(Days::new(horizon_days.into())).ok_or_else(|| {
        AnalyticsError::invalid_parameter(format!(
            "{horizon_days} days after {today} is out of range"
        ))
    })?;

    let mut rows: Vec<ExpiryRiskRow> = deliveries
        .iter()
        .filter_map(|d| {
            let expiry_date = d.expiry_date.filter(|e| *e >= today && *e <= until)?;
            let expires_at = expiry_date.and_time(NaiveTime::MIN).and_utc();
            let days_to_expiry = (expires_at - now).num_milliseconds() as f64 / MILLIS_PER_DAY;
            Some(ExpiryRiskRow {
                lpo_number: d.lpo_number.clone(),
                item_code: d.item_code.clone(),
                batch_no: d.batch_no.clone(),
                supplier_name: d.supplier_name.clone(),
                expiry_date,
                qty_on_hand: d.qty_on_hand,
                unit_cost: d.unit_cost,
                stock_value: d.stock_value(),
                days_to_expiry,
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        a.days_to_expiry
            .total_cmp(&b.days_to_expiry)
            .then_with(|| b.stock_value.total_cmp(&a.stock_value))
    });
    Ok(rows)
}
