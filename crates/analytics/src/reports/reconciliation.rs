//! Delivery ↔ issuance reconciliation reports.

use std::cmp::Reverse;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use warehouse_core::{AnalyticsError, AnalyticsResult, ItemCode, LpoNumber};
use warehouse_inventory::{Delivery, Issuance};

use crate::aggregate::{aggregate, OnAbsent, Reducer};
use crate::join::{anti_join, join, semi_join, JoinMode, Joined};

type Pair<'a> = Joined<'a, Delivery, Issuance>;

fn delivery_lpo(d: &Delivery) -> Option<LpoNumber> {
    d.lpo_number.clone()
}

fn issuance_lpo(i: &Issuance) -> Option<LpoNumber> {
    i.lpo_number.clone()
}

/// Deliveries whose purchase order was never issued against, newest receipt first.
pub fn unmatched_deliveries(
    deliveries: &[Delivery],
    issuances: &[Issuance],
) -> AnalyticsResult<Vec<Delivery>> {
    let mut rows: Vec<Delivery> = anti_join(deliveries, issuances, delivery_lpo, issuance_lpo)
        .into_iter()
        .cloned()
        .collect();
    rows.sort_by_key(|d| Reverse(d.receipt_date));
    Ok(rows)
}

/// An (order, item) pair issued more than once against a controlled delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatedIssuanceRow {
    pub lpo_number: LpoNumber,
    pub item_code: ItemCode,
    pub issue_count: u64,
}

/// Issuances against orders delivered under `category`, grouped by
/// `(lpo_number, item_code)`, keeping groups with more than one issuance.
pub fn repeated_issuances(
    deliveries: &[Delivery],
    issuances: &[Issuance],
    category: &str,
) -> AnalyticsResult<Vec<RepeatedIssuanceRow>> {
    let controlled: Vec<&Delivery> = deliveries
        .iter()
        .filter(|d| d.level1_category == category)
        .collect();

    let matched: Vec<&Issuance> =
        semi_join(issuances, &controlled, issuance_lpo, |d: &&Delivery| {
            d.lpo_number.clone()
        });

    let groups = aggregate(
        &matched,
        |i: &&Issuance| (i.lpo_number.clone(), i.item_code.clone()),
        &[Reducer::count()],
    )?;

    Ok(groups
        .into_iter()
        .filter(|g| g.size > 1)
        .filter_map(|g| {
            let (lpo_number, item_code) = g.key;
            lpo_number.map(|lpo_number| RepeatedIssuanceRow {
                lpo_number,
                item_code,
                issue_count: g.size as u64,
            })
        })
        .collect())
}

/// Stock received versus stock issued per delivery line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationRow {
    pub lpo_number: Option<LpoNumber>,
    pub item_code: ItemCode,
    pub qty_on_hand: i64,
    pub total_issued: i64,
    pub remaining_stock: i64,
}

/// Left-outer join deliveries to issuances, grouped by
/// `(lpo_number, item_code, qty_on_hand)`; most remaining stock first.
///
/// Absent issuances count as zero issued.
pub fn reconciliation(
    deliveries: &[Delivery],
    issuances: &[Issuance],
) -> AnalyticsResult<Vec<ReconciliationRow>> {
    let pairs = join(
        deliveries,
        issuances,
        delivery_lpo,
        issuance_lpo,
        JoinMode::LeftOuter,
    );

    let groups = aggregate(
        &pairs,
        |p: &Pair<'_>| {
            (
                p.left.lpo_number.clone(),
                p.left.item_code.clone(),
                p.left.qty_on_hand,
            )
        },
        &[Reducer::sum_int(
            |p: &Pair<'_>| p.right.map(|i| i.issued_quantity),
            OnAbsent::Zero,
        )],
    )?;

    let mut rows: Vec<ReconciliationRow> = groups
        .into_iter()
        .map(|g| {
            let total_issued = g.int(0);
            let (lpo_number, item_code, qty_on_hand) = g.key;
            ReconciliationRow {
                lpo_number,
                item_code,
                qty_on_hand,
                total_issued,
                remaining_stock: qty_on_hand.saturating_sub(total_issued),
            }
        })
        .collect();
    rows.sort_by_key(|r| Reverse(r.remaining_stock));
    Ok(rows)
}

/// Deliveries with at least one issuance on the same order dated within the
/// trailing `days` days up to and including `today`.
///
/// Existence check: a delivery appears once however many issuances qualify.
pub fn recently_issued_deliveries(
    deliveries: &[Delivery],
    issuances: &[Issuance],
    today: NaiveDate,
    days: u32,
) -> AnalyticsResult<Vec<Delivery>> {
    let since = today.checked_sub_days(Days::new(days.into())).ok_or_else(|| {
        AnalyticsError::invalid_parameter(format!("{days} days before {today} is out of range"))
    })?;

    let recent: Vec<&Issuance> = issuances
        .iter()
        .filter(|i| i.issue_date >= since && i.issue_date <= today)
        .collect();

    Ok(
        semi_join(deliveries, &recent, delivery_lpo, |i: &&Issuance| {
            i.lpo_number.clone()
        })
        .into_iter()
        .cloned()
        .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::fixtures::{date, delivery, issuance};

    #[test]
    fn unmatched_deliveries_are_newest_first() {
        let mut old = delivery("A", 1);
        old.receipt_date = date(2024, 1, 1);
        let mut new = delivery("B", 1);
        new.receipt_date = date(2024, 5, 1);
        let matched = delivery("C", 1);
        let mut no_key = delivery("D", 1);
        no_key.lpo_number = None;
        no_key.receipt_date = date(2024, 3, 1);

        let rows = unmatched_deliveries(
            &[old, new, matched, no_key],
            &[issuance("I1", "C", 1)],
        )
        .unwrap();

        let dates: Vec<NaiveDate> = rows.iter().map(|d| d.receipt_date).collect();
        assert_eq!(dates, vec![date(2024, 5, 1), date(2024, 3, 1), date(2024, 1, 1)]);
    }

    #[test]
    fn repeated_issuances_only_count_controlled_orders() {
        let pharma = delivery("P", 10);
        let mut hardware = delivery("H", 10);
        hardware.level1_category = "Hardware".to_string();

        let issuances = vec![
            issuance("I1", "P", 1),
            issuance("I2", "P", 1),
            issuance("I3", "H", 1),
            issuance("I4", "H", 1),
            issuance("I5", "Q", 1),
        ];

        let rows =
            repeated_issuances(&[pharma, hardware], &issuances, "Pharmaceuticals").unwrap();
        assert_eq!(
            rows,
            vec![RepeatedIssuanceRow {
                lpo_number: LpoNumber::new("P"),
                item_code: ItemCode::new("ITEM-P"),
                issue_count: 2,
            }]
        );
    }

    #[test]
    fn repeated_issuances_are_not_inflated_by_duplicate_deliveries() {
        let deliveries = vec![delivery("P", 1), delivery("P", 2)];
        let issuances = vec![issuance("I1", "P", 1)];
        let rows = repeated_issuances(&deliveries, &issuances, "Pharmaceuticals").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn reconciliation_sums_issued_quantities() {
        let rows = reconciliation(
            &[delivery("B", 10)],
            &[issuance("I1", "B", 4), issuance("I2", "B", 3)],
        )
        .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_issued, 7);
        assert_eq!(rows[0].remaining_stock, 3);
    }

    #[test]
    fn reconciliation_totals_stay_exact_for_large_quantities() {
        let base = 1i64 << 53;
        let rows = reconciliation(
            &[delivery("B", base + 10)],
            &[issuance("I1", "B", base), issuance("I2", "B", 1)],
        )
        .unwrap();

        assert_eq!(rows[0].total_issued, base + 1);
        assert_eq!(rows[0].remaining_stock, 9);
    }

    #[test]
    fn reconciliation_orders_by_remaining_stock_descending() {
        let rows = reconciliation(
            &[delivery("A", 5), delivery("B", 50), delivery("C", 20)],
            &[issuance("I1", "B", 45)],
        )
        .unwrap();

        let remaining: Vec<i64> = rows.iter().map(|r| r.remaining_stock).collect();
        assert_eq!(remaining, vec![20, 5, 5]);
        assert_eq!(rows[0].lpo_number, Some(LpoNumber::new("C")));
        assert_eq!(rows[1].lpo_number, Some(LpoNumber::new("A")));
    }

    #[test]
    fn recent_filter_is_an_existence_check() {
        let today = date(2024, 6, 15);
        let mut stale = issuance("I3", "B", 1);
        stale.issue_date = date(2024, 5, 1);

        let deliveries = vec![delivery("A", 1), delivery("B", 1)];
        let issuances = vec![issuance("I1", "A", 1), issuance("I2", "A", 2), stale];

        let rows = recently_issued_deliveries(&deliveries, &issuances, today, 30).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].lpo_number, Some(LpoNumber::new("A")));
    }

    #[test]
    fn recent_filter_includes_the_boundary_day() {
        let today = date(2024, 6, 15);
        let mut edge = issuance("I1", "A", 1);
        edge.issue_date = date(2024, 5, 16);

        let rows = recently_issued_deliveries(&[delivery("A", 1)], &[edge], today, 30).unwrap();
        assert_eq!(rows.len(), 1);
    }
}
