//! Cost and supplier comparisons.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use warehouse_core::AnalyticsResult;
use warehouse_inventory::Delivery;

use crate::aggregate::{aggregate, Group, OnAbsent, Reducer};
use crate::window::{window, FloatKey, WindowExpr};

/// Average unit cost of one category next to the overall average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCostRow {
    pub category: String,
    pub deliveries: u64,
    pub avg_unit_cost: f64,
    /// Same value on every row: average over all deliveries.
    pub global_avg_unit_cost: f64,
}

fn unit_cost(d: &Delivery) -> Option<f64> {
    Some(d.unit_cost)
}

/// Per-category average `unit_cost` alongside the global average.
pub fn category_cost_comparison(deliveries: &[Delivery]) -> AnalyticsResult<Vec<CategoryCostRow>> {
    let global = aggregate(deliveries, |_| (), &[Reducer::avg(unit_cost, OnAbsent::Skip)])?;
    let Some(global_avg_unit_cost) = global.first().map(|g| g.value(0)) else {
        return Ok(Vec::new());
    };

    let groups = aggregate(
        deliveries,
        |d: &Delivery| d.level1_category.clone(),
        &[Reducer::avg(unit_cost, OnAbsent::Skip)],
    )?;

    Ok(groups
        .into_iter()
        .map(|g| CategoryCostRow {
            deliveries: g.size as u64,
            avg_unit_cost: g.value(0),
            category: g.key,
            global_avg_unit_cost,
        })
        .collect())
}

/// Supplier standing by delivered value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierRankingRow {
    pub supplier_name: String,
    pub deliveries: u64,
    pub total_value: f64,
    /// Competition rank: equal values share a rank.
    pub rank: u64,
    /// Distinct position; ties keep first-appearance order.
    pub row_number: u64,
}

/// Suppliers ranked by summed `total_sales`, highest first.
pub fn supplier_ranking(deliveries: &[Delivery]) -> AnalyticsResult<Vec<SupplierRankingRow>> {
    let groups = aggregate(
        deliveries,
        |d: &Delivery| d.supplier_name.clone(),
        &[
            Reducer::count(),
            Reducer::sum(|d: &Delivery| Some(d.total_sales), OnAbsent::Zero),
        ],
    )?;

    let ranked = window(
        groups,
        |_| (),
        |g: &Group<String>| Reverse(FloatKey(g.value(1))),
        &[WindowExpr::rank(), WindowExpr::row_number()],
    )?;

    Ok(ranked
        .into_iter()
        .map(|w| SupplierRankingRow {
            rank: w.position(0),
            row_number: w.position(1),
            deliveries: w.row.int(0).unsigned_abs(),
            total_value: w.row.value(1),
            supplier_name: w.row.key,
        })
        .collect())
}
