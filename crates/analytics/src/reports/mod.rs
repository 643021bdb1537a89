//! Named reports composed from the join/aggregate/window/date-series operators.
//!
//! Every report is a pure function of one [`Snapshot`] plus parameters. The
//! catalog adds the reference "now", configuration, logging and a run envelope.

pub mod ranking;
pub mod reconciliation;
pub mod stock;
pub mod trends;

#[cfg(test)]
pub(crate) mod fixtures;

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use warehouse_core::{AnalyticsError, AnalyticsResult, Clock, SystemClock};
use warehouse_inventory::{Delivery, RecordStore, Snapshot};

use crate::config::ReportConfig;

pub use ranking::{CategoryCostRow, SupplierRankingRow};
pub use reconciliation::{ReconciliationRow, RepeatedIssuanceRow};
pub use stock::{ExpiryRiskRow, TurnoverRow};
pub use trends::{DailyActivityRow, MonthlyCategoryRow, RunningTotalRow, YearMonth};

/// The reports the catalog can produce.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    UnmatchedDeliveries,
    RepeatedIssuances,
    CategoryCostComparison,
    Reconciliation,
    SupplierRanking,
    IssuanceRunningTotals,
    RecentlyIssuedDeliveries,
    MonthlyCategorySummary,
    DailyActivityCensus,
    Turnover,
    ExpiryRisk,
}

impl ReportKind {
    pub const ALL: [ReportKind; 11] = [
        ReportKind::UnmatchedDeliveries,
        ReportKind::RepeatedIssuances,
        ReportKind::CategoryCostComparison,
        ReportKind::Reconciliation,
        ReportKind::SupplierRanking,
        ReportKind::IssuanceRunningTotals,
        ReportKind::RecentlyIssuedDeliveries,
        ReportKind::MonthlyCategorySummary,
        ReportKind::DailyActivityCensus,
        ReportKind::Turnover,
        ReportKind::ExpiryRisk,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ReportKind::UnmatchedDeliveries => "unmatched_deliveries",
            ReportKind::RepeatedIssuances => "repeated_issuances",
            ReportKind::CategoryCostComparison => "category_cost_comparison",
            ReportKind::Reconciliation => "reconciliation",
            ReportKind::SupplierRanking => "supplier_ranking",
            ReportKind::IssuanceRunningTotals => "issuance_running_totals",
            ReportKind::RecentlyIssuedDeliveries => "recently_issued_deliveries",
            ReportKind::MonthlyCategorySummary => "monthly_category_summary",
            ReportKind::DailyActivityCensus => "daily_activity_census",
            ReportKind::Turnover => "turnover",
            ReportKind::ExpiryRisk => "expiry_risk",
        }
    }
}

impl core::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReportKind {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportKind::ALL
            .into_iter()
            .find(|k| k.name() == s.trim())
            .ok_or_else(|| AnalyticsError::invalid_parameter(format!("unknown report: {s}")))
    }
}

/// Typed result rows, tagged with the report that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "rows", rename_all = "snake_case")]
pub enum ReportRows {
    UnmatchedDeliveries(Vec<Delivery>),
    RepeatedIssuances(Vec<RepeatedIssuanceRow>),
    CategoryCostComparison(Vec<CategoryCostRow>),
    Reconciliation(Vec<ReconciliationRow>),
    SupplierRanking(Vec<SupplierRankingRow>),
    IssuanceRunningTotals(Vec<RunningTotalRow>),
    RecentlyIssuedDeliveries(Vec<Delivery>),
    MonthlyCategorySummary(Vec<MonthlyCategoryRow>),
    DailyActivityCensus(Vec<DailyActivityRow>),
    Turnover(Vec<TurnoverRow>),
    ExpiryRisk(Vec<ExpiryRiskRow>),
}

impl ReportRows {
    pub fn len(&self) -> usize {
        match self {
            ReportRows::UnmatchedDeliveries(r) => r.len(),
            ReportRows::RepeatedIssuances(r) => r.len(),
            ReportRows::CategoryCostComparison(r) => r.len(),
            ReportRows::Reconciliation(r) => r.len(),
            ReportRows::SupplierRanking(r) => r.len(),
            ReportRows::IssuanceRunningTotals(r) => r.len(),
            ReportRows::RecentlyIssuedDeliveries(r) => r.len(),
            ReportRows::MonthlyCategorySummary(r) => r.len(),
            ReportRows::DailyActivityCensus(r) => r.len(),
            ReportRows::Turnover(r) => r.len(),
            ReportRows::ExpiryRisk(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One completed report invocation.
///
/// Transient: owned by the caller once returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRun {
    pub run_id: Uuid,
    pub report: ReportKind,
    /// Reference instant used for every today-relative computation.
    pub as_of: DateTime<Utc>,
    #[serde(flatten)]
    pub rows: ReportRows,
}

/// Entry point for computing reports.
#[derive(Debug, Clone)]
pub struct ReportCatalog<C = SystemClock> {
    config: ReportConfig,
    clock: C,
}

impl ReportCatalog<SystemClock> {
    pub fn new(config: ReportConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> ReportCatalog<C> {
    pub fn with_clock(config: ReportConfig, clock: C) -> Self {
        Self { config, clock }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Compute one report over `snapshot`.
    ///
    /// Errors abort this invocation only and are returned unchanged.
    pub fn run(&self, kind: ReportKind, snapshot: &Snapshot) -> AnalyticsResult<ReportRun> {
        let as_of = self.clock.now();
        let run_id = Uuid::now_v7();

        match self.compute(kind, snapshot, as_of) {
            Ok(rows) => {
                tracing::info!(
                    report = kind.name(),
                    %run_id,
                    rows = rows.len(),
                    deliveries = snapshot.deliveries.len(),
                    issuances = snapshot.issuances.len(),
                    "report computed"
                );
                Ok(ReportRun {
                    run_id,
                    report: kind,
                    as_of,
                    rows,
                })
            }
            Err(err) => {
                tracing::warn!(report = kind.name(), %run_id, error = %err, "report aborted");
                Err(err)
            }
        }
    }

    /// Take one snapshot from `store` and compute `kind` over it.
    pub fn run_from_store<S: RecordStore>(
        &self,
        kind: ReportKind,
        store: &S,
    ) -> AnalyticsResult<ReportRun> {
        self.run(kind, &store.snapshot())
    }

    /// Compute every report against the same snapshot, stopping at the first
    /// failure.
    pub fn run_all(&self, snapshot: &Snapshot) -> AnalyticsResult<Vec<ReportRun>> {
        ReportKind::ALL
            .into_iter()
            .map(|kind| self.run(kind, snapshot))
            .collect()
    }

    fn compute(
        &self,
        kind: ReportKind,
        snapshot: &Snapshot,
        now: DateTime<Utc>,
    ) -> AnalyticsResult<ReportRows> {
        let deliveries = snapshot.deliveries.as_slice();
        let issuances = snapshot.issuances.as_slice();
        let today = now.date_naive();

        let rows = match kind {
            ReportKind::UnmatchedDeliveries => ReportRows::UnmatchedDeliveries(
                reconciliation::unmatched_deliveries(deliveries, issuances)?,
            ),
            ReportKind::RepeatedIssuances => {
                ReportRows::RepeatedIssuances(reconciliation::repeated_issuances(
                    deliveries,
                    issuances,
                    &self.config.controlled_category,
                )?)
            }
            ReportKind::CategoryCostComparison => ReportRows::CategoryCostComparison(
                ranking::category_cost_comparison(deliveries)?,
            ),
            ReportKind::Reconciliation => ReportRows::Reconciliation(
                reconciliation::reconciliation(deliveries, issuances)?,
            ),
            ReportKind::SupplierRanking => {
                ReportRows::SupplierRanking(ranking::supplier_ranking(deliveries)?)
            }
            ReportKind::IssuanceRunningTotals => ReportRows::IssuanceRunningTotals(
                trends::issuance_running_totals(issuances, self.config.moving_average_rows)?,
            ),
            ReportKind::RecentlyIssuedDeliveries => {
                ReportRows::RecentlyIssuedDeliveries(reconciliation::recently_issued_deliveries(
                    deliveries,
                    issuances,
                    today,
                    self.config.recent_issuance_days,
                )?)
            }
            ReportKind::MonthlyCategorySummary => ReportRows::MonthlyCategorySummary(
                trends::monthly_category_summary(deliveries)?,
            ),
            ReportKind::DailyActivityCensus => {
                ReportRows::DailyActivityCensus(trends::daily_activity_census(
                    deliveries,
                    issuances,
                    today,
                    self.config.census_days,
                )?)
            }
            ReportKind::Turnover => ReportRows::Turnover(stock::turnover(deliveries, issuances)?),
            ReportKind::ExpiryRisk => ReportRows::ExpiryRisk(stock::expiry_risk(
                deliveries,
                now,
                self.config.expiry_horizon_days,
            )?),
        };
        Ok(rows)
    }
}
