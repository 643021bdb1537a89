use chrono::{NaiveDate, TimeZone, Utc};

use warehouse_analytics::reports::{ReconciliationRow, SupplierRankingRow};
use warehouse_analytics::{
    date_series, ReportCatalog, ReportConfig, ReportKind, ReportRows, ReportRun,
};
use warehouse_core::{AnalyticsError, FixedClock, IssueId, ItemCode, LpoNumber};
use warehouse_inventory::{Delivery, InMemoryRecordStore, Issuance, RecordStore, Snapshot};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn catalog() -> ReportCatalog<FixedClock> {
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 9, 30, 0).unwrap();
    ReportCatalog::with_clock(ReportConfig::default(), FixedClock::new(now))
}

fn delivery(lpo: &str, qty: i64, supplier: &str, value: f64) -> Delivery {
    Delivery {
        lpo_number: Some(LpoNumber::new(lpo)),
        item_code: ItemCode::new("AMOX-250"),
        receipt_date: date(2024, 6, 1),
        supplier_name: supplier.to_string(),
        level1_category: "Pharmaceuticals".to_string(),
        level2_category: "Antibiotics".to_string(),
        batch_no: Some(format!("B-{lpo}")),
        expiry_date: None,
        qty_on_hand: qty,
        unit_cost: 1.5,
        total_sales: value,
    }
}

fn issuance(id: &str, lpo: &str, qty: i64) -> Issuance {
    Issuance {
        issue_id: IssueId::new(id),
        lpo_number: Some(LpoNumber::new(lpo)),
        item_code: ItemCode::new("AMOX-250"),
        issue_date: date(2024, 6, 10),
        issued_to: "Pharmacy".to_string(),
        issued_quantity: qty,
        total_cost: qty as f64 * 1.5,
    }
}

fn reconciliation_rows(run: ReportRun) -> Vec<ReconciliationRow> {
    match run.rows {
        ReportRows::Reconciliation(rows) => rows,
        other => panic!("expected reconciliation rows, got {other:?}"),
    }
}

#[test]
fn never_issued_delivery_is_unmatched_and_fully_remaining() {
    let snapshot = Snapshot::new(vec![delivery("A", 100, "Acme", 0.0)], Vec::new());
    let catalog = catalog();

    let unmatched = catalog
        .run(ReportKind::UnmatchedDeliveries, &snapshot)
        .unwrap();
    assert_eq!(
        unmatched.rows,
        ReportRows::UnmatchedDeliveries(snapshot.deliveries.clone())
    );

    let rows = reconciliation_rows(catalog.run(ReportKind::Reconciliation, &snapshot).unwrap());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].total_issued, 0);
    assert_eq!(rows[0].remaining_stock, 100);
}

#[test]
fn partially_issued_delivery_reconciles() {
    let snapshot = Snapshot::new(
        vec![delivery("B", 10, "Acme", 0.0)],
        vec![issuance("I1", "B", 4), issuance("I2", "B", 3)],
    );

    let rows = reconciliation_rows(catalog().run(ReportKind::Reconciliation, &snapshot).unwrap());
    assert_eq!(rows[0].total_issued, 7);
    assert_eq!(rows[0].remaining_stock, 3);
}

#[test]
fn unmatched_orders_keep_full_quantity_in_reconciliation() {
    let snapshot = Snapshot::new(
        vec![
            delivery("A", 40, "Acme", 0.0),
            delivery("B", 10, "Acme", 0.0),
            delivery("C", 25, "Acme", 0.0),
        ],
        vec![issuance("I1", "B", 10), issuance("I2", "X", 99)],
    );

    let rows = reconciliation_rows(catalog().run(ReportKind::Reconciliation, &snapshot).unwrap());
    for row in rows.iter().filter(|r| r.total_issued == 0) {
        assert_eq!(row.remaining_stock, row.qty_on_hand);
    }
    assert_eq!(rows.len(), 3);
}

#[test]
fn tied_suppliers_share_rank_one() {
    let snapshot = Snapshot::new(
        vec![
            delivery("A", 1, "Northwind", 300.0),
            delivery("B", 1, "Contoso", 300.0),
            delivery("C", 1, "Fabrikam", 100.0),
        ],
        Vec::new(),
    );

    let run = catalog().run(ReportKind::SupplierRanking, &snapshot).unwrap();
    let ReportRows::SupplierRanking(rows) = run.rows else {
        panic!("expected supplier ranking rows");
    };

    let ranks: Vec<u64> = rows.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, vec![1, 1, 3]);

    let by_name = |name: &str| -> SupplierRankingRow {
        rows.iter().find(|r| r.supplier_name == name).cloned().unwrap()
    };
    assert_eq!(by_name("Northwind").row_number, 1);
    assert_eq!(by_name("Contoso").row_number, 2);
    assert_eq!(by_name("Fabrikam").row_number, 3);
}

#[test]
fn running_totals_end_at_the_full_sum() {
    let issuances: Vec<Issuance> = (1..=10)
        .map(|n| {
            let mut i = issuance(&format!("I{n}"), "A", n);
            i.issue_date = date(2024, 6, (n % 5 + 1) as u32);
            i
        })
        .collect();
    let snapshot = Snapshot::new(Vec::new(), issuances);

    let run = catalog()
        .run(ReportKind::IssuanceRunningTotals, &snapshot)
        .unwrap();
    let ReportRows::IssuanceRunningTotals(rows) = run.rows else {
        panic!("expected running total rows");
    };

    assert_eq!(rows.len(), 10);
    assert!(rows.windows(2).all(|w| w[0].issue_date <= w[1].issue_date));
    let last = rows.last().unwrap();
    assert_eq!(last.cumulative_quantity, 55);
    assert_eq!(last.cumulative_cost, 82.5);
}

#[test]
fn turnover_never_divides_by_zero() {
    let snapshot = Snapshot::new(
        vec![delivery("A", 0, "Acme", 0.0)],
        vec![issuance("I1", "A", 3)],
    );

    let run = catalog().run(ReportKind::Turnover, &snapshot).unwrap();
    let ReportRows::Turnover(rows) = run.rows else {
        panic!("expected turnover rows");
    };
    assert_eq!(rows[0].total_stock, 0);
    assert_eq!(rows[0].turnover_rate, 0.0);
}

#[test]
fn census_spans_lookback_plus_today() {
    let run = catalog()
        .run(ReportKind::DailyActivityCensus, &Snapshot::default())
        .unwrap();
    let ReportRows::DailyActivityCensus(rows) = run.rows else {
        panic!("expected census rows");
    };
    assert_eq!(rows.len(), 31);
    assert_eq!(rows.first().unwrap().date, date(2024, 5, 16));
    assert_eq!(rows.last().unwrap().date, date(2024, 6, 15));
    assert!(rows.iter().all(|r| r.deliveries == 0 && r.issuances == 0));
}

#[test]
fn date_series_boundaries() {
    let day = date(2024, 6, 15);
    let single: Vec<NaiveDate> = date_series(day, day).unwrap().collect();
    assert_eq!(single, vec![day]);

    let err = date_series(date(2024, 6, 16), day).unwrap_err();
    assert!(matches!(err, AnalyticsError::InvalidRange { .. }));
}

#[test]
fn store_appends_after_snapshot_do_not_leak_into_a_run() {
    let store = InMemoryRecordStore::new();
    store.append_delivery(delivery("A", 5, "Acme", 0.0));

    let snapshot = store.snapshot();
    store.append_issuance(issuance("I1", "A", 5));

    let run = catalog()
        .run(ReportKind::UnmatchedDeliveries, &snapshot)
        .unwrap();
    assert_eq!(run.rows.len(), 1);

    let fresh = catalog()
        .run_from_store(ReportKind::UnmatchedDeliveries, &store)
        .unwrap();
    assert!(fresh.rows.is_empty());
}
