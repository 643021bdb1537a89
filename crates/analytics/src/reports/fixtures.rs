//! Record builders for report tests.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use warehouse_core::{IssueId, ItemCode, LpoNumber};
use warehouse_inventory::{Delivery, Issuance};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 2024-06-15T12:00:00Z.
pub fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

pub fn delivery(lpo: &str, qty: i64) -> Delivery {
    Delivery {
        lpo_number: Some(LpoNumber::new(lpo)),
        item_code: ItemCode::new(format!("ITEM-{lpo}")),
        receipt_date: date(2024, 6, 1),
        supplier_name: "Acme".to_string(),
        level1_category: "Pharmaceuticals".to_string(),
        level2_category: "General".to_string(),
        batch_no: None,
        expiry_date: None,
        qty_on_hand: qty,
        unit_cost: 1.0,
        total_sales: 0.0,
    }
}

pub fn issuance(id: &str, lpo: &str, qty: i64) -> Issuance {
    Issuance {
        issue_id: IssueId::new(id),
        lpo_number: Some(LpoNumber::new(lpo)),
        item_code: ItemCode::new(format!("ITEM-{lpo}")),
        issue_date: date(2024, 6, 10),
        issued_to: "Ward 1".to_string(),
        issued_quantity: qty,
        total_cost: qty as f64,
    }
}
