use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use warehouse_core::{IssueId, ItemCode, LpoNumber};

/// One received line item against a purchase order.
///
/// `qty_on_hand * unit_cost` is the stock value at receipt. `total_sales` is
/// tracked independently and is not assumed to equal that product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    /// `None` never joins to any issuance.
    #[serde(default)]
    pub lpo_number: Option<LpoNumber>,
    pub item_code: ItemCode,
    pub receipt_date: NaiveDate,
    pub supplier_name: String,
    pub level1_category: String,
    pub level2_category: String,
    #[serde(default)]
    pub batch_no: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    pub qty_on_hand: i64,
    pub unit_cost: f64,
    pub total_sales: f64,
}

impl Delivery {
    /// Stock value at receipt (quantity × unit cost).
    pub fn stock_value(&self) -> f64 {
        self.qty_on_hand as f64 * self.unit_cost
    }
}

/// One dispensing event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issuance {
    pub issue_id: IssueId,
    /// Foreign key by value; may not exist in any delivery.
    #[serde(default)]
    pub lpo_number: Option<LpoNumber>,
    pub item_code: ItemCode,
    pub issue_date: NaiveDate,
    pub issued_to: String,
    pub issued_quantity: i64,
    pub total_cost: f64,
}
