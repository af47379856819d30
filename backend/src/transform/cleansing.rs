//! Cleansing engine.
//!
//! An ordered chain of pure `RecordSet -> RecordSet` steps. Running the chain
//! on its own output changes nothing: every filter reads values that earlier
//! steps have already settled, and coercion leaves coerced cells alone.
//!
//! ```text
//! raw ─▶ dedupe ─▶ fill names ─▶ drop missing keys ─▶ coerce ─▶ postal text
//!     ─▶ drop zero lines ─▶ drop ship<order ─▶ drop profit<0 ─▶ drop bad postal ─▶ cleansed
//! ```

use std::collections::HashSet;

use crate::logs::{log_info, log_info_indent, log_success};
use crate::models::{Field, Record, RecordSet};
use crate::validation::is_valid_postal_code;

/// Placeholder for a missing customer name
pub const UNKNOWN_CUSTOMER: &str = "Unknown";

/// One cleansing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CleansingStep {
    DropDuplicates,
    FillCustomerName,
    DropMissingKeys,
    CoerceTypes,
    NormalizePostalCode,
    DropZeroSalesAndQuantity,
    DropShipBeforeOrder,
    DropNegativeProfit,
    DropInvalidPostalCode,
}

impl CleansingStep {
    /// Steps in execution order.
    pub const PIPELINE: [CleansingStep; 9] = [
        CleansingStep::DropDuplicates,
        CleansingStep::FillCustomerName,
        CleansingStep::DropMissingKeys,
        CleansingStep::CoerceTypes,
        CleansingStep::NormalizePostalCode,
        CleansingStep::DropZeroSalesAndQuantity,
        CleansingStep::DropShipBeforeOrder,
        CleansingStep::DropNegativeProfit,
        CleansingStep::DropInvalidPostalCode,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CleansingStep::DropDuplicates => "Remove duplicate rows",
            CleansingStep::FillCustomerName => "Fill missing customer names",
            CleansingStep::DropMissingKeys => "Drop rows missing key fields",
            CleansingStep::CoerceTypes => "Coerce dates and numbers",
            CleansingStep::NormalizePostalCode => "Normalize postal codes",
            CleansingStep::DropZeroSalesAndQuantity => "Drop zero sales and quantity",
            CleansingStep::DropShipBeforeOrder => "Drop ship date before order date",
            CleansingStep::DropNegativeProfit => "Drop negative profit",
            CleansingStep::DropInvalidPostalCode => "Drop invalid postal codes",
        }
    }

    /// Run this step.
    pub fn apply(&self, set: RecordSet) -> RecordSet {
        match self {
            CleansingStep::DropDuplicates => drop_duplicates(set),
            CleansingStep::FillCustomerName => set.map(|mut r| {
                if r.customer_name.is_none() {
                    r.customer_name = Some(UNKNOWN_CUSTOMER.to_string());
                }
                r
            }),
            CleansingStep::DropMissingKeys => set.filter(|r| !missing_key(r)),
            CleansingStep::CoerceTypes => set.map(|mut r| {
                r.order_date = r.order_date.coerce();
                r.ship_date = r.ship_date.coerce();
                r.sales = r.sales.coerce();
                r.quantity = r.quantity.coerce();
                r.discount = r.discount.coerce();
                r.profit = r.profit.coerce();
                r
            }),
            CleansingStep::NormalizePostalCode => set.map(|mut r| {
                r.postal_code = r
                    .postal_code
                    .map(|code| code.trim().to_string())
                    .filter(|code| !code.is_empty());
                r
            }),
            CleansingStep::DropZeroSalesAndQuantity => set.filter(|r| {
                !(r.sales.value() == Some(0.0) && r.quantity.value() == Some(0.0))
            }),
            CleansingStep::DropShipBeforeOrder => set.filter(|r| {
                !matches!(
                    (r.order_date.value(), r.ship_date.value()),
                    (Some(order), Some(ship)) if ship < order
                )
            }),
            // A null profit is kept
            CleansingStep::DropNegativeProfit => {
                set.filter(|r| !r.profit.value().is_some_and(|p| p < 0.0))
            }
            CleansingStep::DropInvalidPostalCode => {
                set.filter(|r| r.postal_code.as_deref().is_some_and(is_valid_postal_code))
            }
        }
    }
}

/// Any of Order ID, Product ID, Customer ID, Order Date, Sales absent.
///
/// Only empty source values count; text that failed coercion is present.
fn missing_key(r: &Record) -> bool {
    r.order_id.is_none()
        || r.product_id.is_none()
        || r.customer_id.is_none()
        || r.order_date.is_missing()
        || r.sales.is_missing()
}

/// Keep the first of each group of rows with equal content.
fn drop_duplicates(set: RecordSet) -> RecordSet {
    let mut seen = HashSet::new();
    set.filter(|r| seen.insert(duplicate_key(r)))
}

/// Content key with a null Customer Name read as [`UNKNOWN_CUSTOMER`], so the
/// name fill that follows cannot create new duplicates.
fn duplicate_key(r: &Record) -> Vec<Option<String>> {
    let mut key = r.content_key();
    let name = Field::ALL.iter().position(|f| *f == Field::CustomerName);
    if let Some(slot) = name.and_then(|i| key.get_mut(i)) {
        slot.get_or_insert_with(|| UNKNOWN_CUSTOMER.to_string());
    }
    key
}

/// Rows removed by one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    pub step: CleansingStep,
    pub removed: usize,
}

/// A cleansed set plus what each step removed.
#[derive(Debug, Clone)]
pub struct CleanseOutcome {
    pub records: RecordSet,
    pub steps: Vec<StepReport>,
}

impl CleanseOutcome {
    pub fn removed(&self) -> usize {
        self.steps.iter().map(|s| s.removed).sum()
    }
}

/// Run every step on a copy of `set`. Row ids are kept from the input.
pub fn cleanse(set: &RecordSet) -> CleanseOutcome {
    log_info(format!("🧹 Cleansing {} rows", set.len()));

    let mut records = set.clone();
    let mut steps = Vec::with_capacity(CleansingStep::PIPELINE.len());

    for step in CleansingStep::PIPELINE {
        let before = records.len();
        records = step.apply(records);
        let removed = before - records.len();
        if removed > 0 {
            log_info_indent(format!("{}: {} row(s) removed", step.name(), removed), 1);
        }
        steps.push(StepReport { step, removed });
    }

    let outcome = CleanseOutcome { records, steps };
    log_success(format!(
        "{} rows kept, {} removed",
        outcome.records.len(),
        outcome.removed()
    ));
    outcome
}
