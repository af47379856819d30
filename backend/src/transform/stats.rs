//! Row and key counts per generated table.

use serde::Serialize;
use std::collections::HashSet;
use std::hash::Hash;

use super::marts::{DataMarts, MartKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableStats {
    pub table: MartKind,
    pub rows: usize,
    /// Distinct values of the table's primary key column
    pub distinct_primary_keys: usize,
    /// Distinct Date IDs; fact table only
    pub distinct_row_ids: Option<usize>,
}

impl TableStats {
    /// Primary key column counted for each table.
    pub fn primary_key(kind: MartKind) -> &'static str {
        match kind {
            MartKind::Customer => "Customer ID",
            MartKind::Product => "Product ID",
            MartKind::Geography => "Geography ID",
            MartKind::Time => "Date ID",
            MartKind::Segment => "Segment ID",
            MartKind::ProductCategory => "Category ID",
            MartKind::Region => "Region ID",
            MartKind::SalesFact => "Order ID",
        }
    }
}

fn distinct<T: Eq + Hash>(values: impl IntoIterator<Item = T>) -> usize {
    values.into_iter().collect::<HashSet<_>>().len()
}

/// Statistics for every table, in [`MartKind::ALL`] order.
pub fn compute_stats(marts: &DataMarts) -> Vec<TableStats> {
    MartKind::ALL
        .iter()
        .map(|kind| {
            let distinct_primary_keys = match kind {
                MartKind::Customer => distinct(marts.customers.iter().map(|r| &r.customer_id)),
                MartKind::Product => distinct(marts.products.iter().map(|r| &r.product_id)),
                MartKind::Geography => distinct(marts.geographies.iter().map(|r| r.geography_id)),
                MartKind::Time => distinct(marts.times.iter().map(|r| r.date_id)),
                MartKind::Segment => distinct(marts.segments.iter().map(|r| r.segment_id)),
                MartKind::ProductCategory => {
                    distinct(marts.product_categories.iter().map(|r| r.category_id))
                }
                MartKind::Region => distinct(marts.regions.iter().map(|r| r.region_id)),
                MartKind::SalesFact => distinct(marts.sales.iter().map(|r| &r.order_id)),
            };
            let distinct_row_ids = match kind {
                MartKind::SalesFact => Some(distinct(marts.sales.iter().map(|r| r.date_id))),
                _ => None,
            };

            TableStats {
                table: *kind,
                rows: marts.row_count(*kind),
                distinct_primary_keys,
                distinct_row_ids,
            }
        })
        .collect()
}
