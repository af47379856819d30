//! Data-mart and statistics writers.

use std::path::{Path, PathBuf};

use super::{date, number, text, write_table, Tabular};
use crate::error::ExportResult;
use crate::transform::marts::{
    CustomerRow, DataMarts, GeographyRow, MartKind, ProductCategoryRow, ProductRow, RegionRow,
    SalesFactRow, SegmentRow, TimeRow,
};
use crate::transform::stats::TableStats;

/// Placeholder for a statistic that does not apply to a table
pub const NOT_APPLICABLE: &str = "N/A";

impl Tabular for CustomerRow {
    const HEADERS: &'static [&'static str] = &["Customer ID", "Customer Name", "Segment", "Segment ID"];

    fn cells(&self) -> Vec<String> {
        vec![
            text(&self.customer_id),
            text(&self.customer_name),
            text(&self.segment),
            self.segment_id.to_string(),
        ]
    }
}

impl Tabular for ProductRow {
    const HEADERS: &'static [&'static str] =
        &["Product ID", "Product Name", "Sub-Category", "Category", "Sub-Category ID"];

    fn cells(&self) -> Vec<String> {
        vec![
            text(&self.product_id),
            text(&self.product_name),
            text(&self.sub_category),
            text(&self.category),
            self.sub_category_id.to_string(),
        ]
    }
}

impl Tabular for GeographyRow {
    const HEADERS: &'static [&'static str] = &[
        "Country",
        "State",
        "City",
        "Postal Code",
        "Region",
        "Geography ID",
        "Region ID",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            text(&self.country),
            text(&self.state),
            text(&self.city),
            text(&self.postal_code),
            text(&self.region),
            self.geography_id.to_string(),
            self.region_id.to_string(),
        ]
    }
}

impl Tabular for TimeRow {
    const HEADERS: &'static [&'static str] = &["Order Date", "Ship Date", "Date ID"];

    fn cells(&self) -> Vec<String> {
        vec![date(self.order_date), date(self.ship_date), self.date_id.to_string()]
    }
}

impl Tabular for SegmentRow {
    const HEADERS: &'static [&'static str] = &["Segment ID", "Segment Name"];

    fn cells(&self) -> Vec<String> {
        vec![self.segment_id.to_string(), text(&self.segment_name)]
    }
}

impl Tabular for ProductCategoryRow {
    const HEADERS: &'static [&'static str] =
        &["Sub-Category ID", "Category", "Category ID", "Category Name"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.sub_category_id.to_string(),
            text(&self.category),
            self.category_id.to_string(),
            text(&self.category_name),
        ]
    }
}

impl Tabular for RegionRow {
    const HEADERS: &'static [&'static str] = &["Region Name", "Region ID"];

    fn cells(&self) -> Vec<String> {
        vec![text(&self.region_name), self.region_id.to_string()]
    }
}

impl Tabular for SalesFactRow {
    const HEADERS: &'static [&'static str] = &[
        "Order ID",
        "Product ID",
        "Customer ID",
        "Order Date",
        "Ship Date",
        "Sales",
        "Quantity",
        "Discount",
        "Profit",
        "Postal Code",
        "Date ID",
        "Geography ID",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            text(&self.order_id),
            text(&self.product_id),
            text(&self.customer_id),
            date(self.order_date),
            date(self.ship_date),
            number(self.sales),
            number(self.quantity),
            number(self.discount),
            number(self.profit),
            text(&self.postal_code),
            self.date_id.to_string(),
            self.geography.id().map(|id| id.to_string()).unwrap_or_default(),
        ]
    }
}

impl Tabular for TableStats {
    const HEADERS: &'static [&'static str] = &[
        "Data Mart System Name",
        "Count Rows",
        "Count Distinct Primary Key",
        "Count Distinct Row ID",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.table.name().to_string(),
            self.rows.to_string(),
            self.distinct_primary_keys.to_string(),
            self.distinct_row_ids
                .map(|n| n.to_string())
                .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
        ]
    }
}

/// Write the eight tables into `dir`; returns the written paths in
/// [`MartKind::ALL`] order.
pub fn write_marts(marts: &DataMarts, dir: &Path) -> ExportResult<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(MartKind::ALL.len());
    for kind in MartKind::ALL {
        let path = dir.join(kind.file_name());
        match kind {
            MartKind::Customer => write_table(&path, &marts.customers)?,
            MartKind::Product => write_table(&path, &marts.products)?,
            MartKind::Geography => write_table(&path, &marts.geographies)?,
            MartKind::Time => write_table(&path, &marts.times)?,
            MartKind::Segment => write_table(&path, &marts.segments)?,
            MartKind::ProductCategory => write_table(&path, &marts.product_categories)?,
            MartKind::Region => write_table(&path, &marts.regions)?,
            MartKind::SalesFact => write_table(&path, &marts.sales)?,
        }
        written.push(path);
    }
    Ok(written)
}

pub fn write_stats(stats: &[TableStats], path: &Path) -> ExportResult<()> {
    write_table(path, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::marts::GeographyRef;
    use crate::transform::stats::compute_stats;
    use chrono::NaiveDate;
    use std::fs;

    fn fact(geography: GeographyRef) -> SalesFactRow {
        SalesFactRow {
            order_id: Some("O1".into()),
            product_id: Some("P1".into()),
            customer_id: Some("C1".into()),
            order_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            ship_date: None,
            sales: Some(12.5),
            quantity: Some(2.0),
            discount: Some(0.0),
            profit: None,
            postal_code: Some("02134".into()),
            date_id: 1,
            geography,
        }
    }

    #[test]
    fn test_fact_row_cells() {
        assert_eq!(
            fact(GeographyRef::Resolved(4)).cells(),
            vec!["O1", "P1", "C1", "2024-03-01", "", "12.5", "2", "0", "", "02134", "1", "4"]
        );
        assert_eq!(fact(GeographyRef::Ambiguous(vec![1, 2])).cells()[11], "");
    }

    #[test]
    fn test_write_marts_and_stats() {
        let dir = tempfile::tempdir().unwrap();
        let marts = DataMarts {
            sales: vec![fact(GeographyRef::Unresolved)],
            regions: vec![RegionRow { region_name: Some("West".into()), region_id: 1 }],
            ..DataMarts::default()
        };

        let written = write_marts(&marts, &dir.path().join("Data_Marts")).unwrap();
        assert_eq!(written.len(), 8);
        assert!(written.iter().all(|p| p.exists()));

        let regions = fs::read_to_string(dir.path().join("Data_Marts/Region_Dimension.csv")).unwrap();
        assert_eq!(regions, "Region Name,Region ID\nWest,1\n");
        let customers = fs::read_to_string(&written[0]).unwrap();
        assert_eq!(customers, "Customer ID,Customer Name,Segment,Segment ID\n");

        let stats_path = dir.path().join("Data_Marts_Rows.csv");
        write_stats(&compute_stats(&marts), &stats_path).unwrap();
        let stats = fs::read_to_string(&stats_path).unwrap();
        let lines: Vec<&str> = stats.lines().collect();
        assert_eq!(lines[0], "Data Mart System Name,Count Rows,Count Distinct Primary Key,Count Distinct Row ID");
        assert_eq!(lines[1], "Customer_Dimension,0,0,N/A");
        assert_eq!(lines[8], "Sales_Fact,1,1,1");
    }
}
