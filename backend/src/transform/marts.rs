//! Dimensional decomposition of a cleansed record set.
//!
//! # Star schema
//!
//! ```text
//!                 ┌──────────────┐
//!   Segment ◀─────│   Customer   │
//!                 └──────┬───────┘
//!                        │ Customer ID
//! ┌──────────┐    ┌──────┴───────┐    ┌──────────────┐
//! │   Time   │◀───│  Sales Fact  │───▶│  Geography   │───▶ Region
//! └──────────┘    └──────┬───────┘    └──────────────┘
//!    Date ID             │ Product ID     Geography ID
//!                 ┌──────┴───────┐
//!                 │   Product    │───▶ Product Category
//!                 └──────────────┘
//! ```
//!
//! Every surrogate key is dense, starts at 1 and follows first-encounter order
//! over the cleansed rows, so the same input always yields the same keys.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use super::keys::SurrogateKeys;
use crate::models::RecordSet;

/// Text of a null date inside composite time keys
pub const NULL_DATE: &str = "NaT";

// =============================================================================
// Tables
// =============================================================================

/// The eight generated tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MartKind {
    Customer,
    Product,
    Geography,
    Time,
    Segment,
    ProductCategory,
    Region,
    SalesFact,
}

impl MartKind {
    pub const ALL: [MartKind; 8] = [
        MartKind::Customer,
        MartKind::Product,
        MartKind::Geography,
        MartKind::Time,
        MartKind::Segment,
        MartKind::ProductCategory,
        MartKind::Region,
        MartKind::SalesFact,
    ];

    /// System name used in statistics.
    pub fn name(&self) -> &'static str {
        match self {
            MartKind::Customer => "Customer_Dimension",
            MartKind::Product => "Product_Dimension",
            MartKind::Geography => "Geography_Dimension",
            MartKind::Time => "Time_Dimension",
            MartKind::Segment => "Segment_Dimension",
            MartKind::ProductCategory => "Product_Category_Dimension",
            MartKind::Region => "Region_Dimension",
            MartKind::SalesFact => "Sales_Fact",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.csv", self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRow {
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub segment: Option<String>,
    pub segment_id: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductRow {
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub sub_category: Option<String>,
    pub category: Option<String>,
    pub sub_category_id: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeographyRow {
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub region: Option<String>,
    pub geography_id: u32,
    pub region_id: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeRow {
    pub order_date: Option<NaiveDate>,
    pub ship_date: Option<NaiveDate>,
    pub date_id: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRow {
    pub segment_id: u32,
    pub segment_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductCategoryRow {
    pub sub_category_id: u32,
    pub category: Option<String>,
    pub category_id: u32,
    pub category_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionRow {
    pub region_name: Option<String>,
    pub region_id: u32,
}

/// Outcome of the postal-code lookup against the geography dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeographyRef {
    Resolved(u32),
    /// No geography row carries the postal code
    Unresolved,
    /// Several geography rows carry it; no key is written
    Ambiguous(Vec<u32>),
}

impl GeographyRef {
    pub fn id(&self) -> Option<u32> {
        match self {
            GeographyRef::Resolved(id) => Some(*id),
            GeographyRef::Unresolved | GeographyRef::Ambiguous(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SalesFactRow {
    pub order_id: Option<String>,
    pub product_id: Option<String>,
    pub customer_id: Option<String>,
    pub order_date: Option<NaiveDate>,
    pub ship_date: Option<NaiveDate>,
    pub sales: Option<f64>,
    pub quantity: Option<f64>,
    pub discount: Option<f64>,
    pub profit: Option<f64>,
    pub postal_code: Option<String>,
    pub date_id: u32,
    pub geography: GeographyRef,
}

/// Fact rows whose geography lookup did not resolve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JoinDiagnostics {
    pub resolved: usize,
    pub unresolved: usize,
    pub ambiguous: usize,
}

impl JoinDiagnostics {
    pub fn is_clean(&self) -> bool {
        self.unresolved == 0 && self.ambiguous == 0
    }
}

/// All dimension tables plus the fact table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataMarts {
    pub customers: Vec<CustomerRow>,
    pub products: Vec<ProductRow>,
    pub geographies: Vec<GeographyRow>,
    pub times: Vec<TimeRow>,
    pub segments: Vec<SegmentRow>,
    pub product_categories: Vec<ProductCategoryRow>,
    pub regions: Vec<RegionRow>,
    pub sales: Vec<SalesFactRow>,
    pub diagnostics: JoinDiagnostics,
}

impl DataMarts {
    pub fn row_count(&self, kind: MartKind) -> usize {
        match kind {
            MartKind::Customer => self.customers.len(),
            MartKind::Product => self.products.len(),
            MartKind::Geography => self.geographies.len(),
            MartKind::Time => self.times.len(),
            MartKind::Segment => self.segments.len(),
            MartKind::ProductCategory => self.product_categories.len(),
            MartKind::Region => self.regions.len(),
            MartKind::SalesFact => self.sales.len(),
        }
    }
}

// =============================================================================
// Decomposition
// =============================================================================

/// `"{order}_{ship}"` with null dates as [`NULL_DATE`].
pub fn time_key(order: Option<NaiveDate>, ship: Option<NaiveDate>) -> String {
    let text = |d: Option<NaiveDate>| {
        d.map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| NULL_DATE.to_string())
    };
    format!("{}_{}", text(order), text(ship))
}

/// Build every table from a cleansed set.
pub fn decompose(set: &RecordSet) -> DataMarts {
    let customers = customer_dimension(set);
    let products = product_dimension(set);
    let geographies = geography_dimension(set);
    let times = time_dimension(set);
    let segments = segment_dimension(&customers);
    let product_categories = product_category_dimension(&products);
    let regions = region_dimension(&geographies);
    let (sales, diagnostics) = sales_fact(set, &geographies);

    DataMarts {
        customers,
        products,
        geographies,
        times,
        segments,
        product_categories,
        regions,
        sales,
        diagnostics,
    }
}

fn customer_dimension(set: &RecordSet) -> Vec<CustomerRow> {
    let mut seen = BTreeSet::new();
    let mut segment_ids = SurrogateKeys::new();
    let mut rows = Vec::new();

    for r in set {
        let key = (r.customer_id.clone(), r.customer_name.clone(), r.segment.clone());
        if !seen.insert(key) {
            continue;
        }
        rows.push(CustomerRow {
            customer_id: r.customer_id.clone(),
            customer_name: r.customer_name.clone(),
            segment: r.segment.clone(),
            segment_id: segment_ids.id(r.segment.clone()),
        });
    }
    rows
}

fn product_dimension(set: &RecordSet) -> Vec<ProductRow> {
    let mut seen = BTreeSet::new();
    let mut sub_category_ids = SurrogateKeys::new();
    let mut rows = Vec::new();

    for r in set {
        let key = (
            r.product_id.clone(),
            r.product_name.clone(),
            r.sub_category.clone(),
            r.category.clone(),
        );
        if !seen.insert(key) {
            continue;
        }
        rows.push(ProductRow {
            product_id: r.product_id.clone(),
            product_name: r.product_name.clone(),
            sub_category: r.sub_category.clone(),
            category: r.category.clone(),
            sub_category_id: sub_category_ids.id(r.sub_category.clone()),
        });
    }
    rows
}

/// One row per (Country, State, Postal Code); City and Region come from the
/// first row carrying that key.
fn geography_dimension(set: &RecordSet) -> Vec<GeographyRow> {
    let mut geography_ids = SurrogateKeys::new();
    let mut region_ids = SurrogateKeys::new();
    let mut rows = Vec::new();

    for r in set {
        let key = (r.country.clone(), r.state.clone(), r.postal_code.clone());
        let before = geography_ids.len();
        let geography_id = geography_ids.id(key);
        if geography_ids.len() == before {
            continue;
        }
        rows.push(GeographyRow {
            country: r.country.clone(),
            state: r.state.clone(),
            city: r.city.clone(),
            postal_code: r.postal_code.clone(),
            region: r.region.clone(),
            geography_id,
            region_id: region_ids.id(r.region.clone()),
        });
    }
    rows
}

fn time_dimension(set: &RecordSet) -> Vec<TimeRow> {
    let mut date_ids = SurrogateKeys::new();
    let mut rows = Vec::new();

    for r in set {
        let (order, ship) = (r.order_date.value(), r.ship_date.value());
        let before = date_ids.len();
        let date_id = date_ids.id(time_key(order, ship));
        if date_ids.len() == before {
            continue;
        }
        rows.push(TimeRow {
            order_date: order,
            ship_date: ship,
            date_id,
        });
    }
    rows
}

fn segment_dimension(customers: &[CustomerRow]) -> Vec<SegmentRow> {
    let mut seen = BTreeSet::new();
    customers
        .iter()
        .filter(|c| seen.insert((c.segment_id, c.segment.clone())))
        .map(|c| SegmentRow {
            segment_id: c.segment_id,
            segment_name: c.segment.clone(),
        })
        .collect()
}

fn product_category_dimension(products: &[ProductRow]) -> Vec<ProductCategoryRow> {
    let mut seen = BTreeSet::new();
    let mut category_ids = SurrogateKeys::new();
    let mut rows = Vec::new();

    for p in products {
        if !seen.insert((p.sub_category_id, p.category.clone())) {
            continue;
        }
        rows.push(ProductCategoryRow {
            sub_category_id: p.sub_category_id,
            category: p.category.clone(),
            category_id: category_ids.id(p.category.clone()),
            category_name: p.category.clone(),
        });
    }
    rows
}

fn region_dimension(geographies: &[GeographyRow]) -> Vec<RegionRow> {
    let mut seen = BTreeSet::new();
    geographies
        .iter()
        .filter(|g| seen.insert((g.region.clone(), g.region_id)))
        .map(|g| RegionRow {
            region_name: g.region.clone(),
            region_id: g.region_id,
        })
        .collect()
}

/// Geography ids per postal code.
fn postal_index(geographies: &[GeographyRow]) -> HashMap<Option<&str>, BTreeSet<u32>> {
    let mut index: HashMap<Option<&str>, BTreeSet<u32>> = HashMap::new();
    for g in geographies {
        index
            .entry(g.postal_code.as_deref())
            .or_default()
            .insert(g.geography_id);
    }
    index
}

fn sales_fact(set: &RecordSet, geographies: &[GeographyRow]) -> (Vec<SalesFactRow>, JoinDiagnostics) {
    let index = postal_index(geographies);
    let mut date_ids = SurrogateKeys::new();
    let mut diagnostics = JoinDiagnostics::default();
    let mut rows = Vec::with_capacity(set.len());

    for r in set {
        let (order, ship) = (r.order_date.value(), r.ship_date.value());

        let geography = match index.get(&r.postal_code.as_deref()) {
            None => GeographyRef::Unresolved,
            Some(ids) if ids.len() == 1 => {
                ids.iter().next().map_or(GeographyRef::Unresolved, |id| GeographyRef::Resolved(*id))
            }
            Some(ids) => GeographyRef::Ambiguous(ids.iter().copied().collect()),
        };
        match geography {
            GeographyRef::Resolved(_) => diagnostics.resolved += 1,
            GeographyRef::Unresolved => diagnostics.unresolved += 1,
            GeographyRef::Ambiguous(_) => diagnostics.ambiguous += 1,
        }

        rows.push(SalesFactRow {
            order_id: r.order_id.clone(),
            product_id: r.product_id.clone(),
            customer_id: r.customer_id.clone(),
            order_date: order,
            ship_date: ship,
            sales: r.sales.value(),
            quantity: r.quantity.value(),
            discount: r.discount.value(),
            profit: r.profit.value(),
            postal_code: r.postal_code.clone(),
            date_id: date_ids.id(time_key(order, ship)),
            geography,
        });
    }
    (rows, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;
    use crate::transform::cleansing::cleanse;
    use std::collections::{HashMap, HashSet};
    use std::fmt::Debug;
    use std::hash::Hash;

    const HEADER: &str = "Order ID|Order Date|Ship Date|Customer ID|Customer Name|Segment|Country|City|State|Postal Code|Region|Product ID|Category|Sub-Category|Product Name|Sales|Quantity|Discount|Profit";

    fn cleansed(rows: &[&str]) -> RecordSet {
        let mut content = String::from(HEADER);
        for row in rows {
            content.push('\n');
            content.push_str(row);
        }
        cleanse(&parse_str(&content, b'|').unwrap()).records
    }

    fn sample() -> RecordSet {
        cleansed(&[
            "O1|2024-03-01|2024-03-04|C1|Ann Lee|Consumer|United States|Los Angeles|California|90001|West|P1|Furniture|Chairs|Desk Chair|100|2|0.1|10",
            "O2|2024-03-01|2024-03-04|C2|Bob Roy|Corporate|United States|Seattle|Washington|98101|West|P2|Technology|Phones|Phone X|200|1|0|20",
            "O3|2024-03-02|2024-03-05|C1|Ann Lee|Consumer|United States|New York City|New York|10001|East|P1|Furniture|Chairs|Desk Chair|50|1|0|5",
            "O4|2024-03-01|2024-03-04|C3|Cid Moe|Consumer|United States|LA|California|90001|West|P3|Furniture|Tables|Round Table|300|1|0.2|30",
        ])
    }

    #[test]
    fn test_dimension_keys_are_dense_and_ordered() {
        let marts = decompose(&sample());

        let segments: Vec<(u32, Option<&str>)> = marts
            .segments
            .iter()
            .map(|s| (s.segment_id, s.segment_name.as_deref()))
            .collect();
        assert_eq!(segments, vec![(1, Some("Consumer")), (2, Some("Corporate"))]);

        assert_eq!(marts.customers.len(), 3);
        assert_eq!(marts.customers[2].segment_id, 1);

        let sub_ids: Vec<u32> = marts.products.iter().map(|p| p.sub_category_id).collect();
        assert_eq!(sub_ids, vec![1, 2, 3]);

        let categories: Vec<(u32, u32)> = marts
            .product_categories
            .iter()
            .map(|c| (c.sub_category_id, c.category_id))
            .collect();
        assert_eq!(categories, vec![(1, 1), (2, 2), (3, 1)]);
        assert_eq!(marts.product_categories[1].category_name.as_deref(), Some("Technology"));

        let regions: Vec<(Option<&str>, u32)> =
            marts.regions.iter().map(|r| (r.region_name.as_deref(), r.region_id)).collect();
        assert_eq!(regions, vec![(Some("West"), 1), (Some("East"), 2)]);
    }

    #[test]
    fn test_city_variants_collapse_to_one_geography() {
        let marts = decompose(&sample());

        let la: Vec<&GeographyRow> = marts
            .geographies
            .iter()
            .filter(|g| g.postal_code.as_deref() == Some("90001"))
            .collect();
        assert_eq!(la.len(), 1);
        assert_eq!(la[0].city.as_deref(), Some("Los Angeles"));

        assert_eq!(marts.sales[0].geography, GeographyRef::Resolved(la[0].geography_id));
        assert_eq!(marts.sales[3].geography, GeographyRef::Resolved(la[0].geography_id));
        assert!(marts.diagnostics.is_clean());
        assert_eq!(marts.diagnostics.resolved, 4);
    }

    #[test]
    fn test_shared_postal_code_is_ambiguous() {
        let set = cleansed(&[
            "O1|2024-03-01|2024-03-04|C1|Ann|Consumer|United States|Kansas City|Missouri|64101|Central|P1|Furniture|Chairs|Chair|10|1|0|1",
            "O2|2024-03-01|2024-03-04|C1|Ann|Consumer|United States|Kansas City|Kansas|64101|Central|P1|Furniture|Chairs|Chair|20|1|0|1",
        ]);
        let marts = decompose(&set);

        assert_eq!(marts.geographies.len(), 2);
        assert_eq!(marts.sales.len(), 2);
        assert_eq!(marts.sales[0].geography, GeographyRef::Ambiguous(vec![1, 2]));
        assert_eq!(marts.sales[0].geography.id(), None);
        assert_eq!(marts.diagnostics.ambiguous, 2);
    }

    #[test]
    fn test_time_dimension_and_fact_date_ids_agree() {
        let marts = decompose(&sample());

        assert_eq!(marts.times.len(), 2);
        let by_pair: HashMap<(Option<NaiveDate>, Option<NaiveDate>), u32> = marts
            .times
            .iter()
            .map(|t| ((t.order_date, t.ship_date), t.date_id))
            .collect();
        for fact in &marts.sales {
            assert_eq!(by_pair[&(fact.order_date, fact.ship_date)], fact.date_id);
        }
    }

    #[test]
    fn test_null_dates_share_one_time_key() {
        let set = cleansed(&[
            "O1|2024-03-01||C1|Ann|Consumer|United States|Austin|Texas|73301|Central|P1|Furniture|Chairs|Chair|10|1|0|1",
            "O2|2024-03-01|soon|C1|Ann|Consumer|United States|Austin|Texas|73301|Central|P1|Furniture|Chairs|Chair|20|1|0|1",
        ]);
        let marts = decompose(&set);

        assert_eq!(marts.times.len(), 1);
        assert_eq!(marts.times[0].ship_date, None);
        assert_eq!(time_key(marts.times[0].order_date, None), "2024-03-01_NaT");
    }

    /// Each natural key carries exactly one id and each id exactly one key.
    fn assert_bijection<K: Eq + Hash + Clone + Debug>(pairs: impl IntoIterator<Item = (K, u32)>) {
        let mut by_key: HashMap<K, u32> = HashMap::new();
        let mut by_id: HashMap<u32, K> = HashMap::new();
        for (key, id) in pairs {
            assert_eq!(*by_key.entry(key.clone()).or_insert(id), id, "key {:?}", key);
            assert_eq!(&*by_id.entry(id).or_insert_with(|| key.clone()), &key, "id {}", id);
        }
        assert_eq!(by_key.len(), by_id.len());
    }

    #[test]
    fn test_keys_are_in_bijection_with_natural_keys() {
        let set = sample();
        let marts = decompose(&set);

        let geo_ids: HashSet<u32> = marts.geographies.iter().map(|g| g.geography_id).collect();
        assert_eq!(geo_ids, (1..=marts.geographies.len() as u32).collect::<HashSet<u32>>());
        assert_bijection(
            marts
                .geographies
                .iter()
                .map(|g| ((g.country.clone(), g.state.clone(), g.postal_code.clone()), g.geography_id)),
        );

        assert_bijection(marts.customers.iter().map(|c| (c.segment.clone(), c.segment_id)));
        assert_bijection(marts.segments.iter().map(|s| (s.segment_name.clone(), s.segment_id)));

        assert_bijection(marts.products.iter().map(|p| (p.sub_category.clone(), p.sub_category_id)));
        assert_bijection(
            marts
                .product_categories
                .iter()
                .map(|c| (c.category.clone(), c.category_id)),
        );
        assert_eq!(marts.product_categories.len(), 3);

        assert_bijection(marts.geographies.iter().map(|g| (g.region.clone(), g.region_id)));
        assert_bijection(marts.regions.iter().map(|r| (r.region_name.clone(), r.region_id)));
        assert_eq!(marts.regions.len(), 2);

        assert_bijection(marts.times.iter().map(|t| (time_key(t.order_date, t.ship_date), t.date_id)));
        assert_bijection(marts.sales.iter().map(|f| (time_key(f.order_date, f.ship_date), f.date_id)));
        assert_eq!(marts.times.len(), 2);
    }

    #[test]
    fn test_fact_rows_never_exceed_cleansed_rows() {
        let set = sample();
        let marts = decompose(&set);
        assert_eq!(marts.sales.len(), set.len());
        assert_eq!(marts.row_count(MartKind::SalesFact), 4);
        assert_eq!(marts.sales[1].sales, Some(200.0));
    }

    #[test]
    fn test_empty_set() {
        let marts = decompose(&RecordSet::default());
        for kind in MartKind::ALL {
            assert_eq!(marts.row_count(kind), 0);
        }
        assert_eq!(MartKind::ProductCategory.file_name(), "Product_Category_Dimension.csv");
    }
}
