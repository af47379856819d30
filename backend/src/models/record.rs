//! Order-line records and record sets.

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};

use super::cell::Cell;
use super::{Field, RowId};

// =============================================================================
// Record
// =============================================================================

/// One order line.
///
/// Identifier and label columns are plain optional strings; dates and
/// measures are [`Cell`]s so that coercion failures read as null without
/// losing the source text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub row_id: RowId,
    pub order_id: Option<String>,
    pub order_date: Cell<NaiveDate>,
    pub ship_date: Cell<NaiveDate>,
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub segment: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub region: Option<String>,
    pub product_id: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub product_name: Option<String>,
    pub sales: Cell<f64>,
    pub quantity: Cell<f64>,
    pub discount: Cell<f64>,
    pub profit: Cell<f64>,
    /// Columns outside [`Field::ALL`], by header name.
    pub extras: BTreeMap<String, String>,
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl Record {
    /// An empty record with the given row identifier.
    pub fn new(row_id: RowId) -> Self {
        Self {
            row_id,
            ..Self::default()
        }
    }

    /// Set a column by header name. Empty values are stored as null.
    pub fn set(&mut self, header: &str, value: &str) {
        match Field::from_header(header) {
            Some(field) => self.set_field(field, value),
            None => {
                if let Some(v) = non_empty(value) {
                    self.extras.insert(header.trim().to_string(), v);
                }
            }
        }
    }

    /// Set a known field from source text.
    pub fn set_field(&mut self, field: Field, value: &str) {
        let text = Some(value);
        match field {
            Field::OrderDate => self.order_date = Cell::from_text(text),
            Field::ShipDate => self.ship_date = Cell::from_text(text),
            Field::Sales => self.sales = Cell::from_text(text),
            Field::Quantity => self.quantity = Cell::from_text(text),
            Field::Discount => self.discount = Cell::from_text(text),
            Field::Profit => self.profit = Cell::from_text(text),
            _ => {
                if let Some(slot) = self.text_slot(field) {
                    *slot = non_empty(value);
                }
            }
        }
    }

    /// Builder-style [`Record::set`].
    pub fn with(mut self, header: &str, value: &str) -> Self {
        self.set(header, value);
        self
    }

    fn text_slot(&mut self, field: Field) -> Option<&mut Option<String>> {
        match field {
            Field::OrderId => Some(&mut self.order_id),
            Field::CustomerId => Some(&mut self.customer_id),
            Field::CustomerName => Some(&mut self.customer_name),
            Field::Segment => Some(&mut self.segment),
            Field::Country => Some(&mut self.country),
            Field::City => Some(&mut self.city),
            Field::State => Some(&mut self.state),
            Field::PostalCode => Some(&mut self.postal_code),
            Field::Region => Some(&mut self.region),
            Field::ProductId => Some(&mut self.product_id),
            Field::Category => Some(&mut self.category),
            Field::SubCategory => Some(&mut self.sub_category),
            Field::ProductName => Some(&mut self.product_name),
            Field::OrderDate
            | Field::ShipDate
            | Field::Sales
            | Field::Quantity
            | Field::Discount
            | Field::Profit => None,
        }
    }

    /// Text form of a field, `None` for null.
    pub fn text(&self, field: Field) -> Option<String> {
        match field {
            Field::OrderId => self.order_id.clone(),
            Field::OrderDate => self.order_date.render(),
            Field::ShipDate => self.ship_date.render(),
            Field::CustomerId => self.customer_id.clone(),
            Field::CustomerName => self.customer_name.clone(),
            Field::Segment => self.segment.clone(),
            Field::Country => self.country.clone(),
            Field::City => self.city.clone(),
            Field::State => self.state.clone(),
            Field::PostalCode => self.postal_code.clone(),
            Field::Region => self.region.clone(),
            Field::ProductId => self.product_id.clone(),
            Field::Category => self.category.clone(),
            Field::SubCategory => self.sub_category.clone(),
            Field::ProductName => self.product_name.clone(),
            Field::Sales => self.sales.render(),
            Field::Quantity => self.quantity.render(),
            Field::Discount => self.discount.render(),
            Field::Profit => self.profit.render(),
        }
    }

    /// Every column value except the row identifier, for duplicate detection.
    ///
    /// Typed fields contribute their canonical text, so the key of a record
    /// is the same before and after coercion.
    pub fn content_key(&self) -> Vec<Option<String>> {
        let mut key: Vec<Option<String>> = Field::ALL
            .iter()
            .map(|f| match f {
                Field::OrderDate => self.order_date.canonical(),
                Field::ShipDate => self.ship_date.canonical(),
                Field::Sales => self.sales.canonical(),
                Field::Quantity => self.quantity.canonical(),
                Field::Discount => self.discount.canonical(),
                Field::Profit => self.profit.canonical(),
                other => self.text(*other),
            })
            .collect();
        key.extend(self.extras.iter().map(|(k, v)| Some(format!("{k}={v}"))));
        key
    }
}

// =============================================================================
// Record Set
// =============================================================================

/// An ordered table of records plus the column names its sources declared.
///
/// Row identifiers are unique and ascending within a set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordSet {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        Self { columns, records }
    }

    /// Build a set with every known field as a column, row ids reassigned.
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        let columns = Field::ALL.iter().map(|f| f.name().to_string()).collect();
        let records = records
            .into_iter()
            .enumerate()
            .map(|(i, mut r)| {
                r.row_id = RowId(i);
                r
            })
            .collect();
        Self { columns, records }
    }

    /// Concatenate sets, reassigning row ids `0..n` and unioning columns
    /// in first-seen order.
    pub fn concat<'a>(sets: impl IntoIterator<Item = &'a RecordSet>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let mut records = Vec::new();
        for set in sets {
            for column in &set.columns {
                if !columns.contains(column) {
                    columns.push(column.clone());
                }
            }
            records.extend(set.records.iter().cloned());
        }
        for (i, record) in records.iter_mut().enumerate() {
            record.row_id = RowId(i);
        }
        Self { columns, records }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the source schema declared this field.
    pub fn has_field(&self, field: Field) -> bool {
        self.columns.iter().any(|c| c.trim() == field.name())
    }

    pub fn has_fields(&self, fields: &[Field]) -> bool {
        fields.iter().all(|f| self.has_field(*f))
    }

    /// Fields of `required` absent from the schema, in `required` order.
    pub fn missing_fields(&self, required: &[Field]) -> Vec<Field> {
        required.iter().copied().filter(|f| !self.has_field(*f)).collect()
    }

    /// Declared columns that are not known fields.
    pub fn extra_columns(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.columns
            .iter()
            .map(|c| c.trim())
            .filter(|c| Field::from_header(c).is_none() && seen.insert(*c))
            .collect()
    }

    pub fn get(&self, row_id: RowId) -> Option<&Record> {
        self.records
            .binary_search_by_key(&row_id, |r| r.row_id)
            .ok()
            .and_then(|i| self.records.get(i))
    }

    /// A new set with the same columns and the given records.
    pub fn with_records(&self, records: Vec<Record>) -> Self {
        Self {
            columns: self.columns.clone(),
            records,
        }
    }

    /// Keep the records matching `keep`; row ids are preserved.
    pub fn filter(self, mut keep: impl FnMut(&Record) -> bool) -> Self {
        let Self { columns, records } = self;
        Self {
            columns,
            records: records.into_iter().filter(|r| keep(r)).collect(),
        }
    }

    /// Transform every record; row ids are preserved.
    pub fn map(self, f: impl FnMut(Record) -> Record) -> Self {
        let Self { columns, records } = self;
        Self {
            columns,
            records: records.into_iter().map(f).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(columns: &[&str], rows: &[&[&str]]) -> RecordSet {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let records = rows
            .iter()
            .enumerate()
            .map(|(i, values)| {
                let mut r = Record::new(RowId(i));
                for (c, v) in columns.iter().zip(values.iter()) {
                    r.set(c, v);
                }
                r
            })
            .collect();
        RecordSet::new(columns, records)
    }

    #[test]
    fn test_set_routes_known_and_extra_columns() {
        let r = Record::new(RowId(0))
            .with("Order ID", " CA-1 ")
            .with("Sales", "12.5")
            .with("Ship Mode", "Second Class")
            .with("Segment", "");

        assert_eq!(r.order_id.as_deref(), Some("CA-1"));
        assert_eq!(r.sales, Cell::Raw("12.5".into()));
        assert_eq!(r.segment, None);
        assert_eq!(r.extras.get("Ship Mode").map(String::as_str), Some("Second Class"));
    }

    #[test]
    fn test_concat_reassigns_row_ids_and_unions_columns() {
        let a = set(&["Order ID", "Sales"], &[&["A", "1"], &["B", "2"]]);
        let b = set(&["Order ID", "Country"], &[&["C", "United States"]]);

        let all = RecordSet::concat([&a, &b]);

        let ids: Vec<usize> = all.iter().map(|r| r.row_id.0).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(all.columns(), &["Order ID", "Sales", "Country"]);
        assert_eq!(all.get(RowId(2)).and_then(|r| r.order_id.clone()).as_deref(), Some("C"));
    }

    #[test]
    fn test_missing_fields() {
        let s = set(&["Order ID", "Sales"], &[]);
        assert!(s.has_field(Field::Sales));
        assert_eq!(
            s.missing_fields(&[Field::OrderId, Field::Profit, Field::Country]),
            vec![Field::Profit, Field::Country]
        );
    }

    #[test]
    fn test_content_key_ignores_row_id() {
        let a = Record::new(RowId(0)).with("Order ID", "A").with("Row ID", "1");
        let b = Record::new(RowId(5)).with("Order ID", "A").with("Row ID", "1");
        let c = Record::new(RowId(6)).with("Order ID", "A").with("Row ID", "2");
        assert_eq!(a.content_key(), b.content_key());
        assert_ne!(a.content_key(), c.content_key());
    }

    #[test]
    fn test_filter_preserves_row_ids() {
        let s = set(&["Order ID"], &[&["A"], &["B"], &["C"]]);
        let kept = s.filter(|r| r.order_id.as_deref() != Some("B"));
        let ids: Vec<usize> = kept.iter().map(|r| r.row_id.0).collect();
        assert_eq!(ids, vec![0, 2]);
        assert!(kept.get(RowId(1)).is_none());
    }
}
