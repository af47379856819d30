//! Domain models for the ordermart pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`Field`] - The known order-line columns
//! - [`RowId`] - Positional row identifier used for reporting
//! - [`Cell`] - A typed value together with its coercion state
//! - [`Record`] - One order line
//! - [`RecordSet`] - An ordered table of records with its column schema

mod cell;
mod record;

pub use cell::{Cell, Coerce, DATE_FORMATS};
pub use record::{Record, RecordSet};

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Field
// =============================================================================

/// A known column of an order-line extract.
///
/// Headers that do not match one of these names are kept on the record as
/// extra columns (see [`Record::extras`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    OrderId,
    OrderDate,
    ShipDate,
    CustomerId,
    CustomerName,
    Segment,
    Country,
    City,
    State,
    PostalCode,
    Region,
    ProductId,
    Category,
    SubCategory,
    ProductName,
    Sales,
    Quantity,
    Discount,
    Profit,
}

impl Field {
    /// Every known field, in output column order.
    pub const ALL: [Field; 19] = [
        Field::OrderId,
        Field::OrderDate,
        Field::ShipDate,
        Field::CustomerId,
        Field::CustomerName,
        Field::Segment,
        Field::Country,
        Field::City,
        Field::State,
        Field::PostalCode,
        Field::Region,
        Field::ProductId,
        Field::Category,
        Field::SubCategory,
        Field::ProductName,
        Field::Sales,
        Field::Quantity,
        Field::Discount,
        Field::Profit,
    ];

    /// Fields every source file is expected to carry.
    pub const REQUIRED: [Field; 11] = [
        Field::OrderId,
        Field::OrderDate,
        Field::ShipDate,
        Field::CustomerId,
        Field::CustomerName,
        Field::Sales,
        Field::Quantity,
        Field::Discount,
        Field::Profit,
        Field::PostalCode,
        Field::Country,
    ];

    /// Header name as it appears in source files.
    pub fn name(&self) -> &'static str {
        match self {
            Field::OrderId => "Order ID",
            Field::OrderDate => "Order Date",
            Field::ShipDate => "Ship Date",
            Field::CustomerId => "Customer ID",
            Field::CustomerName => "Customer Name",
            Field::Segment => "Segment",
            Field::Country => "Country",
            Field::City => "City",
            Field::State => "State",
            Field::PostalCode => "Postal Code",
            Field::Region => "Region",
            Field::ProductId => "Product ID",
            Field::Category => "Category",
            Field::SubCategory => "Sub-Category",
            Field::ProductName => "Product Name",
            Field::Sales => "Sales",
            Field::Quantity => "Quantity",
            Field::Discount => "Discount",
            Field::Profit => "Profit",
        }
    }

    /// Match a header name (surrounding whitespace ignored).
    pub fn from_header(header: &str) -> Option<Self> {
        let header = header.trim();
        Self::ALL.into_iter().find(|f| f.name() == header)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Row Identifier
// =============================================================================

/// Positional identifier of a row within one [`RecordSet`].
///
/// Only meaningful for reporting; reassigned whenever sets are concatenated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowId(pub usize);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_from_header() {
        assert_eq!(Field::from_header("Order ID"), Some(Field::OrderId));
        assert_eq!(Field::from_header(" Sub-Category "), Some(Field::SubCategory));
        assert_eq!(Field::from_header("Ship Mode"), None);
        assert_eq!(Field::from_header("order id"), None);
    }

    #[test]
    fn test_every_field_roundtrips_through_its_header() {
        for field in Field::ALL {
            assert_eq!(Field::from_header(field.name()), Some(field));
        }
    }

    #[test]
    fn test_required_fields_are_known() {
        assert!(Field::REQUIRED.iter().all(|f| Field::ALL.contains(f)));
    }
}
