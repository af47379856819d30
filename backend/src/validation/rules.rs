//! The data-quality rule catalog.
//!
//! Each [`Rule`] variant owns its check, the fields it reads, its fixed
//! description and its remediation class. Callers never branch on rule names;
//! they iterate [`Rule::CATALOG`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use crate::models::{Field, Record, RecordSet, RowId};

/// US ZIP or ZIP+4
static POSTAL_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{5}(-\d{4})?$").expect("Invalid postal code pattern"));

/// Whether `code` is a US ZIP (`12345`) or ZIP+4 (`12345-6789`) code.
pub fn is_valid_postal_code(code: &str) -> bool {
    POSTAL_CODE.is_match(code)
}

// =============================================================================
// Remediation
// =============================================================================

/// Who is expected to resolve a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Remediation {
    #[serde(rename = "programmatic")]
    Programmatic,
    #[serde(rename = "requires-SME-input")]
    RequiresSmeInput,
    #[serde(rename = "requires-business-input")]
    RequiresBusinessInput,
    #[serde(rename = "investigate-further")]
    InvestigateFurther,
}

impl Remediation {
    pub fn label(&self) -> &'static str {
        match self {
            Remediation::Programmatic => "programmatic",
            Remediation::RequiresSmeInput => "requires-SME-input",
            Remediation::RequiresBusinessInput => "requires-business-input",
            Remediation::InvestigateFurther => "investigate-further",
        }
    }

    /// Lead-in of the human-readable suggestion.
    fn lead(&self) -> &'static str {
        match self {
            Remediation::Programmatic => "Handle programmatically",
            Remediation::RequiresSmeInput => "Requires SME input",
            Remediation::RequiresBusinessInput => "Requires Business input",
            Remediation::InvestigateFurther => "Investigate Further",
        }
    }
}

impl fmt::Display for Remediation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Rule
// =============================================================================

/// Inputs a rule may consult besides the records.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleContext {
    /// Fields every source must declare
    pub required: Vec<Field>,
    /// Accepted country names
    pub valid_countries: Vec<String>,
}

impl Default for RuleContext {
    fn default() -> Self {
        Self {
            required: Field::REQUIRED.to_vec(),
            valid_countries: vec!["United States".to_string()],
        }
    }
}

/// How a rule inspects a record set.
enum Check {
    /// Compares the declared columns against the required fields
    Schema,
    /// Judges each record on its own
    Row(fn(&Record, &RuleContext) -> bool),
    /// Needs the whole set to judge a record
    Set(fn(&RecordSet) -> BTreeSet<RowId>),
}

/// A data-quality rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rule {
    MissingColumns,
    InvalidDateFormat,
    ZeroSalesAndQuantity,
    NegativeSales,
    UnrealisticDiscount,
    InvalidPostalCode,
    InconsistentCountry,
    MismatchedOrderShipDates,
    InconsistentCustomerId,
    NegativeProfit,
}

impl Rule {
    /// Every rule, in evaluation and reporting order.
    pub const CATALOG: [Rule; 10] = [
        Rule::MissingColumns,
        Rule::InvalidDateFormat,
        Rule::ZeroSalesAndQuantity,
        Rule::NegativeSales,
        Rule::UnrealisticDiscount,
        Rule::InvalidPostalCode,
        Rule::InconsistentCountry,
        Rule::MismatchedOrderShipDates,
        Rule::InconsistentCustomerId,
        Rule::NegativeProfit,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Rule::MissingColumns => "Missing Columns",
            Rule::InvalidDateFormat => "Invalid Date Format",
            Rule::ZeroSalesAndQuantity => "Zero Sales and Quantity",
            Rule::NegativeSales => "Negative Sales Values",
            Rule::UnrealisticDiscount => "Unrealistic Discount Values",
            Rule::InvalidPostalCode => "Invalid Postal Codes",
            Rule::InconsistentCountry => "Inconsistent Country Names",
            Rule::MismatchedOrderShipDates => "Mismatched Order and Ship Dates",
            Rule::InconsistentCustomerId => "Inconsistent Customer IDs",
            Rule::NegativeProfit => "Negative Profit Values",
        }
    }

    /// Fields the check reads. The rule is skipped for a set lacking any of
    /// them; `MissingColumns` reads the schema itself and is never skipped.
    pub fn fields(&self) -> &'static [Field] {
        match self {
            Rule::MissingColumns => &[],
            Rule::InvalidDateFormat => &[Field::OrderDate],
            Rule::ZeroSalesAndQuantity => &[Field::Sales, Field::Quantity],
            Rule::NegativeSales => &[Field::Sales],
            Rule::UnrealisticDiscount => &[Field::Discount],
            Rule::InvalidPostalCode => &[Field::PostalCode],
            Rule::InconsistentCountry => &[Field::Country],
            Rule::MismatchedOrderShipDates => &[Field::OrderDate, Field::ShipDate],
            Rule::InconsistentCustomerId => &[Field::CustomerId, Field::CustomerName],
            Rule::NegativeProfit => &[Field::Profit],
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Rule::MissingColumns => "Required columns missing from source file",
            Rule::InvalidDateFormat => "Invalid order date formats found",
            Rule::ZeroSalesAndQuantity => "Zero sales and zero quantity found",
            Rule::NegativeSales => "Negative sales values found",
            Rule::UnrealisticDiscount => "Unrealistic discount values found",
            Rule::InvalidPostalCode => "Invalid postal codes found",
            Rule::InconsistentCountry => "Inconsistent country names found",
            Rule::MismatchedOrderShipDates => "Mismatched order and ship dates found",
            Rule::InconsistentCustomerId => "Inconsistent customer IDs found",
            Rule::NegativeProfit => "Negative profit values found",
        }
    }

    pub fn remediation(&self) -> Remediation {
        match self {
            Rule::MissingColumns => Remediation::RequiresSmeInput,
            Rule::MismatchedOrderShipDates => Remediation::InvestigateFurther,
            Rule::NegativeProfit => Remediation::RequiresBusinessInput,
            Rule::InvalidDateFormat
            | Rule::ZeroSalesAndQuantity
            | Rule::NegativeSales
            | Rule::UnrealisticDiscount
            | Rule::InvalidPostalCode
            | Rule::InconsistentCountry
            | Rule::InconsistentCustomerId => Remediation::Programmatic,
        }
    }

    fn hint(&self) -> &'static str {
        match self {
            Rule::MissingColumns => "Standardize the column layout across source files",
            Rule::InvalidDateFormat => "Standardize order dates to a single calendar format",
            Rule::ZeroSalesAndQuantity => {
                "Correct or remove records with zero sales and zero quantity"
            }
            Rule::NegativeSales => "Remove or correct negative sales values",
            Rule::UnrealisticDiscount => "Ensure discount values are between 0 and 1",
            Rule::InvalidPostalCode => "Ensure postal codes follow the correct format",
            Rule::InconsistentCountry => "Ensure country names match the predefined list",
            Rule::MismatchedOrderShipDates => "Ensure ship dates are not before order dates",
            Rule::InconsistentCustomerId => {
                "Ensure customer IDs are consistent for the same customer name"
            }
            Rule::NegativeProfit => "Investigate reasons for negative profit",
        }
    }

    /// Remediation lead-in plus the rule's hint.
    pub fn suggestion(&self) -> String {
        format!("{}: {}", self.remediation().lead(), self.hint())
    }

    /// Whether findings cover whole files rather than individual rows.
    pub fn is_file_scoped(&self) -> bool {
        matches!(self.check(), Check::Schema)
    }

    fn check(&self) -> Check {
        match self {
            Rule::MissingColumns => Check::Schema,
            Rule::InvalidDateFormat => Check::Row(|r, _| r.order_date.value().is_none()),
            Rule::ZeroSalesAndQuantity => Check::Row(|r, _| {
                r.sales.value() == Some(0.0) && r.quantity.value() == Some(0.0)
            }),
            Rule::NegativeSales => Check::Row(|r, _| r.sales.value().is_some_and(|v| v < 0.0)),
            Rule::UnrealisticDiscount => Check::Row(|r, _| {
                r.discount.value().is_some_and(|d| !(0.0..=1.0).contains(&d))
            }),
            Rule::InvalidPostalCode => Check::Row(|r, _| {
                !r.postal_code.as_deref().is_some_and(is_valid_postal_code)
            }),
            Rule::InconsistentCountry => Check::Row(|r, ctx| {
                !r.country
                    .as_ref()
                    .is_some_and(|c| ctx.valid_countries.contains(c))
            }),
            Rule::MismatchedOrderShipDates => Check::Row(|r, _| {
                match (r.order_date.value(), r.ship_date.value()) {
                    (Some(order), Some(ship)) => ship < order,
                    _ => false,
                }
            }),
            Rule::InconsistentCustomerId => Check::Set(customers_with_several_ids),
            Rule::NegativeProfit => Check::Row(|r, _| r.profit.value().is_some_and(|v| v < 0.0)),
        }
    }

    /// Evaluate this rule against a set.
    ///
    /// `None` when nothing is flagged or when the set lacks a field the rule
    /// reads.
    pub fn evaluate(&self, set: &RecordSet, ctx: &RuleContext) -> Option<Violation> {
        let affected = match self.check() {
            Check::Schema => {
                let missing = set.missing_fields(&ctx.required);
                if missing.is_empty() {
                    return None;
                }
                Affected::File {
                    missing,
                    row_count: set.len(),
                }
            }
            _ if !set.has_fields(self.fields()) => return None,
            Check::Row(flags) => Affected::Rows(
                set.iter()
                    .filter(|r| flags(r, ctx))
                    .map(|r| r.row_id)
                    .collect(),
            ),
            Check::Set(flags) => Affected::Rows(flags(set)),
        };

        match &affected {
            Affected::Rows(rows) if rows.is_empty() => None,
            _ => Some(Violation {
                rule: *self,
                affected,
            }),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Rule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Every row whose customer name carries more than one distinct customer id.
fn customers_with_several_ids(set: &RecordSet) -> BTreeSet<RowId> {
    let mut ids_by_name: HashMap<&str, HashSet<&str>> = HashMap::new();
    for record in set {
        if let (Some(name), Some(id)) = (record.customer_name.as_deref(), record.customer_id.as_deref()) {
            ids_by_name.entry(name).or_default().insert(id);
        }
    }

    set.iter()
        .filter(|r| {
            r.customer_name
                .as_deref()
                .and_then(|name| ids_by_name.get(name))
                .is_some_and(|ids| ids.len() > 1)
        })
        .map(|r| r.row_id)
        .collect()
}

// =============================================================================
// Violation
// =============================================================================

/// What a violation covers.
#[derive(Debug, Clone, PartialEq)]
pub enum Affected {
    /// Offending rows, ascending
    Rows(BTreeSet<RowId>),
    /// The whole file
    File { missing: Vec<Field>, row_count: usize },
}

/// A rule together with what it flagged.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub rule: Rule,
    pub affected: Affected,
}

impl Violation {
    /// Distinct affected rows (the file's row count for file-level findings).
    pub fn affected_count(&self) -> usize {
        match &self.affected {
            Affected::Rows(rows) => rows.len(),
            Affected::File { row_count, .. } => *row_count,
        }
    }

    /// Offending rows of a row-scoped finding.
    pub fn rows(&self) -> Option<&BTreeSet<RowId>> {
        match &self.affected {
            Affected::Rows(rows) => Some(rows),
            Affected::File { .. } => None,
        }
    }

    pub fn contains(&self, row_id: RowId) -> bool {
        self.rows().is_some_and(|rows| rows.contains(&row_id))
    }
}
