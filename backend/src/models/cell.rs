//! Typed cells for date and numeric columns.

use chrono::{NaiveDate, NaiveDateTime};

/// Date layouts accepted when coercing a date column, tried in order.
///
/// Month-first is tried before day-first, so `03/04/2024` is March 4th.
pub const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%m-%d-%Y",
    "%d.%m.%Y",
];

/// Datetime layouts whose date part is kept.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// A value type a [`Cell`] can be coerced into.
pub trait Coerce: Copy + Sized {
    /// Parse source text, `None` when it is not a valid value.
    fn coerce(text: &str) -> Option<Self>;

    /// Canonical text form.
    fn render(&self) -> String;
}

impl Coerce for NaiveDate {
    fn coerce(text: &str) -> Option<Self> {
        let text = text.trim();
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
            .or_else(|| {
                DATETIME_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                    .map(|dt| dt.date())
            })
    }

    fn render(&self) -> String {
        self.format("%Y-%m-%d").to_string()
    }
}

impl Coerce for f64 {
    fn coerce(text: &str) -> Option<Self> {
        text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

/// A date or numeric value together with its coercion state.
///
/// `Missing` and `Invalid` both read as null through [`Cell::value`], but only
/// `Missing` counts as an absent value ([`Cell::is_missing`]).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell<T> {
    /// Empty in the source.
    #[default]
    Missing,
    /// Source text not coerced yet.
    Raw(String),
    /// Coerced value.
    Parsed(T),
    /// Source text that failed coercion.
    Invalid(String),
}

impl<T: Coerce> Cell<T> {
    /// Build an uncoerced cell from source text; empty text is `Missing`.
    pub fn from_text(text: Option<&str>) -> Self {
        match text.map(str::trim) {
            Some(t) if !t.is_empty() => Cell::Raw(t.to_string()),
            _ => Cell::Missing,
        }
    }

    /// Typed value, parsing raw text on the fly. `None` reads as null.
    pub fn value(&self) -> Option<T> {
        match self {
            Cell::Parsed(v) => Some(*v),
            Cell::Raw(text) => T::coerce(text),
            Cell::Missing | Cell::Invalid(_) => None,
        }
    }

    /// Coerce raw text into a parsed or invalid cell. Other states are kept.
    pub fn coerce(self) -> Self {
        match self {
            Cell::Raw(text) => match T::coerce(&text) {
                Some(v) => Cell::Parsed(v),
                None => Cell::Invalid(text),
            },
            other => other,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Canonical text of the value this cell denotes: raw text that would
    /// parse renders as its parsed value, so coercion does not change it.
    pub fn canonical(&self) -> Option<String> {
        match self {
            Cell::Raw(text) => Some(T::coerce(text).map(|v| v.render()).unwrap_or_else(|| text.clone())),
            other => other.render(),
        }
    }

    /// Text form: source text for raw/invalid cells, canonical form for parsed ones.
    pub fn render(&self) -> Option<String> {
        match self {
            Cell::Missing => None,
            Cell::Raw(text) | Cell::Invalid(text) => Some(text.clone()),
            Cell::Parsed(v) => Some(v.render()),
        }
    }
}
