//! Delimited source parser with encoding auto-detection.
//!
//! Turns one extract into a [`RecordSet`]: the first line names the columns,
//! every following non-blank line is an order line. No quality rule is applied
//! here; malformed values are kept as text and judged later.

use std::path::Path;

use crate::error::{SourceError, SourceResult};
use crate::models::{Record, RecordSet, RowId};

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed records, row ids `0..n`
    pub records: RecordSet,
    /// Detected encoding
    pub encoding: String,
    /// Delimiter used
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding {
        // WHATWG maps the latin1 labels onto windows-1252
        "iso-8859-1" | "windows-1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        // Fallback: UTF-8 with lossy conversion
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Parse delimited text into a record set.
///
/// Rows shorter than the header are padded with nulls; a row longer than the
/// header makes the whole source malformed.
pub fn parse_str(content: &str, delimiter: u8) -> SourceResult<RecordSet> {
    let content = content.trim_start_matches('\u{feff}');
    if content.trim().is_empty() {
        return Err(SourceError::EmptyFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(SourceError::NoHeaders);
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        if row.iter().all(|v| v.is_empty()) {
            continue;
        }
        if row.len() > headers.len() {
            return Err(SourceError::RaggedRow {
                line: row.position().map(|p| p.line()).unwrap_or(0),
                expected: headers.len(),
                found: row.len(),
            });
        }

        let mut record = Record::new(RowId(records.len()));
        for (header, value) in headers.iter().zip(row.iter()) {
            record.set(header, value);
        }
        records.push(record);
    }

    Ok(RecordSet::new(headers, records))
}

/// Parse raw bytes: detect the encoding, decode, then parse.
pub fn parse_bytes(bytes: &[u8], delimiter: u8) -> SourceResult<ParseResult> {
    if bytes.is_empty() {
        return Err(SourceError::EmptyFile);
    }
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let records = parse_str(&content, delimiter)?;

    Ok(ParseResult {
        records,
        encoding,
        delimiter: char::from(delimiter),
    })
}

/// Read and parse one source file.
pub fn read_source<P: AsRef<Path>>(path: P, delimiter: u8) -> SourceResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes(&bytes, delimiter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cell, Field};

    #[test]
    fn test_simple_pipe_file() {
        let content = "Order ID|Sales|Country\nCA-1|12.5|United States\nCA-2|3|Canada\n";
        let set = parse_str(content, b'|').unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.columns(), &["Order ID", "Sales", "Country"]);
        let first = &set.records()[0];
        assert_eq!(first.row_id, RowId(0));
        assert_eq!(first.order_id.as_deref(), Some("CA-1"));
        assert_eq!(first.sales, Cell::Raw("12.5".into()));
        assert_eq!(set.records()[1].country.as_deref(), Some("Canada"));
    }

    #[test]
    fn test_short_rows_are_padded_with_nulls() {
        let set = parse_str("Order ID|Sales|Profit\nA|1\n", b'|').unwrap();
        let r = &set.records()[0];
        assert_eq!(r.sales.value(), Some(1.0));
        assert!(r.profit.is_missing());
    }

    #[test]
    fn test_long_row_is_malformed() {
        let err = parse_str("Order ID|Sales\nA|1|extra\n", b'|').unwrap_err();
        assert!(matches!(err, SourceError::RaggedRow { expected: 2, found: 3, .. }));
    }

    #[test]
    fn test_blank_lines_skipped() {
        let set = parse_str("Order ID|Sales\nA|1\n\nB|2\n", b'|').unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.records()[1].row_id, RowId(1));
    }

    #[test]
    fn test_leading_zeros_kept() {
        let set = parse_str("Postal Code\n02134\n021\n", b'|').unwrap();
        assert_eq!(set.records()[0].postal_code.as_deref(), Some("02134"));
        assert_eq!(set.records()[1].postal_code.as_deref(), Some("021"));
    }

    #[test]
    fn test_empty_source_error() {
        assert!(matches!(parse_str("", b'|'), Err(SourceError::EmptyFile)));
        assert!(matches!(parse_bytes(b"", b'|'), Err(SourceError::EmptyFile)));
    }

    #[test]
    fn test_header_only_has_schema() {
        let set = parse_str("Order ID|Country\n", b'|').unwrap();
        assert!(set.is_empty());
        assert!(set.has_field(Field::Country));
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_latin1_currency_sign() {
        let decoded = decode_content(&[0x31, 0x30, 0xA4], "iso-8859-1");
        assert_eq!(decoded, "10¤");
    }
}
