//! CSV ingestion for restaurant listing exports.
//!
//! Listing dumps arrive in a handful of encodings (UTF-8, ISO-8859,
//! Windows-1252) and delimiters, so ingestion auto-detects both before
//! parsing rows into typed [`RawRestaurantRecord`]s. Quoted fields with
//! embedded commas are handled by the `csv` reader; empty cells become
//! `None`.

use std::path::Path;

use crate::error::{CsvError, CsvResult, TransformError, TransformResult};
use crate::models::{RawRestaurantRecord, REQUIRED_COLUMNS};

/// Result of parsing with metadata.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed typed records.
    pub records: Vec<RawRestaurantRecord>,
    /// Detected encoding.
    pub encoding: String,
    /// Detected or explicit delimiter.
    pub delimiter: char,
    /// Column headers as they appeared in the input.
    pub headers: Vec<String>,
}

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let (charset, _, _) = chardet::detect(bytes);

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to a string using the detected encoding. Unknown charsets
/// fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.to_string()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.to_string(),
        _ => String::from_utf8_lossy(bytes).to_string(),
    }
}

/// Detect the delimiter by counting occurrences in the first line.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Verify that every column the transformation references is present.
///
/// This is the schema-mismatch gate: the dropped columns may be absent,
/// the required ones may not.
pub fn validate_headers(headers: &[String]) -> TransformResult<()> {
    for required in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == required) {
            return Err(TransformError::MissingColumn(required.to_string()));
        }
    }
    Ok(())
}

/// Parse a CSV file with auto-detection of encoding and delimiter.
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> CsvResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);
    parse_content(&content, delimiter, encoding)
}

/// Parse CSV bytes with an explicit delimiter, auto-detecting encoding.
pub fn parse_bytes_with_delimiter(bytes: &[u8], delimiter: char) -> CsvResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    parse_content(&content, delimiter, encoding)
}

/// Parse decoded CSV content into typed records.
fn parse_content(content: &str, delimiter: char, encoding: String) -> CsvResult<ParseResult> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::NoHeaders);
    }

    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: RawRestaurantRecord = row?;
        records.push(record);
    }

    Ok(ParseResult {
        records,
        encoding,
        delimiter,
        headers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_HEADER: &str = "restaurant_link,restaurant_name,address,latitude,longitude,\
claimed,awards,popularity_generic,price_range,meals,cuisines,features,vegetarian_friendly,\
vegan_options,gluten_free,original_open_hours,open_days_per_week,open_hours_per_week,\
avg_rating,total_reviews_count,food,service,value,atmosphere,keywords";

    fn csv_with_rows(rows: &[&str]) -> Vec<u8> {
        let mut content = String::from(MINIMAL_HEADER);
        for row in rows {
            content.push('\n');
            content.push_str(row);
        }
        content.into_bytes()
    }

    #[test]
    fn test_typed_parse() {
        let bytes = csv_with_rows(&[
            "g1,Chez Paul,\"12 Main St, Springfield\",48.85,2.35,Claimed,,#12 of 350,€10-€20,\
\"Lunch, Dinner\",French,Seating,Y,N,,Mon-Fri 9-17,5,40,4.5,127,4.5,4.0,3.5,4.0,\"cosy, view\"",
        ]);
        let result = parse_bytes_auto(&bytes).unwrap();

        assert_eq!(result.records.len(), 1);
        let record = &result.records[0];
        assert_eq!(record.restaurant_name.as_deref(), Some("Chez Paul"));
        assert_eq!(record.address.as_deref(), Some("12 Main St, Springfield"));
        assert_eq!(record.latitude, Some(48.85));
        assert_eq!(record.total_reviews_count, Some(127.0));
        assert_eq!(record.meals.as_deref(), Some("Lunch, Dinner"));
    }

    #[test]
    fn test_empty_cells_stay_missing() {
        let bytes = csv_with_rows(&["g1,Chez Paul,,,,,,,,,,,,,,,,,,,,,,,"]);
        let result = parse_bytes_auto(&bytes).unwrap();
        let record = &result.records[0];

        assert!(record.address.is_none());
        assert!(record.latitude.is_none());
        assert!(record.awards.is_none());
        assert!(record.avg_rating.is_none());
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
    }

    #[test]
    fn test_validate_headers_accepts_full_schema() {
        let headers: Vec<String> = MINIMAL_HEADER.split(',').map(str::to_string).collect();
        assert!(validate_headers(&headers).is_ok());
    }

    #[test]
    fn test_validate_headers_names_missing_column() {
        let headers: Vec<String> = MINIMAL_HEADER
            .split(',')
            .filter(|h| *h != "claimed")
            .map(str::to_string)
            .collect();
        let err = validate_headers(&headers).unwrap_err();
        assert!(err.to_string().contains("claimed"));
    }

    #[test]
    fn test_dropped_columns_may_be_absent() {
        // MINIMAL_HEADER carries none of the dropped columns
        let bytes = csv_with_rows(&["g1,Chez Paul,,,,,,,,,,,,,,,,,,,,,,,"]);
        let result = parse_bytes_auto(&bytes).unwrap();
        assert!(validate_headers(&result.headers).is_ok());
        assert!(result.records[0].city.is_none());
    }

    #[test]
    fn test_empty_input_error() {
        assert!(matches!(parse_bytes_auto(b""), Err(CsvError::EmptyFile)));
        assert!(matches!(parse_bytes_auto(b"  \n "), Err(CsvError::EmptyFile)));
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert!(decoded.starts_with("Soci"));
        assert!(decoded.ends_with('é'));
    }

    #[test]
    fn test_explicit_delimiter() {
        let content = MINIMAL_HEADER.replace(',', ";") + "\ng1;Chez Paul";
        let result = parse_bytes_with_delimiter(content.as_bytes(), ';').unwrap();
        assert_eq!(result.delimiter, ';');
        assert_eq!(result.records[0].restaurant_name.as_deref(), Some("Chez Paul"));
    }
}
